use eframe::egui::{self, Color32, RichText, Ui};

use crate::config::AppConfig;
use crate::selection::{DoseSelection, DoseTier, Reconstruction};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Form actions
// ---------------------------------------------------------------------------

/// What the operator asked for this frame. The app captures a selection
/// snapshot and dispatches; the form itself never validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    /// One figure with the three dose curves of the selected kernel.
    PlotNps,
    /// One 2×4 batch figure for the given reconstruction's kernel list.
    PlotBatch(Reconstruction),
    /// Representative slice(s) for the selected dose.
    TestImage,
}

// ---------------------------------------------------------------------------
// Left side panel – selection form
// ---------------------------------------------------------------------------

/// Render the selection form. Returns the action triggered this frame, if any.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) -> Option<FormAction> {
    let mut action = None;

    ui.heading("NPS vs dose");
    ui.separator();

    // Clone the option lists; the combos borrow the form mutably.
    let scanners = state.config.scanners.clone();
    let filters = state.config.filters.clone();

    ui.strong("Scanner");
    egui::ComboBox::from_id_salt("scanner")
        .selected_text(state.form.scanner.clone())
        .show_ui(ui, |ui: &mut Ui| {
            for scanner in &scanners {
                ui.selectable_value(&mut state.form.scanner, scanner.clone(), scanner);
            }
        });
    ui.add_space(4.0);

    ui.strong("Reconstruction");
    egui::ComboBox::from_id_salt("reconstruction")
        .selected_text(state.form.reconstruction.name())
        .show_ui(ui, |ui: &mut Ui| {
            for reconstruction in Reconstruction::ALL {
                ui.selectable_value(
                    &mut state.form.reconstruction,
                    reconstruction,
                    reconstruction.name(),
                );
            }
        });
    ui.add_space(4.0);

    ui.strong("Filter kernel");
    egui::ComboBox::from_id_salt("filter")
        .selected_text(state.form.filter.name().to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for filter in &filters {
                ui.selectable_value(&mut state.form.filter, filter.clone(), filter.name());
            }
        });
    ui.add_space(8.0);

    if ui.button("Plot NPS").clicked() {
        action = Some(FormAction::PlotNps);
    }
    ui.add_space(4.0);

    ui.horizontal(|ui: &mut Ui| {
        for reconstruction in Reconstruction::ALL {
            if ui.button(format!("Plot all {reconstruction}")).clicked() {
                action = Some(FormAction::PlotBatch(reconstruction));
            }
        }
    });

    ui.separator();

    ui.strong("Dose");
    egui::ComboBox::from_id_salt("dose")
        .selected_text(state.form.dose.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for tier in DoseTier::ALL {
                ui.selectable_value(
                    &mut state.form.dose,
                    DoseSelection::Tier(tier),
                    tier.label(),
                );
            }
            ui.selectable_value(&mut state.form.dose, DoseSelection::All, "ALL");
        });
    ui.add_space(4.0);

    if ui.button("Test image").clicked() {
        action = Some(FormAction::TestImage);
    }

    action
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Load configuration…").clicked() {
                load_config_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!("{} figures open", state.figures.len()));

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Configuration dialog
// ---------------------------------------------------------------------------

/// Pick, load and validate a config file; on success it replaces the active
/// one and the form resets to the new defaults.
pub fn load_config_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Load configuration")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match AppConfig::load(&path) {
            Ok(config) => {
                log::info!("configuration loaded from {}", path.display());
                if let Err(e) = state.set_config(config) {
                    log::error!("failed to apply configuration: {e}");
                    state.status_message = Some(format!("Error: {e}"));
                }
            }
            Err(e) => {
                log::error!("failed to load configuration: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
