use eframe::egui::{self, Color32, Frame, Id};

use crate::data::DataError;
use crate::figure::{self, Figure, FigureKind};
use crate::state::AppState;
use crate::ui::panels::FormAction;
use crate::ui::{image, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct NpsViewerApp {
    pub state: AppState,
}

impl NpsViewerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Build the requested figure from a selection snapshot. Failures never
    /// open a window; they land in the status bar instead.
    fn dispatch(&mut self, action: FormAction) {
        let selection = self.state.form.snapshot();
        log::info!(
            "{action:?} for {} / {} / {} / {}",
            selection.scanner,
            selection.reconstruction,
            selection.filter,
            selection.dose
        );

        let id = self.state.allocate_figure_id();
        let built = match action {
            FormAction::PlotNps => {
                figure::build_nps(id, &self.state.config, &self.state.scheme, &selection)
            }
            FormAction::PlotBatch(reconstruction) => figure::build_batch(
                id,
                &self.state.config,
                &self.state.scheme,
                &selection.scanner,
                reconstruction,
            ),
            FormAction::TestImage => figure::build_slices(id, &self.state.scheme, &selection),
        };

        match built {
            Ok(figure) => {
                self.state.status_message = None;
                self.state.push_figure(figure);
            }
            Err(DataError::Incompatible(e)) => {
                log::warn!("rejected selection: {e}");
                self.state.status_message = Some(format!("Error: {e}"));
            }
            Err(e) => {
                log::error!("could not build figure: {e}");
                self.state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for NpsViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection form ----
        let mut action = None;
        egui::SidePanel::left("selection_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                action = panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: hint only, figures live in their own windows ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central_hint(ui);
        });

        if let Some(action) = action {
            self.dispatch(action);
        }

        for figure in &mut self.state.figures {
            figure_window(ctx, figure);
        }
        self.state.prune_closed_figures();
    }
}

// ---------------------------------------------------------------------------
// Figure windows
// ---------------------------------------------------------------------------

/// One free-floating window per figure. The window id is tied to the figure
/// id, not the title, so identically named figures stay independent.
fn figure_window(ctx: &egui::Context, figure: &mut Figure) {
    let mut window = egui::Window::new(figure.title.as_str())
        .id(Id::new(("figure", figure.id)))
        .open(&mut figure.open)
        .resizable(true);

    window = match &figure.kind {
        FigureKind::NpsSingle(_) => window.default_size([520.0, 400.0]),
        FigureKind::NpsGrid(_) => window.default_size([1100.0, 560.0]),
        // Slice figures draw on a black background.
        FigureKind::SliceSingle(_) => window
            .default_size([420.0, 440.0])
            .frame(Frame::window(&ctx.style()).fill(Color32::BLACK)),
        FigureKind::SliceRow(_) => window
            .default_size([980.0, 360.0])
            .frame(Frame::window(&ctx.style()).fill(Color32::BLACK)),
    };

    window.show(ctx, |ui| match &mut figure.kind {
        FigureKind::NpsSingle(set) => plot::nps_plot(ui, figure.id, set),
        FigureKind::NpsGrid(sets) => plot::nps_grid(ui, figure.id, sets),
        FigureKind::SliceSingle(panel) => image::slice_panel(ui, panel),
        FigureKind::SliceRow(panels) => image::slice_row(ui, panels),
    });
}
