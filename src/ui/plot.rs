use eframe::egui::{Ui, vec2};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::color;
use crate::data::model::CurveSet;

/// Batch figures are laid out on a fixed grid, positions filled row-major.
pub const GRID_ROWS: usize = 2;
pub const GRID_COLUMNS: usize = 4;

// ---------------------------------------------------------------------------
// Single NPS plot
// ---------------------------------------------------------------------------

/// Render the three dose curves of one kernel, filling the available space.
pub fn nps_plot(ui: &mut Ui, figure_id: u64, set: &CurveSet) {
    let size = ui.available_size();
    curve_plot(ui, (figure_id, 0, 0), set, size.x, size.y);
}

// ---------------------------------------------------------------------------
// Batch grid
// ---------------------------------------------------------------------------

/// Render batch panels on the fixed 2×4 grid, row-major, each with its own
/// title. Panels keep the same size regardless of how many there are.
pub fn nps_grid(ui: &mut Ui, figure_id: u64, panels: &[CurveSet]) {
    let spacing = ui.spacing().item_spacing;
    let width =
        (ui.available_width() - spacing.x * (GRID_COLUMNS as f32 - 1.0)) / GRID_COLUMNS as f32;
    let height =
        (ui.available_height() - spacing.y * (GRID_ROWS as f32 - 1.0)) / GRID_ROWS as f32;
    // Room for the per-panel title above each plot.
    let title_height = ui.text_style_height(&eframe::egui::TextStyle::Body) + spacing.y;

    for (row, chunk) in panels.chunks(GRID_COLUMNS).enumerate() {
        ui.horizontal(|ui: &mut Ui| {
            for (column, set) in chunk.iter().enumerate() {
                ui.allocate_ui(vec2(width, height), |ui: &mut Ui| {
                    ui.vertical(|ui: &mut Ui| {
                        ui.strong(set.title());
                        curve_plot(
                            ui,
                            (figure_id, row, column),
                            set,
                            width,
                            height - title_height,
                        );
                    });
                });
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Shared curve rendering
// ---------------------------------------------------------------------------

/// One Plot widget with a line per dose curve. Each curve is drawn against
/// its own frequency axis; legend labels are the dose labels.
fn curve_plot(ui: &mut Ui, id: (u64, usize, usize), set: &CurveSet, width: f32, height: f32) {
    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label("fq (mm⁻¹)")
        .y_axis_label("NPS")
        .width(width)
        .height(height)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for curve in &set.curves {
                let points: PlotPoints = curve
                    .table
                    .frequency
                    .iter()
                    .zip(curve.table.values.iter())
                    .map(|(&x, &y)| [x, y])
                    .collect();

                let line = Line::new(points)
                    .name(curve.tier.label())
                    .color(color::dose_color(curve.tier))
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Hint shown behind the figure windows.
pub fn central_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Pick scanner, reconstruction and filter, then plot NPS or show a test image");
    });
}
