use eframe::egui::{self, Color32, ColorImage, RichText, TextureOptions, Ui, vec2};

use crate::color;
use crate::data::model::SliceImage;
use crate::figure::SlicePanel;

// ---------------------------------------------------------------------------
// HU → grey image
// ---------------------------------------------------------------------------

/// Render a slice to an opaque grey image with the fixed display window.
/// `Array2` iterates row-major, which is exactly the pixel order
/// `ColorImage` expects.
pub fn windowed_color_image(image: &SliceImage) -> ColorImage {
    let (width, height) = (image.width(), image.height());
    let mut rgba = Vec::with_capacity(width * height * 4);
    for &hu in image.hu.iter() {
        let grey = color::hu_to_grey(hu);
        rgba.extend_from_slice(&[grey, grey, grey, 255]);
    }
    ColorImage::from_rgba_unmultiplied([width, height], &rgba)
}

// ---------------------------------------------------------------------------
// Slice panels
// ---------------------------------------------------------------------------

/// Paint one slice panel: dose label above the image, no axes, pixels kept
/// crisp with nearest-neighbour filtering. The texture is uploaded on first
/// paint and reused afterwards.
pub fn slice_panel(ui: &mut Ui, panel: &mut SlicePanel) {
    let texture = panel.texture.get_or_insert_with(|| {
        ui.ctx().load_texture(
            format!("slice:{}", panel.image.source.display()),
            windowed_color_image(&panel.image),
            TextureOptions::NEAREST,
        )
    });

    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(&panel.label).color(Color32::WHITE));

        // Scale to the available space without distorting the aspect ratio.
        let avail = ui.available_size();
        let (w, h) = (panel.image.width() as f32, panel.image.height() as f32);
        let scale = (avail.x / w).min(avail.y / h).max(0.0);
        ui.add(egui::Image::new(&*texture).fit_to_exact_size(vec2(w * scale, h * scale)));
    });
}

/// Paint the all-doses row: one slice panel per tier, ascending dose left to
/// right, equal widths.
pub fn slice_row(ui: &mut Ui, panels: &mut [SlicePanel]) {
    let spacing = ui.spacing().item_spacing;
    let count = panels.len().max(1) as f32;
    let width = (ui.available_width() - spacing.x * (count - 1.0)) / count;
    let height = ui.available_height();

    ui.horizontal(|ui: &mut Ui| {
        for panel in panels.iter_mut() {
            ui.allocate_ui(vec2(width, height), |ui: &mut Ui| {
                slice_panel(ui, panel);
            });
        }
    });
}

// =============================================================================
// Unit tests
// =============================================================================
