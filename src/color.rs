use eframe::egui::Color32;

use crate::selection::DoseTier;

// ---------------------------------------------------------------------------
// Dose palette
// ---------------------------------------------------------------------------

/// Fixed curve colour per dose tier, low dose to high: green, steel blue,
/// purple. Legends rely on these staying put between figures.
pub fn dose_color(tier: DoseTier) -> Color32 {
    match tier {
        DoseTier::Ctdi1 => Color32::from_rgb(0, 128, 0),
        DoseTier::Ctdi2 => Color32::from_rgb(70, 130, 180),
        DoseTier::Ctdi3 => Color32::from_rgb(128, 0, 128),
    }
}

// ---------------------------------------------------------------------------
// Hounsfield display window
// ---------------------------------------------------------------------------

/// Display window for slice images: the water/soft-tissue band of a Catphan
/// uniformity module.
pub const WINDOW_MIN_HU: f64 = -100.0;
pub const WINDOW_MAX_HU: f64 = 200.0;

/// Map a HU value onto the fixed linear grey ramp: `WINDOW_MIN_HU` and below
/// are black, `WINDOW_MAX_HU` and above are white.
pub fn hu_to_grey(hu: f64) -> u8 {
    let t = ((hu - WINDOW_MIN_HU) / (WINDOW_MAX_HU - WINDOW_MIN_HU)).clamp(0.0, 1.0);
    (t * 255.0).round() as u8
}

// =============================================================================
// Unit tests
// =============================================================================
