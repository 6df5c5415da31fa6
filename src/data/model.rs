use std::path::PathBuf;

use ndarray::Array2;

use crate::selection::{DoseTier, FilterKernel, Reconstruction};

// ---------------------------------------------------------------------------
// NpsTable – one loaded spreadsheet export
// ---------------------------------------------------------------------------

/// A noise-power-spectrum table: spatial frequency against total NPS.
/// Both columns have the same length and at least one row.
#[derive(Debug, Clone, PartialEq)]
pub struct NpsTable {
    /// Spatial frequency axis in mm⁻¹.
    pub frequency: Vec<f64>,
    /// Total NPS value at each frequency.
    pub values: Vec<f64>,
}

impl NpsTable {
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DoseCurve / CurveSet – what one NPS plot is made of
// ---------------------------------------------------------------------------

/// One curve of an NPS plot. The table keeps its own frequency axis;
/// axes are never shared between tiers.
#[derive(Debug, Clone)]
pub struct DoseCurve {
    pub tier: DoseTier,
    pub table: NpsTable,
}

/// The three dose curves of one (scanner, reconstruction, filter) triple,
/// in ascending dose order.
#[derive(Debug, Clone)]
pub struct CurveSet {
    pub scanner: String,
    pub reconstruction: Reconstruction,
    pub filter: FilterKernel,
    pub curves: Vec<DoseCurve>,
}

impl CurveSet {
    /// Plot title, e.g. "H30s with FBP".
    pub fn title(&self) -> String {
        format!("{} with {}", self.filter, self.reconstruction)
    }

    /// True when every curve spans the same frequency axis. A mismatch is
    /// legal (each curve is drawn against its own axis) but worth a warning.
    pub fn axes_match(&self) -> bool {
        let mut tables = self.curves.iter().map(|c| &c.table.frequency);
        match tables.next() {
            Some(first) => tables.all(|axis| axis == first),
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// SliceImage – one decoded DICOM slice
// ---------------------------------------------------------------------------

/// A decoded CT slice with the rescale already applied:
/// `hu = stored × RescaleSlope + RescaleIntercept`.
#[derive(Debug, Clone)]
pub struct SliceImage {
    /// Hounsfield units, row-major `(rows, columns)`.
    pub hu: Array2<f64>,
    /// SliceLocation of the source file, in mm.
    pub slice_location: f64,
    /// File the slice was decoded from.
    pub source: PathBuf,
}

impl SliceImage {
    pub fn width(&self) -> usize {
        self.hu.ncols()
    }

    pub fn height(&self) -> usize {
        self.hu.nrows()
    }
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table(frequency: Vec<f64>, values: Vec<f64>) -> NpsTable {
        NpsTable { frequency, values }
    }

    fn curve_set(curves: Vec<DoseCurve>) -> CurveSet {
        CurveSet {
            scanner: "Siemens AS+".into(),
            reconstruction: Reconstruction::Fbp,
            filter: FilterKernel::from("H30s"),
            curves,
        }
    }

    #[test]
    fn title_is_filter_with_reconstruction() {
        let set = curve_set(Vec::new());
        assert_eq!(set.title(), "H30s with FBP");
    }

    #[test]
    fn matching_axes_are_detected() {
        let set = curve_set(vec![
            DoseCurve {
                tier: DoseTier::Ctdi1,
                table: table(vec![0.0, 0.1, 0.2], vec![1.0, 2.0, 1.0]),
            },
            DoseCurve {
                tier: DoseTier::Ctdi2,
                table: table(vec![0.0, 0.1, 0.2], vec![0.5, 1.0, 0.5]),
            },
        ]);
        assert!(set.axes_match());
    }

    #[test]
    fn differing_axes_are_detected() {
        let set = curve_set(vec![
            DoseCurve {
                tier: DoseTier::Ctdi1,
                table: table(vec![0.0, 0.1, 0.2], vec![1.0, 2.0, 1.0]),
            },
            DoseCurve {
                tier: DoseTier::Ctdi2,
                table: table(vec![0.0, 0.15], vec![0.5, 1.0]),
            },
        ]);
        assert!(!set.axes_match());
    }

    #[test]
    fn slice_image_reports_row_major_dimensions() {
        let image = SliceImage {
            hu: Array2::zeros((4, 7)),
            slice_location: -95.0,
            source: PathBuf::from("slice.dcm"),
        };
        assert_eq!(image.height(), 4);
        assert_eq!(image.width(), 7);
    }
}
