use eframe::egui::TextureHandle;

use crate::config::AppConfig;
use crate::data::DataError;
use crate::data::loader;
use crate::data::model::{CurveSet, SliceImage};
use crate::data::paths::PathScheme;
use crate::data::series;
use crate::selection::{DoseSelection, DoseTier, Reconstruction, Selection, check_compatibility};

// ---------------------------------------------------------------------------
// Figure view-models
// ---------------------------------------------------------------------------

/// One accumulated figure window. Figures stay open until the operator
/// closes them; `open` is flipped by the window close button.
pub struct Figure {
    pub id: u64,
    pub title: String,
    pub kind: FigureKind,
    pub open: bool,
}

impl Figure {
    pub fn new(id: u64, title: impl Into<String>, kind: FigureKind) -> Self {
        Figure {
            id,
            title: title.into(),
            kind,
            open: true,
        }
    }
}

pub enum FigureKind {
    /// One NPS plot with the three dose curves.
    NpsSingle(CurveSet),
    /// Batch of NPS plots on the fixed 2×4 grid, row-major.
    NpsGrid(Vec<CurveSet>),
    /// One representative slice.
    SliceSingle(SlicePanel),
    /// Representative slices of all tiers, ascending dose left to right.
    SliceRow(Vec<SlicePanel>),
}

/// A slice image plus its display state. The texture is uploaded lazily on
/// first paint and cached for the lifetime of the figure.
pub struct SlicePanel {
    pub label: String,
    pub image: SliceImage,
    pub texture: Option<TextureHandle>,
}

impl SlicePanel {
    pub fn new(label: impl Into<String>, image: SliceImage) -> Self {
        SlicePanel {
            label: label.into(),
            image,
            texture: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Builders: guard, then exactly the reads the figure needs
// ---------------------------------------------------------------------------

/// Build the NPS figure for one selection: three curves, one per dose tier.
pub fn build_nps(
    id: u64,
    config: &AppConfig,
    scheme: &PathScheme,
    selection: &Selection,
) -> Result<Figure, DataError> {
    check_compatibility(selection.reconstruction, &selection.filter)?;
    let set = loader::load_curve_set(
        scheme,
        &config.table_columns,
        &selection.scanner,
        selection.reconstruction,
        &selection.filter,
    )?;
    let title = set.title();
    Ok(Figure::new(id, title, FigureKind::NpsSingle(set)))
}

/// Build the batch figure of one reconstruction: one NPS panel per kernel in
/// the configured list, in list order.
pub fn build_batch(
    id: u64,
    config: &AppConfig,
    scheme: &PathScheme,
    scanner: &str,
    reconstruction: Reconstruction,
) -> Result<Figure, DataError> {
    let list = config.batch_list(reconstruction);
    let mut panels = Vec::with_capacity(list.len());
    for filter in list {
        check_compatibility(reconstruction, filter)?;
        panels.push(loader::load_curve_set(
            scheme,
            &config.table_columns,
            scanner,
            reconstruction,
            filter,
        )?);
    }
    Ok(Figure::new(
        id,
        format!("All {reconstruction} kernels"),
        FigureKind::NpsGrid(panels),
    ))
}

/// Build the test-image figure: one slice for a concrete dose tier, or a
/// 1×3 row covering all tiers.
pub fn build_slices(
    id: u64,
    scheme: &PathScheme,
    selection: &Selection,
) -> Result<Figure, DataError> {
    check_compatibility(selection.reconstruction, &selection.filter)?;
    match selection.dose {
        DoseSelection::Tier(tier) => {
            let panel = slice_panel(scheme, selection, tier)?;
            let title = format!(
                "{} {} {}",
                selection.reconstruction,
                selection.filter,
                tier.label()
            );
            Ok(Figure::new(id, title, FigureKind::SliceSingle(panel)))
        }
        DoseSelection::All => {
            let mut panels = Vec::with_capacity(DoseTier::ALL.len());
            for tier in DoseTier::ALL {
                panels.push(slice_panel(scheme, selection, tier)?);
            }
            let title = format!("{} {} all doses", selection.reconstruction, selection.filter);
            Ok(Figure::new(id, title, FigureKind::SliceRow(panels)))
        }
    }
}

fn slice_panel(
    scheme: &PathScheme,
    selection: &Selection,
    tier: DoseTier,
) -> Result<SlicePanel, DataError> {
    let dir = scheme.series_dir(
        &selection.scanner,
        tier,
        selection.reconstruction,
        &selection.filter,
    );
    let image = series::load_representative_slice(&dir)?;
    Ok(SlicePanel::new(tier.label(), image))
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil;
    use crate::selection::FilterKernel;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const TABLE_TEMPLATE: &str = "{scanner}/{tier}/{reconstruction}/{filter}.{ext}";
    const SERIES_TEMPLATE: &str = "{scanner}/{tier} {reconstruction}  3.0  {filter}";

    fn scheme_at(root: &Path) -> PathScheme {
        PathScheme::new(root, TABLE_TEMPLATE, "csv", root, SERIES_TEMPLATE).unwrap()
    }

    fn selection(
        reconstruction: Reconstruction,
        filter: &str,
        dose: DoseSelection,
    ) -> Selection {
        Selection {
            scanner: "Siemens AS+".to_string(),
            reconstruction,
            filter: FilterKernel::from(filter),
            dose,
        }
    }

    fn write_table(root: &Path, tier: DoseTier, filter: &str, nps: f64) {
        let dir = root.join("Siemens AS+").join(tier.directory()).join("FBP");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{filter}.csv")),
            format!("F,NPSTOT\n0.0,{nps}\n0.5,{}\n", nps / 2.0),
        )
        .unwrap();
    }

    fn write_series(root: &Path, tier: DoseTier, filter: &str, pixel: u16) {
        let dir = root
            .join("Siemens AS+")
            .join(format!("{} FBP  3.0  {filter}", tier.directory()));
        fs::create_dir_all(&dir).unwrap();
        for i in 0..7 {
            testutil::write_ct_slice(
                &dir.join(format!("slice{i}.dcm")),
                f64::from(i) * 3.0 - 110.0,
                4,
                pixel,
                1.0,
                -1024.0,
            );
        }
    }

    // =========================================================================
    // Guard short-circuit
    // =========================================================================

    mod guard {
        use super::*;

        #[test]
        fn incompatible_selection_fails_before_any_file_access() {
            // Roots that do not exist: reaching I/O would yield a different
            // error variant.
            let scheme = scheme_at(Path::new("/nonexistent/data"));
            let config = AppConfig::default();
            let sel = selection(Reconstruction::Fbp, "J30s", DoseSelection::All);

            let err = build_nps(1, &config, &scheme, &sel).unwrap_err();
            assert!(matches!(err, DataError::Incompatible(_)), "{err}");

            let err = build_slices(2, &scheme, &sel).unwrap_err();
            assert!(matches!(err, DataError::Incompatible(_)), "{err}");
        }

        #[test]
        fn iterative_reconstruction_rejects_h_kernels() {
            let scheme = scheme_at(Path::new("/nonexistent/data"));
            let config = AppConfig::default();
            let sel = selection(Reconstruction::Ir1, "H10s", DoseSelection::All);
            let err = build_nps(1, &config, &scheme, &sel).unwrap_err();
            assert!(matches!(err, DataError::Incompatible(_)), "{err}");
        }
    }

    // =========================================================================
    // NPS figures
    // =========================================================================

    mod nps {
        use super::*;

        #[test]
        fn single_figure_has_three_curves_in_tier_order() {
            let dir = TempDir::new().unwrap();
            for (tier, nps) in DoseTier::ALL.into_iter().zip([30.0, 20.0, 10.0]) {
                write_table(dir.path(), tier, "H10s", nps);
            }

            let sel = selection(Reconstruction::Fbp, "H10s", DoseSelection::All);
            let fig = build_nps(7, &AppConfig::default(), &scheme_at(dir.path()), &sel).unwrap();

            assert_eq!(fig.id, 7);
            assert_eq!(fig.title, "H10s with FBP");
            assert!(fig.open);
            match fig.kind {
                FigureKind::NpsSingle(set) => {
                    assert_eq!(set.curves.len(), 3);
                    for (curve, tier) in set.curves.iter().zip(DoseTier::ALL) {
                        assert_eq!(curve.tier, tier);
                    }
                    assert_eq!(set.curves[0].table.values, vec![30.0, 15.0]);
                }
                _ => panic!("expected NpsSingle"),
            }
        }

        #[test]
        fn batch_panels_follow_the_configured_kernel_order() {
            let dir = TempDir::new().unwrap();
            for filter in ["H20s", "H10s"] {
                for tier in DoseTier::ALL {
                    write_table(dir.path(), tier, filter, 12.0);
                }
            }

            let mut config = AppConfig::default();
            config.batch_kernels.insert(
                Reconstruction::Fbp,
                vec![FilterKernel::from("H20s"), FilterKernel::from("H10s")],
            );

            let fig = build_batch(
                3,
                &config,
                &scheme_at(dir.path()),
                "Siemens AS+",
                Reconstruction::Fbp,
            )
            .unwrap();

            assert_eq!(fig.title, "All FBP kernels");
            match fig.kind {
                FigureKind::NpsGrid(panels) => {
                    assert_eq!(panels.len(), 2);
                    assert_eq!(panels[0].filter.name(), "H20s");
                    assert_eq!(panels[1].filter.name(), "H10s");
                    assert_eq!(panels[0].title(), "H20s with FBP");
                }
                _ => panic!("expected NpsGrid"),
            }
        }

        #[test]
        fn missing_table_aborts_the_whole_batch() {
            let dir = TempDir::new().unwrap();
            // Only the first kernel has tables.
            for tier in DoseTier::ALL {
                write_table(dir.path(), tier, "H20s", 12.0);
            }

            let mut config = AppConfig::default();
            config.batch_kernels.insert(
                Reconstruction::Fbp,
                vec![FilterKernel::from("H20s"), FilterKernel::from("H10s")],
            );

            let err = build_batch(
                3,
                &config,
                &scheme_at(dir.path()),
                "Siemens AS+",
                Reconstruction::Fbp,
            )
            .unwrap_err();
            assert!(matches!(err, DataError::TableRead { .. }), "{err}");
        }
    }

    // =========================================================================
    // Slice figures
    // =========================================================================

    mod slices {
        use super::*;

        #[test]
        fn concrete_tier_gives_a_single_slice_figure() {
            let dir = TempDir::new().unwrap();
            write_series(dir.path(), DoseTier::Ctdi1, "H10s", 1000);

            let sel = selection(
                Reconstruction::Fbp,
                "H10s",
                DoseSelection::Tier(DoseTier::Ctdi1),
            );
            let fig = build_slices(4, &scheme_at(dir.path()), &sel).unwrap();

            assert_eq!(fig.title, "FBP H10s 40 mGy");
            match fig.kind {
                FigureKind::SliceSingle(panel) => {
                    assert_eq!(panel.label, "40 mGy");
                    assert!(panel.texture.is_none());
                    assert!(panel.image.hu.iter().all(|&hu| hu == -24.0));
                }
                _ => panic!("expected SliceSingle"),
            }
        }

        #[test]
        fn all_doses_give_a_row_in_ascending_tier_order() {
            let dir = TempDir::new().unwrap();
            for (tier, pixel) in DoseTier::ALL.into_iter().zip([1000_u16, 1100, 1200]) {
                write_series(dir.path(), tier, "H10s", pixel);
            }

            let sel = selection(Reconstruction::Fbp, "H10s", DoseSelection::All);
            let fig = build_slices(5, &scheme_at(dir.path()), &sel).unwrap();

            assert_eq!(fig.title, "FBP H10s all doses");
            match fig.kind {
                FigureKind::SliceRow(panels) => {
                    assert_eq!(panels.len(), 3);
                    let labels: Vec<&str> = panels.iter().map(|p| p.label.as_str()).collect();
                    assert_eq!(labels, vec!["40 mGy", "60 mGy", "80 mGy"]);
                    for (panel, expected) in panels.iter().zip([-24.0, 76.0, 176.0]) {
                        assert!(panel.image.hu.iter().all(|&hu| hu == expected));
                    }
                }
                _ => panic!("expected SliceRow"),
            }
        }

        #[test]
        fn missing_series_directory_names_the_composed_path() {
            let dir = TempDir::new().unwrap();
            let sel = selection(
                Reconstruction::Fbp,
                "H10s",
                DoseSelection::Tier(DoseTier::Ctdi2),
            );
            let err = build_slices(6, &scheme_at(dir.path()), &sel).unwrap_err();
            match err {
                DataError::SeriesDirMissing { dir } => {
                    assert!(
                        dir.ends_with("Siemens AS+/CTDI2 FBP  3.0  H10s"),
                        "{dir:?}"
                    );
                }
                other => panic!("expected SeriesDirMissing, got {other:?}"),
            }
        }
    }
}
