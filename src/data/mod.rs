/// Data layer: path composition, table loading, and DICOM series access.
///
/// Architecture:
/// ```text
///  Selection (scanner, reconstruction, filter, dose)
///        │
///        ▼
///   ┌──────────┐
///   │  paths    │  substitute selection into the configured templates
///   └──────────┘
///        │
///        ├──────────────────────────┐
///        ▼                          ▼
///   ┌──────────┐              ┌──────────┐
///   │  loader   │              │  series   │
///   └──────────┘              └──────────┘
///   .csv/.json/.parquet        DICOM slice files
///        │                          │
///        ▼                          ▼
///     CurveSet                  SliceImage
/// ```
///
/// Every action re-reads from disk; nothing here caches.

pub mod loader;
pub mod model;
pub mod paths;
pub mod series;

use std::path::PathBuf;

use thiserror::Error;

use crate::selection::IncompatibleSelection;

/// Everything that can go wrong between a captured selection and a finished
/// figure. Action handlers log these and show them in the status line; no
/// data fault may panic the application.
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Incompatible(#[from] IncompatibleSelection),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read NPS table {}: {source:#}", path.display())]
    TableRead {
        path: PathBuf,
        source: anyhow::Error,
    },

    #[error("image series directory not found: {}", dir.display())]
    SeriesDirMissing { dir: PathBuf },

    #[error("image series directory {} contains no files", dir.display())]
    EmptySeries { dir: PathBuf },

    #[error("image series {} has {found} slices, need at least {needed}", dir.display())]
    TooFewSlices {
        dir: PathBuf,
        found: usize,
        needed: usize,
    },

    #[error("failed to read DICOM file {}: {source:#}", path.display())]
    SliceRead {
        path: PathBuf,
        source: anyhow::Error,
    },

    #[error("DICOM file {} is missing a usable {tag} tag", path.display())]
    MissingTag { path: PathBuf, tag: &'static str },

    #[error("failed to decode pixel data of {}: {source:#}", path.display())]
    PixelDecode {
        path: PathBuf,
        source: anyhow::Error,
    },
}

#[cfg(test)]
pub mod testutil;
