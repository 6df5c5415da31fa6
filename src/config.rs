use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::loader::TableColumns;
use crate::data::paths::{PathScheme, TemplateError};
use crate::selection::{
    FilterKernel, IncompatibleSelection, Reconstruction, check_compatibility,
};

/// Config file looked up in the working directory at startup.
pub const DEFAULT_CONFIG_FILE: &str = "nps-viewer.json";

/// Upper bound on a batch kernel list; batch figures are laid out on a fixed
/// 2×4 grid.
pub const MAX_BATCH_KERNELS: usize = 8;

// ---------------------------------------------------------------------------
// Defaults (the legacy archive layout)
// ---------------------------------------------------------------------------

const DEFAULT_SCANNERS: [&str; 2] = ["Siemens AS+", "Siemens Flash"];

const DEFAULT_FILTERS: [&str; 16] = [
    "H10s", "H20s", "H30s", "H37s", "H40s", "H50s", "H60s", "H70h", "J30s", "J37s", "J40s",
    "J45s", "J49s", "J70h", "Q30s", "Q33s",
];

const DEFAULT_FBP_BATCH: [&str; 8] = [
    "H10s", "H20s", "H30s", "H37s", "H40s", "H50s", "H60s", "H70h",
];

const DEFAULT_ITERATIVE_BATCH: [&str; 8] = [
    "J30s", "J37s", "J40s", "J45s", "J49s", "J70h", "Q30s", "Q33s",
];

const DEFAULT_NPS_ROOT: &str = "../NPS tabeller 22";
const DEFAULT_TABLE_TEMPLATE: &str = "{scanner}/{tier}/{reconstruction}/{filter}.{ext}";
const DEFAULT_TABLE_EXTENSION: &str = "csv";
const DEFAULT_IMAGE_ROOT: &str = "../CT bilder av Catphan";
// The double spaces are part of the archive naming and must survive verbatim.
const DEFAULT_SERIES_TEMPLATE: &str = "{scanner}/{tier} {reconstruction}  3.0  {filter}";

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Application configuration. Every field has a default reproducing the
/// legacy archive layout, so an empty JSON object is a valid config file.
/// Unknown keys are rejected so typos fail loudly at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Scanner models offered by the form.
    pub scanners: Vec<String>,
    /// Filter kernels offered by the form.
    pub filters: Vec<FilterKernel>,
    /// Ordered kernel list per reconstruction used by the batch plots.
    pub batch_kernels: BTreeMap<Reconstruction, Vec<FilterKernel>>,

    /// Root of the NPS table tree.
    pub nps_root: PathBuf,
    /// Table path template below `nps_root`.
    pub table_template: String,
    /// Extension substituted for `{ext}` in the table template.
    pub table_extension: String,
    /// Names of the frequency and NPS columns inside the tables.
    pub table_columns: TableColumns,

    /// Root of the DICOM series tree.
    pub image_root: PathBuf,
    /// Series directory template below `image_root`.
    pub series_template: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let kernels = |names: &[&str]| -> Vec<FilterKernel> {
            names.iter().copied().map(FilterKernel::from).collect()
        };

        let mut batch_kernels = BTreeMap::new();
        batch_kernels.insert(Reconstruction::Fbp, kernels(&DEFAULT_FBP_BATCH));
        batch_kernels.insert(Reconstruction::Ir1, kernels(&DEFAULT_ITERATIVE_BATCH));
        batch_kernels.insert(Reconstruction::Ir2, kernels(&DEFAULT_ITERATIVE_BATCH));

        AppConfig {
            scanners: DEFAULT_SCANNERS.iter().map(|s| s.to_string()).collect(),
            filters: kernels(&DEFAULT_FILTERS),
            batch_kernels,
            nps_root: PathBuf::from(DEFAULT_NPS_ROOT),
            table_template: DEFAULT_TABLE_TEMPLATE.to_string(),
            table_extension: DEFAULT_TABLE_EXTENSION.to_string(),
            table_columns: TableColumns::default(),
            image_root: PathBuf::from(DEFAULT_IMAGE_ROOT),
            series_template: DEFAULT_SERIES_TEMPLATE.to_string(),
        }
    }
}

impl AppConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config: AppConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `nps-viewer.json` from the working directory when present,
    /// otherwise fall back to the built-in defaults. Either way the result
    /// is validated.
    pub fn load_or_default() -> Result<AppConfig, ConfigError> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            log::info!("loading configuration from {}", path.display());
            AppConfig::load(path)
        } else {
            log::info!("no {DEFAULT_CONFIG_FILE} found, using built-in defaults");
            let config = AppConfig::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Startup validation: non-empty selection lists, well-formed batch
    /// lists, well-formed path templates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scanners.is_empty() {
            return Err(ConfigError::NoScanners);
        }
        if self.scanners.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::EmptyScannerName);
        }
        if self.filters.is_empty() {
            return Err(ConfigError::NoFilters);
        }
        if self.filters.iter().any(|f| f.name().trim().is_empty()) {
            return Err(ConfigError::EmptyKernelName);
        }

        for reconstruction in Reconstruction::ALL {
            let Some(list) = self.batch_kernels.get(&reconstruction) else {
                return Err(ConfigError::MissingBatchList { reconstruction });
            };
            if list.is_empty() {
                return Err(ConfigError::EmptyBatchList { reconstruction });
            }
            if list.len() > MAX_BATCH_KERNELS {
                return Err(ConfigError::BatchListTooLong {
                    reconstruction,
                    len: list.len(),
                    max: MAX_BATCH_KERNELS,
                });
            }
            for filter in list {
                if !self.filters.contains(filter) {
                    return Err(ConfigError::UnknownBatchKernel {
                        reconstruction,
                        filter: filter.clone(),
                    });
                }
                check_compatibility(reconstruction, filter).map_err(|source| {
                    ConfigError::IncompatibleBatchKernel {
                        reconstruction,
                        source,
                    }
                })?;
            }
        }

        self.path_scheme()?;
        Ok(())
    }

    /// Build the path scheme from the configured roots and templates.
    pub fn path_scheme(&self) -> Result<PathScheme, TemplateError> {
        PathScheme::new(
            &self.nps_root,
            &self.table_template,
            &self.table_extension,
            &self.image_root,
            &self.series_template,
        )
    }

    /// Ordered batch kernel list of a reconstruction. Validation guarantees
    /// the list exists and is non-empty.
    pub fn batch_list(&self, reconstruction: Reconstruction) -> &[FilterKernel] {
        self.batch_kernels
            .get(&reconstruction)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("config lists no scanners")]
    NoScanners,

    #[error("config contains an empty scanner name")]
    EmptyScannerName,

    #[error("config lists no filter kernels")]
    NoFilters,

    #[error("config contains an empty filter kernel name")]
    EmptyKernelName,

    #[error("config has no batch kernel list for {reconstruction}")]
    MissingBatchList { reconstruction: Reconstruction },

    #[error("batch kernel list for {reconstruction} is empty")]
    EmptyBatchList { reconstruction: Reconstruction },

    #[error("batch kernel list for {reconstruction} has {len} entries, at most {max} fit the grid")]
    BatchListTooLong {
        reconstruction: Reconstruction,
        len: usize,
        max: usize,
    },

    #[error("batch kernel list for {reconstruction} contains {filter}, which is not in the filter list")]
    UnknownBatchKernel {
        reconstruction: Reconstruction,
        filter: FilterKernel,
    },

    #[error("batch kernel list for {reconstruction} is invalid: {source}")]
    IncompatibleBatchKernel {
        reconstruction: Reconstruction,
        source: IncompatibleSelection,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),
}

// =============================================================================
// Unit tests
// =============================================================================
