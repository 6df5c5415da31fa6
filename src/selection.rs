use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Reconstruction family
// ---------------------------------------------------------------------------

/// Reconstruction algorithm family: filtered back-projection or one of the
/// two iterative variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Reconstruction {
    Fbp,
    Ir1,
    Ir2,
}

impl Reconstruction {
    pub const ALL: [Reconstruction; 3] =
        [Reconstruction::Fbp, Reconstruction::Ir1, Reconstruction::Ir2];

    /// Name used in directory layouts, config keys and figure titles.
    pub fn name(self) -> &'static str {
        match self {
            Reconstruction::Fbp => "FBP",
            Reconstruction::Ir1 => "IR1",
            Reconstruction::Ir2 => "IR2",
        }
    }
}

impl fmt::Display for Reconstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Dose tiers
// ---------------------------------------------------------------------------

/// One CTDI dose bucket of the three-tier acquisition protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DoseTier {
    Ctdi1,
    Ctdi2,
    Ctdi3,
}

impl DoseTier {
    /// All tiers in ascending dose order. Curve sets and the all-doses image
    /// row are always assembled in this order.
    pub const ALL: [DoseTier; 3] = [DoseTier::Ctdi1, DoseTier::Ctdi2, DoseTier::Ctdi3];

    /// Directory name of the tier in both data trees.
    pub fn directory(self) -> &'static str {
        match self {
            DoseTier::Ctdi1 => "CTDI1",
            DoseTier::Ctdi2 => "CTDI2",
            DoseTier::Ctdi3 => "CTDI3",
        }
    }

    /// Human-readable dose label used in legends and titles.
    pub fn label(self) -> &'static str {
        match self {
            DoseTier::Ctdi1 => "40 mGy",
            DoseTier::Ctdi2 => "60 mGy",
            DoseTier::Ctdi3 => "80 mGy",
        }
    }
}

impl fmt::Display for DoseTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dose choice as presented by the form: a concrete tier or all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoseSelection {
    Tier(DoseTier),
    All,
}

impl fmt::Display for DoseSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoseSelection::Tier(tier) => f.write_str(tier.label()),
            DoseSelection::All => f.write_str("ALL"),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter kernels
// ---------------------------------------------------------------------------

/// A named convolution kernel, e.g. "H10s" or "J45s". The first character
/// encodes the compatibility class checked by [`check_compatibility`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterKernel(String);

impl FilterKernel {
    pub fn new(name: impl Into<String>) -> Self {
        FilterKernel(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Compatibility class of the kernel (its leading character).
    pub fn class(&self) -> Option<char> {
        self.0.chars().next()
    }
}

impl fmt::Display for FilterKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilterKernel {
    fn from(name: &str) -> Self {
        FilterKernel::new(name)
    }
}

// ---------------------------------------------------------------------------
// Selection snapshot
// ---------------------------------------------------------------------------

/// Immutable copy of the form state, captured once per triggered action.
#[derive(Debug, Clone)]
pub struct Selection {
    pub scanner: String,
    pub reconstruction: Reconstruction,
    pub filter: FilterKernel,
    pub dose: DoseSelection,
}

// ---------------------------------------------------------------------------
// Compatibility guard
// ---------------------------------------------------------------------------

/// Rejected reconstruction × kernel combination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("filter {filter} is not compatible with {reconstruction} reconstruction")]
pub struct IncompatibleSelection {
    pub reconstruction: Reconstruction,
    pub filter: FilterKernel,
}

/// Reject kernel/reconstruction pairings that no scanner produces:
/// FBP never uses the iterative 'J'/'Q' kernels, and the iterative
/// reconstructions never use the 'H' kernels. Everything else passes.
pub fn check_compatibility(
    reconstruction: Reconstruction,
    filter: &FilterKernel,
) -> Result<(), IncompatibleSelection> {
    let rejected = match reconstruction {
        Reconstruction::Fbp => matches!(filter.class(), Some('J') | Some('Q')),
        Reconstruction::Ir1 | Reconstruction::Ir2 => matches!(filter.class(), Some('H')),
    };

    if rejected {
        Err(IncompatibleSelection {
            reconstruction,
            filter: filter.clone(),
        })
    } else {
        Ok(())
    }
}

// =============================================================================
// Unit tests
// =============================================================================
