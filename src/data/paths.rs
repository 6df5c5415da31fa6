use std::path::PathBuf;

use thiserror::Error;

use crate::selection::{DoseTier, FilterKernel, Reconstruction};

// ---------------------------------------------------------------------------
// Template placeholders
// ---------------------------------------------------------------------------

/// Placeholders a table template must contain.
const TABLE_PLACEHOLDERS: [&str; 5] = ["scanner", "tier", "reconstruction", "filter", "ext"];

/// Placeholders a series template must contain.
const SERIES_PLACEHOLDERS: [&str; 4] = ["scanner", "tier", "reconstruction", "filter"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template '{template}' is missing the {{{placeholder}}} placeholder")]
    MissingPlaceholder {
        template: String,
        placeholder: &'static str,
    },

    #[error("template '{template}' contains unsupported placeholder {{{token}}}")]
    UnknownPlaceholder { template: String, token: String },

    #[error("template '{template}' has an unmatched '{{'")]
    UnmatchedBrace { template: String },
}

/// Check that `template` uses exactly the `allowed` placeholder vocabulary
/// and uses all of it.
fn validate_template(template: &str, allowed: &[&'static str]) -> Result<(), TemplateError> {
    let mut rest = template;
    let mut seen: Vec<&str> = Vec::new();

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            return Err(TemplateError::UnmatchedBrace {
                template: template.to_string(),
            });
        };
        let token = &after[..end];
        match allowed.iter().copied().find(|p| *p == token) {
            Some(placeholder) => seen.push(placeholder),
            None => {
                return Err(TemplateError::UnknownPlaceholder {
                    template: template.to_string(),
                    token: token.to_string(),
                });
            }
        }
        rest = &after[end + 1..];
    }

    for &placeholder in allowed {
        if !seen.contains(&placeholder) {
            return Err(TemplateError::MissingPlaceholder {
                template: template.to_string(),
                placeholder,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PathScheme
// ---------------------------------------------------------------------------

/// Turns a selection into concrete file-system paths. Built once at startup
/// from the configured roots and templates; templates are validated here so
/// a bad scheme is a startup error, not a runtime surprise.
///
/// Substitutions: `{scanner}` and `{filter}` verbatim, `{tier}` as the CTDI
/// directory name, `{reconstruction}` as FBP/IR1/IR2, `{ext}` (tables only)
/// as the configured table extension. Whitespace in templates is preserved
/// byte for byte; the legacy series layout depends on its double spaces.
#[derive(Debug, Clone)]
pub struct PathScheme {
    nps_root: PathBuf,
    table_template: String,
    table_extension: String,
    image_root: PathBuf,
    series_template: String,
}

impl PathScheme {
    pub fn new(
        nps_root: impl Into<PathBuf>,
        table_template: impl Into<String>,
        table_extension: impl Into<String>,
        image_root: impl Into<PathBuf>,
        series_template: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        let table_template = table_template.into();
        let series_template = series_template.into();
        validate_template(&table_template, &TABLE_PLACEHOLDERS)?;
        validate_template(&series_template, &SERIES_PLACEHOLDERS)?;

        Ok(PathScheme {
            nps_root: nps_root.into(),
            table_template,
            table_extension: table_extension.into(),
            image_root: image_root.into(),
            series_template,
        })
    }

    /// Path of the NPS table for one (scanner, tier, reconstruction, filter).
    pub fn table_path(
        &self,
        scanner: &str,
        tier: DoseTier,
        reconstruction: Reconstruction,
        filter: &FilterKernel,
    ) -> PathBuf {
        let relative = self
            .table_template
            .replace("{scanner}", scanner)
            .replace("{tier}", tier.directory())
            .replace("{reconstruction}", reconstruction.name())
            .replace("{filter}", filter.name())
            .replace("{ext}", &self.table_extension);
        self.nps_root.join(relative)
    }

    /// Directory holding the DICOM series for one
    /// (scanner, tier, reconstruction, filter).
    pub fn series_dir(
        &self,
        scanner: &str,
        tier: DoseTier,
        reconstruction: Reconstruction,
        filter: &FilterKernel,
    ) -> PathBuf {
        let relative = self
            .series_template
            .replace("{scanner}", scanner)
            .replace("{tier}", tier.directory())
            .replace("{reconstruction}", reconstruction.name())
            .replace("{filter}", filter.name());
        self.image_root.join(relative)
    }
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE_TEMPLATE: &str = "{scanner}/{tier}/{reconstruction}/{filter}.{ext}";
    const SERIES_TEMPLATE: &str = "{scanner}/{tier} {reconstruction}  3.0  {filter}";

    fn scheme() -> PathScheme {
        PathScheme::new(
            "../NPS tabeller 22",
            TABLE_TEMPLATE,
            "csv",
            "../CT bilder av Catphan",
            SERIES_TEMPLATE,
        )
        .unwrap()
    }

    // =========================================================================
    // Composition
    // =========================================================================

    #[test]
    fn table_path_is_composed_exactly() {
        let path = scheme().table_path(
            "Siemens AS+",
            DoseTier::Ctdi1,
            Reconstruction::Fbp,
            &FilterKernel::from("H10s"),
        );
        assert_eq!(
            path,
            PathBuf::from("../NPS tabeller 22/Siemens AS+/CTDI1/FBP/H10s.csv")
        );
    }

    #[test]
    fn series_dir_keeps_the_double_spaces() {
        let dir = scheme().series_dir(
            "Siemens AS+",
            DoseTier::Ctdi1,
            Reconstruction::Fbp,
            &FilterKernel::from("H10s"),
        );
        assert_eq!(
            dir,
            PathBuf::from("../CT bilder av Catphan/Siemens AS+/CTDI1 FBP  3.0  H10s")
        );
    }

    #[test]
    fn every_tier_substitutes_its_directory_name() {
        let sch = scheme();
        for (tier, dir_name) in DoseTier::ALL.into_iter().zip(["CTDI1", "CTDI2", "CTDI3"]) {
            let path = sch.table_path(
                "Siemens Flash",
                tier,
                Reconstruction::Ir2,
                &FilterKernel::from("Q33s"),
            );
            let expected = format!("../NPS tabeller 22/Siemens Flash/{dir_name}/IR2/Q33s.csv");
            assert_eq!(path, PathBuf::from(expected));
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn missing_placeholder_is_rejected() {
        let err = PathScheme::new(
            "root",
            "{scanner}/{tier}/{filter}.{ext}",
            "csv",
            "imgroot",
            SERIES_TEMPLATE,
        )
        .unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingPlaceholder {
                template: "{scanner}/{tier}/{filter}.{ext}".into(),
                placeholder: "reconstruction",
            }
        );
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let err = PathScheme::new(
            "root",
            "{scanner}/{tier}/{reconstruction}/{kernel}.{ext}",
            "csv",
            "imgroot",
            SERIES_TEMPLATE,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UnknownPlaceholder { token, .. } if token == "kernel"
        ));
    }

    #[test]
    fn unmatched_brace_is_rejected() {
        let err =
            PathScheme::new("root", TABLE_TEMPLATE, "csv", "imgroot", "{scanner}/{tier")
                .unwrap_err();
        assert!(matches!(err, TemplateError::UnmatchedBrace { .. }));
    }

    #[test]
    fn series_template_must_not_use_ext() {
        let err = PathScheme::new(
            "root",
            TABLE_TEMPLATE,
            "csv",
            "imgroot",
            "{scanner}/{tier}/{reconstruction}/{filter}.{ext}",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UnknownPlaceholder { token, .. } if token == "ext"
        ));
    }
}
