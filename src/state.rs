use crate::config::AppConfig;
use crate::data::paths::{PathScheme, TemplateError};
use crate::figure::Figure;
use crate::selection::{DoseSelection, FilterKernel, Reconstruction, Selection};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Active configuration (built-in defaults or loaded from disk).
    pub config: AppConfig,

    /// Path scheme derived from the configuration's templates.
    pub scheme: PathScheme,

    /// Current contents of the selection form.
    pub form: FormState,

    /// Open figure windows, in creation order.
    pub figures: Vec<Figure>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Ids are never reused, so closing a figure cannot make another
    /// window inherit its position.
    next_figure_id: u64,
}

impl AppState {
    /// Build the initial state from a validated configuration.
    pub fn new(config: AppConfig) -> Result<Self, TemplateError> {
        let scheme = config.path_scheme()?;
        let form = FormState::from_config(&config);
        Ok(Self {
            config,
            scheme,
            form,
            figures: Vec::new(),
            status_message: None,
            next_figure_id: 1,
        })
    }

    /// Replace the active configuration. The form resets to the new
    /// defaults; figures keep the data they were built with.
    pub fn set_config(&mut self, config: AppConfig) -> Result<(), TemplateError> {
        self.scheme = config.path_scheme()?;
        self.form = FormState::from_config(&config);
        self.config = config;
        self.status_message = None;
        Ok(())
    }

    /// Hand out a fresh figure id.
    pub fn allocate_figure_id(&mut self) -> u64 {
        let id = self.next_figure_id;
        self.next_figure_id += 1;
        id
    }

    pub fn push_figure(&mut self, figure: Figure) {
        self.figures.push(figure);
    }

    /// Drop figures whose window was closed this frame.
    pub fn prune_closed_figures(&mut self) {
        self.figures.retain(|figure| figure.open);
    }
}

// ---------------------------------------------------------------------------
// Selection form
// ---------------------------------------------------------------------------

/// Mutable contents of the selection form. Actions never read the live
/// widgets; they work on a [`Selection`] snapshot taken at click time.
pub struct FormState {
    pub scanner: String,
    pub reconstruction: Reconstruction,
    pub filter: FilterKernel,
    pub dose: DoseSelection,
}

impl FormState {
    /// Starting selection for a configuration: first scanner, FBP, first
    /// kernel, all doses.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            scanner: config.scanners.first().cloned().unwrap_or_default(),
            reconstruction: Reconstruction::Fbp,
            filter: config.filters.first().cloned().unwrap_or_default(),
            dose: DoseSelection::All,
        }
    }

    /// Capture the form as an immutable selection.
    pub fn snapshot(&self) -> Selection {
        Selection {
            scanner: self.scanner.clone(),
            reconstruction: self.reconstruction,
            filter: self.filter.clone(),
            dose: self.dose,
        }
    }
}

// =============================================================================
// Unit tests
// =============================================================================
