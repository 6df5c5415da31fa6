mod app;
mod color;
mod config;
mod data;
mod figure;
mod selection;
mod state;
mod ui;

use app::NpsViewerApp;
use config::{AppConfig, ConfigError};
use eframe::egui;
use state::AppState;

/// Load `nps-viewer.json` from the working directory (built-in defaults if
/// absent) and derive the initial state from it.
fn startup_state() -> Result<AppState, ConfigError> {
    let config = AppConfig::load_or_default()?;
    Ok(AppState::new(config)?)
}

fn main() -> eframe::Result {
    env_logger::init();

    let state = match startup_state() {
        Ok(state) => state,
        Err(err) => {
            log::error!("invalid configuration: {err}");
            std::process::exit(2);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "NPS Viewer – CT quality assurance",
        options,
        Box::new(move |_cc| Ok(Box::new(NpsViewerApp::new(state)))),
    )
}
