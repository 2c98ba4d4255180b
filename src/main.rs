mod app;
mod color;
mod config;
mod state;
mod ui;

use app::SalesLensApp;
use config::AppConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    let config = AppConfig::from_env();
    env_logger::Builder::new()
        .parse_filters(&config.log_filter)
        .init();

    if config.default_source.is_none() {
        log::info!(
            "No default dataset configured; set {} or pass a path",
            config::DEFAULT_SOURCE_VAR
        );
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Lens – Office Supplies Dashboard",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(SalesLensApp::new(AppState::new(
                config.default_source,
            ))))
        }),
    )
}
