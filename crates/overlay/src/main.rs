mod app;
mod viewport;

use app::OverlayApp;
use measure_overlay_lib::state::OverlaySettings;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "measure_overlay=info,measure_overlay_lib=info".into()),
        )
        .init();

    // Parse --settings <path> argument
    let settings = parse_settings_arg().unwrap_or_else(OverlaySettings::load);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Measure Overlay")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "measure-overlay",
        native_options,
        Box::new(move |cc| Ok(Box::new(OverlayApp::new(cc, settings)?))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_settings_arg() -> Option<OverlaySettings> {
    let args: Vec<String> = std::env::args().collect();
    let position = args.iter().position(|a| a == "--settings")?;
    let path = args.get(position + 1)?;
    match OverlaySettings::load_from(std::path::Path::new(path)) {
        Ok(settings) => {
            tracing::info!("Loaded overlay settings from {path}");
            Some(settings)
        }
        Err(e) => {
            tracing::error!("Failed to load settings from {path}: {e}");
            None
        }
    }
}
