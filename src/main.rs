mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use app::CrashDashboardApp;
use clap::Parser;
use config::{Cli, DashboardConfig};
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = DashboardConfig::from_cli(&cli)?;
    log::info!("Starting with data file {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Airplane Crashes Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(CrashDashboardApp::new(&config)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))
}
