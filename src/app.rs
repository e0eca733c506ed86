use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CrashDashboardApp {
    pub state: AppState,
}

impl CrashDashboardApp {
    /// Build the app and load the configured data file, if it exists.
    pub fn new(config: &DashboardConfig) -> Self {
        let mut state = AppState {
            preview_rows: config.preview_rows,
            ..Default::default()
        };
        if let Err(e) = state.load_path(&config.data_path) {
            log::error!("Failed to load startup data: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
        Self { state }
    }
}

impl eframe::App for CrashDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::dashboard(ui, &mut self.state);
        });
    }
}
