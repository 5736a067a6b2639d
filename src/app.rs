use eframe::egui;

use sales_dashboard::data::cache::DatasetCache;

use crate::args::Args;
use crate::state::AppState;
use crate::ui::{dashboard, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
    cache: DatasetCache,
}

impl SalesDashboardApp {
    /// Build the app and open the data file named on the command line.
    pub fn new(args: &Args) -> Self {
        let mut cache = DatasetCache::new();
        let mut state = AppState::new(args.layout(), args.top_n());
        state.open(&mut cache, args.data());
        Self { state, cache }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &mut self.cache);
        });

        // ---- Left side panel: filters and calculator ----
        if self.state.dataset.is_some() {
            egui::SidePanel::left("filter_panel")
                .default_width(260.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::side_panel(ui, &mut self.state);
                });
        }

        // ---- Central panel: metrics and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard::central_panel(ui, &mut self.state);
        });
    }
}
