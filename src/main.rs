mod app;
mod args;
mod color;
mod state;
mod ui;

use app::SalesDashboardApp;
use args::{Args, Layout};
use clap::Parser;
use eframe::egui;

fn main() -> eframe::Result {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();
    log::debug!("{args:?}");

    let title = match args.layout() {
        Layout::Classic => "Sales Dashboard",
        Layout::Tabbed => "📊 Sales Dashboard",
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(SalesDashboardApp::new(&args)))),
    )
}
