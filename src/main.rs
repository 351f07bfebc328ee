mod app;
mod color;
mod config;
mod currency;
mod data;
mod state;
mod stats;
mod ui;

use std::path::PathBuf;

use app::RustySalaryApp;
use config::AnalysisConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AnalysisConfig::load_or_default();
    let initial_file = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Salary – Survey Explorer",
        options,
        Box::new(move |_cc| {
            let mut app = RustySalaryApp::new(config);
            if let Some(path) = initial_file {
                app.state.load_path(&path);
            }
            Ok(Box::new(app))
        }),
    )
}
