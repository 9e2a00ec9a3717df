mod app;
mod io;
mod model;

use app::{configure_fonts, DesktopApp};
use eframe::egui;

fn main() -> eframe::Result<()> {
    // 盤面は縦長なので高さを多めに取る
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([860.0, 1000.0])
            .with_min_inner_size([480.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Pegboard Restock",
        options,
        Box::new(|cc| {
            configure_fonts(&cc.egui_ctx);
            Box::new(DesktopApp::default())
        }),
    )
}
