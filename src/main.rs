mod analysis;
mod app;
mod encode;
mod event;
mod model;
mod report;
mod theme;
mod workflow;

use analysis::gemini::GeminiClient;
use analysis::AnalysisService;
use app::OptiTaxApp;
use eframe::egui;
use std::sync::mpsc;
use std::sync::Arc;
use theme::Theme;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("optitax=info")),
        )
        .init();

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("optitax-runtime")
        .build()?;

    let analyzer = Arc::new(GeminiClient::from_env());
    let service = runtime.block_on(async { AnalysisService::new(analyzer, tx.clone()) })?;

    let app = OptiTaxApp::new(rx, service);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "OptiTax",
        native_options,
        Box::new(move |creation_context| {
            Theme::default().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
