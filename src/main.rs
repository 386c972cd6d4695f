//! AIRA Writer - AI research assistant document editor
//!
//! A rich-text writing desk with undo history, word count, citation
//! placeholders, an AI assistant panel and a pluggable document store.

mod app;
mod assistant;
mod core;
mod store;
mod ui;

use anyhow::Context;
use app::WriterApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::config::AppConfig;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting AIRA Writer...");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Using default configuration: {:#}", e);
            AppConfig::default()
        }
    };

    // Store and assistant requests run here while the UI thread keeps drawing
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let handle = runtime.handle().clone();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("AIRA Writer"),
        ..Default::default()
    };

    eframe::run_native(
        "AIRA Writer",
        native_options,
        Box::new(move |cc| Ok(Box::new(WriterApp::new(cc, config, handle)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
