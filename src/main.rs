mod config;
mod error;
mod ops;
mod renderer;
mod types;
mod ui;

use std::error::Error;

use gstreamer as gst;
use tracing_subscriber::EnvFilter;

use clap::Parser;

use crate::config::{AppConfig, Cli};
use crate::ops::content_provider::{ContentProvider, FileContentProvider, StaticContentProvider};
use crate::types::story::StorySequence;
use crate::ui::app::StoryApp;

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    gst::init()?;
    let config = AppConfig::from_env(cli)?;

    // Content is loaded once per session; a failure leaves the carousel idle.
    let provider: Box<dyn ContentProvider> = match &config.content_path {
        Some(path) => Box::new(FileContentProvider::new(path)),
        None => {
            tracing::info!("no content configured; use \"Open content…\" to pick a file");
            Box::new(StaticContentProvider::default())
        }
    };
    let sequence = match provider.load() {
        Ok(stories) => StorySequence::new(stories),
        Err(e) => {
            tracing::error!("failed to load content: {e}");
            StorySequence::empty()
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([420.0, 820.0])
            .with_title("Storyreel"),
        ..Default::default()
    };
    eframe::run_native(
        "Storyreel",
        native_options,
        Box::new(move |cc| Ok(Box::new(StoryApp::new(cc, &config, sequence)))),
    )?;
    Ok(())
}
