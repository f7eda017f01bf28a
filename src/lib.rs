#![forbid(unsafe_code)]

pub mod adapters;
pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod ports;

use clap::Parser;
use tracing::info;

use app::AppController;

/// Speech-to-text worker speaking newline-delimited JSON on stdin/stdout.
#[derive(Debug, Parser)]
#[command(name = "transcription-worker", version, about)]
pub struct Cli {
    /// Model to load at startup, by catalog name (e.g. `base.en`) or path to
    /// a ggml file. Defaults to the configured model.
    pub model: Option<String>,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let controller = AppController::new(cli.model)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("transcription-rt")
        .build()?;

    let stats = runtime.block_on(controller.serve())?;
    info!(?stats, "Exiting");
    Ok(())
}
