//! MLab terminal front end.
//!
//! Usage:
//!   mlab-terminal [--config lab.json] [--log mlab.log] [--fps 30]
//!
//! Drag with the left mouse button to spin the cube; press `:` to type a
//! console command such as `set v1 1 0 0` or `mode ortho`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use mlab_core::LabConfig;
use mlab_terminal::LabApp;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "mlab-terminal", version, about = "Interactive linear algebra and projection lab")]
struct Args {
    /// JSON file with the initial lab state
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write logs to this file (the terminal itself is taken by the lab)
    #[arg(long)]
    log: Option<PathBuf>,
    /// Target frame rate, overriding the config
    #[arg(long)]
    fps: Option<u32>,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log {
        init_logging(path)?;
    }

    let config = match &args.config {
        Some(path) => LabConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => LabConfig::default(),
    };
    let fps = args.fps.unwrap_or(config.fps).max(1);
    info!(config = ?args.config, fps, "starting lab");

    let mut app = LabApp::new(config.build_lab(), fps).context("query terminal size")?;
    app.run().context("terminal session failed")?;

    Ok(())
}
