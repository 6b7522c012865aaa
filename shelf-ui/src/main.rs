//! romshelf - a game launcher that lists NES ROMs with cover art and
//! descriptions and starts the chosen one in an emulator.

mod app;
mod config;
mod decode;
mod gpu;
mod launcher;
mod library;
mod open;
mod shell;
mod text;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Browse and launch NES games
#[derive(Parser, Debug)]
#[command(name = "romshelf")]
#[command(version)]
pub struct Args {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory containing .nes ROMs
    #[arg(short, long)]
    pub games_dir: Option<PathBuf>,

    /// Emulator executable
    #[arg(short, long)]
    pub emulator: Option<String>,

    /// Font file for all text
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Log at debug level when RUST_LOG is unset
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    fn overrides(&self) -> config::CliOverrides {
        config::CliOverrides {
            games_dir: self.games_dir.clone(),
            emulator: self.emulator.clone(),
            font_path: self.font.clone(),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    tracing::info!("Starting romshelf");

    let config = config::load(args.config.clone(), args.overrides())?;
    tracing::debug!(?config, "resolved configuration");

    app::run(config)
}
