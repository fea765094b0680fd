//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod extract;
mod logs;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(name = "snuggig-ocr")]
#[command(about = "Fetch images by URL and return their OCR text over HTTP")]
#[command(version)]
pub struct Cli {
    /// Config file path (TOML)
    #[arg(short, long, global = true, env = "SNUGGIG_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the OCR log and debug images
    #[arg(long, global = true, env = "SNUGGIG_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the OCR web server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: 0.0.0.0:$PORT)
        bind: Option<String>,

        /// Port used when the bind address has none
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Fetch one image and print its text (no log entry or debug image)
    Extract {
        /// Image URL
        url: String,
    },

    /// Check OCR backend availability and show resolved settings
    Check,

    /// Print the OCR log
    Logs,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
    };
    let settings = load_settings(&options)?;

    match cli.command {
        Commands::Serve { bind, port } => serve::cmd_serve(&settings, bind.as_deref(), port).await,
        Commands::Extract { url } => extract::cmd_extract(&settings, &url).await,
        Commands::Check => check::cmd_check(&settings).await,
        Commands::Logs => logs::cmd_logs(&settings).await,
    }
}
