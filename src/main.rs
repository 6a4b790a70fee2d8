// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use quickshot::backends::Capabilities;
use quickshot::config::Config;
use quickshot::constants;
use quickshot::session::CameraFacing;
use quickshot::storage;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "quickshot")]
#[command(about = "Take a photo, review it, then share, save or discard it")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Read settings from this file instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive capture and review screen (default)
    Terminal,

    /// Request camera and gallery permission and print the result
    Permissions {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available cameras
    List,

    /// Take a photo and save it to the gallery
    Photo {
        /// Camera facing to use
        #[arg(short, long, default_value = "back")]
        facing: CameraFacing,

        /// Share the photo instead of saving it
        #[arg(short, long)]
        share: bool,
    },
}

fn init_logging(to_file: bool) {
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=quickshot=debug, RUST_LOG=info
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // The terminal UI owns stdout/stderr, so it logs to a file
    if to_file {
        let dir = storage::cache_directory();
        let file = std::fs::create_dir_all(&dir)
            .and_then(|_| std::fs::File::create(dir.join(constants::LOG_FILE_NAME)));
        if let Ok(file) = file {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .init();
        }
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Commands::Terminal));
    init_logging(interactive);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    match cli.command {
        Some(Commands::List) => cli::list_cameras()?,
        Some(Commands::Permissions { json }) => cli::print_permissions(&config, json)?,
        Some(Commands::Photo { facing, share }) => cli::take_photo(&config, facing, share)?,
        Some(Commands::Terminal) | None => run_terminal(&config)?,
    }

    Ok(())
}

fn run_terminal(config: &Config) -> quickshot::errors::AppResult<()> {
    let pruned = storage::prune_staging(&storage::staging_directory(), storage::staging_cutoff());
    if pruned > 0 {
        tracing::info!(pruned, "Removed stale staged captures");
    }

    quickshot::terminal::run(Capabilities::desktop(config))
}
