//! fmucat - FMU catalog pipeline
//!
//! Finds FMU files on GitHub, downloads them, validates each model and looks
//! up the license of every contributing repository. Every stage keeps a CSV
//! table and resumes where the previous run stopped.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fmucat_core::{ProgressContext, Verbosity};

mod cmd;
mod config;

use config::Config;

/// Exit status after SIGINT/SIGTERM
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser)]
#[command(name = "fmucat")]
#[command(about = "Catalog FMU models published on GitHub")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./fmucat.toml or ~/.config/fmucat/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Test mode: stop after a few items and checkpoint more often
    #[arg(long, global = true)]
    test: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Search GitHub for FMU files and record their links
    Search(cmd::search::SearchArgs),
    /// Download every recorded link
    Download(cmd::download::DownloadArgs),
    /// Validate downloaded FMUs and record their metadata
    Validate(cmd::validate::ValidateArgs),
    /// Look up the license of every repository with a catalogued model
    Licenses,
    /// Summarize every table
    Status(cmd::status::StatusArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = ProgressContext::new();

    // Logging:
    //   TTY:     warn unless --debug, the stage line shows activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = is_tty && !cli.debug;
    fmucat_core::init_logging(Verbosity::from_flags(quiet, cli.debug), multi);

    if let Err(e) = fmucat_core::install_signal_handlers() {
        log::warn!("Cannot install signal handlers: {e}");
    }

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };
    if cli.test {
        log::info!("Test mode: at most {} items per stage", config.run.test_cap);
    }

    match cli.command {
        Command::Search(args) => cmd::search::run(args, &config, cli.test, &progress)?,
        Command::Download(args) => cmd::download::run(args, &config, cli.test, &progress)?,
        Command::Validate(args) => cmd::validate::run(args, &config, cli.test, &progress)?,
        Command::Licenses => cmd::licenses::run(&config, cli.test, &progress)?,
        Command::Status(args) => cmd::status::run(args, &config)?,
        Command::Config => cmd::show_config::run(&config),
    }

    if fmucat_core::is_shutdown_requested() {
        std::process::exit(EXIT_INTERRUPTED);
    }
    Ok(())
}
