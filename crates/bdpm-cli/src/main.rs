//! bdpm - Rebuild a queryable DuckDB store from the BDPM drug-registry
//! extracts.
//!
//! Running `bdpm` with no arguments performs the full rebuild.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "bdpm")]
#[command(about = "Load the BDPM drug-registry extracts into an indexed DuckDB store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./bdpm.toml or ~/.config/bdpm/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the store from scratch (default)
    Build(cmd::build::BuildArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = bdpm_core::ProgressContext::new();

    // Logging:
    //   TTY:     info through the spinner bridge
    //   non-TTY: plain lines, same level
    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    bdpm_core::init_logging(false, cli.debug, multi);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    match cli.command.unwrap_or(Command::Build(Default::default())) {
        Command::Build(args) => cmd::build::run(args, &config, &progress),
        Command::Config => cmd::show_config::run(&config),
    }
}
