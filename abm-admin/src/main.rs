//! ABM admin console (abm-admin) - Main entry point
//!
//! Loads artists from a seed file (or the builtin mock set) and runs the
//! pricing and availability console on stdin or a script file.

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use abm_admin::console::Console;
use abm_admin::session::Session;
use abm_common::config::{default_config_path, init_config, load_config, ConfigSource};
use abm_common::seed::SeedData;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for abm-admin
#[derive(Parser, Debug)]
#[command(name = "abm-admin")]
#[command(about = "Artist pricing and availability admin console")]
#[command(version)]
struct Args {
    /// Config file (overrides ABM_CONFIG and the per-user config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed file with artists, pricing and blocked dates
    #[arg(short, long, env = "ABM_SEED")]
    seed: Option<PathBuf>,

    /// Read commands from a file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Log level when RUST_LOG is not set (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,

    /// Write a default config file (to --config or the per-user path) and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.init_config {
        let target = args
            .config
            .clone()
            .or_else(default_config_path)
            .context("No config directory available; pass --config")?;
        if init_config(&target).context("Failed to write config")? {
            println!("Wrote {}", target.display());
        } else {
            println!("{} already exists, left unchanged", target.display());
        }
        return Ok(());
    }

    // Config first so its log level can seed the filter
    let (config, source) = load_config(args.config.clone()).context("Failed to load config")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("abm_admin={level},abm_common={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!(
        "Starting ABM admin console (abm-admin) v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &source {
        ConfigSource::File(path) => info!("Config: {}", path.display()),
        ConfigSource::Defaults => info!("Config: defaults"),
    }

    let seed = match args.seed.as_ref().or(config.seed_file.as_ref()) {
        Some(path) => {
            info!("Seed file: {}", path.display());
            SeedData::load(path)
                .with_context(|| format!("Failed to load seed file {}", path.display()))?
        }
        None => {
            info!("No seed file, using builtin artists");
            SeedData::builtin()
        }
    };
    let session = Session::from_seed(seed).context("Invalid seed data")?;

    match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            info!("Running script {}", path.display());
            let mut console = Console::new(
                session,
                config.console,
                BufReader::new(file),
                io::stdout().lock(),
                false,
            );
            console.run().context("Console I/O failed")?;
        }
        None => {
            let interactive = io::stdin().is_terminal();
            let mut console = Console::new(
                session,
                config.console,
                io::stdin().lock(),
                io::stdout().lock(),
                interactive,
            );
            console.run().context("Console I/O failed")?;
        }
    }

    info!("Session ended, nothing persisted");
    Ok(())
}
