//! Riskscope: disease-risk explorer
//!
//! Main entry point for the command-line application.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use riskscope::adapters::sqlite::SqliteProfileStore;
use riskscope::application::{ProfileService, RiskService};
use riskscope::cli::{Cli, Command};
use riskscope::config::{AppConfig, LogMode};

fn main() -> Result<()> {
    let config = AppConfig::from_env_or_default();

    // Logs never go to stdout: it carries the JSON command output.
    let (writer, _guard) = match config.log_mode {
        LogMode::File => {
            if let Some(parent) = config.log_file.parent() {
                // Best-effort: don't fail startup just because the directory is missing.
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)
                .with_context(|| format!("cannot open log file {:?}", config.log_file))?;
            tracing_appender::non_blocking(file)
        }
        LogMode::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    let command = Command::parse(std::env::args().skip(1))?;
    if command == Command::Help {
        print!("{}", riskscope::cli::USAGE);
        return Ok(());
    }

    let registry = Arc::new(config.load_registry()?);
    let store = Arc::new(
        SqliteProfileStore::new(&config.db_path)
            .with_context(|| format!("cannot open profile database {:?}", config.db_path))?,
    );
    tracing::debug!("Using profile database {:?}", config.db_path);

    let cli = Cli::new(
        RiskService::new(registry),
        ProfileService::new(store),
        config.timeline_steps,
    );

    let output = cli.execute(&command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
