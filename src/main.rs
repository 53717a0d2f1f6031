use clap::Parser;
use ploy_advisor::cli::{self, Cli, Commands};
use ploy_advisor::config::{AppConfig, LoggingConfig};
use ploy_advisor::error::{AdvisorError, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    config
        .validate()
        .map_err(|errors| AdvisorError::Validation(errors.join("; ")))?;

    init_logging(&config.logging);

    match &cli.command {
        Commands::Allocate {
            candidates,
            budget,
            no_headlines,
        } => {
            cli::run_allocate(&config, candidates, *budget, *no_headlines).await?;
        }
        Commands::Review {
            positions,
            market,
            capital,
        } => {
            cli::run_review(&config, positions, market.as_deref(), *capital).await?;
        }
        Commands::Extract => {
            cli::run_extract()?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable JSON
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
