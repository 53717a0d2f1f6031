use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::adapters::{BinanceTickerClient, CryptoPanicFeed};
use crate::agent::{AllocationAgent, OpenAiClient, PositionReviewer};
use crate::config::AppConfig;
use crate::domain::{AllocationSet, Position};
use crate::error::Result;
use crate::sizing::{
    extract_with_strategy, normalize_picks, review_from_payload, ExtractStrategy, ParsedPayload,
    ReviewOutcome,
};

#[derive(Parser)]
#[command(name = "ploy-advisor")]
#[command(version = "0.1.0")]
#[command(about = "AI-assisted position sizing and position review", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding default.toml and environment overrides
    #[arg(short, long, default_value = "config")]
    pub config_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank candidates and size an allocation
    Allocate {
        /// Candidate symbols, comma separated (e.g., BTC,ETH/USDT,SOLUSDT)
        #[arg(short, long, value_delimiter = ',', required = true)]
        candidates: Vec<String>,
        /// Budget in USDT quoted to the reasoning service
        #[arg(short, long)]
        budget: Option<Decimal>,
        /// Skip fetching market headlines
        #[arg(long)]
        no_headlines: bool,
    },
    /// Ask for adjustments to open positions
    Review {
        /// JSON file with a list of positions
        #[arg(short, long)]
        positions: PathBuf,
        /// JSON file with a market snapshot (optional)
        #[arg(short, long)]
        market: Option<PathBuf>,
        /// Capital available for scale-ins, in USD
        #[arg(long)]
        capital: Decimal,
    },
    /// Parse a reasoning-service reply from stdin and show what survives validation
    Extract,
}

/// Run the allocation path and print the report as JSON
pub async fn run_allocate(
    config: &AppConfig,
    candidates: &[String],
    budget: Option<Decimal>,
    no_headlines: bool,
) -> Result<()> {
    let chat = Arc::new(OpenAiClient::new(&config.openai)?);
    let tickers = Arc::new(BinanceTickerClient::new(&config.exchange)?);
    let mut agent = AllocationAgent::new(config.advisor.clone(), chat, tickers);

    if config.headlines.enabled && !no_headlines {
        let feed = Arc::new(CryptoPanicFeed::new(&config.headlines)?);
        agent = agent.with_headlines(feed, config.headlines.max_items);
    }

    let report = agent
        .allocate(candidates, budget.or(config.budget_usdt))
        .await;
    info!("Analysis:\n{}", report.analysis);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Run the review path and print the outcome as JSON
pub async fn run_review(
    config: &AppConfig,
    positions_path: &Path,
    market_path: Option<&Path>,
    capital: Decimal,
) -> Result<()> {
    let positions: Vec<Position> = serde_json::from_str(&std::fs::read_to_string(positions_path)?)?;
    let market: Value = match market_path {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => Value::Object(Default::default()),
    };

    let chat = Arc::new(OpenAiClient::new(&config.openai)?);
    let outcome = PositionReviewer::new(chat)
        .review(&positions, &market, capital)
        .await;
    for decision in &outcome.decisions {
        info!("Decision: {}", decision);
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

#[derive(Serialize)]
struct ExtractReport {
    strategy: Option<ExtractStrategy>,
    payload: ParsedPayload,
    picks: AllocationSet,
    review: ReviewOutcome,
}

/// Offline check: run a reply from stdin through extraction and both validators
pub fn run_extract() -> Result<()> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;

    let (payload, strategy) = extract_with_strategy(&text);
    let picks = payload.picks().map(normalize_picks).unwrap_or_default();
    let review = review_from_payload(&payload, &[]);

    let report = ExtractReport {
        strategy,
        payload,
        picks,
        review,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
