pub mod adapters;
pub mod agent;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod sizing;

pub use agent::{AllocationAgent, AllocationReport, ChatCompletion, OpenAiClient, PositionReviewer};
pub use config::{AdvisorConfig, AppConfig};
pub use domain::{AllocationSet, Decision, DecisionAction, Pick, Position, PositionSide};
pub use error::{AdvisorError, Result};
pub use sizing::{
    allocate_fallback, extract_payload, normalize_picks, validate_decisions, ParsedPayload,
    ReviewOutcome, ScoreWeighting, TickerLookup,
};
