//! Normalization and fallback core
//!
//! Pure, synchronous functions that turn an untrusted reasoning-service reply
//! into bounded allocations or validated position adjustments. Nothing in here
//! performs I/O or returns an error to the caller.

pub mod extract;
pub mod fallback;
pub mod normalize;
pub mod review;

pub use extract::{extract_payload, extract_with_strategy, ExtractStrategy, ParsedPayload};
pub use fallback::{
    allocate_fallback, fallback_symbols, momentum_score, FallbackOutcome, ScoreWeighting,
    TickerLookup,
};
pub use normalize::{decode_pick, normalize_picks};
pub use review::{decode_decision, review_from_payload, validate_decisions, ReviewOutcome};
