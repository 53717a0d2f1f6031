//! Position review orchestrator

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{info, warn};

use super::client::{ChatCompletion, ChatMessage};
use super::prompts::{review_user_prompt, REVIEW_SYSTEM_PROMPT};
use crate::domain::Position;
use crate::sizing::{extract_payload, review_from_payload, ReviewOutcome};

/// Asks the reasoning service for adjustments to open positions
pub struct PositionReviewer {
    chat: Arc<dyn ChatCompletion>,
}

impl PositionReviewer {
    pub fn new(chat: Arc<dyn ChatCompletion>) -> Self {
        Self { chat }
    }

    /// Review `positions` given a market snapshot and free capital.
    ///
    /// Never fails: a failed call yields no decisions and says why in `reason`.
    pub async fn review(
        &self,
        positions: &[Position],
        market: &Value,
        available_capital: Decimal,
    ) -> ReviewOutcome {
        if positions.is_empty() {
            return ReviewOutcome::empty("no open positions");
        }
        if !self.chat.is_configured() {
            return ReviewOutcome::empty("no api key");
        }

        let prompt = match review_user_prompt(positions, market, available_capital) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("Could not build review prompt: {}", e);
                return ReviewOutcome::empty(format!("could not build review prompt: {}", e));
            }
        };

        let messages = [
            ChatMessage::system(REVIEW_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];

        let reply = match self.chat.complete(&messages).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Position review call failed: {}", e);
                return ReviewOutcome::empty(format!("reasoning service unavailable: {}", e));
            }
        };

        let known_ids: Vec<Value> = positions.iter().map(|p| p.id.clone()).collect();
        let outcome = review_from_payload(&extract_payload(&reply), &known_ids);
        info!(
            "Position review: {} decisions for {} positions",
            outcome.decisions.len(),
            positions.len()
        );
        outcome
    }
}
