//! Prompt text for the reasoning service

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::domain::Position;
use crate::error::Result;

/// Positions beyond this many are left out of the review prompt
pub const MAX_REVIEW_POSITIONS: usize = 20;

pub const ALLOCATION_SYSTEM_PROMPT: &str = r#"You are a disciplined crypto trading assistant. Output JSON only, in exactly this shape:
{"picks":[{"symbol":"BTCUSDT","weight":0.2,"side":"long"}],"reason":"<one or two sentences on why this allocation>"}"#;

pub const REVIEW_SYSTEM_PROMPT: &str = r#"You are a position risk manager running rolling adjustments. Your goal is to maximize floating profit and minimize potential loss while keeping every open position safe.
Allowed actions are 'close', 'adjust_stop', 'scale_out' and 'scale_in' only.
When PnL% is negative or the market shows signs of a sharp sell-off, prefer tightening the stop (adjust_stop) or closing the position (close) to preserve capital.
When PnL% is positive, prefer a partial scale_out to lock in profit, or a trailing adjust_stop to protect it.
Use 'scale_in' only with very high conviction and ample available capital, pyramiding rather than chasing highs.
'scale_out' needs 'reduce_ratio' between 0.01 and 1.0; 'scale_in' needs a positive 'capital_usd' below the available capital; 'adjust_stop' needs 'new_stop'. Every decision carries the position 'id'.
Explain the adjustments briefly in 'reason', citing PnL% or the market snapshot.
Output JSON only: {"decisions": [ ... ], "reason": "<summary>"}"#;

/// User prompt for the allocation path
pub fn allocation_user_prompt<S: AsRef<str>>(
    headlines: Option<&str>,
    candidates: &[S],
    budget: Option<Decimal>,
) -> String {
    let candidates: Vec<&str> = candidates.iter().map(|c| c.as_ref()).collect();
    let candidates = serde_json::to_string(&candidates).unwrap_or_else(|_| "[]".to_string());
    let budget = budget
        .map(|b| b.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut prompt = String::new();
    if let Some(headlines) = headlines {
        prompt.push_str("Latest market headlines:\n");
        prompt.push_str(headlines);
        prompt.push_str("\n\n");
    }
    prompt.push_str(&format!(
        "Pick 1-5 symbols from the tradable list and give each a weight (weights sum to <= 1).\n\
         Tradable list: {}\n\
         Available capital (USDT): {}\n\
         Output JSON only, no extra text.",
        candidates, budget
    ));
    prompt
}

#[derive(Serialize)]
struct ReviewContext<'a> {
    positions: &'a [Position],
    market_snapshot: &'a Value,
    available_capital_usd: Decimal,
}

/// User prompt for the review path: positions, market snapshot and capital as JSON
pub fn review_user_prompt(
    positions: &[Position],
    market: &Value,
    available_capital: Decimal,
) -> Result<String> {
    let shown = &positions[..positions.len().min(MAX_REVIEW_POSITIONS)];
    let context = ReviewContext {
        positions: shown,
        market_snapshot: market,
        available_capital_usd: available_capital,
    };
    Ok(serde_json::to_string_pretty(&context)?)
}
