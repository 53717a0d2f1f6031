//! Deterministic momentum x liquidity allocator
//!
//! Used when the reasoning service produced no usable picks. Candidates are
//! ranked by the magnitude of their 24h move, weighted by a log-scaled quote
//! volume term, and the best few split the budget in proportion to score.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AdvisorConfig;
use crate::domain::{
    normalize_symbol, round6, AllocationSet, MarketTicker, Pick, PositionSide, RawTicker,
};
use crate::error::{AdvisorError, Result};

/// Liquidity term multiplied into the momentum score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreWeighting {
    /// `max(1, log10(1 + quote_volume_usd))`
    #[default]
    Log10Volume,
    /// Momentum only
    Flat,
}

impl ScoreWeighting {
    pub fn factor(&self, quote_volume_usd: f64) -> f64 {
        match self {
            ScoreWeighting::Log10Volume => (1.0 + quote_volume_usd.max(0.0)).log10().max(1.0),
            ScoreWeighting::Flat => 1.0,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            ScoreWeighting::Log10Volume => {
                "Ranked by 24h momentum x quote volume (score = |%| x log10(1 + volume))"
            }
            ScoreWeighting::Flat => "Ranked by absolute 24h momentum (score = |%|)",
        }
    }
}

/// Synchronous access to already-fetched tickers, keyed by normalized symbol
pub trait TickerLookup {
    fn ticker(&self, symbol: &str) -> Result<RawTicker>;
}

impl TickerLookup for HashMap<String, RawTicker> {
    fn ticker(&self, symbol: &str) -> Result<RawTicker> {
        self.get(symbol)
            .cloned()
            .ok_or_else(|| AdvisorError::MarketDataUnavailable(symbol.to_string()))
    }
}

/// Result of a fallback run: the allocation and operator-facing text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackOutcome {
    pub picks: AllocationSet,
    pub diagnostic: String,
}

#[derive(Debug, Clone)]
struct ScoredCandidate {
    symbol: String,
    pct_change: f64,
    quote_volume_usd: f64,
    score: f64,
}

/// Symbols the fallback will look up, in order: normalized, quote-suffixed,
/// capped at `candidate_cap`.
pub fn fallback_symbols<S: AsRef<str>>(config: &AdvisorConfig, candidates: &[S]) -> Vec<String> {
    let quote = normalize_symbol(&config.quote_asset);
    candidates
        .iter()
        .take(config.candidate_cap)
        .map(|c| normalize_symbol(c.as_ref()))
        .filter(|s| !s.is_empty())
        .map(|s| if s.ends_with(&quote) { s } else { s + &quote })
        .collect()
}

/// Score a single ticker.
pub fn momentum_score(ticker: &MarketTicker, weighting: ScoreWeighting) -> f64 {
    ticker.pct_change_24h.abs() * weighting.factor(ticker.quote_volume_usd)
}

/// Allocate across the top-scoring candidates.
///
/// Lookup failures skip the candidate. If nothing scores above zero the
/// result is empty and the diagnostic says why.
pub fn allocate_fallback<S, L>(config: &AdvisorConfig, candidates: &[S], tickers: &L) -> FallbackOutcome
where
    S: AsRef<str>,
    L: TickerLookup + ?Sized,
{
    let mut scored: Vec<ScoredCandidate> = fallback_symbols(config, candidates)
        .into_iter()
        .filter_map(|symbol| {
            let raw = match tickers.ticker(&symbol) {
                Ok(raw) => raw,
                Err(e) => {
                    debug!("Skipping {} in fallback: {}", symbol, e);
                    return None;
                }
            };
            let ticker = MarketTicker::from(&raw);
            let score = momentum_score(&ticker, config.score_weighting);
            Some(ScoredCandidate {
                symbol,
                pct_change: ticker.pct_change_24h,
                quote_volume_usd: ticker.quote_volume_usd,
                score,
            })
        })
        .filter(|c| c.score.is_finite() && c.score > 0.0)
        .collect();

    // Stable sort keeps candidate order on ties.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(config.top_n);

    if scored.is_empty() {
        return FallbackOutcome {
            picks: AllocationSet::empty(),
            diagnostic: "No usable market data; fallback skipped".to_string(),
        };
    }

    let total: f64 = scored.iter().map(|c| c.score).sum();
    let mut picks: Vec<Pick> = scored
        .iter()
        .map(|c| {
            Pick::new(
                c.symbol.clone(),
                round6(c.score / total),
                PositionSide::from_momentum(c.pct_change),
            )
        })
        .collect();

    // Give the rounding residual to the leader so the weights sum to 1.
    let residual = 1.0 - picks.iter().map(|p| p.weight).sum::<f64>();
    picks[0].weight = round6(picks[0].weight + residual);

    let mut lines = vec![config.score_weighting.describe().to_string()];
    lines.extend(scored.iter().zip(&picks).map(|(c, p)| {
        format!(
            "{}: {:+.2}% / 24h volume ~ {} USD / w={:.3}",
            c.symbol,
            c.pct_change,
            group_thousands(c.quote_volume_usd),
            p.weight
        )
    }));

    FallbackOutcome {
        picks: AllocationSet::from_picks(picks),
        diagnostic: lines.join("\n"),
    }
}

/// `1234567.8` -> `"1,234,568"`
fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 && digits != "0" {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(pct: f64, quote_volume: f64) -> RawTicker {
        RawTicker {
            percentage: Some(pct),
            quote_volume: Some(quote_volume),
            ..Default::default()
        }
    }

    fn book(entries: &[(&str, RawTicker)]) -> HashMap<String, RawTicker> {
        entries
            .iter()
            .map(|(s, t)| (s.to_string(), t.clone()))
            .collect()
    }

    #[test]
    fn test_fallback_symbols_normalized_and_capped() {
        let config = AdvisorConfig {
            candidate_cap: 3,
            ..Default::default()
        };
        let symbols = fallback_symbols(&config, &["btc/usdt", "ETH", "", "sol", "ada"]);
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn test_log10_factor_floors_at_one() {
        let w = ScoreWeighting::Log10Volume;
        assert_eq!(w.factor(0.0), 1.0);
        assert_eq!(w.factor(5.0), 1.0);
        assert!((w.factor(999_999.0) - 6.0).abs() < 1e-9);
        assert_eq!(w.factor(-10.0), 1.0);
        assert_eq!(ScoreWeighting::Flat.factor(1e12), 1.0);
    }

    #[test]
    fn test_weights_proportional_to_score() {
        let config = AdvisorConfig {
            score_weighting: ScoreWeighting::Flat,
            ..Default::default()
        };
        let tickers = book(&[
            ("BTCUSDT", ticker(10.0, 0.0)),
            ("ETHUSDT", ticker(-4.0, 0.0)),
            ("DOGEUSDT", ticker(1.0, 0.0)),
        ]);
        let out = allocate_fallback(&config, &["BTC", "ETH", "DOGE"], &tickers);
        let picks = out.picks.picks();
        assert_eq!(picks.len(), 3);
        assert!((picks[0].weight - 10.0 / 15.0).abs() < 1e-6);
        assert!((picks[1].weight - 4.0 / 15.0).abs() < 1e-6);
        assert!((picks[2].weight - 1.0 / 15.0).abs() < 1e-6);
        assert_eq!(picks[1].side, PositionSide::Short);
        assert!((out.picks.total_weight() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_n_and_missing_tickers() {
        let config = AdvisorConfig::default();
        let tickers = book(&[
            ("AUSDT", ticker(1.0, 10.0)),
            ("BUSDT", ticker(2.0, 10.0)),
            ("CUSDT", ticker(3.0, 10.0)),
            ("DUSDT", ticker(4.0, 10.0)),
        ]);
        let out = allocate_fallback(&config, &["A", "B", "C", "D", "E"], &tickers);
        let symbols: Vec<_> = out.picks.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["DUSDT", "CUSDT", "BUSDT"]);
        assert!(out.diagnostic.starts_with("Ranked by 24h momentum"));
        assert_eq!(out.diagnostic.lines().count(), 4);
    }

    #[test]
    fn test_zero_scores_give_empty_result() {
        let config = AdvisorConfig::default();
        let tickers = book(&[("BTCUSDT", ticker(0.0, 1e9))]);
        let out = allocate_fallback(&config, &["BTC", "ETH"], &tickers);
        assert!(out.picks.is_empty());
        assert!(out.diagnostic.contains("fallback skipped"));
    }

    #[test]
    fn test_diagnostic_line_format() {
        let config = AdvisorConfig::default();
        let tickers = book(&[("BTCUSDT", ticker(2.5, 1_234_567.0))]);
        let out = allocate_fallback(&config, &["BTC"], &tickers);
        assert_eq!(out.picks.picks()[0].weight, 1.0);
        assert!(out
            .diagnostic
            .contains("BTCUSDT: +2.50% / 24h volume ~ 1,234,567 USD / w=1.000"));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(1_234_567.8), "1,234,568");
    }
}
