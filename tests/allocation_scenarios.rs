use std::collections::HashMap;

use ploy_advisor::domain::{normalize_symbol, PositionSide, RawTicker};
use ploy_advisor::sizing::{allocate_fallback, extract_payload, normalize_picks};
use ploy_advisor::AdvisorConfig;
use serde_json::json;

/// Replies the extractor must survive without panicking.
const HOSTILE_REPLIES: &[&str] = &[
    "",
    "   \n\t ",
    "I'm sorry, I can't help with that.",
    "{",
    "}",
    "}{",
    "{{{{}}}}",
    "```json\n```",
    "```json\n{\"picks\": [}\n```",
    "[\"BTC\", \"ETH\"]",
    "null",
    "\"just a string\"",
    "{'picks': ['BTC',], 'reason': 'it's fine'}",
    "prefix { \"a\": 1 } middle { \"b\": 2 } suffix",
    "\u{0000}{\u{0000}}",
    "{\"picks\": [{\"symbol\": \"BTC\", \"weight\": 1e400}]}",
];

#[test]
fn extraction_never_panics_and_returns_a_mapping() {
    for reply in HOSTILE_REPLIES {
        let payload = extract_payload(reply);
        // Whatever came back must be usable as a mapping.
        let _ = payload.reason();
        let _ = payload.picks();
        let _ = serde_json::to_value(&payload).unwrap().as_object().unwrap();
    }
}

#[test]
fn normalized_weights_stay_within_budget() {
    let inputs = [
        json!([{"symbol": "A", "weight": 5}, {"symbol": "B", "weight": 3}, {"symbol": "C", "weight": 2}]),
        json!([{"symbol": "A", "weight": 0.7}, {"symbol": "B", "weight": 0.7}, {"symbol": "C", "weight": 0.7}]),
        json!([{"symbol": "A", "weight": -3}, {"symbol": "B", "weight": "2"}]),
        json!(["A", "B", "C", "D", "E", "F", "G", "H", "I"]),
        json!([{"symbol": "A", "weight": 1e300}, {"symbol": "B", "weight": 1e300}]),
        json!({"symbol": "A", "weight": 42}),
    ];

    for raw in inputs {
        let set = normalize_picks(&raw);
        assert!(!set.is_empty());
        assert!(set.iter().all(|p| p.weight >= 0.0), "negative weight in {raw}");
        assert!(set.total_weight() <= 1.0 + 1e-6, "over budget for {raw}");
    }
}

#[test]
fn zero_weights_become_equal_shares() {
    for count in 1..=5usize {
        let raw: Vec<_> = (0..count)
            .map(|i| json!({"symbol": format!("SYM{i}"), "weight": 0}))
            .collect();
        let set = normalize_picks(&json!(raw));
        let expected = 1.0 / count as f64;
        assert!(set.iter().all(|p| (p.weight - expected).abs() < 1e-6));
    }
}

#[test]
fn symbol_normalization_is_idempotent() {
    assert_eq!(normalize_symbol("BTC/USDT"), normalize_symbol("btcusdt"));
    let once = normalize_symbol("eth/usdt");
    assert_eq!(normalize_symbol(&once), once);
}

#[test]
fn fenced_reply_with_bare_symbols() {
    let reply = "```json\n{\"picks\":[\"BTC/USDT\",\"ETH/USDT\"],\"reason\":\"momentum\"}\n```";
    let payload = extract_payload(reply);
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({"picks": ["BTC/USDT", "ETH/USDT"], "reason": "momentum"})
    );

    let set = normalize_picks(payload.picks().unwrap());
    let picks = set.picks();
    assert_eq!(picks.len(), 2);
    assert_eq!(picks[0].symbol, "BTCUSDT");
    assert_eq!(picks[1].symbol, "ETHUSDT");
    assert!(picks.iter().all(|p| p.weight == 0.5 && p.side == PositionSide::Long));
}

#[test]
fn over_allocated_picks_are_rescaled() {
    let set = normalize_picks(&json!([
        {"symbol": "sol", "weight": 0.9},
        {"symbol": "ada", "weight": 0.9}
    ]));
    let weights: Vec<f64> = set.iter().map(|p| p.weight).collect();
    assert_eq!(weights, vec![0.5, 0.5]);
}

#[test]
fn unparsable_reply_falls_back_to_market_scores() {
    let payload = extract_payload("The market looks choppy today; I'd stay careful.");
    let picks = payload.picks().map(normalize_picks).unwrap_or_default();
    assert!(picks.is_empty());

    // Zero volume keeps the liquidity factor at 1, so scores equal |%|.
    let tickers: HashMap<String, RawTicker> = [("BTCUSDT", 10.0), ("ETHUSDT", -4.0), ("DOGEUSDT", 1.0)]
        .into_iter()
        .map(|(symbol, pct)| {
            (
                symbol.to_string(),
                RawTicker {
                    percentage: Some(pct),
                    ..Default::default()
                },
            )
        })
        .collect();

    let outcome = allocate_fallback(&AdvisorConfig::default(), &["BTC", "ETH", "DOGE"], &tickers);
    let picks = outcome.picks.picks();
    assert_eq!(picks.len(), 3);
    assert!((picks[0].weight - 10.0 / 15.0).abs() < 1e-6);
    assert!((picks[1].weight - 4.0 / 15.0).abs() < 1e-6);
    assert!((picks[2].weight - 1.0 / 15.0).abs() < 1e-6);
    assert_eq!(picks[1].side, PositionSide::Short);
    assert!((outcome.picks.total_weight() - 1.0).abs() < 1e-6);
}

#[test]
fn fallback_never_exceeds_top_n() {
    let tickers: HashMap<String, RawTicker> = (1..=10)
        .map(|i| {
            (
                format!("C{i}USDT"),
                RawTicker {
                    percentage: Some(i as f64),
                    quote_volume: Some(10f64.powi(i)),
                    ..Default::default()
                },
            )
        })
        .collect();
    let candidates: Vec<String> = (1..=10).map(|i| format!("C{i}")).collect();

    let outcome = allocate_fallback(&AdvisorConfig::default(), &candidates, &tickers);
    assert_eq!(outcome.picks.len(), 3);
    assert!((outcome.picks.total_weight() - 1.0).abs() < 1e-6);
    assert_eq!(outcome.picks.picks()[0].symbol, "C10USDT");
}
