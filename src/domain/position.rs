use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::PositionSide;

/// Snapshot of an open position, supplied by the caller and never mutated here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Caller-defined identifier (string or number)
    pub id: Value,
    pub symbol: String,
    #[serde(default, deserialize_with = "loose_side")]
    pub side: PositionSide,
    /// Average entry price
    #[serde(default)]
    pub entry: Option<Decimal>,
    #[serde(default)]
    pub qty: Option<Decimal>,
    /// Current stop price, if one is set
    #[serde(default)]
    pub stop: Option<Decimal>,
    /// Floating P&L in percent
    #[serde(default)]
    pub pnl_pct: f64,
    #[serde(default)]
    pub holding_time_sec: u64,
    #[serde(default)]
    pub status: Option<String>,
}

impl Position {
    pub fn new(id: impl Into<Value>, symbol: impl Into<String>, side: PositionSide) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            side,
            entry: None,
            qty: None,
            stop: None,
            pnl_pct: 0.0,
            holding_time_sec: 0,
            status: None,
        }
    }

    pub fn with_entry(mut self, entry: Decimal, qty: Decimal) -> Self {
        self.entry = Some(entry);
        self.qty = Some(qty);
        self
    }

    pub fn with_stop(mut self, stop: Decimal) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_pnl_pct(mut self, pnl_pct: f64) -> Self {
        self.pnl_pct = pnl_pct;
        self
    }

    /// Notional value at entry, when both entry and qty are known
    pub fn entry_notional(&self) -> Option<Decimal> {
        Some(self.entry? * self.qty?)
    }
}

fn loose_side<'de, D>(deserializer: D) -> std::result::Result<PositionSide, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|s| PositionSide::from_loose(&s))
        .unwrap_or_default())
}
