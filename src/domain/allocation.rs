use serde::{Deserialize, Serialize};

/// Direction of a proposed allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    #[default]
    Long,
    Short,
}

impl PositionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSide::Long => "long",
            PositionSide::Short => "short",
        }
    }

    /// Lenient parse used on model output: anything unrecognized is `Long`.
    pub fn from_loose(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "short" => PositionSide::Short,
            _ => PositionSide::Long,
        }
    }

    /// Side implied by a signed 24h move.
    pub fn from_momentum(pct_change: f64) -> Self {
        if pct_change >= 0.0 {
            PositionSide::Long
        } else {
            PositionSide::Short
        }
    }
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalize a trading symbol: trim, uppercase, drop separators.
///
/// `"BTC/USDT"`, `"btc-usdt"` and `"BTCUSDT"` all become `"BTCUSDT"`.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// A single proposed allocation target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub symbol: String,
    pub weight: f64,
    pub side: PositionSide,
}

impl Pick {
    pub fn new(symbol: impl Into<String>, weight: f64, side: PositionSide) -> Self {
        Self {
            symbol: symbol.into(),
            weight,
            side,
        }
    }
}

/// Validated, weight-bounded list of picks.
///
/// Every weight is non-negative and the weights sum to at most 1.0. Only the
/// normalizer and the fallback allocator build non-empty sets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationSet(Vec<Pick>);

impl AllocationSet {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn from_picks(picks: Vec<Pick>) -> Self {
        Self(picks)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn picks(&self) -> &[Pick] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pick> {
        self.0.iter()
    }

    pub fn total_weight(&self) -> f64 {
        self.0.iter().map(|p| p.weight).sum()
    }

    /// Capital left uninvested, as a fraction of the budget
    pub fn unallocated(&self) -> f64 {
        (1.0 - self.total_weight()).max(0.0)
    }

    pub fn into_inner(self) -> Vec<Pick> {
        self.0
    }
}

impl<'a> IntoIterator for &'a AllocationSet {
    type Item = &'a Pick;
    type IntoIter = std::slice::Iter<'a, Pick>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Round to 6 decimals, the precision weights are reported with.
pub(crate) fn round6(x: f64) -> f64 {
    (x * 1_000_000.0).round() / 1_000_000.0
}
