use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 24h ticker as returned by an exchange.
///
/// Field names follow the unified `percentage`/`quoteVolume`/`baseVolume`/`last`
/// layout; Binance's native names are accepted as aliases. Numbers may arrive
/// as JSON numbers or numeric strings; anything else reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTicker {
    #[serde(default, alias = "priceChangePercent", deserialize_with = "lenient_f64")]
    pub percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quote_volume: Option<f64>,
    #[serde(default, alias = "volume", deserialize_with = "lenient_f64")]
    pub base_volume: Option<f64>,
    #[serde(default, alias = "lastPrice", deserialize_with = "lenient_f64")]
    pub last: Option<f64>,
}

/// Statistics the fallback allocator scores on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketTicker {
    pub pct_change_24h: f64,
    pub quote_volume_usd: f64,
}

impl From<&RawTicker> for MarketTicker {
    fn from(raw: &RawTicker) -> Self {
        let pct_change_24h = raw.percentage.unwrap_or(0.0);
        let quote_volume_usd = match (raw.quote_volume, raw.base_volume, raw.last) {
            (Some(qv), _, _) => qv,
            (None, Some(base), Some(last)) => base * last,
            _ => 0.0,
        };
        Self {
            pct_change_24h,
            quote_volume_usd: if quote_volume_usd.is_finite() {
                quote_volume_usd.max(0.0)
            } else {
                0.0
            },
        }
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

/// Coerce a JSON number or numeric string to a finite `f64`.
pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|x| x.is_finite())
}
