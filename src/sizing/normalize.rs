//! Normalization of proposed picks into a weight-bounded allocation set

use serde_json::Value;
use tracing::debug;

use crate::domain::{normalize_symbol, round6, value_as_f64, AllocationSet, Pick, PositionSide};
use crate::error::FieldError;

/// Weights at or below this are treated as zero
const ZERO_WEIGHT_EPS: f64 = 1e-9;
/// Upper bound on the equal-weight divisor
const MAX_EQUAL_WEIGHT_SLOTS: usize = 5;

/// Turn whatever the reasoning service sent as `picks` into an [`AllocationSet`].
///
/// Accepts a list of symbols, a list of objects, or a single object; any
/// other shape yields an empty set. Items that cannot be decoded are dropped
/// individually. If no item carries a weight, all picks get an equal share of
/// `1/min(5, n)`; if the weights add up to more than 1 they are scaled down
/// proportionally. Under-allocation is kept as is.
pub fn normalize_picks(raw: &Value) -> AllocationSet {
    let items: &[Value] = match raw {
        Value::Array(items) => items,
        Value::Object(_) => std::slice::from_ref(raw),
        _ => return AllocationSet::empty(),
    };

    let mut picks: Vec<Pick> = items
        .iter()
        .filter_map(|item| match decode_pick(item) {
            Ok(pick) => Some(pick),
            Err(e) => {
                debug!("Dropping pick {}: {}", item, e);
                None
            }
        })
        .collect();

    if picks.is_empty() {
        return AllocationSet::empty();
    }

    if picks.iter().all(|p| p.weight.abs() <= ZERO_WEIGHT_EPS) {
        // The divisor counts every supplied item, decodable or not.
        let slots = items.len().min(MAX_EQUAL_WEIGHT_SLOTS).max(1);
        let share = round6(1.0 / slots as f64);
        for pick in &mut picks {
            pick.weight = share;
        }
    }

    rescale_to_budget(&mut picks);
    AllocationSet::from_picks(picks)
}

/// Decode a single pick: either a bare symbol or an object with
/// `symbol`, optional `weight` and optional `side`.
pub fn decode_pick(item: &Value) -> Result<Pick, FieldError> {
    match item {
        Value::String(raw) => {
            let symbol = normalize_symbol(raw);
            if symbol.is_empty() {
                return Err(FieldError::Missing("symbol"));
            }
            Ok(Pick::new(symbol, 0.0, PositionSide::Long))
        }
        Value::Object(obj) => {
            let symbol = match obj.get("symbol") {
                Some(Value::String(s)) => normalize_symbol(s),
                Some(Value::Number(n)) => normalize_symbol(&n.to_string()),
                _ => String::new(),
            };
            if symbol.is_empty() {
                return Err(FieldError::Missing("symbol"));
            }

            let weight = obj
                .get("weight")
                .and_then(value_as_f64)
                .map(|w| w.max(0.0))
                .unwrap_or(0.0);

            let side = obj
                .get("side")
                .and_then(Value::as_str)
                .map(PositionSide::from_loose)
                .unwrap_or_default();

            Ok(Pick::new(symbol, weight, side))
        }
        _ => Err(FieldError::NotAnObject),
    }
}

/// Scale weights down so they sum to at most 1.0.
fn rescale_to_budget(picks: &mut [Pick]) {
    let total: f64 = picks.iter().map(|p| p.weight).sum();
    if total <= 1.0 {
        return;
    }

    for pick in picks.iter_mut() {
        pick.weight = round6(pick.weight / total);
    }

    // Rounding can leave the sum a few millionths above 1.0.
    let excess = picks.iter().map(|p| p.weight).sum::<f64>() - 1.0;
    if excess > 0.0 {
        if let Some(largest) = picks
            .iter_mut()
            .max_by(|a, b| a.weight.total_cmp(&b.weight))
        {
            largest.weight = round6((largest.weight - excess).max(0.0));
        }
    }
}
