//! Validation of position-review decisions

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::extract::ParsedPayload;
use crate::domain::{value_as_f64, Decision, DecisionAction};
use crate::error::FieldError;

/// Ratios at or below this are noise, not a scale-out
const MIN_REDUCE_RATIO: f64 = 0.01;
const MAX_REDUCE_RATIO: f64 = 1.0;

/// Validated decisions plus the model's rationale
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub decisions: Vec<Decision>,
    pub reason: String,
}

impl ReviewOutcome {
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            decisions: Vec::new(),
            reason: reason.into(),
        }
    }
}

/// Validate the `decisions` and carry the `reason` of a parsed reply.
pub fn review_from_payload(payload: &ParsedPayload, known_ids: &[Value]) -> ReviewOutcome {
    ReviewOutcome {
        decisions: payload
            .decisions()
            .map(|raw| validate_decisions(raw, known_ids))
            .unwrap_or_default(),
        reason: payload.reason().to_string(),
    }
}

/// Keep every decision that decodes, in input order.
///
/// `known_ids` is informational: decisions for unknown ids are kept and
/// logged. Several decisions for the same id are all kept; precedence is the
/// executor's call.
pub fn validate_decisions(raw: &Value, known_ids: &[Value]) -> Vec<Decision> {
    let Some(items) = raw.as_array() else {
        debug!("decisions is not a list: {}", raw);
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match decode_decision(item) {
            Ok(decision) => {
                if !known_ids.is_empty() && !known_ids.contains(&decision.id) {
                    debug!("Decision references unknown position id {}", decision.id);
                }
                Some(decision)
            }
            Err(e) => {
                debug!("Dropping decision {}: {}", item, e);
                None
            }
        })
        .collect()
}

/// Decode and range-check one decision.
pub fn decode_decision(item: &Value) -> Result<Decision, FieldError> {
    let obj = item.as_object().ok_or(FieldError::NotAnObject)?;

    let action_name = obj
        .get("action")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_lowercase())
        .ok_or(FieldError::Missing("action"))?;

    let action = match action_name.as_str() {
        DecisionAction::CLOSE => DecisionAction::Close,
        DecisionAction::ADJUST_STOP => DecisionAction::AdjustStop {
            new_stop: number_field(obj, "new_stop")?,
        },
        DecisionAction::SCALE_OUT => {
            let reduce_ratio = number_field(obj, "reduce_ratio")?;
            if !(reduce_ratio > MIN_REDUCE_RATIO && reduce_ratio <= MAX_REDUCE_RATIO) {
                return Err(FieldError::OutOfRange {
                    field: "reduce_ratio",
                    value: reduce_ratio,
                });
            }
            DecisionAction::ScaleOut { reduce_ratio }
        }
        DecisionAction::SCALE_IN => {
            let capital_usd = number_field(obj, "capital_usd")?;
            if capital_usd <= 0.0 {
                return Err(FieldError::OutOfRange {
                    field: "capital_usd",
                    value: capital_usd,
                });
            }
            DecisionAction::ScaleIn { capital_usd }
        }
        _ => return Err(FieldError::UnsupportedAction(action_name)),
    };

    Ok(Decision {
        id: obj.get("id").cloned().unwrap_or(Value::Null),
        action,
    })
}

fn number_field(obj: &Map<String, Value>, field: &'static str) -> Result<f64, FieldError> {
    obj.get(field)
        .and_then(value_as_f64)
        .ok_or(FieldError::NotNumeric { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::extract::extract_payload;
    use serde_json::json;

    #[test]
    fn test_close_keeps_only_id_and_action() {
        let d = decode_decision(&json!({"id": 4, "action": "CLOSE", "new_stop": 10})).unwrap();
        assert_eq!(d, Decision::new(4, DecisionAction::Close));
    }

    #[test]
    fn test_adjust_stop_requires_number() {
        let ok = decode_decision(&json!({"id": 1, "action": "adjust_stop", "new_stop": "101.5"}));
        assert_eq!(
            ok.unwrap().action,
            DecisionAction::AdjustStop { new_stop: 101.5 }
        );

        let missing = decode_decision(&json!({"id": 1, "action": "adjust_stop"}));
        assert_eq!(missing, Err(FieldError::NotNumeric { field: "new_stop" }));

        let junk = decode_decision(&json!({"id": 1, "action": "adjust_stop", "new_stop": "tight"}));
        assert!(junk.is_err());
    }

    #[test]
    fn test_scale_out_bounds() {
        let at_floor = decode_decision(&json!({"action": "scale_out", "reduce_ratio": 0.01}));
        assert!(matches!(at_floor, Err(FieldError::OutOfRange { .. })));

        let above_floor = decode_decision(&json!({"action": "scale_out", "reduce_ratio": 0.0101}));
        assert!(above_floor.is_ok());

        let full = decode_decision(&json!({"action": "scale_out", "reduce_ratio": 1.0}));
        assert!(full.is_ok());

        let over = decode_decision(&json!({"action": "scale_out", "reduce_ratio": 1.01}));
        assert!(over.is_err());
    }

    #[test]
    fn test_scale_in_must_be_positive() {
        assert!(decode_decision(&json!({"action": "scale_in", "capital_usd": 0})).is_err());
        assert!(decode_decision(&json!({"action": "scale_in", "capital_usd": -5})).is_err());
        let tiny = decode_decision(&json!({"action": "scale_in", "capital_usd": 0.0001})).unwrap();
        assert_eq!(tiny.action, DecisionAction::ScaleIn { capital_usd: 0.0001 });
        assert_eq!(tiny.id, Value::Null);
    }

    #[test]
    fn test_unsupported_and_malformed_items_dropped() {
        let raw = json!([
            {"id": 1, "action": "hedge"},
            {"id": 2, "action": 7},
            "close",
            {"id": 3, "action": " Scale_In ", "capital_usd": 50}
        ]);
        let decisions = validate_decisions(&raw, &[]);
        assert_eq!(
            decisions,
            vec![Decision::new(3, DecisionAction::ScaleIn { capital_usd: 50.0 })]
        );
    }

    #[test]
    fn test_conflicting_decisions_retained() {
        let raw = json!([
            {"id": "a", "action": "close"},
            {"id": "a", "action": "scale_in", "capital_usd": 100}
        ]);
        let decisions = validate_decisions(&raw, &[json!("a")]);
        assert_eq!(decisions.len(), 2);
    }

    #[test]
    fn test_unknown_ids_are_kept() {
        let raw = json!([{"id": 99, "action": "close"}]);
        let decisions = validate_decisions(&raw, &[json!(1), json!(2)]);
        assert_eq!(decisions.len(), 1);
    }

    #[test]
    fn test_non_list_decisions() {
        assert!(validate_decisions(&json!({"id": 1, "action": "close"}), &[]).is_empty());
    }

    #[test]
    fn test_review_from_payload() {
        let payload = extract_payload(
            r#"{"decisions": [{"id": 1, "action": "close"}], "reason": " trend broke "}"#,
        );
        let outcome = review_from_payload(&payload, &[]);
        assert_eq!(outcome.decisions.len(), 1);
        assert_eq!(outcome.reason, "trend broke");

        let outcome = review_from_payload(&extract_payload("garbage"), &[]);
        assert_eq!(outcome, ReviewOutcome::default());
    }
}
