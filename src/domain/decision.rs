use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validated position-adjustment instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DecisionAction {
    /// Close the whole position
    Close,
    /// Move the stop to a new price
    AdjustStop { new_stop: f64 },
    /// Reduce the position by a fraction in (0.01, 1.0]
    ScaleOut { reduce_ratio: f64 },
    /// Add capital (USD) to the position
    ScaleIn { capital_usd: f64 },
}

impl DecisionAction {
    pub const CLOSE: &'static str = "close";
    pub const ADJUST_STOP: &'static str = "adjust_stop";
    pub const SCALE_OUT: &'static str = "scale_out";
    pub const SCALE_IN: &'static str = "scale_in";

    pub fn name(&self) -> &'static str {
        match self {
            DecisionAction::Close => Self::CLOSE,
            DecisionAction::AdjustStop { .. } => Self::ADJUST_STOP,
            DecisionAction::ScaleOut { .. } => Self::SCALE_OUT,
            DecisionAction::ScaleIn { .. } => Self::SCALE_IN,
        }
    }
}

/// A decision bound to a position id.
///
/// Serializes flat: `{"id": 3, "action": "scale_out", "reduce_ratio": 0.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: Value,
    #[serde(flatten)]
    pub action: DecisionAction,
}

impl Decision {
    pub fn new(id: impl Into<Value>, action: DecisionAction) -> Self {
        Self {
            id: id.into(),
            action,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.action {
            DecisionAction::Close => write!(f, "close {}", self.id),
            DecisionAction::AdjustStop { new_stop } => {
                write!(f, "adjust_stop {} -> {}", self.id, new_stop)
            }
            DecisionAction::ScaleOut { reduce_ratio } => {
                write!(f, "scale_out {} by {:.1}%", self.id, reduce_ratio * 100.0)
            }
            DecisionAction::ScaleIn { capital_usd } => {
                write!(f, "scale_in {} with ${:.2}", self.id, capital_usd)
            }
        }
    }
}
