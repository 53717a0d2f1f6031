use thiserror::Error;

/// Main error type for the advisor
#[derive(Error, Debug)]
pub enum AdvisorError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Collaborator errors
    #[error("Reasoning service error: {0}")]
    ReasoningService(String),

    #[error("Market data unavailable: {0}")]
    MarketDataUnavailable(String),

    #[error("Headline feed error: {0}")]
    Headlines(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for AdvisorError
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Why a single payload item was rejected.
///
/// Never crosses the crate boundary: the batch decoders log it and move on to
/// the next item.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("item is not an object")]
    NotAnObject,

    #[error("missing or empty field: {0}")]
    Missing(&'static str),

    #[error("field {field} is not a finite number")]
    NotNumeric { field: &'static str },

    #[error("field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("unsupported action: {0}")]
    UnsupportedAction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_messages() {
        let err = FieldError::OutOfRange {
            field: "reduce_ratio",
            value: 0.005,
        };
        assert_eq!(err.to_string(), "field reduce_ratio out of range: 0.005");
        assert_eq!(
            FieldError::UnsupportedAction("hedge".into()).to_string(),
            "unsupported action: hedge"
        );
    }

    #[test]
    fn test_anyhow_converts() {
        let err: AdvisorError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
