//! Permissive JSON recovery from reasoning-service replies
//!
//! Replies are expected to be a bare JSON object but routinely arrive wrapped
//! in markdown fences, surrounded by prose, or written with single quotes and
//! trailing commas. Extraction tries progressively looser strategies and never
//! fails: the worst case is an empty payload.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

static FENCED_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced object pattern")
});

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern"));

/// Which strategy recovered the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractStrategy {
    Strict,
    Fenced,
    BraceSpan,
    Repaired,
}

/// Loosely-typed mapping recovered from a reply
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParsedPayload(Map<String, Value>);

impl ParsedPayload {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Raw `picks` value, whatever its shape
    pub fn picks(&self) -> Option<&Value> {
        self.get("picks")
    }

    /// Raw `decisions` value, whatever its shape
    pub fn decisions(&self) -> Option<&Value> {
        self.get("decisions")
    }

    /// Trimmed `reason`, empty when absent or not a string
    pub fn reason(&self) -> &str {
        self.text_field("reason")
    }

    /// Trimmed `notes`, empty when absent or not a string
    pub fn notes(&self) -> &str {
        self.text_field("notes")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn text_field(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_str).map(str::trim).unwrap_or("")
    }
}

impl From<Map<String, Value>> for ParsedPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Recover a JSON object from `text`, or an empty payload.
pub fn extract_payload(text: &str) -> ParsedPayload {
    extract_with_strategy(text).0
}

/// Like [`extract_payload`], also reporting which strategy succeeded.
pub fn extract_with_strategy(text: &str) -> (ParsedPayload, Option<ExtractStrategy>) {
    let text = text.trim();
    if text.is_empty() {
        return (ParsedPayload::default(), None);
    }

    // An empty object is as good as nothing; let the relaxed passes look further.
    if let Some(map) = parse_object(text).filter(|m| !m.is_empty()) {
        return (map.into(), Some(ExtractStrategy::Strict));
    }

    if let Some(map) = FENCED_OBJECT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_object(m.as_str()))
    {
        return (map.into(), Some(ExtractStrategy::Fenced));
    }

    if let Some(chunk) = brace_span(text) {
        if let Some(map) = parse_object(chunk) {
            return (map.into(), Some(ExtractStrategy::BraceSpan));
        }
        if let Some(map) = parse_object(&repair(chunk)) {
            return (map.into(), Some(ExtractStrategy::Repaired));
        }
    }

    debug!("No JSON object recoverable from {} chars of reply", text.len());
    (ParsedPayload::default(), None)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Substring from the first `{` to the last `}`, inclusive
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Single quotes to double quotes, trailing commas removed
fn repair(chunk: &str) -> String {
    let quoted = chunk.replace('\'', "\"");
    TRAILING_COMMA.replace_all(&quoted, "$1").into_owned()
}
