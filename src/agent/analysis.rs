//! Operator-facing analysis text for an allocation run

/// Raw replies are cut to this many characters in the analysis text
pub const RAW_SNIPPET_CHARS: usize = 600;

/// Everything that can go into the analysis text
#[derive(Debug, Default, Clone)]
pub struct AnalysisParts<'a> {
    pub headlines: Option<&'a str>,
    pub reason: &'a str,
    pub notes: &'a str,
    /// Fallback diagnostic; present only when the fallback ran
    pub fallback: Option<&'a str>,
    pub raw_reply: &'a str,
    pub error: Option<&'a str>,
}

/// Join the non-empty sections with blank lines.
///
/// The raw reply and the call error are only shown when the fallback ran or
/// the call failed.
pub fn compose_analysis(parts: &AnalysisParts<'_>) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(headlines) = parts.headlines.filter(|h| !h.trim().is_empty()) {
        sections.push(format!("[Market headlines]\n{}", headlines));
    }
    if !parts.reason.trim().is_empty() {
        sections.push(format!("[Rationale]\n{}", parts.reason.trim()));
    }
    if !parts.notes.trim().is_empty() {
        sections.push(format!("[Notes]\n{}", parts.notes.trim()));
    }
    if let Some(fallback) = parts.fallback.filter(|f| !f.trim().is_empty()) {
        sections.push(format!("[Fallback]\n{}", fallback.trim()));
    }

    if parts.fallback.is_some() || parts.error.is_some() {
        let mut diag = String::from("[Reasoning service]\n");
        if let Some(error) = parts.error {
            diag.push_str(&format!("(error) {}\n", error));
        }
        let snippet = raw_snippet(parts.raw_reply);
        if !snippet.is_empty() {
            diag.push_str(&format!("(raw) {}", snippet));
        }
        sections.push(diag.trim().to_string());
    }

    sections.join("\n\n")
}

/// Trimmed reply with carriage returns flattened, truncated with an ellipsis.
pub fn raw_snippet(raw: &str) -> String {
    let flat = raw.trim().replace('\r', " ");
    if flat.chars().count() > RAW_SNIPPET_CHARS {
        let mut cut: String = flat.chars().take(RAW_SNIPPET_CHARS).collect();
        cut.push('…');
        cut
    } else {
        flat
    }
}
