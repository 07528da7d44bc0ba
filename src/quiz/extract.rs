//! Candidate extraction from raw model output.
//!
//! Three steps, tried in order, each total and side-effect free:
//! 1. the interior of the first fenced code block (optionally tagged `json`)
//! 2. the span from the first `[` to the last `]`, inclusive
//! 3. the raw text unchanged
//!
//! The first step that matches wins; later steps never refine its output.

use regex::Regex;
use std::sync::LazyLock;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?i:json)?\s*(.*?)\s*```").expect("valid fenced block regex")
});

/// Interior of the first fenced code block, if any
pub fn fenced_block(raw: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Substring from the first `[` through the last `]`, when `]` comes after `[`
pub fn bracket_span(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end > start).then(|| &raw[start..=end])
}

/// Run the fallback chain and return the candidate JSON string
pub fn candidate(raw: &str) -> &str {
    fenced_block(raw)
        .or_else(|| bracket_span(raw))
        .unwrap_or(raw)
}
