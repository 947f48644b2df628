//! # Text Processing Utilities
//!
//! Redaction of secret-looking values before they reach a log, plus the small
//! string helpers the viewer uses for titles and one-line summaries.

use heck::ToTitleCase;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use unicode_width::UnicodeWidthChar;

const REDACTED: &str = "[REDACTED]";

/// Object keys whose values are always redacted in JSON payloads.
const SENSITIVE_KEY_FRAGMENTS: &[&str] = &["password", "passwd", "secret", "token", "api_key", "apikey", "authorization", "credential"];

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s+)([^\s]+(?:\s+[^\s]+)*)",
        r"(?i)((?:^|\b)Bearer\s+)([A-Za-z0-9\-._~+/]+=*)",
        r"(?i)((?:export\s+)?[A-Za-z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD)[A-Za-z0-9_]*\s*=\s*)([^\s]+)",
        r#"(?i)("[A-Za-z0-9_.-]*?(?:key|token|secret|password)[A-Za-z0-9_.-]*"\s*:\s*")([^"]+)(")"#,
        r"(eyJ[A-Za-z0-9\-._~+/]+=*)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
///
/// ```rust
/// use flowdeck_util::redact_sensitive;
///
/// assert_eq!(redact_sensitive("API_KEY=abc123"), "API_KEY=[REDACTED]");
/// assert_eq!(redact_sensitive("Authorization: Bearer abc"), "Authorization: [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                match (captures.get(1), captures.get(2)) {
                    (Some(prefix), Some(_)) => {
                        let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                        format!("{}{REDACTED}{}", prefix.as_str(), suffix)
                    }
                    _ => REDACTED.to_string(),
                }
            })
            .to_string();
    }
    redacted
}

/// Redacts a JSON document: string leaves are scrubbed with
/// [`redact_sensitive`], and values under sensitive keys are replaced outright.
pub fn redact_json(value: &Value) -> Value {
    match value {
        Value::String(text) => Value::String(redact_sensitive(text)),
        Value::Array(items) => Value::Array(items.iter().map(redact_json).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    let lowered = key.to_ascii_lowercase();
                    let redacted = if SENSITIVE_KEY_FRAGMENTS.iter().any(|fragment| lowered.contains(fragment)) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_json(item)
                    };
                    (key.clone(), redacted)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Turns an event or field identifier into a display title.
///
/// `PlaceOrder` → `Place Order`, `confirm_payment` → `Confirm Payment`,
/// `HTTPRequest` → `Http Request`.
pub fn humanize_identifier(identifier: &str) -> String {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    trimmed.to_title_case()
}

/// Shortens `text` to at most `max_width` terminal columns, appending `...`
/// when anything was cut.
pub fn truncate_for_summary(text: &str, max_width: usize) -> String {
    let trimmed = text.trim();
    let total: usize = trimmed.chars().map(|ch| ch.width().unwrap_or(0)).sum();
    if total <= max_width {
        return trimmed.to_string();
    }

    // Reserve space for the trailing ellipsis.
    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let mut truncated = String::new();
    for ch in trimmed.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width > budget {
            break;
        }
        used += width;
        truncated.push(ch);
    }
    format!("{}...", truncated.trim_end())
}

/// Collapses a possibly multi-line body into one line for status output.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_env_style_assignments_and_headers() {
        assert_eq!(redact_sensitive("DB_PASSWORD=hunter2 mode=fast"), "DB_PASSWORD=[REDACTED] mode=fast");
        assert_eq!(redact_sensitive("authorization: Basic Zm9v"), "authorization: [REDACTED]");
    }

    #[test]
    fn redacts_json_text_values() {
        assert_eq!(redact_sensitive(r#"{"api_token":"abc"}"#), r#"{"api_token":"[REDACTED]"}"#);
    }

    #[test]
    fn redact_json_scrubs_sensitive_keys() {
        let redacted = redact_json(&json!({
            "CookName": "Luigi",
            "Password": "pa55",
            "Nested": { "auth_token": 42, "note": "API_KEY=xyz" }
        }));
        assert_eq!(
            redacted,
            json!({
                "CookName": "Luigi",
                "Password": "[REDACTED]",
                "Nested": { "auth_token": "[REDACTED]", "note": "API_KEY=[REDACTED]" }
            })
        );
    }

    #[test]
    fn humanizes_identifiers() {
        assert_eq!(humanize_identifier("PlaceOrder"), "Place Order");
        assert_eq!(humanize_identifier("confirm_payment"), "Confirm Payment");
        assert_eq!(humanize_identifier("HTTPRequest"), "Http Request");
        assert_eq!(humanize_identifier("add"), "Add");
        assert_eq!(humanize_identifier(""), "");
    }

    #[test]
    fn truncates_on_display_width() {
        assert_eq!(truncate_for_summary("short", 10), "short");
        assert_eq!(truncate_for_summary("a fairly long message", 10), "a fairl...");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(single_line("error:\n  missing\tphone "), "error: missing phone");
    }
}
