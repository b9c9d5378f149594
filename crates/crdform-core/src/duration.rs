//! Go-style duration strings (`"30s"`, `"1m30s"`, `"500ms"`)

use std::time::Duration;

use crate::error::{Result, ValueError};

/// Parse a duration attribute. A bare `"0"` means zero.
pub fn parse_duration(text: &str) -> Result<Duration> {
    let trimmed = text.trim();
    if trimmed == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(trimmed).map_err(|e| ValueError::InvalidDuration {
        value: text.to_string(),
        message: e.to_string(),
    })
}

/// Parse an optional duration attribute, falling back to `default` when absent
pub fn parse_duration_or(text: Option<&str>, default: Duration) -> Result<Duration> {
    match text {
        Some(t) if !t.trim().is_empty() => parse_duration(t),
        _ => Ok(default),
    }
}

/// Render a duration in the same notation
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }
    humantime::format_duration(duration).to_string()
}
