//! Text-level gate for numeric input
//!
//! Edits are accepted only when they could be the start of a plain decimal
//! number. Rejected edits leave the stored text untouched.

use std::sync::OnceLock;

use regex::Regex;

/// Digits, at most one dot, more digits. Every part may be empty.
static NUMBER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn number_pattern() -> &'static Regex {
    NUMBER_PATTERN.get_or_init(|| {
        // ASCII digits only; `\d` would admit other Unicode digits that f64 parsing refuses
        Regex::new(r"^[0-9]*\.?[0-9]*$").expect("number pattern is a valid regex")
    })
}

/// Normalize comma decimal separators and validate the result.
///
/// Returns `None` when the edit must be rejected.
///
/// ```
/// use kidcal::egfr::sanitize;
///
/// assert_eq!(sanitize("12,5").as_deref(), Some("12.5"));
/// assert_eq!(sanitize("1.2.3"), None);
/// assert_eq!(sanitize("").as_deref(), Some(""));
/// ```
pub fn sanitize(raw_text: &str) -> Option<String> {
    let text = raw_text.replace(',', ".");
    if number_pattern().is_match(&text) {
        Some(text)
    } else {
        None
    }
}

/// Parse sanitized text. Empty text and a lone dot yield NaN.
pub fn parse_number(text: &str) -> f64 {
    text.parse::<f64>().unwrap_or(f64::NAN)
}
