//! Human-readable magnitude parsing ("1.2k", "3M", "1,234").

use regex::Regex;
use std::sync::OnceLock;

fn magnitude_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]*\.?[0-9]+)\s*([kmb]?)$").expect("magnitude regex is valid")
    })
}

/// Parse a count as rendered in the feed into an integer.
///
/// Thousands separators are stripped and a `k`/`m`/`b` suffix (any case)
/// scales the value; fractional results are truncated. Returns `None` for
/// empty or unparseable text.
pub fn parse_magnitude(text: &str) -> Option<u64> {
    let cleaned = text.trim().to_ascii_lowercase().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    let Some(caps) = magnitude_re().captures(&cleaned) else {
        return cleaned.parse::<u64>().ok();
    };

    let value: f64 = caps[1].parse().ok()?;
    let scale = match &caps[2] {
        "k" => 1e3,
        "m" => 1e6,
        "b" => 1e9,
        _ => 1.0,
    };
    let scaled = value * scale;
    if !scaled.is_finite() || scaled < 0.0 || scaled > u64::MAX as f64 {
        return None;
    }
    Some(scaled.trunc() as u64)
}
