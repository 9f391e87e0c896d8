//! Timestamp recovery from activity identifiers and relative-time normalization.
//!
//! Activity identifiers are snowflake-style: the leading 41 bits of the
//! binary representation hold a millisecond Unix epoch. That lets a post's
//! absolute creation time be recovered from its permalink alone, even when
//! the feed only renders "4mo".

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Bits of the identifier that encode the epoch milliseconds.
const EPOCH_BITS: u32 = 41;

/// Decode a snowflake-style identifier into an ISO-8601 UTC timestamp with
/// millisecond precision, e.g. `2023-11-14T22:13:20.000Z`.
pub fn iso_from_activity_id(id: &str) -> Option<String> {
    let id = id.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u128 = id.parse().ok()?;
    let bits = u128::BITS - n.leading_zeros();
    if bits < EPOCH_BITS {
        return None;
    }
    let ms = i64::try_from(n >> (bits - EPOCH_BITS)).ok()?;
    let instant: DateTime<Utc> = DateTime::from_timestamp_millis(ms)?;
    Some(instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

fn activity_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{19})").expect("activity id regex is valid"))
}

/// Find the first 19-digit activity identifier in a URL and decode it.
pub fn iso_from_url(url: &str) -> Option<String> {
    let caps = activity_id_re().captures(url)?;
    iso_from_activity_id(&caps[1])
}

const UNITS: &str = "h|hr|hrs|hour|hours|d|day|days|w|wk|wks|week|weeks|mo|month|months|y|yr|yrs|year|years";

fn compact_relative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)\b(\d+)\s*({UNITS})\b")).expect("relative time regex is valid")
    })
}

fn verbose_relative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)\b(\d+)\s+({UNITS})\s+ago\b"))
            .expect("verbose relative time regex is valid")
    })
}

/// Find a relative-time expression in free text and canonicalize it to
/// `Nh`, `Nd`, `Nw`, `Nmo` or `Nyr`.
///
/// Accepts compact forms ("4mo", "3 d") and verbose ones ("10 years ago").
pub fn normalize_relative_time(text: &str) -> Option<String> {
    let caps = compact_relative_re()
        .captures(text)
        .or_else(|| verbose_relative_re().captures(text))?;
    let amount = &caps[1];
    let suffix = match caps[2].to_ascii_lowercase().as_str() {
        "h" | "hr" | "hrs" | "hour" | "hours" => "h",
        "d" | "day" | "days" => "d",
        "w" | "wk" | "wks" | "week" | "weeks" => "w",
        "mo" | "month" | "months" => "mo",
        _ => "yr",
    };
    Some(format!("{amount}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // (1_700_000_000_000 << 22) + 12345
    const KNOWN_ID: &str = "7130316800000012345";

    #[test]
    fn test_decode_known_identifier() {
        assert_eq!(
            iso_from_activity_id(KNOWN_ID).as_deref(),
            Some("2023-11-14T22:13:20.000Z")
        );
    }

    #[test]
    fn test_decode_keeps_milliseconds() {
        // (1_712_345_678_901 << 22) | 99
        assert_eq!(
            iso_from_activity_id("7182098330397180003").as_deref(),
            Some("2024-04-05T19:34:38.901Z")
        );
    }

    #[test]
    fn test_decode_rejects_short_and_non_numeric() {
        assert_eq!(iso_from_activity_id("12345"), None);
        assert_eq!(iso_from_activity_id(""), None);
        assert_eq!(iso_from_activity_id("71303168000000abcde"), None);
        assert_eq!(iso_from_activity_id("-7130316800000012345"), None);
    }

    #[test]
    fn test_decode_from_url() {
        let url = format!("https://www.linkedin.com/feed/update/urn:li:activity:{KNOWN_ID}/");
        assert_eq!(iso_from_url(&url).as_deref(), Some("2023-11-14T22:13:20.000Z"));
        assert_eq!(iso_from_url("https://www.linkedin.com/in/jdoe"), None);
    }

    #[test]
    fn test_relative_compact_tokens() {
        assert_eq!(normalize_relative_time("4mo").as_deref(), Some("4mo"));
        assert_eq!(normalize_relative_time("5h • Edited").as_deref(), Some("5h"));
        assert_eq!(normalize_relative_time("2w").as_deref(), Some("2w"));
        assert_eq!(normalize_relative_time("3 days").as_deref(), Some("3d"));
        assert_eq!(normalize_relative_time("1yr").as_deref(), Some("1yr"));
    }

    #[test]
    fn test_relative_verbose_form() {
        assert_eq!(normalize_relative_time("10 years ago").as_deref(), Some("10yr"));
        assert_eq!(
            normalize_relative_time("Posted 2 Weeks ago").as_deref(),
            Some("2w")
        );
        assert_eq!(normalize_relative_time("1 month ago").as_deref(), Some("1mo"));
    }

    #[test]
    fn test_relative_absent() {
        assert_eq!(normalize_relative_time("Jane Doe • 1st"), None);
        assert_eq!(normalize_relative_time(""), None);
    }
}
