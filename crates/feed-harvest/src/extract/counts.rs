//! Engagement counts: likes, comments, reposts, views.
//!
//! Likes have structured sources (an accessible label on the reactions
//! button, a dedicated counter); everything else is only available as free
//! text, so the card's rendered text is scanned for `<N> comments` etc.
//! Absence is kept distinct from zero.

use regex::Regex;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::{Cascade, ExtractResult, ExtractionError};
use crate::dom;
use crate::numeric::parse_magnitude;

const REACTIONS_BUTTON_SELECTOR: &str =
    "li.social-details-social-counts__reactions button[aria-label]";
const REACTIONS_COUNT_SELECTOR: &str = "span.social-details-social-counts__reactions-count";

/// Number as rendered: digits with separators and an optional magnitude suffix.
const NUMBER: &str = r"([0-9][\d,\.]*\s*[kmb]?)";

fn reactions_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i){NUMBER}\s+reactions?")).expect("reactions label regex is valid")
    })
}

fn likes_text_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"{NUMBER}\s+(?:likes|reactions?)\b")).expect("likes regex is valid")
    })
}

fn comments_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"{NUMBER}\s+comments?\b")).expect("comments regex is valid")
    })
}

fn reposts_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"{NUMBER}\s+reposts?\b")).expect("reposts regex is valid")
    })
}

fn views_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"{NUMBER}\s+views?\b")).expect("views regex is valid"))
}

/// Engagement counts of one card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounts {
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub reposts: Option<u64>,
    pub views: Option<u64>,
}

fn number(field: &'static str, raw: &str) -> ExtractResult<u64> {
    parse_magnitude(raw).ok_or_else(|| ExtractionError::Parse {
        field,
        input: raw.to_string(),
    })
}

/// Scan lowercased card text with one count pattern.
fn count_in_text(field: &'static str, re: &Regex, text: &str) -> ExtractResult<u64> {
    let caps = re.captures(text).ok_or(ExtractionError::NotFound(field))?;
    number(field, &caps[1])
}

pub fn like_count(card: ElementRef<'_>, text: &str) -> ExtractResult<u64> {
    Cascade::new("like count")
        .then("reactions label", move || {
            let Some(button) = dom::select_first(card, REACTIONS_BUTTON_SELECTOR)? else {
                return Ok(None);
            };
            let label = dom::attr(button, "aria-label").unwrap_or_default();
            match reactions_label_re().captures(&label) {
                Some(caps) => number("like count", &caps[1]).map(Some),
                None => Ok(None),
            }
        })
        .then("reactions counter", move || {
            match dom::select_first(card, REACTIONS_COUNT_SELECTOR)? {
                Some(span) => number("like count", &dom::rendered_text(span)).map(Some),
                None => Ok(None),
            }
        })
        .then("text pattern", move || {
            Ok(count_in_text("like count", likes_text_re(), text).ok())
        })
        .run()
}

pub fn comment_count(text: &str) -> ExtractResult<u64> {
    count_in_text("comment count", comments_re(), text)
}

pub fn repost_count(text: &str) -> ExtractResult<u64> {
    count_in_text("repost count", reposts_re(), text)
}

pub fn view_count(text: &str) -> ExtractResult<u64> {
    count_in_text("view count", views_re(), text)
}

/// All four counts; each one independently absent.
pub fn extract_counts(card: ElementRef<'_>) -> EngagementCounts {
    let text = dom::rendered_text(card).to_lowercase();
    EngagementCounts {
        likes: like_count(card, &text).ok(),
        comments: comment_count(&text).ok(),
        reposts: repost_count(&text).ok(),
        views: view_count(&text).ok(),
    }
}
