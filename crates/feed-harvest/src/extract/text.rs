//! Post body text.

use scraper::ElementRef;

use super::{first_text, ExtractResult};

const BODY_SELECTORS: [&str; 4] = [
    "div.update-components-text",
    "div.feed-shared-inline-show-more-text",
    "div.feed-shared-text",
    "span.break-words",
];

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

pub fn extract_text(card: ElementRef<'_>) -> ExtractResult<String> {
    first_text(card, "post content", &BODY_SELECTORS, non_empty)
}
