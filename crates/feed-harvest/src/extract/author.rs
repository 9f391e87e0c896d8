//! Author display name.

use regex::Regex;
use scraper::ElementRef;
use std::sync::OnceLock;

use super::{first_text, ExtractResult};
use crate::dom;

/// Actor-title variants, most specific first.
pub const ACTOR_TITLE_SELECTORS: [&str; 4] = [
    "span.update-components-actor__title span[dir='ltr']",
    "span.feed-shared-actor__title span[dir='ltr']",
    "span.update-components-actor__title",
    "span.feed-shared-actor__title",
];

/// Title markup that sits next to a profile link.
const LINKED_TITLE_SELECTOR: &str =
    "span.update-components-actor__title span[dir='ltr'], span.feed-shared-actor__title span[dir='ltr']";

fn badge_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*•\s*.*$").expect("badge regex is valid"))
}

/// Keep the first line of an actor title and drop a trailing `• 1st` style badge.
pub fn clean_actor_title(raw: &str) -> Option<String> {
    let first_line = raw.trim().lines().next()?.trim();
    let name = badge_re().replace(first_line, "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

pub fn extract_author(card: ElementRef<'_>) -> ExtractResult<String> {
    first_text(card, "author", &ACTOR_TITLE_SELECTORS, clean_actor_title)
}

/// Actor title directly under `scope`, used when climbing from a profile link.
pub fn linked_actor_title(scope: ElementRef<'_>) -> Option<String> {
    let el = dom::select_first(scope, LINKED_TITLE_SELECTOR).ok().flatten()?;
    clean_actor_title(&dom::rendered_text(el))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn card(doc: &Html) -> ElementRef<'_> {
        dom::select_first(doc.root_element(), "#card").unwrap().unwrap()
    }

    #[test]
    fn test_clean_strips_badge_and_extra_lines() {
        assert_eq!(clean_actor_title("Jane Doe • 1st").as_deref(), Some("Jane Doe"));
        assert_eq!(
            clean_actor_title("  Jane Doe\nVerified • 2nd").as_deref(),
            Some("Jane Doe")
        );
        assert_eq!(clean_actor_title("• 3rd+"), None);
        assert_eq!(clean_actor_title("   "), None);
    }

    #[test]
    fn test_prefers_ltr_title() {
        let doc = Html::parse_fragment(
            r#"<div id="card">
                <span class="update-components-actor__title">
                    <span dir="ltr"><span aria-hidden="true">Jane Doe</span></span>
                    <span class="supplementary"> • 1st</span>
                </span>
            </div>"#,
        );
        assert_eq!(extract_author(card(&doc)).as_deref(), Ok("Jane Doe"));
    }

    #[test]
    fn test_falls_back_to_legacy_title() {
        let doc = Html::parse_fragment(
            r#"<div id="card">
                <span class="update-components-actor__title"><span dir="ltr">  </span></span>
                <span class="feed-shared-actor__title">John Roe • Following</span>
            </div>"#,
        );
        assert_eq!(extract_author(card(&doc)).as_deref(), Ok("John Roe"));
    }

    #[test]
    fn test_missing_author_is_error() {
        let doc = Html::parse_fragment(r#"<div id="card"><p>no header</p></div>"#);
        assert!(extract_author(card(&doc)).is_err());
    }
}
