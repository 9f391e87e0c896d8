//! Relative post date and activity verb from the actor sub-description.

use regex::Regex;
use scraper::ElementRef;
use std::sync::OnceLock;

use super::{ExtractResult, ExtractionError};
use crate::dom;
use crate::timestamp::normalize_relative_time;
use crate::types::Action;

/// Elements that carry the rendered timestamp.
pub const TIMESTAMP_SELECTOR: &str = "span.update-components-actor__sub-description span.visually-hidden, \
     span.feed-shared-actor__sub-description span.visually-hidden, \
     span.update-components-actor__sub-description, \
     span.feed-shared-actor__sub-description, \
     time";

fn verb_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(reposted|shared|commented|liked)").expect("action verb regex is valid")
    })
}

/// Date and verb found in a card's timestamp text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateAction {
    pub post_date: Option<String>,
    pub verb: Option<Action>,
}

/// Trimmed text of each timestamp-bearing element, in document order.
pub fn timestamp_snippets(card: ElementRef<'_>) -> ExtractResult<Vec<String>> {
    Ok(dom::select_all(card, TIMESTAMP_SELECTOR)?
        .into_iter()
        .map(|el| dom::rendered_text(el).trim().to_string())
        .collect())
}

/// Canonical relative token when one is present, otherwise the first
/// non-empty snippet verbatim.
pub fn post_date(snippets: &[String]) -> ExtractResult<String> {
    let joined = snippets.join(" ");
    if let Some(token) = normalize_relative_time(&joined) {
        return Ok(token);
    }
    snippets
        .iter()
        .find(|s| !s.is_empty())
        .cloned()
        .ok_or(ExtractionError::NotFound("post date"))
}

/// First activity verb in the joined timestamp text.
pub fn action_verb(snippets: &[String]) -> ExtractResult<Action> {
    let joined = snippets.join(" ");
    verb_re()
        .captures(&joined)
        .and_then(|caps| Action::from_verb(&caps[1]))
        .ok_or(ExtractionError::NotFound("action verb"))
}

pub fn extract_date_action(card: ElementRef<'_>) -> DateAction {
    let snippets = match timestamp_snippets(card) {
        Ok(snippets) => snippets,
        Err(e) => {
            tracing::trace!("timestamp text unavailable: {e}");
            return DateAction::default();
        }
    };
    DateAction {
        post_date: post_date(&snippets).ok(),
        verb: action_verb(&snippets).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn date_action(body: &str) -> DateAction {
        let html = format!(r#"<div id="card">{body}</div>"#);
        let doc = Html::parse_fragment(&html);
        let card = dom::select_first(doc.root_element(), "#card").unwrap().unwrap();
        extract_date_action(card)
    }

    #[test]
    fn test_visually_hidden_relative_time() {
        let da = date_action(
            r#"<span class="update-components-actor__sub-description">
                <span aria-hidden="true">4mo • </span>
                <span class="visually-hidden">4 months ago</span>
            </span>"#,
        );
        assert_eq!(da.post_date.as_deref(), Some("4mo"));
        assert_eq!(da.verb, None);
    }

    #[test]
    fn test_verbose_years() {
        let da = date_action(r#"<time>10 years ago</time>"#);
        assert_eq!(da.post_date.as_deref(), Some("10yr"));
    }

    #[test]
    fn test_raw_fallback_and_verb() {
        let da = date_action(
            r#"<span class="feed-shared-actor__sub-description"></span><time>Jane Doe reposted this on Mar 3</time>"#,
        );
        assert_eq!(da.post_date.as_deref(), Some("Jane Doe reposted this on Mar 3"));
        assert_eq!(da.verb, Some(Action::Repost));
    }

    #[test]
    fn test_first_verb_wins() {
        let snippets = vec!["Liked by you".to_string(), "commented".to_string()];
        assert_eq!(action_verb(&snippets), Ok(Action::Liked));
    }

    #[test]
    fn test_nothing_found() {
        let da = date_action("<p>body</p>");
        assert_eq!(da, DateAction::default());
    }
}
