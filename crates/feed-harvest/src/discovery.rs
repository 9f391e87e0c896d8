//! Card discovery and deduplication.
//!
//! Cards are the top-level feed containers carrying a native activity
//! identifier in `data-urn`. Two cards with the same identifier are the same
//! post rendered twice (virtualized feeds re-materialize items); only the
//! first is kept. Cards without a well-formed identifier cannot be compared
//! and are always kept.

use scraper::{ElementRef, Html};

use crate::dom;
use crate::types::ACTIVITY_URN_PREFIX;

/// Feed-post containers keyed by activity identifier.
pub const PRIMARY_CARD_SELECTOR: &str = "div.feed-shared-update-v2[data-urn^='urn:li:activity:']";

/// Builds that render posts as generic articles.
pub const FALLBACK_CARD_SELECTOR: &str = "[role='article'][data-urn^='urn:li:activity:']";

/// Union of both predicates, used to count materialized cards while scrolling.
pub const CARD_COUNT_SELECTOR: &str = "div.feed-shared-update-v2[data-urn^='urn:li:activity:'], [role='article'][data-urn^='urn:li:activity:']";

/// Looser predicate for the degraded wait when the feed is slow to render.
pub const GENERIC_CARD_SELECTOR: &str = "div.feed-shared-update-v2, article";

/// A discovered card that survived deduplication.
#[derive(Debug, Clone)]
pub struct Card<'a> {
    pub element: ElementRef<'a>,
    /// Well-formed native identifier, if the card has one.
    pub urn: Option<String>,
}

/// Cards found in one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Discovery<'a> {
    pub cards: Vec<Card<'a>>,
    /// Matches before deduplication.
    pub seen: usize,
    pub duplicates_dropped: usize,
}

/// Well-formed activity identifier of a card.
pub fn card_urn(card: ElementRef<'_>) -> Option<String> {
    dom::attr(card, "data-urn").filter(|urn| urn.starts_with(ACTIVITY_URN_PREFIX))
}

/// Match the primary predicate, falling back to the article predicate when
/// the primary one finds nothing.
pub fn find_cards(doc: &Html) -> Vec<ElementRef<'_>> {
    let root = doc.root_element();
    let primary = dom::select_all(root, PRIMARY_CARD_SELECTOR).unwrap_or_default();
    if !primary.is_empty() {
        return primary;
    }
    tracing::debug!("no primary feed cards, trying article fallback");
    dom::select_all(root, FALLBACK_CARD_SELECTOR).unwrap_or_default()
}

/// Keep the first item per key. Items without a key are always kept.
/// Returns the survivors and how many were dropped.
pub fn dedupe_by_key<T, F>(items: Vec<T>, key: F) -> (Vec<T>, usize)
where
    F: Fn(&T) -> Option<String>,
{
    let mut seen = std::collections::HashSet::new();
    let mut kept = Vec::with_capacity(items.len());
    let mut dropped = 0;
    for item in items {
        if let Some(k) = key(&item) {
            if !seen.insert(k) {
                dropped += 1;
                continue;
            }
        }
        kept.push(item);
    }
    (kept, dropped)
}

/// Find and deduplicate the cards of a snapshot.
pub fn discover(doc: &Html) -> Discovery<'_> {
    let found: Vec<Card<'_>> = find_cards(doc)
        .into_iter()
        .map(|element| Card {
            urn: card_urn(element),
            element,
        })
        .collect();
    let seen = found.len();
    let (cards, duplicates_dropped) = dedupe_by_key(found, |card| card.urn.clone());
    Discovery {
        cards,
        seen,
        duplicates_dropped,
    }
}
