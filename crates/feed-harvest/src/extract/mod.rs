//! Field extractors.
//!
//! Each extractor reads one card and derives one facet of a [`PostRecord`].
//! Markup varies between rendering variants, so most extractors are a
//! [`Cascade`] of strategies tried in order. Extractors return
//! [`ExtractResult`]; the harvester turns any error into an absent field,
//! so one failing extractor never affects another.
//!
//! [`PostRecord`]: crate::types::PostRecord

pub mod author;
pub mod classify;
pub mod counts;
pub mod date;
pub mod links;
pub mod media;
pub mod text;

use scraper::ElementRef;

use crate::dom;

/// Why a field could not be extracted.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid selector {0}")]
    Selector(String),

    #[error("cannot parse {field} from {input:?}")]
    Parse { field: &'static str, input: String },
}

pub type ExtractResult<T> = Result<T, ExtractionError>;

type Strategy<'s, T> = Box<dyn FnOnce() -> ExtractResult<Option<T>> + 's>;

/// Ordered strategies for one field; the first one producing a value wins.
///
/// A strategy answers `Ok(None)` when its markup is absent. Errors are
/// logged and the next strategy runs.
pub struct Cascade<'s, T> {
    field: &'static str,
    steps: Vec<(&'static str, Strategy<'s, T>)>,
}

impl<'s, T> Cascade<'s, T> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            steps: Vec::new(),
        }
    }

    pub fn then<F>(mut self, label: &'static str, step: F) -> Self
    where
        F: FnOnce() -> ExtractResult<Option<T>> + 's,
    {
        self.steps.push((label, Box::new(step)));
        self
    }

    pub fn run(self) -> ExtractResult<T> {
        for (label, step) in self.steps {
            match step() {
                Ok(Some(value)) => {
                    tracing::trace!("{}: matched {label}", self.field);
                    return Ok(value);
                }
                Ok(None) => {}
                Err(e) => tracing::debug!("{}: strategy {label} failed: {e}", self.field),
            }
        }
        Err(ExtractionError::NotFound(self.field))
    }
}

/// Text of the first selector whose element yields a value after `clean`.
pub fn first_text<'a>(
    scope: ElementRef<'a>,
    field: &'static str,
    selectors: &[&'static str],
    clean: fn(&str) -> Option<String>,
) -> ExtractResult<String> {
    selectors
        .iter()
        .fold(Cascade::new(field), |cascade, &css| {
            cascade.then(css, move || {
                Ok(dom::select_first(scope, css)?.and_then(|el| clean(&dom::rendered_text(el))))
            })
        })
        .run()
}

/// Content area of a card: the post body without header and avatar.
/// Falls back to the whole card.
pub fn content_region(card: ElementRef<'_>) -> ElementRef<'_> {
    const CONTENT_SELECTORS: [&str; 2] = [
        "div.feed-shared-update-v2__content",
        "div.update-components-entity__content-wrapper",
    ];
    CONTENT_SELECTORS
        .iter()
        .find_map(|css| dom::select_first(card, css).ok().flatten())
        .unwrap_or(card)
}
