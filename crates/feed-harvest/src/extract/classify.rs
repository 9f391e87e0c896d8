//! Post type classification: video > article > image > text.

use scraper::ElementRef;

use super::{content_region, media, ExtractResult};
use crate::dom;
use crate::types::PostType;

/// Links to long-form articles and the article preview component.
pub const ARTICLE_SELECTOR: &str = "a[href*='/pulse/'], a[href*='/articles/'], div.update-components-article, article.update-components-article";

pub fn try_classify(card: ElementRef<'_>) -> ExtractResult<PostType> {
    let region = content_region(card);
    if dom::select_first(region, media::VIDEO_SELECTOR)?.is_some() {
        return Ok(PostType::Video);
    }
    if dom::select_first(region, ARTICLE_SELECTOR)?.is_some() {
        return Ok(PostType::Article);
    }
    if !media::content_images(card)?.is_empty() {
        return Ok(PostType::Image);
    }
    Ok(PostType::Text)
}

/// Exactly one type per card; anything unclassifiable is text.
pub fn classify(card: ElementRef<'_>) -> PostType {
    try_classify(card).unwrap_or(PostType::Text)
}
