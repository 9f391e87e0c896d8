//! Video and image references from a card's content area.

use scraper::ElementRef;

use super::{content_region, Cascade, ExtractResult};
use crate::dom;

pub const VIDEO_SELECTOR: &str = "video, video source";

/// Whether an `<img>` is post media rather than an avatar or entity photo.
pub fn is_content_image(img: ElementRef<'_>) -> bool {
    if dom::class_contains(img, "avatar") || dom::class_contains(img, "EntityPhoto") {
        return false;
    }
    match img.value().attr("alt") {
        Some(alt) => !alt.is_empty() && !alt.contains("profile"),
        None => true,
    }
}

/// Qualifying content images, in document order.
pub fn content_images(card: ElementRef<'_>) -> ExtractResult<Vec<ElementRef<'_>>> {
    let imgs = dom::select_all(content_region(card), "img")?;
    Ok(imgs.into_iter().filter(|img| is_content_image(*img)).collect())
}

fn usable_src(src: Option<String>) -> Option<String> {
    src.filter(|s| !s.starts_with("data:"))
}

pub fn extract_video_url(card: ElementRef<'_>) -> ExtractResult<String> {
    let region = content_region(card);
    Cascade::new("video")
        .then("video src", move || {
            Ok(dom::select_all(region, VIDEO_SELECTOR)?
                .into_iter()
                .find_map(|el| dom::attr(el, "src")))
        })
        .run()
}

/// First qualifying image. `src` is preferred; lazy images carry the real
/// URL in `data-delayed-url` while `src` holds a data-URI placeholder.
///
/// A data-URI `src` is treated as a placeholder, not as the absence of an
/// image: the same element's `data-delayed-url` is tried before giving up.
/// A data URI itself is never returned.
pub fn extract_image_url(card: ElementRef<'_>) -> ExtractResult<String> {
    let img = content_images(card)?.into_iter().next();
    Cascade::new("image")
        .then("src", move || Ok(img.and_then(|el| usable_src(dom::attr(el, "src")))))
        .then("data-delayed-url", move || {
            Ok(img.and_then(|el| usable_src(dom::attr(el, "data-delayed-url"))))
        })
        .run()
}
