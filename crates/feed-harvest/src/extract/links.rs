//! Permalink, author, shared-post and shared-job links.

use regex::Regex;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::{content_region, Cascade, ExtractResult, ExtractionError};
use crate::dom;
use crate::urlnorm::{normalize_url, SITE_ORIGIN};

/// Candidate permalinks, gathered in document order.
pub const PERMALINK_SELECTOR: &str = "a[href*='/posts/'], \
     a[href*='/feed/update/urn:li:activity:'], \
     a[href*='/activity/'], \
     a[href*='activity-'], \
     a[href*='/feed/update/']";

pub const PROFILE_LINK_SELECTOR: &str = "a[href*='/in/']";
const ARTICLE_LINK_SELECTOR: &str = "a[href*='/pulse/'], a[href*='/articles/']";
const EXTERNAL_LINK_SELECTOR: &str = "a[href^='http']";
const JOB_LINK_SELECTOR: &str = "a[href*='/jobs/view/']";

/// On-site links that are never a shared post.
const NON_SHARE_MARKERS: [&str; 3] = ["linkedin.com/in/", "linkedin.com/company/", "linkedin.com/jobs/view/"];

fn urn_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"urn:li:activity:(\d+)").expect("urn regex is valid"))
}

/// All links of one card, normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLinks {
    pub post_url: Option<String>,
    pub author_url: Option<String>,
    pub shared_post_url: Option<String>,
    pub shared_job_url: Option<String>,
}

fn hrefs(scope: ElementRef<'_>, css: &str) -> ExtractResult<Vec<String>> {
    Ok(dom::select_all(scope, css)?
        .into_iter()
        .filter_map(|a| dom::attr(a, "href"))
        .collect())
}

/// Canonical permalink of a card.
///
/// Prefers `/posts/...-activity-<id>-...` permalinks, then any activity or
/// feed-update link, and finally builds a feed-update URL from the card's
/// own activity identifier.
pub fn post_url(card: ElementRef<'_>) -> ExtractResult<String> {
    let candidates = hrefs(card, PERMALINK_SELECTOR)?;
    let ranked = candidates.clone();
    Cascade::new("post url")
        .then("posts permalink", move || {
            Ok(ranked
                .into_iter()
                .find(|h| h.contains("/posts/") && h.contains("-activity-")))
        })
        .then("activity link", move || {
            Ok(candidates
                .into_iter()
                .find(|h| h.contains("activity") || h.contains("/feed/update/")))
        })
        .then("synthesized from urn", move || {
            Ok(dom::attr(card, "data-urn").and_then(|urn| {
                urn_id_re()
                    .captures(&urn)
                    .map(|caps| format!("{SITE_ORIGIN}/feed/update/urn:li:activity:{}/", &caps[1]))
            }))
        })
        .run()
        .and_then(|href| normalized("post url", &href))
}

/// First profile link of the card, before reshare resolution.
pub fn author_url(card: ElementRef<'_>) -> ExtractResult<String> {
    let href = dom::select_first(card, PROFILE_LINK_SELECTOR)?
        .and_then(|a| dom::attr(a, "href"))
        .ok_or(ExtractionError::NotFound("author url"))?;
    normalized("author url", &href)
}

/// Shared article or external link in the content area.
///
/// Long-form article links win; otherwise the first absolute link that is
/// not a profile, company or job page and not the card's own permalink.
pub fn shared_post_url(card: ElementRef<'_>, own_post_url: Option<&str>) -> ExtractResult<String> {
    let region = content_region(card);
    Cascade::new("shared post url")
        .then("article link", move || {
            Ok(hrefs(region, ARTICLE_LINK_SELECTOR)?.into_iter().next())
        })
        .then("external link", move || {
            Ok(hrefs(region, EXTERNAL_LINK_SELECTOR)?.into_iter().find(|href| {
                !NON_SHARE_MARKERS.iter().any(|m| href.contains(m))
                    && normalize_url(href).as_deref() != own_post_url
            }))
        })
        .run()
        .and_then(|href| normalized("shared post url", &href))
}

pub fn shared_job_url(card: ElementRef<'_>) -> ExtractResult<String> {
    let href = hrefs(card, JOB_LINK_SELECTOR)?
        .into_iter()
        .next()
        .ok_or(ExtractionError::NotFound("shared job url"))?;
    normalized("shared job url", &href)
}

/// Distinct normalized profile links in document order.
pub fn profile_links(card: ElementRef<'_>) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for href in hrefs(card, PROFILE_LINK_SELECTOR).unwrap_or_default() {
        if let Some(url) = normalize_url(&href) {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }
    urls
}

fn normalized(field: &'static str, href: &str) -> ExtractResult<String> {
    normalize_url(href).ok_or(ExtractionError::NotFound(field))
}

pub fn extract_links(card: ElementRef<'_>) -> CardLinks {
    let post_url = post_url(card).ok();
    let shared_post_url = shared_post_url(card, post_url.as_deref()).ok();
    CardLinks {
        author_url: author_url(card).ok(),
        shared_job_url: shared_job_url(card).ok(),
        post_url,
        shared_post_url,
    }
}
