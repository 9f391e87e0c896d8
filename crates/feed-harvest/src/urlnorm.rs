//! Link canonicalization.

use url::{ParseError, Url};

/// Canonical origin used to absolutize site-relative links.
pub const SITE_ORIGIN: &str = "https://www.linkedin.com";

/// Canonicalize a link: absolutize root-relative paths against [`SITE_ORIGIN`]
/// and drop query and fragment.
///
/// Relative links without a scheme (`posts/abc`, `//cdn.host/a.jpg`) keep
/// their path but still lose query and fragment. The path is kept as
/// written, so a bare origin gets no trailing slash. Returns `None` for
/// empty input and the input unchanged when it cannot be parsed at all.
pub fn normalize_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let base = strip_query(raw);

    if raw.starts_with('/') && !raw.starts_with("//") {
        return Some(format!("{SITE_ORIGIN}{base}"));
    }

    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            let mut out = url.to_string();
            if url.path() == "/" && !base.ends_with('/') && out.ends_with('/') {
                out.pop();
            }
            Some(out)
        }
        Err(ParseError::RelativeUrlWithoutBase) => Some(base.to_string()),
        Err(_) => Some(raw.to_string()),
    }
}

/// Everything before the first `?` or `#`.
fn strip_query(raw: &str) -> &str {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    &raw[..end]
}
