//! Core data types for harvested posts and harvest targets.

use serde::{Deserialize, Serialize};

use crate::urlnorm::SITE_ORIGIN;

/// Prefix carried by every well-formed native activity identifier.
pub const ACTIVITY_URN_PREFIX: &str = "urn:li:activity:";

/// One harvested feed post. Built once per deduplicated card and never mutated after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub post_url: Option<String>,
    pub shared_job_url: Option<String>,
    pub img_url: Option<String>,
    pub post_content: Option<String>,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub repost_count: Option<u64>,
    pub view_count: Option<u64>,
    pub post_date: Option<String>,
    pub action: Action,
    pub author: Option<String>,
    pub author_url: Option<String>,
    pub profile_url: String,
    pub post_timestamp: Option<String>,
    pub video_url: Option<String>,
    pub shared_post_url: Option<String>,
}

/// Content classification, checked in priority order video > article > image > text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Video,
    Article,
    Image,
    Text,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Video => "video",
            PostType::Article => "article",
            PostType::Image => "image",
            PostType::Text => "text",
        }
    }
}

/// What the harvested target did with the post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Post,
    Repost,
    Commented,
    Liked,
}

impl Action {
    /// Map an activity verb as rendered in the feed ("reposted", "shared", ...).
    pub fn from_verb(verb: &str) -> Option<Self> {
        match verb.to_ascii_lowercase().as_str() {
            "reposted" | "shared" => Some(Action::Repost),
            "commented" => Some(Action::Commented),
            "liked" => Some(Action::Liked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Post => "post",
            Action::Repost => "repost",
            Action::Commented => "commented",
            Action::Liked => "liked",
        }
    }
}

/// The profile whose activity feed is harvested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    handle: String,
}

impl Target {
    /// Validate a profile handle. Fails before any page interaction happens.
    pub fn new(handle: &str) -> HarvestResult<Self> {
        let handle = handle.trim().trim_matches('/');
        if handle.is_empty() {
            return Err(HarvestError::Config("target handle is empty".to_string()));
        }
        if handle
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
        {
            return Err(HarvestError::Config(format!(
                "invalid target handle: {handle:?}"
            )));
        }
        Ok(Self {
            handle: handle.to_string(),
        })
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// The activity feed listing every post the target interacted with.
    pub fn feed_url(&self) -> String {
        format!("{SITE_ORIGIN}/in/{}/recent-activity/all/", self.handle)
    }

    /// The target's own profile URL, constant for the whole run.
    pub fn profile_url(&self) -> String {
        format!("{SITE_ORIGIN}/in/{}", self.handle)
    }

    /// Whether a normalized profile URL points at this target.
    pub fn owns_profile(&self, url: &str) -> bool {
        let own = self.profile_url().to_ascii_lowercase();
        let url = url.to_ascii_lowercase();
        url == own || url.starts_with(&format!("{own}/"))
    }
}

/// Errors that can end a harvest run.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Navigation failed: {0}")]
    Navigation(#[from] crate::page::PageError),

    #[error("Sink error: {0}")]
    Sink(String),
}

/// Convenience result type.
pub type HarvestResult<T> = Result<T, HarvestError>;
