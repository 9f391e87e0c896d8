//! Page handle abstraction.
//!
//! Defines the `FeedPage` trait the harvester drives. The live browser
//! implementation lives in the CLI crate; tests drive a scripted in-memory
//! page. Element-level queries run against a parsed snapshot of
//! [`FeedPage::content`] (see [`crate::dom`]).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// Failures of a single page interaction.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PageError {
    #[error("timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("browser error: {0}")]
    Browser(String),
}

impl PageError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PageError::Timeout { .. })
    }
}

/// A navigable, scriptable browser page.
#[async_trait]
pub trait FeedPage: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult, PageError>;
    /// Wait until an element matching `selector` exists, or time out.
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<(), PageError>;
    /// Execute JavaScript in the page context and return the result.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, PageError>;
    /// Get the full outer HTML of the current document.
    async fn content(&self) -> Result<String, PageError>;
}
