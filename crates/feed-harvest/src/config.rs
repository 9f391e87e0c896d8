//! Run configuration, passed explicitly into the harvester.

use serde::{Deserialize, Serialize};

use crate::resolve::DEFAULT_AUTHOR_SEARCH_DEPTH;
use crate::types::{HarvestError, HarvestResult};

/// Settings for one harvest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Timeout for loading the feed URL.
    pub navigation_timeout_ms: u64,
    /// Timeout for each bounded wait for cards to appear.
    pub wait_timeout_ms: u64,
    /// Pause after the feed has appeared, before scrolling starts.
    pub settle_ms: u64,
    /// How many ancestors to climb from a profile link looking for an actor title.
    pub author_search_depth: usize,
    /// Keep each card's outer HTML in the report.
    pub capture_card_html: bool,
    pub scroll: ScrollConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 60_000,
            wait_timeout_ms: 60_000,
            settle_ms: 1_000,
            author_search_depth: DEFAULT_AUTHOR_SEARCH_DEPTH,
            capture_card_html: false,
            scroll: ScrollConfig::default(),
        }
    }
}

impl HarvestConfig {
    pub fn validate(&self) -> HarvestResult<()> {
        self.scroll.validate()
    }
}

/// Scroll convergence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Forward step as a fraction of the viewport height.
    pub forward_fraction: f64,
    /// Backward nudge as a fraction of the viewport height.
    pub backward_fraction: f64,
    /// Nudge backward every this many rounds.
    pub backward_every: u32,
    /// Debounce after each forward step.
    pub pause_ms: u64,
    /// Consecutive non-growing rounds before the feed counts as converged.
    pub max_idle_rounds: u32,
    /// Hard cap on rounds regardless of growth.
    pub max_rounds: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            forward_fraction: 0.9,
            backward_fraction: 0.3,
            backward_every: 10,
            pause_ms: 1_200,
            max_idle_rounds: 8,
            max_rounds: 500,
        }
    }
}

impl ScrollConfig {
    pub fn validate(&self) -> HarvestResult<()> {
        if !(self.forward_fraction > 0.0 && self.forward_fraction.is_finite()) {
            return Err(HarvestError::Config(format!(
                "scroll.forward_fraction must be positive, got {}",
                self.forward_fraction
            )));
        }
        if !(self.backward_fraction >= 0.0 && self.backward_fraction.is_finite()) {
            return Err(HarvestError::Config(format!(
                "scroll.backward_fraction must not be negative, got {}",
                self.backward_fraction
            )));
        }
        if self.max_rounds == 0 {
            return Err(HarvestError::Config("scroll.max_rounds must be at least 1".into()));
        }
        if self.max_idle_rounds == 0 {
            return Err(HarvestError::Config(
                "scroll.max_idle_rounds must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
