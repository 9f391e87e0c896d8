//! Scroll convergence: force a lazy-loaded feed to materialize all its cards.
//!
//! Each round scrolls forward, waits out the debounce, and counts the cards
//! currently in the DOM. Rounds in which the count does not grow are idle;
//! the loop stops after `max_idle_rounds` consecutive idle rounds or after
//! `max_rounds` rounds in total. Every `backward_every` rounds the viewport
//! is nudged back up, because some lazy loaders only fire on a direction
//! change. Script failures never abort the loop: the round just counts as idle.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ScrollConfig;
use crate::discovery::CARD_COUNT_SELECTOR;
use crate::page::FeedPage;

/// Why the scroll loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The idle-round threshold was reached.
    Converged,
    /// The hard round cap was reached first.
    RoundCap,
}

/// Summary of one convergence run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollOutcome {
    pub rounds: u32,
    pub idle_rounds: u32,
    /// Highest card count observed.
    pub final_count: u64,
    pub stop: StopReason,
}

fn scroll_script(fraction: f64) -> String {
    format!(
        "(() => {{ window.scrollBy(0, Math.floor(window.innerHeight * {fraction})); return window.scrollY; }})()"
    )
}

fn count_script() -> String {
    let selector = serde_json::to_string(CARD_COUNT_SELECTOR).unwrap_or_default();
    format!("document.querySelectorAll({selector}).length")
}

async fn count_cards(page: &dyn FeedPage, script: &str) -> Option<u64> {
    match page.evaluate(script).await {
        Ok(value) => value.as_u64(),
        Err(e) => {
            tracing::debug!("card count failed: {e}");
            None
        }
    }
}

/// Scroll until the card count stops growing or the round cap is hit.
pub async fn converge(page: &dyn FeedPage, config: &ScrollConfig) -> ScrollOutcome {
    let forward = scroll_script(config.forward_fraction);
    let backward = scroll_script(-config.backward_fraction);
    let counter = count_script();
    let pause = Duration::from_millis(config.pause_ms);

    let mut best: Option<u64> = None;
    let mut idle_rounds = 0u32;
    let mut rounds = 0u32;

    while idle_rounds < config.max_idle_rounds && rounds < config.max_rounds {
        rounds += 1;

        if let Err(e) = page.evaluate(&forward).await {
            tracing::debug!("scroll round {rounds}: forward scroll failed: {e}");
        }
        tokio::time::sleep(pause).await;

        match count_cards(page, &counter).await {
            Some(current) if best.map_or(true, |b| current > b) => {
                idle_rounds = 0;
                best = Some(current);
            }
            _ => idle_rounds += 1,
        }
        tracing::debug!(
            "scroll round {rounds}: cards={}, idle={idle_rounds}",
            best.unwrap_or(0)
        );

        if config.backward_every > 0 && rounds % config.backward_every == 0 {
            if let Err(e) = page.evaluate(&backward).await {
                tracing::debug!("scroll round {rounds}: backward nudge failed: {e}");
            }
        }
    }

    let stop = if idle_rounds >= config.max_idle_rounds {
        StopReason::Converged
    } else {
        StopReason::RoundCap
    };

    ScrollOutcome {
        rounds,
        idle_rounds,
        final_count: best.unwrap_or(0),
        stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{NavigationResult, PageError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Page whose card count follows a fixed sequence (last value repeats).
    struct CountingPage {
        counts: Vec<Result<u64, PageError>>,
        calls: Mutex<usize>,
        scrolls: Mutex<Vec<String>>,
    }

    impl CountingPage {
        fn new(counts: Vec<Result<u64, PageError>>) -> Self {
            Self {
                counts,
                calls: Mutex::new(0),
                scrolls: Mutex::new(Vec::new()),
            }
        }

        fn backward_scrolls(&self) -> usize {
            self.scrolls
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.contains("* -"))
                .count()
        }
    }

    #[async_trait]
    impl FeedPage for CountingPage {
        async fn navigate(&mut self, url: &str, _: u64) -> Result<NavigationResult, PageError> {
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 0,
            })
        }

        async fn wait_for_selector(&self, _: &str, _: u64) -> Result<(), PageError> {
            Ok(())
        }

        async fn evaluate(&self, script: &str) -> Result<serde_json::Value, PageError> {
            if script.contains("querySelectorAll") {
                let mut calls = self.calls.lock().unwrap();
                let idx = (*calls).min(self.counts.len() - 1);
                *calls += 1;
                return self.counts[idx].clone().map(serde_json::Value::from);
            }
            self.scrolls.lock().unwrap().push(script.to_string());
            Ok(serde_json::Value::from(0))
        }

        async fn content(&self) -> Result<String, PageError> {
            Ok(String::new())
        }
    }

    fn fast(max_idle_rounds: u32, max_rounds: u32) -> ScrollConfig {
        ScrollConfig {
            pause_ms: 0,
            max_idle_rounds,
            max_rounds,
            ..ScrollConfig::default()
        }
    }

    #[tokio::test]
    async fn test_converges_after_idle_threshold() {
        let page = CountingPage::new(vec![Ok(5), Ok(10), Ok(12)]);
        let outcome = converge(&page, &fast(8, 500)).await;
        assert_eq!(outcome.stop, StopReason::Converged);
        // 3 growing rounds, then 8 idle ones
        assert_eq!(outcome.rounds, 11);
        assert_eq!(outcome.idle_rounds, 8);
        assert_eq!(outcome.final_count, 12);
    }

    #[tokio::test]
    async fn test_round_cap_bounds_endless_growth() {
        let counts = (1..=1000).map(Ok).collect();
        let page = CountingPage::new(counts);
        let outcome = converge(&page, &fast(8, 25)).await;
        assert_eq!(outcome.stop, StopReason::RoundCap);
        assert_eq!(outcome.rounds, 25);
        assert_eq!(outcome.final_count, 25);
    }

    #[tokio::test]
    async fn test_fluctuating_counts_never_exceed_cap() {
        let counts = (0..1000).map(|i| Ok(if i % 2 == 0 { 5 } else { 4 })).collect();
        let page = CountingPage::new(counts);
        let outcome = converge(&page, &fast(3, 50)).await;
        assert!(outcome.rounds <= 50);
        assert_eq!(outcome.stop, StopReason::Converged);
        assert_eq!(outcome.final_count, 5);
    }

    #[tokio::test]
    async fn test_script_failures_count_as_idle() {
        let page = CountingPage::new(vec![
            Ok(3),
            Err(PageError::Script("boom".into())),
            Ok(7),
            Err(PageError::Script("boom".into())),
        ]);
        let outcome = converge(&page, &fast(2, 500)).await;
        // 3, err(idle 1), 7 (reset), err, err
        assert_eq!(outcome.rounds, 5);
        assert_eq!(outcome.final_count, 7);
        assert_eq!(outcome.stop, StopReason::Converged);
    }

    #[tokio::test]
    async fn test_backward_nudge_every_tenth_round() {
        let counts = (1..=100).map(Ok).collect();
        let page = CountingPage::new(counts);
        let outcome = converge(&page, &fast(8, 30)).await;
        assert_eq!(outcome.rounds, 30);
        assert_eq!(page.backward_scrolls(), 3);
    }
}
