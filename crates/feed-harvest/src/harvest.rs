//! Harvest orchestrator: open the feed, converge, discover, extract, resolve.
//!
//! Page interaction happens first and entirely through [`FeedPage`]. Once
//! scrolling has converged a single HTML snapshot is taken, and everything
//! after that is synchronous work over the parsed snapshot.

use scraper::{ElementRef, Html};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use crate::config::HarvestConfig;
use crate::discovery::{self, CARD_COUNT_SELECTOR, GENERIC_CARD_SELECTOR};
use crate::extract::author::extract_author;
use crate::extract::classify::classify;
use crate::extract::counts::extract_counts;
use crate::extract::date::extract_date_action;
use crate::extract::links::extract_links;
use crate::extract::media::{extract_image_url, extract_video_url};
use crate::extract::text::extract_text;
use crate::extract::ExtractResult;
use crate::page::FeedPage;
use crate::resolve::Resolution;
use crate::scroll::{self, ScrollOutcome};
use crate::timestamp::iso_from_url;
use crate::types::{HarvestResult, PostRecord, Target};

/// Everything one target's harvest produced.
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub target: Target,
    /// One record per deduplicated card, in document order.
    pub records: Vec<PostRecord>,
    pub scroll: ScrollOutcome,
    /// Cards matched before deduplication.
    pub cards_seen: usize,
    pub duplicates_dropped: usize,
    /// Outer HTML of each deduplicated card, when capture is enabled.
    pub card_html: Vec<String>,
}

/// Records and card statistics from one snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotExtraction {
    pub records: Vec<PostRecord>,
    pub cards_seen: usize,
    pub duplicates_dropped: usize,
    pub card_html: Vec<String>,
}

/// Destination for the finished records of a target.
pub trait RecordSink {
    fn accept(&mut self, target: &Target, records: &[PostRecord]) -> HarvestResult<()>;
}

/// Sink that keeps every batch in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub batches: Vec<(Target, Vec<PostRecord>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records_for(&self, handle: &str) -> Option<&[PostRecord]> {
        self.batches
            .iter()
            .find(|(target, _)| target.handle() == handle)
            .map(|(_, records)| records.as_slice())
    }
}

impl RecordSink for MemorySink {
    fn accept(&mut self, target: &Target, records: &[PostRecord]) -> HarvestResult<()> {
        self.batches.push((target.clone(), records.to_vec()));
        Ok(())
    }
}

/// Drives one page through the harvest of one or more targets.
pub struct Harvester {
    config: HarvestConfig,
}

impl Harvester {
    pub fn new(config: HarvestConfig) -> HarvestResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Validate `handle`, then harvest it. An invalid handle fails before
    /// the page is touched.
    pub async fn harvest_handle(
        &self,
        page: &mut dyn FeedPage,
        handle: &str,
    ) -> HarvestResult<HarvestReport> {
        let target = Target::new(handle)?;
        self.harvest(page, &target).await
    }

    /// Load the target's feed and wait for cards to show up.
    ///
    /// A navigation timeout is tolerated, as are both bounded waits; only a
    /// hard navigation failure is returned.
    pub async fn open_feed(&self, page: &mut dyn FeedPage, target: &Target) -> HarvestResult<()> {
        let url = target.feed_url();
        match page.navigate(&url, self.config.navigation_timeout_ms).await {
            Ok(nav) => debug!("loaded {} in {}ms", nav.final_url, nav.load_time_ms),
            Err(e) if e.is_timeout() => warn!("navigation to {url} timed out, continuing"),
            Err(e) => return Err(e.into()),
        }

        let wait = self.config.wait_timeout_ms;
        if let Err(e) = page.wait_for_selector(CARD_COUNT_SELECTOR, wait).await {
            warn!("feed cards did not appear ({e}), waiting for generic cards");
            if let Err(e) = page.wait_for_selector(GENERIC_CARD_SELECTOR, wait).await {
                warn!("generic cards did not appear either ({e}), continuing");
            }
        }

        tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;
        Ok(())
    }

    pub async fn harvest(
        &self,
        page: &mut dyn FeedPage,
        target: &Target,
    ) -> HarvestResult<HarvestReport> {
        let start = Instant::now();
        info!("harvesting {}", target.feed_url());

        self.open_feed(page, target).await?;
        let scroll = scroll::converge(&*page, &self.config.scroll).await;
        debug!(
            "scrolling stopped after {} rounds ({:?}), {} cards materialized",
            scroll.rounds, scroll.stop, scroll.final_count
        );

        let extraction = match page.content().await {
            Ok(html) => extract_records(&html, target, &self.config),
            Err(e) => {
                warn!("could not snapshot {}: {e}", target.handle());
                SnapshotExtraction::default()
            }
        };

        info!(
            "{}: {} cards, {} duplicates, {} records in {:.1}s",
            target.handle(),
            extraction.cards_seen,
            extraction.duplicates_dropped,
            extraction.records.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(HarvestReport {
            target: target.clone(),
            records: extraction.records,
            scroll,
            cards_seen: extraction.cards_seen,
            duplicates_dropped: extraction.duplicates_dropped,
            card_html: extraction.card_html,
        })
    }

    /// Harvest and hand the records to `sink`.
    pub async fn harvest_into(
        &self,
        page: &mut dyn FeedPage,
        target: &Target,
        sink: &mut dyn RecordSink,
    ) -> HarvestResult<HarvestReport> {
        let report = self.harvest(page, target).await?;
        sink.accept(&report.target, &report.records)?;
        Ok(report)
    }
}

/// Discover, deduplicate and extract every card of an HTML snapshot.
pub fn extract_records(html: &str, target: &Target, config: &HarvestConfig) -> SnapshotExtraction {
    let doc = Html::parse_document(html);
    let found = discovery::discover(&doc);
    let records = found
        .cards
        .iter()
        .map(|card| extract_record(card.element, target, config.author_search_depth))
        .collect();
    let card_html = if config.capture_card_html {
        found.cards.iter().map(|card| card.element.html()).collect()
    } else {
        Vec::new()
    };
    SnapshotExtraction {
        records,
        cards_seen: found.seen,
        duplicates_dropped: found.duplicates_dropped,
        card_html,
    }
}

fn field<T>(name: &str, result: ExtractResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            trace!("{name}: {e}");
            None
        }
    }
}

/// Run every extractor over one card and resolve action and authorship.
pub fn extract_record(card: ElementRef<'_>, target: &Target, author_search_depth: usize) -> PostRecord {
    let links = extract_links(card);
    let counts = extract_counts(card);
    let date = extract_date_action(card);

    let resolution = Resolution::baseline(
        date.verb,
        links.shared_post_url.is_some(),
        field("author", extract_author(card)),
        links.author_url.clone(),
    )
    .resolve(card, target, author_search_depth);

    PostRecord {
        post_timestamp: links.post_url.as_deref().and_then(iso_from_url),
        post_url: links.post_url,
        shared_job_url: links.shared_job_url,
        img_url: field("image", extract_image_url(card)),
        post_content: field("text", extract_text(card)),
        post_type: classify(card),
        like_count: counts.likes,
        comment_count: counts.comments,
        repost_count: counts.reposts,
        view_count: counts.views,
        post_date: date.post_date,
        action: resolution.action,
        author: resolution.author,
        author_url: resolution.author_url,
        profile_url: target.profile_url(),
        video_url: field("video", extract_video_url(card)),
        shared_post_url: links.shared_post_url,
    }
}
