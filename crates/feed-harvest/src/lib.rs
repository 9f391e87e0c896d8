//! FeedHarvest: structured post records from lazy-loaded activity feeds.

pub mod config;
pub mod discovery;
pub mod dom;
pub mod extract;
pub mod harvest;
pub mod numeric;
pub mod page;
pub mod resolve;
pub mod scroll;
pub mod timestamp;
pub mod types;
pub mod urlnorm;

pub use config::{HarvestConfig, ScrollConfig};
pub use discovery::{discover, Card, Discovery};
pub use extract::{Cascade, ExtractResult, ExtractionError};
pub use harvest::{extract_record, extract_records, HarvestReport, Harvester, MemorySink, RecordSink};
pub use numeric::parse_magnitude;
pub use page::{FeedPage, NavigationResult, PageError};
pub use resolve::Resolution;
pub use scroll::{converge, ScrollOutcome, StopReason};
pub use timestamp::{iso_from_activity_id, iso_from_url, normalize_relative_time};
pub use types::*;
pub use urlnorm::normalize_url;
