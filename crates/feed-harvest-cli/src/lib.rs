//! FeedHarvest CLI: Chromium page handle, record files, and run configuration.

pub mod config;
pub mod renderer;
pub mod sink;

pub use renderer::{find_chromium, BrowserOptions, ChromiumPage};
pub use sink::JsonFileSink;
