//! Record files on disk.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use feed_harvest::{HarvestError, HarvestResult, PostRecord, RecordSink, Target};

/// Writes each target's records to `{dir}/{handle}.json` as a pretty JSON array.
#[derive(Debug)]
pub struct JsonFileSink {
    dir: PathBuf,
    written: Vec<(PathBuf, usize)>,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn path_for(&self, target: &Target) -> PathBuf {
        self.dir.join(format!("{}.json", target.handle()))
    }

    /// Files written so far with their record counts.
    pub fn written(&self) -> &[(PathBuf, usize)] {
        &self.written
    }
}

impl RecordSink for JsonFileSink {
    fn accept(&mut self, target: &Target, records: &[PostRecord]) -> HarvestResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| HarvestError::Sink(format!("{}: {e}", self.dir.display())))?;
        let path = self.path_for(target);
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| HarvestError::Sink(format!("serialize {}: {e}", target.handle())))?;
        std::fs::write(&path, json)
            .map_err(|e| HarvestError::Sink(format!("{}: {e}", path.display())))?;
        tracing::info!("wrote {} posts to {}", records.len(), path.display());
        self.written.push((path, records.len()));
        Ok(())
    }
}

/// Render captured card HTML with numbered separators.
pub fn render_card_dump(cards: &[String]) -> String {
    let mut out = String::from("<!-- Saved feed card HTML snippets for analysis -->\n");
    for (i, html) in cards.iter().enumerate() {
        let _ = write!(out, "\n<!-- CARD {} -->\n{html}\n", i + 1);
    }
    out
}

/// Write `{dir}/{handle}.cards.html`.
pub fn write_card_dump(dir: &Path, target: &Target, cards: &[String]) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.cards.html", target.handle()));
    std::fs::write(&path, render_card_dump(cards))?;
    Ok(path)
}
