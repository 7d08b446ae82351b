mod analytics;
mod error;
mod saver;

pub use error::{Result, StoreError};
pub use saver::SaveScheduler;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use pulse_core::{DomainSummary, SessionRecord};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The full tracked state: the append-only session log plus the
/// denormalized per-domain summaries. Serializes to the on-disk layout
/// `{"sessions": [...], "summary": {...}}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingStore {
    pub sessions: Vec<SessionRecord>,
    pub summary: BTreeMap<String, DomainSummary>,
}

impl TrackingStore {
    /// Loads prior state from `path`. A missing, empty, or unparseable file
    /// yields a fresh store; corruption is logged, never fatal.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                warn!("unreadable store file {}: {err}; starting fresh", path.display());
                return Self::default();
            }
        };
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(&raw) {
            Ok(store) => store,
            Err(err) => {
                warn!("corrupt store file {}: {err}; starting fresh", path.display());
                Self::default()
            }
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Appends a session record and folds it into the domain's summary,
    /// creating the summary on first sight. Returns the domain's new
    /// running total.
    pub fn ingest(&mut self, record: SessionRecord) -> u64 {
        let summary = self
            .summary
            .entry(record.domain.clone())
            .or_insert_with(|| DomainSummary::new(record.domain.clone(), record.category));
        summary.add(record.category, record.time_spent);
        let total = summary.total;
        self.sessions.push(record);
        total
    }

    /// Clears the session log and every summary.
    pub fn reset(&mut self) {
        self.sessions.clear();
        self.summary.clear();
    }
}
