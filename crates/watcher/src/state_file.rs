use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use pulse_core::DomainSummary;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// On-disk shape of the local live state: the full table under one
/// `timeData` key.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(rename = "timeData", default)]
    time_data: HashMap<String, DomainSummary>,
}

/// Local key-value slot mirroring the live per-domain table.
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Rebuilds the table from disk. A missing, empty, or corrupt file
    /// starts the table empty; corruption is logged, never fatal.
    pub fn load(&self) -> HashMap<String, DomainSummary> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return HashMap::new(),
            Err(err) => {
                warn!("unreadable state file {}: {err}", self.path.display());
                return HashMap::new();
            }
        };
        if raw.trim().is_empty() {
            return HashMap::new();
        }
        match serde_json::from_str::<PersistedState>(&raw) {
            Ok(state) => state.time_data,
            Err(err) => {
                warn!("corrupt state file {}: {err}; starting fresh", self.path.display());
                HashMap::new()
            }
        }
    }

    /// Mirrors the full table to disk.
    pub fn save(&self, table: &HashMap<String, DomainSummary>) -> Result<()> {
        let state = PersistedState {
            time_data: table.clone(),
        };
        let data = serde_json::to_string(&state)?;
        fs::write(&self.path, data)
            .with_context(|| format!("writing state file {}", self.path.display()))?;
        Ok(())
    }
}
