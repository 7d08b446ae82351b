use std::collections::HashMap;

use pulse_core::{Category, DomainSummary};
use tracing::warn;

use crate::state_file::StateFile;
use crate::sync::{SyncEvent, SyncSink};

/// Seconds of accumulated per-domain time between backend pushes.
pub const SYNC_BOUNDARY_SECS: u64 = 60;

/// Live per-domain counters on the observing side, mirrored to the state
/// file on every update. Authoritative for the local view regardless of
/// backend reachability.
pub struct LocalAccumulator {
    table: HashMap<String, DomainSummary>,
    state: StateFile,
    sink: Box<dyn SyncSink>,
}

impl LocalAccumulator {
    /// Rebuilds the live table from the persisted state file.
    pub fn new(state: StateFile, sink: Box<dyn SyncSink>) -> Self {
        let table = state.load();
        Self { table, state, sink }
    }

    /// Attributes `seconds` of dwell time to `domain`, persisting the full
    /// table and pushing one 60-second unit whenever the running total
    /// lands exactly on a sync boundary.
    pub fn record(&mut self, domain: &str, category: Category, seconds: u64) {
        let entry = self
            .table
            .entry(domain.to_string())
            .or_insert_with(|| DomainSummary::new(domain.to_string(), category));
        entry.add(category, seconds);
        let total = entry.total;

        if let Err(err) = self.state.save(&self.table) {
            warn!("local state save failed: {err}");
        }

        if total % SYNC_BOUNDARY_SECS == 0 {
            self.sink.push(SyncEvent {
                domain: domain.to_string(),
                seconds: SYNC_BOUNDARY_SECS,
                category,
            });
        }
    }

    pub fn table(&self) -> &HashMap<String, DomainSummary> {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::MockSyncSink;

    fn state(dir: &tempfile::TempDir) -> StateFile {
        StateFile::new(dir.path().join("state.json"))
    }

    #[test]
    fn reaching_the_boundary_pushes_one_minute() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut sink = MockSyncSink::new();
        sink.expect_push()
            .withf(|event| {
                event.domain == "github.com"
                    && event.seconds == 60
                    && event.category == Category::Productive
            })
            .times(1)
            .return_const(());

        let mut accumulator = LocalAccumulator::new(state(&dir), Box::new(sink));
        accumulator.record("github.com", Category::Productive, 30);
        accumulator.record("github.com", Category::Productive, 30);
        // Past the boundary, short of the next one: no second push.
        accumulator.record("github.com", Category::Productive, 30);
    }

    #[test]
    fn no_push_before_the_boundary() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut sink = MockSyncSink::new();
        sink.expect_push().times(0);

        let mut accumulator = LocalAccumulator::new(state(&dir), Box::new(sink));
        for _ in 0..59 {
            accumulator.record("github.com", Category::Productive, 1);
        }
        assert_eq!(accumulator.table()["github.com"].total, 59);
    }

    #[test]
    fn boundaries_count_per_domain_not_globally() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut sink = MockSyncSink::new();
        sink.expect_push().times(0);

        let mut accumulator = LocalAccumulator::new(state(&dir), Box::new(sink));
        accumulator.record("github.com", Category::Productive, 40);
        accumulator.record("netflix.com", Category::Unproductive, 20);
    }

    #[test]
    fn local_counters_survive_a_restart() {
        let dir = tempfile::tempdir().expect("temp dir");
        {
            let mut sink = MockSyncSink::new();
            sink.expect_push().return_const(());
            let mut accumulator = LocalAccumulator::new(state(&dir), Box::new(sink));
            accumulator.record("github.com", Category::Productive, 45);
        }

        let mut sink = MockSyncSink::new();
        sink.expect_push().return_const(());
        let accumulator = LocalAccumulator::new(state(&dir), Box::new(sink));
        assert_eq!(accumulator.table()["github.com"].productive, 45);
    }
}
