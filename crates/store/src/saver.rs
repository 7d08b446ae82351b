use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{debug, error};

use crate::TrackingStore;

/// Debounced store writer. Each mutation re-arms a single pending write
/// instead of stacking one write per mutation; the file is touched at most
/// once per quiet period.
pub struct SaveScheduler {
    store: Arc<Mutex<TrackingStore>>,
    path: PathBuf,
    quiet_period: Duration,
    pending: Mutex<Option<AbortHandle>>,
}

impl SaveScheduler {
    pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(5);

    pub fn new(store: Arc<Mutex<TrackingStore>>, path: PathBuf, quiet_period: Duration) -> Self {
        Self {
            store,
            path,
            quiet_period,
            pending: Mutex::new(None),
        }
    }

    /// Arms the pending write, canceling any timer already running. Must be
    /// called from within a tokio runtime.
    pub fn schedule(&self) {
        let store = Arc::clone(&self.store);
        let path = self.path.clone();
        let quiet_period = self.quiet_period;
        let task = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            write_snapshot(&store, &path);
        });
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = pending.replace(task.abort_handle()) {
            previous.abort();
        }
    }
}

fn write_snapshot(store: &Mutex<TrackingStore>, path: &Path) {
    let snapshot = {
        let guard = match store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    };
    match snapshot.write(path) {
        Ok(()) => debug!("store synced to {}", path.display()),
        Err(err) => error!("store save failed for {}: {err}", path.display()),
    }
}
