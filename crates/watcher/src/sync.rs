use chrono::{SecondsFormat, Utc};
use pulse_core::Category;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

/// One batched attribution unit bound for the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncEvent {
    pub domain: String,
    pub seconds: u64,
    pub category: Category,
}

/// Best-effort outbound path to the backend. Implementations may fail
/// silently; local truth is unaffected either way.
#[cfg_attr(test, mockall::automock)]
pub trait SyncSink: Send {
    fn push(&self, event: SyncEvent);
}

/// Hands events to the HTTP worker through a bounded queue. A full queue
/// drops the event rather than blocking the tick cadence.
pub struct ChannelSink {
    sender: mpsc::Sender<SyncEvent>,
}

impl SyncSink for ChannelSink {
    fn push(&self, event: SyncEvent) {
        if self.sender.try_send(event).is_err() {
            debug!("sync queue full, dropping event");
        }
    }
}

/// Creates the sink half and the worker's receiving half.
pub fn queue(capacity: usize) -> (ChannelSink, mpsc::Receiver<SyncEvent>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (ChannelSink { sender }, receiver)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackPayload {
    domain: String,
    time_spent: u64,
    category: Category,
    timestamp: String,
}

/// Drains the sync queue, posting each event to the backend's `/track`
/// endpoint. An unreachable or unhappy backend is logged and skipped; the
/// event is simply lost.
pub struct SyncWorker {
    endpoint: String,
    client: reqwest::Client,
    receiver: mpsc::Receiver<SyncEvent>,
}

impl SyncWorker {
    pub fn new(backend: &str, receiver: mpsc::Receiver<SyncEvent>) -> Self {
        Self {
            endpoint: format!("{}/track", backend.trim_end_matches('/')),
            client: reqwest::Client::new(),
            receiver,
        }
    }

    pub async fn run(mut self) {
        while let Some(event) = self.receiver.recv().await {
            self.send(event).await;
        }
    }

    async fn send(&self, event: SyncEvent) {
        let payload = TrackPayload {
            domain: event.domain,
            time_spent: event.seconds,
            category: event.category,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        match self.client.post(&self.endpoint).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("synced {}s for {}", payload.time_spent, payload.domain);
            }
            Ok(response) => {
                debug!("backend rejected sync for {}: {}", payload.domain, response.status());
            }
            Err(err) => {
                debug!("backend offline, keeping data local: {err}");
            }
        }
    }
}
