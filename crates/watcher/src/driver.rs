use std::sync::Arc;
use std::time::Duration;

use pulse_core::{Category, classify};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::accumulator::LocalAccumulator;
use crate::clock::Clock;
use crate::domain;
use crate::events::TabEvent;

/// Fixed heartbeat between attribution opportunities.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

enum State {
    Idle,
    Tracking {
        domain: String,
        category: Category,
        since: Instant,
    },
}

/// Converts tab focus/navigation transitions plus the heartbeat into
/// whole-second attribution calls on the accumulator.
pub struct TabTracker {
    state: State,
    accumulator: LocalAccumulator,
    clock: Arc<dyn Clock>,
}

impl TabTracker {
    pub fn new(accumulator: LocalAccumulator, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: State::Idle,
            accumulator,
            clock,
        }
    }

    /// Any observed transition flushes pending time first; tracking then
    /// restarts on the newly focused URL, or stops if there is none.
    pub fn handle_event(&mut self, event: TabEvent) {
        match event {
            TabEvent::Activated { url } | TabEvent::Updated { url } => self.focus(Some(url)),
            TabEvent::FocusChanged { url } => self.focus(url),
        }
    }

    /// Heartbeat: attributes whole elapsed seconds to the current domain
    /// and restarts the marker. The sub-second remainder is dropped, so the
    /// attributed time never exceeds real elapsed time.
    pub fn tick(&mut self) {
        self.flush();
    }

    /// Flushes pending time and stops tracking.
    pub fn stop(&mut self) {
        self.flush();
        self.state = State::Idle;
    }

    fn focus(&mut self, url: Option<String>) {
        self.flush();
        self.state = match url.as_deref().and_then(domain::normalize) {
            Some(domain) => {
                let category = classify(&domain);
                debug!("tracking {domain} as {}", category.as_str());
                State::Tracking {
                    domain,
                    category,
                    since: self.clock.instant(),
                }
            }
            None => State::Idle,
        };
    }

    fn flush(&mut self) {
        if let State::Tracking {
            domain,
            category,
            since,
        } = &mut self.state
        {
            let now = self.clock.instant();
            let elapsed = now.saturating_duration_since(*since).as_secs();
            if elapsed >= 1 {
                self.accumulator.record(domain, *category, elapsed);
                *since = now;
            }
        }
    }

    pub fn accumulator(&self) -> &LocalAccumulator {
        &self.accumulator
    }
}

/// Drives the tracker: tab events preempt, the heartbeat fires at a fixed
/// cadence, cancellation or a closed event feed flushes and returns.
pub async fn run(
    mut tracker: TabTracker,
    mut events: mpsc::Receiver<TabEvent>,
    cadence: Duration,
    shutdown: CancellationToken,
) {
    let clock = Arc::clone(&tracker.clock);
    let mut next_tick = clock.instant() + cadence;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracker.stop();
                return;
            }
            event = events.recv() => match event {
                Some(event) => tracker.handle_event(event),
                None => {
                    tracker.stop();
                    shutdown.cancel();
                    return;
                }
            },
            _ = clock.sleep_until(next_tick) => {
                tracker.tick();
                next_tick += cadence;
            }
        }
    }
}
