use async_trait::async_trait;
use tokio::time::Instant;

/// Time source for the driver loop. Swappable so tests can run against the
/// paused tokio clock.
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    fn instant(&self) -> Instant;

    async fn sleep_until(&self, deadline: Instant);
}

pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}
