//! Fixed minimum-interval request scheduling.

use std::time::Duration;
use tokio::time::Instant;

/// Spaces consecutive requests at least `interval` apart.
///
/// The first call to [`Throttle::wait`] returns immediately.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Sleeps until `interval` has passed since the previous call, then records this one.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            tokio::time::sleep_until(last + self.interval).await;
        }
        self.last = Some(Instant::now());
    }
}
