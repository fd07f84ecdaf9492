//! Fixed-interval pacing for outbound requests.
//!
//! Every network operation in the pipeline is issued and awaited before the
//! next one starts, so a plain sleep after each request is enough to keep a
//! minimum spacing between requests to third-party sites.

use std::time::Duration;

/// Sleeps a fixed amount of time between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A pacer that never sleeps.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the configured delay. A zero delay returns immediately.
    pub async fn pause(&self) {
        if self.delay.is_zero() {
            return;
        }
        tracing::debug!(sleep_ms = %self.delay.as_millis(), "Pacing next request");
        tokio::time::sleep(self.delay).await;
    }
}
