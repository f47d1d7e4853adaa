use std::time::Duration;
use tokio::time::sleep;

/// Fixed inter-request delay between sequential upstream calls.
///
/// There is no backoff; a failed request is followed by the same delay
/// as a successful one before the next signature is attempted.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    interval: Duration,
    paced: u64,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, paced: 0 }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of pacing steps taken so far
    pub fn paced(&self) -> u64 {
        self.paced
    }

    pub async fn pace(&mut self) {
        self.paced += 1;
        if self.interval.is_zero() {
            return;
        }
        log::trace!("⏳ Pacing {}ms before next request", self.interval.as_millis());
        sleep(self.interval).await;
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::from_millis(50)
    }
}
