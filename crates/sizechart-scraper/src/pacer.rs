//! Per-store request pacing.
//!
//! One [`RequestPacer`] is shared by every network request a store's
//! pipeline makes (product feed pages, product pages, image fetches).
//! It is a mutex-guarded "time of last request" check, not a token
//! bucket: bursts above one request per interval are impossible because
//! the lock is held across the sleep.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct RequestPacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Blocks until at least `min_interval` has elapsed since the previous
    /// acquisition, then records the current time. A zero interval is a
    /// no-op.
    pub async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
