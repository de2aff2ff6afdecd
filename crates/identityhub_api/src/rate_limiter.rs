//! Spacing between backend requests, shared by every clone of a client.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep_until;
use tracing::trace;

#[derive(Clone, Debug)]
pub struct RateLimiter {
    spacing: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Reserves the next request slot, sleeping if it lies in the future.
    /// Returns how long the caller was held back.
    pub async fn hit(&self) -> Duration {
        let mut slot = self.next_slot.lock().await;
        let now = Instant::now();
        let start = match *slot {
            Some(at) if at > now => at,
            _ => now,
        };
        let held = start - now;
        if !held.is_zero() {
            trace!(held_ms = held.as_millis() as u64, "spacing backend request");
            sleep_until(start.into()).await;
        }
        *slot = Some(start + self.spacing);
        held
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }
}
