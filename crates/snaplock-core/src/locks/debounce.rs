use std::time::{Duration, Instant};

/// Coalesces bursts of lock mutations into one save.
///
/// Each [`mark`](Self::mark) restarts the quiet period; the save becomes due
/// once `interval` has passed without another mark.
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    interval: Duration,
    last_change: Option<Instant>,
}

impl SaveDebouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_change: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mark(&mut self, now: Instant) {
        self.last_change = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_change.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.last_change
            .is_some_and(|t| now.saturating_duration_since(t) >= self.interval)
    }

    pub fn clear(&mut self) {
        self.last_change = None;
    }
}
