//! Test and helper doubles for airq_core.

use std::time::Duration;

/// A source that serves one canned payload on every fetch.
pub struct StaticSource {
    payload: serde_json::Value,
}

impl StaticSource {
    pub fn new(payload: serde_json::Value) -> Self {
        Self { payload }
    }
}

impl airq_traits::Source for StaticSource {
    fn fetch(
        &mut self,
        _timeout: Duration,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.payload.clone())
    }
}

/// A clock pinned to a fixed epoch-millisecond value.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl airq_traits::Clock for FixedClock {
    fn epoch_ms(&self) -> u64 {
        self.0
    }

    fn sleep(&self, _d: Duration) {}
}
