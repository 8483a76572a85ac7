pub mod clock;

pub use clock::{Clock, WallClock};

/// A provider of one raw sensor payload per call (cloud API, local device,
/// or a canned double in tests). The payload is an arbitrary JSON tree; the
/// core's adapter decides what to make of it.
pub trait Source {
    fn fetch(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>>;
}
