//! The immutable sensor reading and its derived summary.

use std::fmt;

use airq_traits::Clock;
use serde_json::Value;

use crate::aqi::{self, CorrectionModel, HumidityPolicy};
use crate::error::{AqiError, PayloadError};
use crate::payload::{AveragingWindow, NormalizedFields, SourceKind, adapt};

/// One normalized sensor reading.
///
/// Constructed fresh per successful fetch and never mutated; a superseded
/// reading is simply dropped. The AQI and category are derived on demand
/// (see [`crate::aqi`]), never cached here.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Opaque station identifier.
    pub sensor_id: String,
    /// Primary PM2.5 in ug/m3; semantics follow the requested window.
    pub pm25: f64,
    /// PM2.5 under the "standard particle" (CF=1) calibration factor.
    pub pm25_cf1: f64,
    /// Alternate-channel PM2.5; equals `pm25` where no such channel exists.
    pub pm25_alt: f64,
    /// Relative humidity percent, bias-corrected at ingestion.
    pub humidity: Option<f64>,
    /// Ambient temperature in whole degrees Celsius.
    pub temperature: Option<f64>,
    /// VOC index; `None` when the source omits it.
    pub voc: Option<f64>,
    /// Correction model used when deriving the AQI.
    pub model: CorrectionModel,
    /// Wall-clock milliseconds since the epoch, stamped at construction.
    pub captured_at_ms: u64,
}

impl Reading {
    /// Build a reading from normalized fields, stamping the capture time.
    pub fn new(fields: NormalizedFields, model: CorrectionModel, clock: &dyn Clock) -> Self {
        Self {
            sensor_id: fields.sensor_id,
            pm25: fields.pm25,
            pm25_cf1: fields.pm25_cf1,
            pm25_alt: fields.pm25_alt,
            humidity: fields.humidity,
            temperature: fields.temperature,
            voc: fields.voc,
            model,
            captured_at_ms: clock.epoch_ms(),
        }
    }

    /// Adapt one raw payload and construct the reading in one step.
    pub fn from_payload(
        raw: &Value,
        window: AveragingWindow,
        kind: SourceKind,
        model: CorrectionModel,
        clock: &dyn Clock,
    ) -> Result<Self, PayloadError> {
        Ok(Self::new(adapt(raw, window, kind)?, model, clock))
    }

    /// AQI under this reading's correction model (fails for EPA without
    /// humidity).
    pub fn aqi(&self) -> Result<f64, AqiError> {
        aqi::compute_aqi(self)
    }

    /// Whether the reading is younger than `max_age_ms` at `now_ms`.
    /// Freshness decisions belong to the caller; the reading only carries
    /// its stamp.
    pub fn is_fresh(&self, now_ms: u64, max_age_ms: u64) -> bool {
        now_ms.saturating_sub(self.captured_at_ms) <= max_age_ms
    }
}

impl fmt::Display for Reading {
    /// Summary used by callers for logging: the AQI plus every stored field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(v: Option<f64>, unit: &str) -> String {
            v.map_or_else(|| "n/a".to_string(), |v| format!("{v}{unit}"))
        }
        let aqi = aqi::compute_aqi_with(self, HumidityPolicy::FallbackToRaw)
            .map_or_else(|_| "n/a".to_string(), |a| format!("{a:.0}"));
        write!(
            f,
            "Reading(AQI={aqi}, PM2.5={}u/m3, CF1={}u/m3, ALT={}u/m3, humidity={}, temp={}, VOC={})",
            self.pm25,
            self.pm25_cf1,
            self.pm25_alt,
            opt(self.humidity, "%"),
            opt(self.temperature, "C"),
            opt(self.voc, ""),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::FixedClock;

    fn fields(pm25: f64) -> NormalizedFields {
        NormalizedFields {
            sensor_id: "1234".into(),
            pm25,
            pm25_cf1: pm25,
            pm25_alt: pm25,
            humidity: None,
            temperature: None,
            voc: None,
        }
    }

    #[test]
    fn stamps_capture_time_from_the_clock() {
        let reading = Reading::new(fields(6.86), CorrectionModel::None, &FixedClock(42_000));
        assert_eq!(reading.captured_at_ms, 42_000);
    }

    #[test]
    fn freshness_is_relative_to_now() {
        let reading = Reading::new(fields(6.86), CorrectionModel::None, &FixedClock(10_000));
        assert!(reading.is_fresh(10_500, 1_000));
        assert!(!reading.is_fresh(12_000, 1_000));
        // A stamp from the future is still fresh (saturating age of zero).
        assert!(reading.is_fresh(9_000, 0));
    }

    #[test]
    fn summary_lists_every_field() {
        let mut f = fields(6.86);
        f.humidity = Some(35.0);
        f.voc = Some(81.0);
        let reading = Reading::new(f, CorrectionModel::None, &FixedClock(0));
        let summary = reading.to_string();
        assert_eq!(
            summary,
            "Reading(AQI=29, PM2.5=6.86u/m3, CF1=6.86u/m3, ALT=6.86u/m3, humidity=35%, temp=n/a, VOC=81)"
        );
    }
}
