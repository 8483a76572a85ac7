//! `From` implementations bridging `airq_config` types to `airq_core` types.
//!
//! These keep string-to-enum and flag-to-policy mapping out of the CLI.

use crate::aqi::{CorrectionModel, HumidityPolicy};
use crate::payload::AveragingWindow;

// ── AveragingWindow ──────────────────────────────────────────────────────────

impl From<airq_config::Averages> for AveragingWindow {
    fn from(a: airq_config::Averages) -> Self {
        match a {
            airq_config::Averages::Realtime => Self::Instantaneous,
            airq_config::Averages::TenMinutes => Self::TenMinutes,
            airq_config::Averages::ThirtyMinutes => Self::ThirtyMinutes,
            airq_config::Averages::SixtyMinutes => Self::SixtyMinutes,
        }
    }
}

// ── CorrectionModel ──────────────────────────────────────────────────────────

impl From<airq_config::Conversion> for CorrectionModel {
    fn from(c: airq_config::Conversion) -> Self {
        match c {
            airq_config::Conversion::None => Self::None,
            airq_config::Conversion::AqAndU => Self::AqAndU,
            airq_config::Conversion::Lrapa => Self::Lrapa,
            airq_config::Conversion::Epa => Self::Epa,
            airq_config::Conversion::Woodsmoke => Self::Woodsmoke,
            airq_config::Conversion::AltCf3 => Self::Alt,
        }
    }
}

// ── HumidityPolicy ───────────────────────────────────────────────────────────

impl From<&airq_config::DisplayCfg> for HumidityPolicy {
    fn from(d: &airq_config::DisplayCfg) -> Self {
        if d.epa_fallback {
            Self::FallbackToRaw
        } else {
            Self::Fail
        }
    }
}
