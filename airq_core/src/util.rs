//! Unit conversions and ingestion calibration constants.

/// Bias added to every parsed relative-humidity value, in percentage points.
/// The on-board humidity element under-reads by roughly this much.
pub const HUMIDITY_BIAS_PCT: f64 = 4.0;

/// Offset subtracted from raw Fahrenheit readings before the Celsius
/// conversion. Heat from the device electronics inflates the raw value.
pub const TEMP_OFFSET_F: f64 = 8.0;

/// Convert a raw device Fahrenheit reading to calibrated Celsius, rounded
/// to the nearest whole degree.
#[inline]
pub fn device_temp_to_celsius(raw_f: f64) -> f64 {
    ((raw_f - TEMP_OFFSET_F - 32.0) * 5.0 / 9.0).round()
}
