//! Payload adaptation: one raw upstream payload in, normalized scalars out.
//!
//! Three upstream shapes are recognized; each gets its own pure mapping
//! function and [`adapt`] dispatches on [`SourceKind`]. Unknown extra fields
//! are ignored. Required fields (station id, primary PM2.5) fail with
//! [`PayloadError`]; optional fields resolve to `None` and never to NaN.

use serde_json::Value;

use crate::error::PayloadError;
use crate::util::{HUMIDITY_BIAS_PCT, device_temp_to_celsius};

/// Rolling-average window for the primary PM2.5 value.
///
/// The windowed variants are served from the cloud APIs' rolling statistics;
/// local devices only report the live value and ignore the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AveragingWindow {
    #[default]
    Instantaneous,
    TenMinutes,
    ThirtyMinutes,
    SixtyMinutes,
}

impl std::str::FromStr for AveragingWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "realtime" | "instantaneous" => Ok(Self::Instantaneous),
            "10m" => Ok(Self::TenMinutes),
            "30m" => Ok(Self::ThirtyMinutes),
            "60m" => Ok(Self::SixtyMinutes),
            other => Err(format!(
                "unknown averaging window `{other}` (expected realtime|10m|30m|60m)"
            )),
        }
    }
}

/// Which upstream produced the payload. Selected explicitly by the caller;
/// no shape sniffing happens here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// api.purpleair.com v1: a root `sensor` object.
    #[default]
    Cloud,
    /// The retired www.purpleair.com/json API: a `results` array.
    CloudLegacy,
    /// A device queried over the LAN at `http://<ip>/json`.
    Local,
}

impl SourceKind {
    /// Map the single "is this a local sensor" flag onto a kind.
    #[inline]
    pub fn from_local_flag(is_local: bool) -> Self {
        if is_local { Self::Local } else { Self::Cloud }
    }
}

/// Scalar fields extracted from one payload, ready for `Reading` construction.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFields {
    pub sensor_id: String,
    /// Primary PM2.5 in ug/m3, per the requested window.
    pub pm25: f64,
    /// Instantaneous PM2.5 under the CF=1 calibration factor; equals `pm25`
    /// where the source does not distinguish calibration factors.
    pub pm25_cf1: f64,
    /// Alternate-channel PM2.5; equals `pm25` where no such channel exists.
    pub pm25_alt: f64,
    /// Relative humidity percent, bias-corrected.
    pub humidity: Option<f64>,
    /// Ambient temperature in whole degrees Celsius.
    pub temperature: Option<f64>,
    /// VOC index; `None` when the source omits it.
    pub voc: Option<f64>,
}

/// Extract normalized fields from one raw payload.
pub fn adapt(
    raw: &Value,
    window: AveragingWindow,
    kind: SourceKind,
) -> Result<NormalizedFields, PayloadError> {
    let fields = match kind {
        SourceKind::Cloud => adapt_cloud(raw, window),
        SourceKind::CloudLegacy => adapt_cloud_legacy(raw, window),
        SourceKind::Local => adapt_local(raw),
    }?;
    tracing::debug!(sensor = %fields.sensor_id, pm25 = fields.pm25, "parsed payload");
    Ok(fields)
}

fn adapt_cloud(raw: &Value, window: AveragingWindow) -> Result<NormalizedFields, PayloadError> {
    let sensor = raw
        .get("sensor")
        .filter(|s| s.is_object())
        .ok_or(PayloadError::Shape("cloud payload has no `sensor` object"))?;

    let pm25 = match window {
        AveragingWindow::Instantaneous => req_num(sensor, "pm2.5")?,
        windowed => {
            let stats = sensor
                .get("stats")
                .ok_or(PayloadError::MissingField("stats"))?;
            req_num(stats, cloud_stat_field(windowed))?
        }
    };
    let pm25 = non_negative("pm2.5", pm25)?;

    Ok(NormalizedFields {
        sensor_id: req_id(sensor, "sensor_index")?,
        pm25,
        // CF=1 and ALT are always the instantaneous channel values,
        // independent of the requested window.
        pm25_cf1: opt_concentration(sensor, "pm2.5_cf_1")?.unwrap_or(pm25),
        pm25_alt: opt_concentration(sensor, "pm2.5_alt")?.unwrap_or(pm25),
        humidity: opt_humidity(sensor, "humidity"),
        temperature: opt_temperature(sensor, "temperature"),
        voc: opt_voc(sensor, "voc"),
    })
}

fn cloud_stat_field(window: AveragingWindow) -> &'static str {
    match window {
        AveragingWindow::Instantaneous => "pm2.5",
        AveragingWindow::TenMinutes => "pm2.5_10minute",
        AveragingWindow::ThirtyMinutes => "pm2.5_30minute",
        AveragingWindow::SixtyMinutes => "pm2.5_60minute",
    }
}

fn adapt_cloud_legacy(
    raw: &Value,
    window: AveragingWindow,
) -> Result<NormalizedFields, PayloadError> {
    let results = raw
        .get("results")
        .and_then(Value::as_array)
        .filter(|r| !r.is_empty())
        .ok_or(PayloadError::Shape("legacy payload has no `results` entries"))?;
    let primary = &results[0];

    let pm25 = match window {
        AveragingWindow::Instantaneous => req_num(primary, "PM2_5Value")?,
        windowed => legacy_stat(primary, windowed)?,
    };
    let pm25 = non_negative("PM2_5Value", pm25)?;

    Ok(NormalizedFields {
        sensor_id: req_id(primary, "ID")?,
        pm25,
        // A single channel; the API predates the CF=1/ALT distinction.
        pm25_cf1: pm25,
        pm25_alt: pm25,
        humidity: None,
        temperature: None,
        // VOC rides on the second channel when the station has the element.
        voc: results.get(1).and_then(|second| opt_voc(second, "Voc")),
    })
}

/// Rolling means live in `Stats`, a JSON document embedded as a string:
/// `{"v":<live>,"v1":<10m>,"v2":<30m>,"v3":<60m>,...}`.
fn legacy_stat(primary: &Value, window: AveragingWindow) -> Result<f64, PayloadError> {
    let text = primary
        .get("Stats")
        .and_then(Value::as_str)
        .ok_or(PayloadError::MissingField("Stats"))?;
    let stats: Value = serde_json::from_str(text)
        .map_err(|_| PayloadError::Shape("`Stats` is not a JSON document"))?;
    let field = match window {
        AveragingWindow::Instantaneous => "v",
        AveragingWindow::TenMinutes => "v1",
        AveragingWindow::ThirtyMinutes => "v2",
        AveragingWindow::SixtyMinutes => "v3",
    };
    req_num(&stats, field)
}

fn adapt_local(raw: &Value) -> Result<NormalizedFields, PayloadError> {
    if !raw.is_object() {
        return Err(PayloadError::Shape("local payload is not an object"));
    }

    // Rolling windows are a cloud feature; the device only has the live value.
    let pm25 = non_negative("pm2_5_atm", req_num(raw, "pm2_5_atm")?)?;

    Ok(NormalizedFields {
        sensor_id: req_id(raw, "SensorId")?,
        pm25,
        pm25_cf1: opt_concentration(raw, "pm2_5_cf_1")?.unwrap_or(pm25),
        // No alternate channel exists on-device.
        pm25_alt: pm25,
        humidity: opt_humidity(raw, "current_humidity"),
        temperature: opt_temperature(raw, "current_temp_f"),
        voc: opt_voc(raw, "voc"),
    })
}

/// Parse a numeric field that may arrive as a JSON number or a
/// string-encoded number. Absent, non-numeric and NaN values are `None`.
fn opt_num(obj: &Value, field: &str) -> Option<f64> {
    let n = match obj.get(field)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.is_nan() { None } else { Some(n) }
}

fn req_num(obj: &Value, field: &'static str) -> Result<f64, PayloadError> {
    let v = obj.get(field).ok_or(PayloadError::MissingField(field))?;
    opt_num(obj, field).ok_or_else(|| PayloadError::NotNumeric {
        field,
        value: v.to_string(),
    })
}

/// An optional concentration: absent is fine, negative is a parse failure.
fn opt_concentration(obj: &Value, field: &'static str) -> Result<Option<f64>, PayloadError> {
    opt_num(obj, field).map(|v| non_negative(field, v)).transpose()
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, PayloadError> {
    if value < 0.0 {
        return Err(PayloadError::Negative { field, value });
    }
    Ok(value)
}

/// Station identifier: a non-empty string or a bare number.
fn req_id(obj: &Value, field: &'static str) -> Result<String, PayloadError> {
    match obj.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(PayloadError::NotNumeric {
            field,
            value: other.to_string(),
        }),
        None => Err(PayloadError::MissingField(field)),
    }
}

fn opt_humidity(obj: &Value, field: &str) -> Option<f64> {
    opt_num(obj, field).map(|h| h + HUMIDITY_BIAS_PCT)
}

fn opt_temperature(obj: &Value, field: &str) -> Option<f64> {
    opt_num(obj, field).map(device_temp_to_celsius)
}

/// Stations without a VOC element zero-fill the field; absent-or-zero both
/// map to `None`.
fn opt_voc(obj: &Value, field: &str) -> Option<f64> {
    opt_num(obj, field).filter(|v| *v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn opt_num_parses_string_encoded_numbers() {
        let obj = json!({"a": "6.86", "b": 7, "c": "not a number", "d": []});
        assert_eq!(opt_num(&obj, "a"), Some(6.86));
        assert_eq!(opt_num(&obj, "b"), Some(7.0));
        assert_eq!(opt_num(&obj, "c"), None);
        assert_eq!(opt_num(&obj, "d"), None);
        assert_eq!(opt_num(&obj, "missing"), None);
    }

    #[test]
    fn voc_zero_means_absent() {
        let obj = json!({"voc": 0});
        assert_eq!(opt_voc(&obj, "voc"), None);
        let obj = json!({"voc": 81.0});
        assert_eq!(opt_voc(&obj, "voc"), Some(81.0));
    }

    #[test]
    fn humidity_gets_bias_correction() {
        let obj = json!({"humidity": 31});
        assert_eq!(opt_humidity(&obj, "humidity"), Some(35.0));
    }

    #[test]
    fn id_accepts_numbers_and_strings() {
        assert_eq!(req_id(&json!({"ID": 25999}), "ID").unwrap(), "25999");
        assert_eq!(
            req_id(&json!({"SensorId": "84:f3:eb"}), "SensorId").unwrap(),
            "84:f3:eb"
        );
        assert!(matches!(
            req_id(&json!({"ID": true}), "ID"),
            Err(PayloadError::NotNumeric { field: "ID", .. })
        ));
        assert!(matches!(
            req_id(&json!({}), "ID"),
            Err(PayloadError::MissingField("ID"))
        ));
    }

    #[test]
    fn local_ignores_requested_window() {
        let raw = json!({"SensorId": "a1", "pm2_5_atm": 3.07});
        let fields = adapt(&raw, AveragingWindow::SixtyMinutes, SourceKind::Local).unwrap();
        assert_eq!(fields.pm25, 3.07);
        assert_eq!(fields.pm25_alt, 3.07);
    }

    #[test]
    fn cloud_windowed_needs_stats() {
        let raw = json!({"sensor": {"sensor_index": 1, "pm2.5": 5.0}});
        let err = adapt(&raw, AveragingWindow::TenMinutes, SourceKind::Cloud).unwrap_err();
        assert_eq!(err, PayloadError::MissingField("stats"));
    }

    #[test]
    fn window_parses_from_config_strings() {
        assert_eq!(
            "realtime".parse::<AveragingWindow>().unwrap(),
            AveragingWindow::Instantaneous
        );
        assert_eq!(
            "30m".parse::<AveragingWindow>().unwrap(),
            AveragingWindow::ThirtyMinutes
        );
        assert!("5m".parse::<AveragingWindow>().is_err());
    }
}
