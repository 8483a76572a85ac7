use airq_core::{AveragingWindow, PayloadError, SourceKind, adapt};
use rstest::rstest;
use serde_json::json;

#[test]
fn legacy_missing_pm25_is_malformed() {
    let raw = json!({"results": [{"ID": 25999}]});
    let err = adapt(&raw, AveragingWindow::Instantaneous, SourceKind::CloudLegacy).unwrap_err();
    assert_eq!(err, PayloadError::MissingField("PM2_5Value"));
}

#[test]
fn legacy_non_numeric_pm25_is_malformed() {
    let raw = json!({"results": [{"ID": 25999, "PM2_5Value": "offline"}]});
    let err = adapt(&raw, AveragingWindow::Instantaneous, SourceKind::CloudLegacy).unwrap_err();
    assert!(matches!(
        err,
        PayloadError::NotNumeric { field: "PM2_5Value", .. }
    ));
}

#[test]
fn negative_concentration_is_a_parse_failure_not_a_clamp() {
    let raw = json!({"results": [{"ID": 25999, "PM2_5Value": "-4.2"}]});
    let err = adapt(&raw, AveragingWindow::Instantaneous, SourceKind::CloudLegacy).unwrap_err();
    assert_eq!(
        err,
        PayloadError::Negative { field: "PM2_5Value", value: -4.2 }
    );
}

#[rstest]
#[case::empty_results(json!({"results": []}))]
#[case::no_results(json!({"mapVersion": "0.17"}))]
#[case::not_an_object(json!(42))]
fn unrecognized_legacy_shapes(#[case] raw: serde_json::Value) {
    let err = adapt(&raw, AveragingWindow::Instantaneous, SourceKind::CloudLegacy).unwrap_err();
    assert!(matches!(err, PayloadError::Shape(_)));
}

#[test]
fn cloud_payload_needs_a_sensor_object() {
    let raw = json!({"api_version": "V1.0.11-0.0.41"});
    let err = adapt(&raw, AveragingWindow::Instantaneous, SourceKind::Cloud).unwrap_err();
    assert!(matches!(err, PayloadError::Shape(_)));
}

#[test]
fn cloud_missing_station_id_is_malformed() {
    let raw = json!({"sensor": {"pm2.5": 5.0}});
    let err = adapt(&raw, AveragingWindow::Instantaneous, SourceKind::Cloud).unwrap_err();
    assert_eq!(err, PayloadError::MissingField("sensor_index"));
}

#[test]
fn legacy_windowed_request_with_corrupt_stats() {
    let raw = json!({"results": [{"ID": 25999, "PM2_5Value": "6.86", "Stats": "{not json"}]});
    let err = adapt(&raw, AveragingWindow::TenMinutes, SourceKind::CloudLegacy).unwrap_err();
    assert!(matches!(err, PayloadError::Shape(_)));
}

#[test]
fn legacy_windowed_request_without_stats() {
    let raw = json!({"results": [{"ID": 25999, "PM2_5Value": "6.86"}]});
    let err = adapt(&raw, AveragingWindow::ThirtyMinutes, SourceKind::CloudLegacy).unwrap_err();
    assert_eq!(err, PayloadError::MissingField("Stats"));
}

#[test]
fn optional_field_garbage_never_errors() {
    let raw = json!({
        "SensorId": "a1",
        "pm2_5_atm": 3.07,
        "current_humidity": "wet",
        "current_temp_f": [],
        "voc": "NaN"
    });
    let fields = adapt(&raw, AveragingWindow::Instantaneous, SourceKind::Local).unwrap();
    assert_eq!(fields.humidity, None);
    assert_eq!(fields.temperature, None);
    assert_eq!(fields.voc, None);
}

#[test]
fn negative_optional_concentration_still_fails() {
    // CF=1 is optional to have, but a negative value means a broken payload.
    let raw = json!({"SensorId": "a1", "pm2_5_atm": 3.07, "pm2_5_cf_1": -1.0});
    let err = adapt(&raw, AveragingWindow::Instantaneous, SourceKind::Local).unwrap_err();
    assert_eq!(
        err,
        PayloadError::Negative { field: "pm2_5_cf_1", value: -1.0 }
    );
}
