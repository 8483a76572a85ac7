//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use airq_client::error::ClientError;
    use airq_core::{AqiError, PayloadError};

    // Typed matches first
    if let Some(pe) = err.downcast_ref::<PayloadError>() {
        return match pe {
            PayloadError::MissingField(field) => format!(
                "What happened: The sensor payload is missing `{field}`.\nLikely causes: Wrong station id, or the upstream API changed shape.\nHow to fix: Verify the sensor entry in the config; re-run with --log-level=debug to see the raw payload."
            ),
            PayloadError::NotNumeric { field, value } => format!(
                "What happened: Field `{field}` could not be parsed as a number (got {value}).\nLikely causes: A partially-initialized station or an upstream API change.\nHow to fix: Retry in a minute; if it persists, check the station in the vendor's map."
            ),
            PayloadError::Negative { field, value } => format!(
                "What happened: Field `{field}` is negative ({value}), which no real concentration can be.\nLikely causes: A faulty or warming-up sensor element.\nHow to fix: Retry later; a persistent negative value means the station needs service."
            ),
            PayloadError::Shape(msg) => format!(
                "What happened: The payload does not look like a recognized API response ({msg}).\nLikely causes: The local address points at something that is not a sensor, or the wrong API generation was assumed.\nHow to fix: Check local_ip_address / sensor id in the config."
            ),
        };
    }

    if let Some(AqiError::MissingHumidity) = err.downcast_ref::<AqiError>() {
        return "What happened: The EPA conversion needs humidity, but the reading has none.\nLikely causes: The station has no humidity element, or humidity=true is missing from the sensor config.\nHow to fix: Enable humidity for the sensor, pick another conversion, or set display.epa_fallback = true.".to_string();
    }

    if let Some(ce) = err.downcast_ref::<ClientError>() {
        return match ce {
            ClientError::Status { status: 403, .. } => "What happened: The cloud API rejected the request (403).\nLikely causes: Missing or invalid api.read_key.\nHow to fix: Check the read key in the config; keys are issued per account by the vendor.".to_string(),
            ClientError::Status { status: 429, .. } => "What happened: The cloud API is rate-limiting (429).\nLikely causes: Polling too often, possibly from several clients on one key.\nHow to fix: Raise poll.update_interval_secs.".to_string(),
            ClientError::Status { status, url } => format!(
                "What happened: HTTP {status} from {url}.\nLikely causes: Wrong station id or a temporary upstream problem.\nHow to fix: Verify the sensor entry; retry later."
            ),
            ClientError::Transport(msg) => format!(
                "What happened: Could not reach the sensor API ({msg}).\nLikely causes: No network, DNS failure, or the local device is offline.\nHow to fix: Check connectivity and the configured address."
            ),
            ClientError::Json(msg) => format!(
                "What happened: The response body is not valid JSON ({msg}).\nLikely causes: A captive portal or proxy answered instead of the API.\nHow to fix: Check the network path to the API."
            ),
            ClientError::NoSensor => "What happened: The API answered but returned no sensor.\nLikely causes: Unknown station id.\nHow to fix: Verify the `sensor` value in the config against the vendor's map.".to_string(),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read_key") || lower.contains("read key") {
        return "What happened: A cloud sensor is configured without an API read key.\nLikely causes: Missing [api] read_key in the config.\nHow to fix: Add your read key under [api], or configure the sensor with local_ip_address instead.".to_string();
    }

    if lower.contains("config") && (lower.contains("no such file") || lower.contains("not found")) {
        return "What happened: The config file could not be read.\nLikely causes: Wrong --config path or the file does not exist yet.\nHow to fix: Pass --config <FILE> or create etc/airq.toml. See etc/airq.toml.example.".to_string();
    }

    // Generic fallback
    use std::error::Error;
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Structured error for --json mode, one object on stdout.
pub fn json_error(err: &eyre::Report) -> String {
    serde_json::json!({
        "ok": false,
        "error": err.to_string(),
        "detail": humanize(err),
    })
    .to_string()
}
