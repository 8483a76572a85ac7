use thiserror::Error;

/// Parse failure for a required payload field. Optional fields (VOC,
/// humidity, temperature) never produce these; they resolve to absent.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PayloadError {
    #[error("payload is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is not numeric: `{value}`")]
    NotNumeric { field: &'static str, value: String },
    #[error("field `{field}` is negative: {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("unrecognized payload shape: {0}")]
    Shape(&'static str),
}

/// Failure while deriving an AQI from a reading.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AqiError {
    #[error("the EPA conversion needs humidity, but the reading has none")]
    MissingHumidity,
}
