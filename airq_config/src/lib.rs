#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the air-quality poller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Poll defaults mirror the cloud API's documented rate guidance.
use serde::Deserialize;

/// Default fetch interval - 5 minutes.
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 300;

/// Never fetch more frequently than this - 30 seconds.
pub const MIN_UPDATE_INTERVAL_SECS: u64 = 30;

/// Age after which a sensor that keeps failing counts as gone - 1 hour.
pub const SENSOR_FAILURE_TIMEOUT_SECS: u64 = 3600;

/// Cloud API base URL.
pub const API_BASE_URL: &str = "https://api.purpleair.com/v1/sensors";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiCfg,
    /// Sensors to poll. At least one entry.
    pub sensors: Vec<SensorCfg>,
    #[serde(default)]
    pub poll: PollCfg,
    #[serde(default)]
    pub display: DisplayCfg,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ApiCfg {
    /// Cloud API read key, sent as the X-API-Key header. Required unless
    /// every configured sensor is local.
    pub read_key: Option<String>,
    /// Override the cloud API base URL (tests, proxies).
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorCfg {
    /// Display name.
    pub name: String,
    /// Cloud station id (digits).
    pub sensor: Option<String>,
    /// Per-station read key for private sensors, passed as a query param.
    pub key: Option<String>,
    /// LAN address of the device; when set the local API is used and the
    /// cloud fields are ignored.
    pub local_ip_address: Option<String>,
    /// Whether the station has a humidity element.
    #[serde(default)]
    pub humidity: bool,
    /// Whether the station has a temperature element.
    #[serde(default)]
    pub temperature: bool,
}

impl SensorCfg {
    #[inline]
    pub fn is_local(&self) -> bool {
        self.local_ip_address.is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollCfg {
    /// Seconds between fetches in watch mode.
    pub update_interval_secs: u64,
    /// Seconds after which a failing sensor's last reading is discarded
    /// from the display (reported as unknown).
    pub failure_timeout_secs: u64,
}

impl Default for PollCfg {
    fn default() -> Self {
        Self {
            update_interval_secs: DEFAULT_UPDATE_INTERVAL_SECS,
            failure_timeout_secs: SENSOR_FAILURE_TIMEOUT_SECS,
        }
    }
}

/// Rolling-average window selection, as spelled in config files.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Averages {
    #[default]
    #[serde(rename = "realtime")]
    Realtime,
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "60m")]
    SixtyMinutes,
}

/// Correction model selection, as spelled in config files.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Conversion {
    #[default]
    None,
    #[serde(rename = "AQandU")]
    AqAndU,
    #[serde(rename = "LRAPA")]
    Lrapa,
    #[serde(rename = "EPA")]
    Epa,
    #[serde(rename = "WOODSMOKE")]
    Woodsmoke,
    #[serde(rename = "ALT-CF3")]
    AltCf3,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DisplayCfg {
    /// Averaging window for the primary PM2.5 value.
    pub averages: Averages,
    /// Correction model applied when deriving the AQI.
    pub conversion: Conversion,
    /// Report the AQI number in the density field instead of ug/m3.
    pub aqi_instead_of_density: bool,
    /// Degrade the EPA conversion to the uncorrected value when humidity is
    /// missing, instead of failing the reading.
    pub epa_fallback: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Cross-field requirements the schema cannot express.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.sensors.is_empty() {
            eyre::bail!("no sensors configured; add at least one [[sensors]] entry");
        }
        for s in &self.sensors {
            if s.sensor.is_none() && s.local_ip_address.is_none() {
                eyre::bail!(
                    "sensor `{}` has neither a station id nor a local address",
                    s.name
                );
            }
            if !s.is_local() && self.api.read_key.is_none() {
                eyre::bail!(
                    "sensor `{}` is a cloud sensor but api.read_key is not configured",
                    s.name
                );
            }
        }
        if self.poll.update_interval_secs < MIN_UPDATE_INTERVAL_SECS {
            eyre::bail!(
                "poll.update_interval_secs must be at least {MIN_UPDATE_INTERVAL_SECS}"
            );
        }
        Ok(())
    }
}
