//! Fetch orchestration: config-to-client assembly, one-shot reads, and the
//! polling loop.

use std::time::Duration;

use airq_client::{CloudSource, FieldOpts, LocalSource};
use airq_config::{API_BASE_URL, Config, MIN_UPDATE_INTERVAL_SECS, SensorCfg};
use airq_core::{
    AveragingWindow, CorrectionModel, HumidityPolicy, Reading, SourceKind, compute_aqi_with,
    to_category,
};
use airq_traits::{Clock, Source};
use eyre::WrapErr;

/// Per-request timeout; the upstream answers in well under this or not at all.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to poll one configured sensor.
pub struct SensorPoller {
    pub name: String,
    source: Box<dyn Source>,
    kind: SourceKind,
    window: AveragingWindow,
    model: CorrectionModel,
    policy: HumidityPolicy,
    last: Option<Reading>,
}

/// What the status display should show for one sensor right now.
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub name: String,
    /// `None` when there is no (fresh) reading or the conversion failed.
    pub aqi: Option<f64>,
    /// 1..=5, or the "no data" sentinel 0.
    pub category: u8,
    pub reading: Option<Reading>,
}

/// Assemble a poller for one configured sensor, cloud or local.
pub fn build_poller(
    cfg: &Config,
    sensor: &SensorCfg,
    window: AveragingWindow,
    model: CorrectionModel,
) -> eyre::Result<SensorPoller> {
    let (source, kind): (Box<dyn Source>, SourceKind) =
        if let Some(addr) = &sensor.local_ip_address {
            (Box::new(LocalSource::new(addr)), SourceKind::Local)
        } else {
            let id = sensor
                .sensor
                .as_deref()
                .ok_or_else(|| eyre::eyre!("sensor `{}` has no station id", sensor.name))?;
            let api_key = cfg.api.read_key.as_deref().ok_or_else(|| {
                eyre::eyre!("sensor `{}` needs api.read_key for cloud access", sensor.name)
            })?;
            let base = cfg.api.base_url.as_deref().unwrap_or(API_BASE_URL);
            let opts = FieldOpts {
                humidity: sensor.humidity,
                temperature: sensor.temperature,
                alt: matches!(model, CorrectionModel::Alt),
            };
            (
                Box::new(CloudSource::new(base, id, api_key, sensor.key.clone(), opts)),
                SourceKind::Cloud,
            )
        };
    Ok(SensorPoller {
        name: sensor.name.clone(),
        source,
        kind,
        window,
        model,
        policy: HumidityPolicy::from(&cfg.display),
        last: None,
    })
}

impl SensorPoller {
    /// Fetch once, parse, and remember the reading. A failure leaves the
    /// previous reading in place.
    pub fn refresh(&mut self, clock: &dyn Clock) -> eyre::Result<Reading> {
        let raw = self
            .source
            .fetch(REQUEST_TIMEOUT)
            .map_err(|e| eyre::eyre!("{e}"))
            .wrap_err_with(|| format!("fetching sensor `{}`", self.name))?;
        let reading = Reading::from_payload(&raw, self.window, self.kind, self.model, clock)
            .wrap_err_with(|| format!("parsing payload for sensor `{}`", self.name))?;
        tracing::info!(sensor = %self.name, %reading, "new reading");
        self.last = Some(reading.clone());
        Ok(reading)
    }

    /// When the last successful reading was captured.
    pub fn last_captured_ms(&self) -> Option<u64> {
        self.last.as_ref().map(|r| r.captured_at_ms)
    }

    /// Resolve the current display values. A missing or aged-out reading
    /// reports the unknown sentinel (category 0, no AQI), never a stale band.
    pub fn display_state(&self, now_ms: u64, max_age_ms: u64) -> DisplayState {
        match self.last.as_ref().filter(|r| r.is_fresh(now_ms, max_age_ms)) {
            None => DisplayState {
                name: self.name.clone(),
                aqi: None,
                category: 0,
                reading: None,
            },
            Some(r) => {
                let aqi = compute_aqi_with(r, self.policy).ok();
                DisplayState {
                    name: self.name.clone(),
                    aqi,
                    category: to_category(aqi),
                    reading: Some(r.clone()),
                }
            }
        }
    }
}

/// Render one display state to the chosen output format.
pub fn render(state: &DisplayState, aqi_instead_of_density: bool, json: bool) -> String {
    if json {
        let density = state.reading.as_ref().map(|r| {
            if aqi_instead_of_density {
                state.aqi.unwrap_or(0.0)
            } else {
                r.pm25
            }
        });
        let value = match &state.reading {
            Some(r) => serde_json::json!({
                "name": state.name,
                "sensor_id": r.sensor_id,
                "aqi": state.aqi,
                "category": state.category,
                "density": density,
                "pm25": r.pm25,
                "pm25_cf1": r.pm25_cf1,
                "pm25_alt": r.pm25_alt,
                "humidity": r.humidity,
                "temperature": r.temperature,
                "voc": r.voc,
                "captured_at_ms": r.captured_at_ms,
            }),
            None => serde_json::json!({
                "name": state.name,
                "aqi": serde_json::Value::Null,
                "category": 0,
            }),
        };
        value.to_string()
    } else {
        match (&state.reading, state.aqi) {
            (Some(r), Some(aqi)) => {
                format!("{}: AQI {aqi:.0} (category {}) {r}", state.name, state.category)
            }
            (Some(r), None) => format!("{}: AQI n/a (category 0) {r}", state.name),
            (None, _) => format!("{}: no data (category 0)", state.name),
        }
    }
}

/// Fetch every selected sensor once and print the result.
pub fn run_read(
    cfg: &Config,
    only: Option<&str>,
    window: AveragingWindow,
    model: CorrectionModel,
    json: bool,
    clock: &dyn Clock,
) -> eyre::Result<()> {
    let mut failures = 0usize;
    for sensor in cfg.sensors.iter().filter(|s| only.is_none_or(|n| s.name == n)) {
        let mut poller = build_poller(cfg, sensor, window, model)?;
        if let Err(err) = poller.refresh(clock) {
            tracing::error!(sensor = %sensor.name, error = %err, "fetch failed");
            failures += 1;
        }
        let state = poller.display_state(clock.epoch_ms(), cfg.poll.failure_timeout_secs * 1000);
        println!("{}", render(&state, cfg.display.aqi_instead_of_density, json));
    }
    if failures > 0 {
        eyre::bail!("{failures} sensor fetch(es) failed");
    }
    Ok(())
}

/// Poll every configured sensor until the process is interrupted.
pub fn run_watch(
    cfg: &Config,
    interval_override_secs: Option<u64>,
    json: bool,
    clock: &dyn Clock,
) -> eyre::Result<()> {
    let interval_secs = interval_override_secs
        .unwrap_or(cfg.poll.update_interval_secs)
        .max(MIN_UPDATE_INTERVAL_SECS);
    let max_age_ms = cfg.poll.failure_timeout_secs * 1000;

    let mut pollers = Vec::new();
    for sensor in &cfg.sensors {
        pollers.push(build_poller(
            cfg,
            sensor,
            cfg.display.averages.into(),
            cfg.display.conversion.into(),
        )?);
    }

    tracing::info!(interval_secs, sensors = pollers.len(), "watching");
    loop {
        let now = clock.epoch_ms();
        for poller in &mut pollers {
            // Honor the upstream rate floor even right after a restart.
            let recently = poller
                .last_captured_ms()
                .is_some_and(|t| now.saturating_sub(t) < MIN_UPDATE_INTERVAL_SECS * 1000);
            if recently {
                tracing::info!(sensor = %poller.name, "skipping fetch, last update is recent");
            } else if let Err(err) = poller.refresh(clock) {
                // Keep the previous reading; it ages out via display_state.
                tracing::error!(sensor = %poller.name, error = %err, "fetch failed");
            }
            let state = poller.display_state(clock.epoch_ms(), max_age_ms);
            println!("{}", render(&state, cfg.display.aqi_instead_of_density, json));
        }
        clock.sleep(Duration::from_secs(interval_secs));
    }
}
