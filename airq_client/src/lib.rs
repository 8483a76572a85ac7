//! Transport layer: fetch raw payloads from the cloud API or a local device.
//!
//! Both sources implement `airq_traits::Source` and hand the untouched JSON
//! tree to the core's payload adapter. Transient transport failures are
//! retried a few times; HTTP statuses and shape problems surface immediately.
pub mod error;

use std::time::Duration;

use serde_json::Value;

use crate::error::ClientError;

/// Options controlling which optional fields the cloud API is asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldOpts {
    pub humidity: bool,
    pub temperature: bool,
    /// Ask for the alternate channel (only useful for the ALT conversion).
    pub alt: bool,
}

/// Build the cloud `fields` query parameter. Unrequested optional fields are
/// left out to keep the response small.
fn field_list(opts: FieldOpts) -> String {
    let mut fields =
        String::from("voc,pm2.5,pm2.5_cf_1,pm2.5_10minute,pm2.5_30minute,pm2.5_60minute");
    if opts.humidity {
        fields.push_str(",humidity");
    }
    if opts.temperature {
        fields.push_str(",temperature");
    }
    if opts.alt {
        fields.push_str(",pm2.5_alt");
    }
    fields
}

/// Bounded retry for transient transport failures.
fn fetch_with_retry(mut get: impl FnMut() -> Result<Value, ClientError>) -> Result<Value, ClientError> {
    let mut attempts = 0;
    let max_attempts = 3;
    loop {
        match get() {
            Ok(v) => return Ok(v),
            Err(ClientError::Transport(msg)) if attempts < max_attempts => {
                attempts += 1;
                tracing::warn!(retries = attempts, error = %msg, "fetch failed, retrying");
            }
            Err(e) => {
                tracing::error!("fetch error: {e}");
                return Err(e);
            }
        }
    }
}

/// Cloud v1 API source for one station.
pub struct CloudSource {
    url: String,
    api_key: String,
    read_key: Option<String>,
    fields: String,
    agent: ureq::Agent,
}

impl CloudSource {
    pub fn new(
        base_url: &str,
        sensor_id: &str,
        api_key: impl Into<String>,
        read_key: Option<String>,
        opts: FieldOpts,
    ) -> Self {
        Self {
            url: format!("{}/{}", base_url.trim_end_matches('/'), sensor_id),
            api_key: api_key.into(),
            read_key,
            fields: field_list(opts),
            agent: ureq::agent(),
        }
    }

    fn get(&self, timeout: Duration) -> Result<Value, ClientError> {
        let mut req = self
            .agent
            .get(&self.url)
            .timeout(timeout)
            .set("X-API-Key", &self.api_key)
            .query("fields", &self.fields);
        if let Some(key) = &self.read_key {
            req = req.query("read_key", key);
        }
        tracing::debug!(url = %self.url, "fetching cloud sensor");
        let body: Value = req
            .call()
            .map_err(ClientError::from)?
            .into_json()
            .map_err(|e| ClientError::Json(e.to_string()))?;
        // The API answers 200 with an empty object for unknown stations.
        if body.get("sensor").is_none() {
            return Err(ClientError::NoSensor);
        }
        Ok(body)
    }
}

impl airq_traits::Source for CloudSource {
    fn fetch(
        &mut self,
        timeout: Duration,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        fetch_with_retry(|| self.get(timeout)).map_err(Into::into)
    }
}

/// Local-device source (`http://<ip>/json`).
pub struct LocalSource {
    url: String,
    agent: ureq::Agent,
}

impl LocalSource {
    pub fn new(address: &str) -> Self {
        Self {
            url: format!("http://{address}/json"),
            agent: ureq::agent(),
        }
    }

    fn get(&self, timeout: Duration) -> Result<Value, ClientError> {
        tracing::debug!(url = %self.url, "fetching local sensor");
        self.agent
            .get(&self.url)
            .timeout(timeout)
            .call()
            .map_err(ClientError::from)?
            .into_json()
            .map_err(|e| ClientError::Json(e.to_string()))
    }
}

impl airq_traits::Source for LocalSource {
    fn fetch(
        &mut self,
        timeout: Duration,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        fetch_with_retry(|| self.get(timeout)).map_err(Into::into)
    }
}
