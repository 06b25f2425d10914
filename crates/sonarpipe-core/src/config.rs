use crate::{Error, Result};
use std::time::Duration;
use url::Url;

/// Process-wide settings, built once at startup and shared read-only.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub endpoint: Url,
    /// `None` leaves the HTTP client default in place.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Both values are required. Whitespace-only counts as missing.
    pub fn new(
        api_key: Option<&str>,
        base_url: Option<&str>,
        timeout_ms: Option<u64>,
    ) -> Result<Self> {
        let api_key = non_empty(api_key)
            .ok_or_else(|| Error::NotConfigured("PERPLEXITY_API_KEY is required".to_string()))?;
        let base_url = non_empty(base_url)
            .ok_or_else(|| Error::NotConfigured("BASE_URL is required".to_string()))?;
        let endpoint =
            Url::parse(&base_url).map_err(|e| Error::InvalidUrl(format!("BASE_URL: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "BASE_URL: unsupported scheme {:?}",
                endpoint.scheme()
            )));
        }
        Ok(Self {
            api_key,
            endpoint,
            timeout: timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis),
        })
    }
}

fn non_empty(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
