// Shared transport configuration for building reqwest::Client instances.
//
// The vehicle and style clients share timeout and user-agent settings
// through this module, avoiding duplicated builder logic. The client
// timeout also bounds each poll-cycle fetch, so a hung request cannot
// block staleness detection indefinitely.

use std::time::Duration;

use url::Url;

/// Ensure a backend base URL ends with a slash so relative joins work.
pub(crate) fn normalize_base_url(raw: &str) -> Result<Url, crate::error::Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    Ok(url)
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("rideview/0.1.0")
            .build()?;
        Ok(client)
    }
}
