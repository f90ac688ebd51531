// Style/config retrieval from the backend.
//
// Consumed exactly once, before the map initializes. Failure here is a
// fatal startup condition for the view; the surrounding bootstrap owns
// any retry policy, not this client.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;

#[derive(Deserialize)]
struct StyleResponse {
    #[serde(default)]
    style: Option<String>,
}

#[derive(Deserialize)]
struct PingResponse {
    #[serde(default)]
    msg: Option<String>,
}

/// Async client for the backend's config endpoints.
#[derive(Debug, Clone)]
pub struct StyleClient {
    http: reqwest::Client,
    base_url: Url,
}

impl StyleClient {
    /// Build from a backend base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(
            http,
            crate::transport::normalize_base_url(base_url)?,
        ))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> Url {
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    /// Fetch the base-map style URL (`GET /tileserver-url`).
    ///
    /// A missing or unparseable `style` field is [`Error::MissingStyle`]
    /// or [`Error::InvalidUrl`]; the map must not initialize without it.
    pub async fn style_url(&self) -> Result<Url, Error> {
        let url = self.url("tileserver-url");
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let parsed: StyleResponse =
            serde_json::from_str(&body).map_err(|e| Error::MalformedResponse {
                message: format!("style config did not parse: {e}"),
                body,
            })?;

        if let Some(style) = parsed.style.filter(|s| !s.is_empty()) {
            Ok(Url::parse(&style)?)
        } else {
            Err(Error::MissingStyle)
        }
    }

    /// Probe backend liveness (`GET /ping`).
    pub async fn ping(&self) -> Result<String, Error> {
        let url = self.url("ping");
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PingResponse = resp.json().await?;
        Ok(parsed.msg.unwrap_or_default())
    }
}
