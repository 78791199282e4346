//! Jikan v4 client (unofficial MyAnimeList REST API)

use crate::error::{Error, Result};
use crate::locator::RecordId;
use crate::provider::{MetadataProvider, RawManga};
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const SERVICE: &str = "Jikan";

/// Connection settings for the Jikan API
#[derive(Debug, Clone)]
pub struct JikanConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
}

/// HTTP client for the Jikan API
pub struct JikanClient {
    http: reqwest::Client,
    base_url: String,
}

impl JikanClient {
    pub fn new(config: JikanConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("komal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::transport(SERVICE, format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl MetadataProvider for JikanClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawManga>> {
        let endpoint = self.endpoint("/manga");
        debug!("Searching {SERVICE} for {query:?} (limit {limit})");

        let limit_param = limit.to_string();
        let response = self
            .http
            .get(&endpoint)
            .query(&[
                ("q", query),
                ("limit", limit_param.as_str()),
                ("type", "manga"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::http_status(SERVICE, &endpoint, status.as_u16()));
        }

        let envelope: Envelope<Vec<RawManga>> = response.json().await?;
        let mut results = envelope.data.unwrap_or_default();
        results.truncate(limit);
        debug!("{SERVICE} returned {} candidate(s) for {query:?}", results.len());
        Ok(results)
    }

    async fn fetch(&self, id: RecordId) -> Result<Option<RawManga>> {
        let endpoint = self.endpoint(&format!("/manga/{id}"));
        debug!("Fetching {SERVICE} record {id}");

        let response = self.http.get(&endpoint).send().await?;

        match response.status() {
            StatusCode::OK => {
                let envelope: Envelope<RawManga> = response.json().await?;
                Ok(envelope.data)
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(Error::http_status(SERVICE, &endpoint, status.as_u16())),
        }
    }

    fn name(&self) -> &'static str {
        "jikan"
    }
}
