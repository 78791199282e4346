//! Best-effort cover image transfer
//!
//! Downloads the provider's large cover and uploads it to the catalog. The
//! caller decides what a failure means; the reconciler only logs it.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use std::time::Duration;

const SERVICE: &str = "cover host";

/// Source of cover image bytes
#[async_trait]
pub trait CoverSource: Send + Sync {
    async fn fetch_cover(&self, url: &str) -> Result<Vec<u8>>;
}

/// Downloads covers over HTTP
pub struct HttpCoverSource {
    http: reqwest::Client,
}

impl HttpCoverSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("komal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::transport(SERVICE, format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl CoverSource for HttpCoverSource {
    async fn fetch_cover(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(Error::http_status(SERVICE, url, response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        debug!("Downloaded {} byte cover from {url}", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// What a cover transfer did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverTransfer {
    Uploaded,
    /// The record has no cover URL
    NoCover,
}

/// Fetch the cover at `url` and upload it to series `series_id`
pub async fn transfer_cover(
    source: &dyn CoverSource,
    catalog: &dyn Catalog,
    series_id: &str,
    url: &str,
) -> Result<CoverTransfer> {
    if url.trim().is_empty() {
        return Ok(CoverTransfer::NoCover);
    }

    let image = source.fetch_cover(url).await?;
    catalog.upload_thumbnail(series_id, image).await?;
    Ok(CoverTransfer::Uploaded)
}
