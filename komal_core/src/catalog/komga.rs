//! Komga REST client

use crate::catalog::{Catalog, CatalogListing, MetadataPatch};
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

const SERVICE: &str = "Komga";

/// Page size large enough to list a whole library in one request
const LISTING_PAGE_SIZE: u32 = 50_000;

/// Connection settings for a Komga server
#[derive(Debug, Clone)]
pub struct KomgaConfig {
    pub url: String,
    pub email: String,
    pub password: String,
    pub timeout: Duration,
}

impl KomgaConfig {
    pub fn new(
        url: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            email: email.into(),
            password: password.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for a Komga server using basic authentication
pub struct KomgaClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    password: String,
}

impl KomgaClient {
    pub fn new(config: KomgaConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(Error::configuration_missing("komga.url"));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("komal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::transport(SERVICE, format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            email: config.email,
            password: config.password,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }
}

#[async_trait]
impl Catalog for KomgaClient {
    async fn list_series(&self) -> Result<CatalogListing> {
        let endpoint = self.endpoint("/series");
        debug!("Listing {SERVICE} series as {}", self.email);

        let response = self
            .http
            .get(&endpoint)
            .query(&[("size", LISTING_PAGE_SIZE)])
            .basic_auth(&self.email, Some(&self.password))
            .send()
            .await
            .map_err(|e| Error::catalog_listing(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::catalog_listing(format!(
                "{endpoint} returned HTTP {}",
                status.as_u16()
            )));
        }

        let listing: CatalogListing = response
            .json()
            .await
            .map_err(|e| Error::catalog_listing(format!("unreadable series list: {e}")))?;

        debug!(
            "{SERVICE} listed {} series ({} reported)",
            listing.content.len(),
            listing.number_of_elements
        );
        Ok(listing)
    }

    async fn update_metadata(&self, series_id: &str, patch: &MetadataPatch) -> Result<()> {
        let endpoint = self.endpoint(&format!("/series/{series_id}/metadata"));
        debug!("Writing metadata for series {series_id}");

        let response = self
            .http
            .patch(&endpoint)
            .basic_auth(&self.email, Some(&self.password))
            .json(patch)
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            status => Err(Error::http_status(SERVICE, &endpoint, status.as_u16())),
        }
    }

    async fn upload_thumbnail(&self, series_id: &str, image: Vec<u8>) -> Result<()> {
        let endpoint = self.endpoint(&format!("/series/{series_id}/thumbnails"));
        debug!("Uploading {} byte cover for series {series_id}", image.len());

        let part = Part::bytes(image)
            .file_name("cover.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| Error::invalid_response(SERVICE, format!("bad cover part: {e}")))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&endpoint)
            .basic_auth(&self.email, Some(&self.password))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::http_status(SERVICE, &endpoint, status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_layout() {
        let client =
            KomgaClient::new(KomgaConfig::new("http://komga.local:25600/", "a@b.c", "pw")).unwrap();
        assert_eq!(
            client.endpoint("/series/0A1B/metadata"),
            "http://komga.local:25600/api/v1/series/0A1B/metadata"
        );
    }

    #[test]
    fn test_empty_url_is_configuration_error() {
        let err = KomgaClient::new(KomgaConfig::new("  ", "a@b.c", "pw")).err().unwrap();
        assert!(err.is_fatal());
    }
}
