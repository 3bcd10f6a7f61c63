//! reqwest-backed source clients

use std::time::Duration;

use patseed_core::{RawMockRecord, RawPersonRecord};
use serde::de::DeserializeOwned;

use super::{MockSource, PersonSource};
use crate::error::TransportError;

/// Build the shared HTTP client with a per-request timeout
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Client for the demographic person generator
#[derive(Clone)]
pub struct PersonClient {
    http: reqwest::Client,
    url: String,
}

impl PersonClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

impl PersonSource for PersonClient {
    async fn fetch_one(&self) -> Result<RawPersonRecord, TransportError> {
        get_json(self.http.get(&self.url), &self.url).await
    }
}

/// Client for the mock-data batch endpoint
#[derive(Clone)]
pub struct MockClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl MockClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            url: url.into(),
            api_key,
        }
    }
}

impl MockSource for MockClient {
    async fn fetch_batch(&self, count: usize) -> Result<Vec<RawMockRecord>, TransportError> {
        let mut request = self
            .http
            .get(&self.url)
            .query(&[("count", count.to_string())]);
        if let Some(ref key) = self.api_key {
            request = request.query(&[("key", key)]);
        }
        get_json(request, &self.url).await
    }
}

/// Send a GET request and decode the JSON body.
///
/// `url` is only used for error context and must not carry the API key.
async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<T, TransportError> {
    let response = request
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|source| TransportError::Request {
            url: url.to_string(),
            source: source.without_url(),
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            url: url.to_string(),
            status,
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| TransportError::Request {
            url: url.to_string(),
            source: source.without_url(),
        })?;

    serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode {
        url: url.to_string(),
        source,
    })
}
