//! Record store facade
//!
//! Wraps the probe client with the store's REST surface. Every call runs
//! under the anonymous credential tier: the public key is sent both as
//! `apikey` and as a bearer token, matching what the store expects from
//! browser clients.

use anyhow::Result;
use serde_json::Value;

use super::client::{HttpClient, HttpRequest, HttpResponse};
use crate::config::ConnectionConfig;

/// Client for the policy-governed record store.
#[derive(Clone)]
pub struct RecordStore {
    client: HttpClient,
    rest_url: String,
}

impl RecordStore {
    pub fn new(config: &ConnectionConfig, timeout_secs: u64) -> Result<Self> {
        let client = HttpClient::with_timeout(timeout_secs)?
            .default_header("apikey", &config.store_key)?
            .default_header("Authorization", format!("Bearer {}", config.store_key))?;

        Ok(Self {
            client,
            rest_url: config.rest_url(),
        })
    }

    /// `GET /rest/v1/` - the store's self-describing schema document.
    pub async fn schema_document(&self) -> Result<HttpResponse> {
        self.client.get(&format!("{}/", self.rest_url)).await
    }

    /// Zero-row existence probe for a collection.
    pub async fn table_probe(&self, collection: &str) -> Result<HttpResponse> {
        self.client
            .get(&format!(
                "{}/{}?select=count&limit=0",
                self.rest_url, collection
            ))
            .await
    }

    /// Single-row read probe, subject to the store's read policy.
    pub async fn read_probe(&self, collection: &str) -> Result<HttpResponse> {
        self.client
            .get(&format!("{}/{}?select=*&limit=1", self.rest_url, collection))
            .await
    }

    /// Insert a record, asking the store to echo the representation back.
    pub async fn insert(&self, collection: &str, payload: &Value) -> Result<HttpResponse> {
        self.client
            .send(
                HttpRequest::post(format!("{}/{}", self.rest_url, collection))
                    .header("Content-Type", "application/json")
                    .header("Prefer", "return=representation")
                    .body(payload.to_string()),
            )
            .await
    }
}
