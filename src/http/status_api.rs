//! Status service facade
//!
//! Wraps the probe client with the status API's three endpoints.

use anyhow::Result;
use serde_json::json;

use super::client::{HttpClient, HttpResponse};
use crate::config::ConnectionConfig;

/// Client for the status-reporting sub-API.
#[derive(Clone)]
pub struct StatusApi {
    client: HttpClient,
    api_url: String,
}

impl StatusApi {
    pub fn new(config: &ConnectionConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: HttpClient::with_timeout(timeout_secs)?,
            api_url: config.api_url(),
        })
    }

    /// `GET /api/` - the greeting endpoint.
    pub async fn root(&self) -> Result<HttpResponse> {
        self.client.get(&format!("{}/", self.api_url)).await
    }

    /// `POST /api/status` - create a status record.
    pub async fn submit_status(&self, client_name: &str) -> Result<HttpResponse> {
        self.client
            .post_json(
                &format!("{}/status", self.api_url),
                &json!({ "client_name": client_name }),
            )
            .await
    }

    /// `GET /api/status` - list all status records.
    pub async fn list_status(&self) -> Result<HttpResponse> {
        self.client.get(&format!("{}/status", self.api_url)).await
    }
}
