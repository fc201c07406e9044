//! HTTP layer
//!
//! Probe client plus facades for the two external services.

mod client;
mod record_store;
mod status_api;

pub use client::{HttpClient, HttpError, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_SECS};
pub use record_store::RecordStore;
pub use status_api::StatusApi;
