//! HTTP boundary to the event webhooks.
//!
//! Deliberately thin: no retry, no timeout beyond the client's native
//! behavior. A non-success status surfaces as a `Network` error with the
//! status embedded; callers decide what to tell the user.

use serde_json::json;

use crate::error::{AcaraError, AcaraResult};
use crate::wire::{self, ApiEvent};

/// Client for the list/create webhooks.
#[derive(Clone, Default)]
pub struct EventGateway {
    http: reqwest::Client,
}

impl EventGateway {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// GET the full event collection.
    pub async fn list(&self, url: &str) -> AcaraResult<Vec<ApiEvent>> {
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AcaraError::Network(format!(
                "status {}",
                resp.status().as_u16()
            )));
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(wire::decode_list(&body))
    }

    /// POST one event; returns the acknowledgment body.
    ///
    /// Webhooks are not required to answer with JSON; a non-JSON body on a
    /// success status degrades to `{"success": true}`.
    pub async fn create(&self, url: &str, event: &ApiEvent) -> AcaraResult<serde_json::Value> {
        let resp = self.http.post(url).json(event).send().await?;

        if !resp.status().is_success() {
            return Err(AcaraError::Network(format!(
                "status {}",
                resp.status().as_u16()
            )));
        }

        Ok(resp
            .json()
            .await
            .unwrap_or_else(|_| json!({ "success": true })))
    }
}
