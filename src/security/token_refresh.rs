use anyhow::{anyhow, Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

pub const REFRESH_ENDPOINT: &str = "/users/token/refresh/";

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: Option<String>,
}

/// Exchange a refresh token for a new access token.
///
/// POST {base_url}/users/token/refresh/ with `{"refresh": "..."}`
/// Expects response: {"access":"..."}
pub async fn fetch_access_token(
    http_client: &Client,
    base_url: &str,
    refresh_token: &str,
) -> Result<String> {
    let url = format!("{}{}", base_url, REFRESH_ENDPOINT);

    debug!(url = %url, "requesting new access token");

    let response = http_client
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .json(&serde_json::json!({ "refresh": refresh_token }))
        .send()
        .await
        .context("sending token refresh request")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!(
            "token refresh failed with status {}: {}",
            status,
            body
        ));
    }

    let parsed: RefreshResponse = response
        .json()
        .await
        .context("parsing token refresh response")?;

    parsed
        .access
        .filter(|token| !token.is_empty())
        .context("access token not found in refresh response")
}

/// Serializes refresh attempts across clones of one client.
///
/// The first task to see a 401 performs the refresh while holding the guard.
/// Tasks queued behind it compare the held access token with the one they
/// sent and reuse the fresh token instead of refreshing again.
#[derive(Debug, Clone, Default)]
pub struct RefreshGuard {
    in_flight: Arc<Mutex<()>>,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.in_flight.lock().await
    }
}
