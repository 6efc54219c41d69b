//! Authenticated JSON REST client.
//!
//! [`ApiClient`] attaches the held bearer token to every call, refreshes an
//! expired access token once per request on a 401, and mirrors the token
//! pair into a [`TokenStore`] so sessions survive restarts.

mod error;

pub use error::ClientError;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, debug_span, Instrument};
use uuid::Uuid;

use crate::api::models::UserProfile;
use crate::config::ClientConfig;
use crate::security::audit_log::AuditLogger;
use crate::security::token_refresh::{self, RefreshGuard};
use crate::security::{
    FileTokenStore, MemoryTokenStore, Session, SessionState, TokenPair, TokenStore,
};
use crate::transport::{self, http, RequestOptions};

pub const LOGIN_ENDPOINT: &str = "/users/login/";
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

/// Login form payload.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
struct Inner {
    base_url: String,
    http_client: Client,
    session: Session,
    refresh_guard: RefreshGuard,
    audit: AuditLogger,
}

/// Handle to one API session. Clones share tokens and the refresh guard.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Build a client persisting tokens into `store`. Starts unauthenticated.
    pub fn new(config: &ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ClientError::Build)?;

        let base_url = config.normalized_base_url();
        debug!(base_url = %base_url, "API client initialized");

        Ok(Self {
            inner: Arc::new(Inner {
                base_url,
                http_client,
                session: Session::new(store),
                refresh_guard: RefreshGuard::new(),
                audit: AuditLogger::new(),
            }),
        })
    }

    /// Build a client backed by the configured token file, or by memory when
    /// no file location can be determined.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let store: Arc<dyn TokenStore> = match config.token_file_path() {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Self::new(config, store)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Watch login/refresh/logout transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.session.subscribe()
    }

    /// Pick up a previously persisted token pair. No network call is made.
    pub async fn restore_session(&self) -> bool {
        let restored = self.inner.session.restore().await;
        if restored {
            if let SessionState::Authenticated { refresh_capable } =
                self.inner.session.state().await
            {
                self.inner.audit.session_restored(refresh_capable);
            }
        }
        restored
    }

    /// Exchange credentials for a token pair, then fetch the user's profile.
    ///
    /// The login call goes through the same header and 401 path as any other
    /// request; a non-2xx final response is reported as [`ClientError::Auth`].
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, ClientError> {
        let options = RequestOptions::post().json(credentials)?;
        let (status, body) = self.execute(LOGIN_ENDPOINT, options).await?;

        if !status.is_success() {
            let message = transport::extract_error_message(&body)
                .unwrap_or_else(|| AUTH_FAILED_MESSAGE.to_string());
            self.inner
                .audit
                .login_failure(&credentials.email, Some(status.as_u16()), &message);
            return Err(ClientError::Auth(message));
        }

        let pair: TokenPair = serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
            status: status.as_u16(),
            source,
        })?;
        self.inner.session.set_tokens(&pair).await?;
        self.inner.audit.login_success(&credentials.email);

        self.get_current_user().await
    }

    /// Forget both tokens. Never fails and makes no network call.
    pub async fn logout(&self) {
        self.inner.session.clear().await;
        self.inner.audit.logout();
    }

    /// Issue `options.method` against `base_url + endpoint` and decode the
    /// JSON reply.
    ///
    /// A 401 while a refresh token is held triggers one refresh and one
    /// retry; whatever the retry returns is final.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let (status, body) = self.execute(endpoint, options).await?;
        Self::decode(status, &body)
    }

    /// Send with the held bearer token, refreshing and retrying once on 401.
    /// Returns the final status and body without judging the status.
    async fn execute(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<(StatusCode, Vec<u8>), ClientError> {
        let request_id = Uuid::new_v4().to_string();
        let span = debug_span!(
            "api_request",
            request_id = %request_id,
            method = %options.method,
            endpoint = %endpoint
        );

        async move {
            let url = self.url(endpoint);
            let sent_access = self.inner.session.access_token().await;
            let mut response = self.send(&url, &options, sent_access.as_deref()).await?;

            if response.status() == StatusCode::UNAUTHORIZED
                && self.inner.session.refresh_token().await.is_some()
            {
                debug!("received 401, attempting token refresh");
                if let Some(access) = self
                    .refresh_after_unauthorized(sent_access.as_deref(), &request_id)
                    .await
                {
                    debug!("retrying request with refreshed access token");
                    response = self.send(&url, &options, Some(&access)).await?;
                }
            }

            http::read_body(response).await
        }
        .instrument(span)
        .await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.inner.base_url, endpoint)
    }

    async fn send(
        &self,
        url: &str,
        options: &RequestOptions,
        access_token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let headers = http::build_headers(&options.headers, access_token)?;
        http::send(&self.inner.http_client, url, options, headers).await
    }

    fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ClientError> {
        if !status.is_success() {
            return Err(ClientError::Request {
                status: Some(status.as_u16()),
                message: transport::error_message(body),
            });
        }

        let decoded = if body.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_value(serde_json::Value::Null)
        } else {
            serde_json::from_slice(body)
        };
        decoded.map_err(|source| ClientError::Decode {
            status: status.as_u16(),
            source,
        })
    }

    /// Single-flight refresh. Returns the access token to retry with, or
    /// `None` when no retry should happen.
    async fn refresh_after_unauthorized(
        &self,
        sent_access: Option<&str>,
        request_id: &str,
    ) -> Option<String> {
        let _in_flight = self.inner.refresh_guard.lock().await;
        let session = &self.inner.session;

        if let Some(current) = session.access_token().await {
            if Some(current.as_str()) != sent_access {
                debug!("access token already refreshed by a concurrent request");
                return Some(current);
            }
        }

        let refresh_token = session.refresh_token().await?;
        let access = match token_refresh::fetch_access_token(
            &self.inner.http_client,
            &self.inner.base_url,
            &refresh_token,
        )
        .await
        {
            Ok(access) => access,
            Err(err) => {
                self.inner.audit.refresh_failed(request_id, &format!("{err:#}"));
                return None;
            }
        };

        match session.replace_access_token(&refresh_token, access.clone()).await {
            Ok(true) => {
                self.inner.audit.token_refreshed(request_id);
                Some(access)
            }
            Ok(false) => {
                self.inner
                    .audit
                    .refresh_failed(request_id, "session changed during refresh");
                None
            }
            Err(err) => {
                self.inner.audit.refresh_failed(request_id, &err.to_string());
                None
            }
        }
    }
}
