use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const BASE_URL_ENV: &str = "DEVOPS_API_URL";
const TIMEOUT_ENV: &str = "DEVOPS_API_TIMEOUT_SECS";
const TOKEN_FILE_ENV: &str = "DEVOPS_TOKEN_FILE";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Connection settings for [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// REST endpoint root, e.g. `http://localhost:8000/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-call HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Where the token pair is persisted; falls back to the user config dir
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token_file: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Build the config from environment variables.
    ///
    /// - `DEVOPS_API_URL`: base URL (default `http://localhost:8000/api`)
    /// - `DEVOPS_API_TIMEOUT_SECS`: request timeout in seconds (default 30)
    /// - `DEVOPS_TOKEN_FILE`: token file path
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(default_base_url);

        let timeout_secs = match std::env::var(TIMEOUT_ENV) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("parsing {TIMEOUT_ENV}={raw}"))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let token_file = std::env::var(TOKEN_FILE_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            base_url,
            timeout_secs,
            token_file,
        })
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path).context("reading config file")?;
        serde_json::from_str(&raw).context("parsing JSON config")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without the trailing slash, so endpoints can be appended as-is.
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim().trim_end_matches('/').to_string()
    }

    pub fn token_file_path(&self) -> Option<PathBuf> {
        self.token_file.clone().or_else(default_token_file)
    }
}

/// `~/.config/devops-control/tokens.json`
pub fn default_token_file() -> Option<PathBuf> {
    home::home_dir().map(|home| {
        home.join(".config")
            .join("devops-control")
            .join("tokens.json")
    })
}
