use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Token values as they sit in durable storage. Either half may be missing
/// when a previous session was only partially written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(rename = "access_token", default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(rename = "refresh_token", default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl StoredTokens {
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed token file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable key/value slot mirroring the in-memory session.
///
/// Calls are synchronous: every login, logout and refresh writes through
/// before the in-memory pair changes.
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Returns `Ok(None)` when nothing has been persisted.
    fn load(&self) -> Result<Option<StoredTokens>, StorageError>;

    fn save(&self, tokens: &StoredTokens) -> Result<(), StorageError>;

    /// Removing an absent entry is not an error.
    fn clear(&self) -> Result<(), StorageError>;
}

/// JSON file holding `access_token` / `refresh_token`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredTokens>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let tokens: StoredTokens =
            serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        if tokens.is_empty() {
            Ok(None)
        } else {
            Ok(Some(tokens))
        }
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let body = serde_json::to_vec_pretty(tokens).map_err(|source| StorageError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, body).map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error(e))?;
        }

        debug!(path = %self.path.display(), "token file written");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "token file removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Process-local store keyed like browser storage. Used by tests and by
/// embedders that do not want tokens on disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: StoredTokens) -> Self {
        let store = Self::new();
        store.write(&tokens);
        store
    }

    /// Raw value under a storage key, as a browser devtools panel would show it.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }

    fn write(&self, tokens: &StoredTokens) {
        let mut entries = self.lock();
        for (key, value) in [
            (ACCESS_TOKEN_KEY, &tokens.access),
            (REFRESH_TOKEN_KEY, &tokens.refresh),
        ] {
            match value {
                Some(v) => {
                    entries.insert(key.to_string(), v.clone());
                }
                None => {
                    entries.remove(key);
                }
            }
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredTokens>, StorageError> {
        let tokens = StoredTokens {
            access: self.get(ACCESS_TOKEN_KEY),
            refresh: self.get(REFRESH_TOKEN_KEY),
        };
        Ok((!tokens.is_empty()).then_some(tokens))
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), StorageError> {
        self.write(tokens);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.lock();
        entries.remove(ACCESS_TOKEN_KEY);
        entries.remove(REFRESH_TOKEN_KEY);
        Ok(())
    }
}
