use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::security::token_store::{StorageError, StoredTokens, TokenStore};

/// Access/refresh credentials as issued by the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Observable authentication state of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// `refresh_capable` is false when only the access half is held.
    Authenticated { refresh_capable: bool },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

impl Tokens {
    fn state(&self) -> SessionState {
        match self.access {
            Some(_) => SessionState::Authenticated {
                refresh_capable: self.refresh.is_some(),
            },
            None => SessionState::Unauthenticated,
        }
    }

    fn to_stored(&self) -> StoredTokens {
        StoredTokens {
            access: self.access.clone(),
            refresh: self.refresh.clone(),
        }
    }
}

/// In-memory token pair with write-through to a [`TokenStore`].
///
/// Every mutation persists first and only then updates memory, so memory and
/// storage never disagree after a successful call. Clones share state.
#[derive(Clone)]
pub struct Session {
    tokens: Arc<RwLock<Tokens>>,
    last_rotated: Arc<RwLock<Option<DateTime<Utc>>>>,
    store: Arc<dyn TokenStore>,
    state_tx: Arc<watch::Sender<SessionState>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &*self.state_tx.borrow())
            .field("store", &self.store)
            .finish()
    }
}

impl Session {
    /// Start unauthenticated; call [`Session::restore`] to pick up a stored pair.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            tokens: Arc::new(RwLock::new(Tokens::default())),
            last_rotated: Arc::new(RwLock::new(None)),
            store,
            state_tx: Arc::new(state_tx),
        }
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.access.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.refresh.clone()
    }

    pub async fn state(&self) -> SessionState {
        self.tokens.read().await.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Time of the last login or refresh.
    pub async fn last_rotated(&self) -> Option<DateTime<Utc>> {
        *self.last_rotated.read().await
    }

    /// Load persisted tokens into memory.
    ///
    /// Storage is only consulted while memory holds nothing. A failed read
    /// counts as "no session". Returns true when a token was restored.
    pub async fn restore(&self) -> bool {
        let mut tokens = self.tokens.write().await;
        if tokens.access.is_some() || tokens.refresh.is_some() {
            debug!("session already populated, skipping storage read");
            return false;
        }

        let stored = match self.store.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return false,
            Err(err) => {
                warn!(error = %err, "failed to read stored session, starting unauthenticated");
                return false;
            }
        };

        *tokens = Tokens {
            access: stored.access,
            refresh: stored.refresh,
        };
        self.publish(&tokens);
        true
    }

    /// Replace both tokens (login).
    pub async fn set_tokens(&self, pair: &TokenPair) -> Result<(), StorageError> {
        let mut tokens = self.tokens.write().await;
        let next = Tokens {
            access: Some(pair.access.clone()),
            refresh: Some(pair.refresh.clone()),
        };
        self.store.save(&next.to_stored())?;

        *tokens = next;
        self.touch_rotated().await;
        self.publish(&tokens);
        Ok(())
    }

    /// Swap in a refreshed access token. The refresh token is kept as-is.
    ///
    /// Returns `Ok(false)` without writing anything when the held refresh
    /// token is no longer `expected_refresh` (logout or re-login raced the
    /// refresh call).
    pub async fn replace_access_token(
        &self,
        expected_refresh: &str,
        access: String,
    ) -> Result<bool, StorageError> {
        let mut tokens = self.tokens.write().await;
        if tokens.refresh.as_deref() != Some(expected_refresh) {
            debug!("session changed during refresh, discarding new access token");
            return Ok(false);
        }

        let next = Tokens {
            access: Some(access),
            refresh: tokens.refresh.clone(),
        };
        self.store.save(&next.to_stored())?;

        *tokens = next;
        self.touch_rotated().await;
        self.publish(&tokens);
        Ok(true)
    }

    /// Drop both tokens. Storage failures are logged; memory is always cleared.
    pub async fn clear(&self) {
        let mut tokens = self.tokens.write().await;
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to remove stored tokens");
        }
        *tokens = Tokens::default();
        *self.last_rotated.write().await = None;
        self.publish(&tokens);
    }

    async fn touch_rotated(&self) {
        let now = Utc::now();
        *self.last_rotated.write().await = Some(now);
        debug!("Token rotated at {:?}", now);
    }

    fn publish(&self, tokens: &Tokens) {
        let state = tokens.state();
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}
