use tracing::{info, warn};

/// Structured session events under the `audit` target.
#[derive(Debug, Clone, Default)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn login_success(&self, email: &str) {
        info!(target: "audit", event = "login_success", email);
    }

    pub fn login_failure(&self, email: &str, status: Option<u16>, reason: &str) {
        warn!(target: "audit", event = "login_failure", email, status = status.unwrap_or(0), reason);
    }

    pub fn logout(&self) {
        info!(target: "audit", event = "logout");
    }

    pub fn session_restored(&self, refresh_capable: bool) {
        info!(target: "audit", event = "session_restored", refresh_capable);
    }

    pub fn token_refreshed(&self, request_id: &str) {
        info!(target: "audit", event = "token_refreshed", request_id);
    }

    pub fn refresh_failed(&self, request_id: &str, reason: &str) {
        warn!(target: "audit", event = "refresh_failed", request_id, reason);
    }
}
