//! Session credentials for the Elements backend
//!
//! A session is passed explicitly to every request that needs one. The
//! secret is wiped from memory when the context is dropped and never shows
//! up in `Debug` output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use zeroize::Zeroize;

use super::error::ApiError;

/// Header carrying the session secret on authenticated requests
pub const SESSION_HEADER: &str = "Elements-SessionSecret";

pub const DEFAULT_USER: &str = "admin";
pub const DEFAULT_LEVEL: &str = "SUPERUSER";

#[derive(Clone)]
pub struct SessionContext {
    secret: String,
    user: String,
    level: String,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    /// Wrap a session secret, rejecting values that cannot travel in a header
    pub fn new(secret: impl Into<String>) -> Result<Self, ApiError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ApiError::Validation("Session secret cannot be empty".to_string()));
        }
        if secret.chars().any(|c| c.is_control()) {
            return Err(ApiError::Validation(
                "Session secret contains control characters".to_string(),
            ));
        }

        Ok(Self {
            secret,
            user: DEFAULT_USER.to_string(),
            level: DEFAULT_LEVEL.to_string(),
            expires_at: None,
        })
    }

    pub fn with_user(mut self, user: impl Into<String>, level: impl Into<String>) -> Self {
        self.user = user.into();
        self.level = level.into();
        self
    }

    /// Expiry as reported by the backend, in milliseconds since the epoch
    pub fn with_expiry_millis(mut self, millis: i64) -> Self {
        self.expires_at = DateTime::from_timestamp_millis(millis);
        self
    }

    pub fn expose_secret(&self) -> &str {
        &self.secret
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Sessions without an expiry never expire locally
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            username: self.user.clone(),
            level: self.level.clone(),
            expires_at: self.expires_at,
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("secret", &"[REDACTED]")
            .field("user", &self.user)
            .field("level", &self.level)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Zeroize for SessionContext {
    fn zeroize(&mut self) {
        self.secret.zeroize();
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

/// Who a session belongs to; safe to print
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    pub username: String,
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}
