//! Auth session types and the token-endpoint response they are built from.

use portal::AuthUser;
use serde::{Deserialize, Serialize};

/// Seconds before `expires_at` at which a session is treated as expired.
pub const EXPIRY_MARGIN_SECS: i64 = 10;

/// A signed-in session as persisted under [`store::SESSION_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl Session {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at
            .map(|at| at <= now + EXPIRY_MARGIN_SECS)
            .unwrap_or(false)
    }
}

/// Body of a successful `/token` call.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    pub(crate) fn into_session(self, now: i64) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| now + secs));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
}

impl AuthEvent {
    /// The session carried by the event; `None` after sign-out.
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::SignedIn(s) | AuthEvent::TokenRefreshed(s) => Some(s),
            AuthEvent::SignedOut => None,
        }
    }
}
