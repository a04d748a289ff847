//! Password sign-in against the hosted auth endpoint.
//!
//! The current [`Session`] lives in the [`BackendClient`] and is mirrored to the
//! local store under [`store::SESSION_KEY`] so a reload stays signed in. Every
//! change is broadcast as an [`AuthEvent`]; UI code listens through
//! [`AuthClient::on_auth_state_change`].

mod session;

use chrono::Utc;
use serde_json::json;
use store::SESSION_KEY;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use crate::client::BackendClient;
use crate::error::ApiError;

pub use session::{AuthEvent, Session, EXPIRY_MARGIN_SECS};
use session::TokenResponse;

#[derive(Clone, Debug)]
pub struct AuthClient {
    client: BackendClient,
}

impl AuthClient {
    pub(crate) fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn token_url(&self, grant_type: &str) -> String {
        format!(
            "{}/token?grant_type={grant_type}",
            self.client.config().backend.auth_url()
        )
    }

    /// The current session, restoring a persisted one on first use. An expired
    /// session is refreshed when it carries a refresh token and dropped otherwise.
    pub async fn get_session(&self) -> Result<Option<Session>, ApiError> {
        let session = match self.client.session() {
            Some(session) => session,
            None => match store::get_json::<Session, _>(self.client.storage().as_ref(), SESSION_KEY) {
                Some(session) => session,
                None => return Ok(None),
            },
        };

        if !session.is_expired(Utc::now().timestamp()) {
            self.client.set_session(Some(session.clone()));
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token else {
            info!("stored session expired");
            self.clear_local();
            return Ok(None);
        };
        match self.refresh(&refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(e) if e.is_retryable() => Err(e),
            Err(e) => {
                warn!("could not refresh session: {e}");
                self.clear_local();
                Ok(None)
            }
        }
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::Invalid("Invalid email address".to_string()));
        }
        if password.is_empty() {
            return Err(ApiError::Invalid("Password is required".to_string()));
        }

        let session = self
            .request_token("password", json!({ "email": email, "password": password }))
            .await?;
        info!("signed in as {}", session.user.id);
        self.store_session(&session);
        self.client.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    /// Exchange `refresh_token` for a fresh session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, ApiError> {
        let session = self
            .request_token("refresh_token", json!({ "refresh_token": refresh_token }))
            .await?;
        info!("session refreshed for {}", session.user.id);
        self.store_session(&session);
        self.client.emit(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    /// Revoke the session on the backend and forget it locally. The local
    /// session is cleared even when the backend call fails.
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        if self.client.session().is_some() {
            let url = format!("{}/logout", self.client.config().backend.auth_url());
            let result = self
                .client
                .send("logout", || self.client.authorize(self.client.http().post(&url)))
                .await;
            if let Err(e) = result {
                warn!("logout request failed: {e}");
            }
        }
        self.clear_local();
        info!("signed out");
        self.client.emit(AuthEvent::SignedOut);
        Ok(())
    }

    /// Drop a session the backend no longer accepts.
    pub(crate) fn expire(&self) {
        self.clear_local();
        self.client.emit(AuthEvent::SignedOut);
    }

    pub fn on_auth_state_change(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.client.subscribe_events(),
        }
    }

    async fn request_token(&self, grant_type: &str, body: serde_json::Value) -> Result<Session, ApiError> {
        let url = self.token_url(grant_type);
        let anon = &self.client.config().backend.anon_key;
        let response = self
            .client
            .send("token", || {
                self.client
                    .http()
                    .post(&url)
                    .header("apikey", anon)
                    .json(&body)
            })
            .await?;
        let text = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&text)?;
        Ok(token.into_session(Utc::now().timestamp()))
    }

    fn store_session(&self, session: &Session) {
        self.client.set_session(Some(session.clone()));
        if let Err(e) = store::set_json(self.client.storage().as_ref(), SESSION_KEY, session) {
            warn!("could not persist session: {e}");
        }
    }

    fn clear_local(&self) {
        self.client.set_session(None);
        if let Err(e) = self.client.storage().remove(SESSION_KEY) {
            warn!("could not remove persisted session: {e}");
        }
    }
}

/// Stream of [`AuthEvent`]s. Dropping it unsubscribes.
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Next event, or `None` once the client is gone. Lagged events are skipped.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("auth subscriber lagged, {skipped} events skipped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
