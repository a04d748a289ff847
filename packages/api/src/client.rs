//! Shared handle to the hosted backend.
//!
//! [`BackendClient`] is cheap to clone; every clone shares the same HTTP client,
//! session slot, auth-event channel and local store. Views take it from context
//! and pass it to the functions in [`crate::queries`].

use std::sync::{Arc, RwLock};

use chrono::Utc;
use portal::PortalConfig;
use reqwest::header::CONTENT_RANGE;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use store::{KeyValueStore, MemoryStore};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::auth::{AuthClient, AuthEvent, Session};
use crate::error::ApiError;
use crate::query::{parse_content_range, Query};

/// Buffered auth events per subscriber before the slowest one starts lagging.
const AUTH_EVENT_CAPACITY: usize = 16;

pub type SharedStore = Arc<dyn KeyValueStore + Send + Sync>;

#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    config: PortalConfig,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
    storage: SharedStore,
    /// Serialises token refreshes so concurrent requests spend the refresh token once.
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("url", &self.inner.config.backend.url)
            .field("signed_in", &self.session().is_some())
            .finish()
    }
}

impl PartialEq for BackendClient {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl BackendClient {
    pub fn new(config: PortalConfig, storage: SharedStore) -> Result<Self, ApiError> {
        reqwest::Url::parse(config.backend.base_url())
            .map_err(|e| ApiError::Config(format!("invalid backend url {:?}: {e}", config.backend.url)))?;
        if config.backend.anon_key.is_empty() {
            warn!("no anon key configured; requests will likely be rejected");
        }

        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_secs(config.query.timeout_secs));
        let http = builder.build()?;

        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                config,
                session: RwLock::new(None),
                events,
                storage,
                refresh_lock: Mutex::new(()),
            }),
        })
    }

    /// Client whose session lives only as long as the process.
    pub fn in_memory(config: PortalConfig) -> Result<Self, ApiError> {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Load `.env` if present and apply `PORTAL_*` overrides to `config`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env(config: PortalConfig, storage: SharedStore) -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();
        Self::new(config.with_overrides(|key| std::env::var(key).ok()), storage)
    }

    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.session.read().ok().and_then(|s| s.clone())
    }

    pub(crate) fn set_session(&self, session: Option<Session>) {
        if let Ok(mut slot) = self.inner.session.write() {
            *slot = session;
        }
    }

    pub(crate) fn storage(&self) -> &SharedStore {
        &self.inner.storage
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn emit(&self, event: AuthEvent) {
        // No receivers is fine.
        let _ = self.inner.events.send(event);
    }

    pub(crate) fn subscribe_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    /// Attach `apikey` and a bearer token: the session's access token, else the anon key.
    pub(crate) fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let anon = &self.inner.config.backend.anon_key;
        let token = self
            .session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| anon.clone());
        builder.header("apikey", anon).bearer_auth(token)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.inner.config.backend.rest_url())
    }

    /// Send the request built by `build`, retrying transport errors and 5xx
    /// responses up to `query.retries` extra times. Non-success responses are
    /// turned into [`ApiError::Status`].
    pub(crate) async fn send<F>(&self, label: &str, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let attempts = self.inner.config.query.retries + 1;
        let mut attempt = 1;
        loop {
            let err = match build().send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    ApiError::from_status(status, &body)
                }
                Err(e) => ApiError::Http(e),
            };
            if attempt >= attempts || !err.is_retryable() {
                return Err(err);
            }
            warn!("{label}: attempt {attempt}/{attempts} failed ({err}), retrying");
            attempt += 1;
        }
    }

    /// Like [`send`](Self::send) with the session's bearer token. An expired
    /// session is refreshed first, and a 401 answer gets one refresh and retry.
    /// A session that cannot be refreshed is signed out.
    async fn send_authorized<F>(&self, label: &str, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        if let Some(session) = self.session() {
            if session.is_expired(Utc::now().timestamp()) {
                self.refresh_session(&session).await?;
            }
        }

        let sent_with = self.session();
        match self.send(label, || self.authorize(build())).await {
            Err(e) if e.is_unauthorized() => {
                let Some(session) = sent_with else {
                    return Err(e);
                };
                debug!("{label}: access token rejected, refreshing");
                if self.refresh_session(&session).await? {
                    self.send(label, || self.authorize(build())).await
                } else {
                    Err(ApiError::NotAuthenticated)
                }
            }
            other => other,
        }
    }

    /// Replace `stale` with a refreshed session. Returns whether a session is
    /// in place afterwards; `false` means it was dropped and signed out.
    async fn refresh_session(&self, stale: &Session) -> Result<bool, ApiError> {
        let _guard = self.inner.refresh_lock.lock().await;
        let current = self.session();
        if current.as_ref().map(|s| s.access_token.as_str()) != Some(stale.access_token.as_str()) {
            // Refreshed or signed out while waiting for the lock.
            return Ok(current.is_some());
        }

        let auth = self.auth();
        let Some(refresh_token) = stale.refresh_token.as_deref() else {
            info!("session for {} expired without a refresh token", stale.user.id);
            auth.expire();
            return Ok(false);
        };
        match auth.refresh(refresh_token).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_retryable() => Err(e),
            Err(e) => {
                warn!("could not refresh session: {e}");
                auth.expire();
                Ok(false)
            }
        }
    }

    /// Rows matching `query`.
    pub async fn fetch<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, ApiError> {
        let table = query.table_name();
        debug!("fetch {table} ({} filters)", query.filter_count());
        let url = self.table_url(table);
        let params = query.params();
        let response = self
            .send_authorized(table, || self.inner.http.get(&url).query(&params))
            .await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// First row matching `query`, if any.
    pub async fn fetch_one<T: DeserializeOwned>(&self, query: Query) -> Result<Option<T>, ApiError> {
        let rows = self.fetch(&query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Exact number of rows matching `query`, without transferring them.
    pub async fn count(&self, query: &Query) -> Result<usize, ApiError> {
        let table = query.table_name();
        debug!("count {table} ({} filters)", query.filter_count());
        let url = self.table_url(table);
        let params = query.params();
        let response = self
            .send_authorized(table, || {
                self.inner
                    .http
                    .head(&url)
                    .query(&params)
                    .header("Prefer", "count=exact")
            })
            .await?;
        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or(ApiError::MissingCount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthEvent, Session};
    use portal::{AuthUser, Profile};
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, retries: u32) -> BackendClient {
        BackendClient::in_memory(PortalConfig::new(server.uri(), "anon").with_retries(retries))
            .unwrap()
    }

    #[test]
    fn test_rejects_bad_url() {
        let err = BackendClient::in_memory(PortalConfig::new("not a url", "anon")).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[tokio::test]
    async fn test_fetch_renders_query_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("status", "eq.active"))
            .and(query_param("order", "full_name.asc"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": Uuid::from_u128(1), "full_name": "Siti Aminah", "status": "active"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let rows: Vec<Profile> = client(&server, 0)
            .fetch(
                &Query::table("profiles")
                    .eq("status", "active")
                    .order("full_name", crate::Direction::Ascending),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].full_name, "Siti Aminah");
    }

    #[tokio::test]
    async fn test_session_token_is_used() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/polls"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, 0);
        client.set_session(Some(Session {
            access_token: "user-token".to_string(),
            refresh_token: None,
            expires_at: None,
            user: AuthUser {
                id: Uuid::from_u128(7),
                email: None,
            },
        }));
        let rows: Vec<serde_json::Value> = client.fetch(&Query::table("polls")).await.unwrap();
        assert!(rows.is_empty());
    }

    fn session(access_token: &str, refresh_token: Option<&str>, expires_at: Option<i64>) -> Session {
        Session {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.map(str::to_string),
            expires_at,
            user: AuthUser {
                id: Uuid::from_u128(9),
                email: None,
            },
        }
    }

    async fn mount_refresh(server: &MockServer, refresh_token: &str, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_json(json!({ "refresh_token": refresh_token })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": access_token,
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "r2",
                "user": {"id": Uuid::from_u128(9), "email": "ketua@example.com"}
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_expired_session_is_refreshed_once_before_requests() {
        let server = MockServer::start().await;
        mount_refresh(&server, "r1", "at-new").await;
        Mock::given(method("HEAD"))
            .and(path("/rest/v1/polls"))
            .and(header("authorization", "Bearer at-new"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-1/2"))
            .expect(2)
            .mount(&server)
            .await;

        let client = client(&server, 0);
        client.set_session(Some(session("at-old", Some("r1"), Some(0))));
        let mut events = client.auth().on_auth_state_change();

        let query = Query::table("polls");
        let (first, second) = futures::join!(client.count(&query), client.count(&query));
        assert_eq!(first.unwrap(), 2);
        assert_eq!(second.unwrap(), 2);

        let current = client.session().unwrap();
        assert_eq!(current.access_token, "at-new");
        assert_eq!(current.refresh_token.as_deref(), Some("r2"));
        let event = events.next().await.unwrap();
        assert!(matches!(event, AuthEvent::TokenRefreshed(_)));
        assert_eq!(event.session(), Some(&current));
    }

    #[tokio::test]
    async fn test_rejected_token_is_refreshed_and_retried() {
        let server = MockServer::start().await;
        mount_refresh(&server, "r1", "at-new").await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/polls"))
            .and(header("authorization", "Bearer at-old"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "JWT expired"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/polls"))
            .and(header("authorization", "Bearer at-new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, 0);
        client.set_session(Some(session("at-old", Some("r1"), None)));
        let rows: Vec<serde_json::Value> = client.fetch(&Query::table("polls")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(client.session().unwrap().access_token, "at-new");
    }

    #[tokio::test]
    async fn test_rejected_token_without_refresh_signs_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/polls"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, 0);
        client.set_session(Some(session("at-old", None, None)));
        let mut events = client.auth().on_auth_state_change();

        let err = client
            .fetch::<serde_json::Value>(&Query::table("polls"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
        assert!(err.is_unauthorized());
        assert!(client.session().is_none());
        let event = events.next().await.unwrap();
        assert_eq!(event, AuthEvent::SignedOut);
        assert_eq!(event.session(), None);
    }

    #[tokio::test]
    async fn test_expired_session_without_refresh_falls_back_to_anon() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/gallery"))
            .and(header("authorization", "Bearer anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, 0);
        client.set_session(Some(session("at-old", None, Some(0))));
        let rows: Vec<serde_json::Value> = client.fetch(&Query::table("gallery")).await.unwrap();
        assert!(rows.is_empty());
        assert!(client.session().is_none());
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/polls"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/polls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let rows: Vec<serde_json::Value> =
            client(&server, 1).fetch(&Query::table("polls")).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server, 2)
            .fetch::<serde_json::Value>(&Query::table("polls"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "bad filter"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server, 3)
            .fetch::<serde_json::Value>(&Query::table("polls"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "backend returned 400: bad filter");
    }

    #[tokio::test]
    async fn test_unknown_enum_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": Uuid::from_u128(1), "full_name": "X", "status": "suspended"}
            ])))
            .mount(&server)
            .await;

        let err = client(&server, 0)
            .fetch::<Profile>(&Query::table("profiles"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_count_reads_content_range() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/rest/v1/polls"))
            .and(query_param("status", "eq.active"))
            .and(header("prefer", "count=exact"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-2/3"))
            .expect(1)
            .mount(&server)
            .await;

        let count = client(&server, 0)
            .count(&Query::table("polls").eq("status", "active"))
            .await
            .unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_count_without_header() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = client(&server, 0)
            .count(&Query::table("polls"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingCount));
    }
}
