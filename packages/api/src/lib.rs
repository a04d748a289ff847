//! # API crate: client for the hosted backend
//!
//! Everything that crosses the network lives here. Views never build URLs
//! themselves: they hold a [`BackendClient`] from context and call the
//! functions in [`queries`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`client`] | [`BackendClient`]: shared HTTP client, auth headers, retry, `fetch`/`count` |
//! | [`query`] | [`Query`] builder rendering table reads into REST query pairs |
//! | [`auth`] | Password sign-in, session restore/refresh, sign-out, auth-state events |
//! | [`realtime`] | Per-table row-change subscriptions over the realtime websocket |
//! | [`queries`] | Typed data access for every dashboard widget and report |
//! | [`error`] | [`ApiError`] |
//!
//! ## Targets
//!
//! The crate builds for both wasm32 (the web app) and native (tests, desktop
//! runs). Only the realtime transport differs: the browser `WebSocket` on
//! wasm, `tokio-tungstenite` on native.

pub mod auth;
pub mod client;
pub mod error;
pub mod queries;
pub mod query;
pub mod realtime;

pub use auth::{AuthClient, AuthEvent, AuthSubscription, Session};
pub use client::{BackendClient, SharedStore};
pub use error::ApiError;
pub use queries::Dashboard;
pub use query::{Direction, Query};
pub use realtime::{ChangeEvent, ChangeKind, RealtimeClient, RealtimeSubscription};
