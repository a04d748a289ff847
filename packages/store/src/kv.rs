//! # The [`KeyValueStore`] trait
//!
//! The portal persists exactly two things locally:
//!
//! | Key | Value |
//! |-----|-------|
//! | [`THEME_KEY`] | the theme preference string (`"light"`, `"dark"`, `"system"`) |
//! | [`SESSION_KEY`] | the auth session as JSON |
//!
//! Implementations live in sibling modules ([`crate::memory`], the native
//! filesystem store and the browser `localStorage` store). Reads swallow
//! backend failures and return `None`, so a broken store degrades to "nothing
//! saved" instead of blocking the UI; writes report errors so callers can log
//! them.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

pub const THEME_KEY: &str = "portal.theme";
pub const SESSION_KEY: &str = "portal.auth.session";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON value. Undecodable data reads as `None`.
pub fn get_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("discarding undecodable value under {key}: {e}");
            None
        }
    }
}

pub fn set_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
