//! # Browser `localStorage` store
//!
//! [`LocalStorageStore`] is the [`KeyValueStore`] used on the web platform. Every
//! call looks the storage object up again through `window.localStorage`; when it
//! is unavailable (private browsing, sandboxed iframes) reads return `None` and
//! writes return [`StoreError::Unavailable`].

use crate::error::StoreError;
use crate::kv::KeyValueStore;

#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage(&self) -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self.storage().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StoreError::Write(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let storage = self.storage().ok_or(StoreError::Unavailable)?;
        storage
            .remove_item(key)
            .map_err(|e| StoreError::Write(format!("{e:?}")))
    }
}
