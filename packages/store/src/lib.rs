//! Small key/value persistence for client-side preferences and the auth session.

pub mod error;
pub mod kv;

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod local_storage;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use local_storage::LocalStorageStore;

pub use error::StoreError;
pub use kv::{get_json, set_json, KeyValueStore, SESSION_KEY, THEME_KEY};
