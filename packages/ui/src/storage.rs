//! Platform-appropriate local store for the session and theme preference.
//!
//! - **Web** (WASM + `web` feature): `localStorage` via [`store::LocalStorageStore`]
//! - **Native**: one file per key under `<data_dir>/residents-portal/`
//! - **WASM without `web`**: in memory, forgotten on reload

use std::sync::Arc;

use api::SharedStore;

pub fn make_store() -> SharedStore {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        Arc::new(store::LocalStorageStore::new())
    }
    #[cfg(all(target_arch = "wasm32", not(feature = "web")))]
    {
        Arc::new(store::MemoryStore::new())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let base = dirs::data_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("residents-portal");
        Arc::new(store::FileStore::new(base))
    }
}
