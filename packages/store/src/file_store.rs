//! # Filesystem-backed key/value store
//!
//! [`FileStore`] keeps one file per key under a base directory. It backs the
//! portal when it runs outside a browser (tests, desktop builds).
//!
//! ```text
//! <base_dir>/
//! ├── portal.theme
//! └── portal.auth.session
//! ```

use std::path::PathBuf;

use crate::error::StoreError;
use crate::kv::KeyValueStore;

#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn path(&self, key: &str) -> PathBuf {
        // Keys are fixed constants, but keep them from escaping the base dir.
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' { c } else { '_' })
            .collect();
        self.base.join(name)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.base)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
