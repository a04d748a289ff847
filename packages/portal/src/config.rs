//! # Portal configuration: `portal.toml`
//!
//! Connection details for the hosted backend plus a handful of client-side knobs.
//! The web binary embeds a `portal.toml` at build time; environment variables
//! override the backend section so one build can target several projects.
//!
//! ## Structure
//!
//! ```toml
//! [backend]
//! url = "https://project.example.co"
//! anon_key = "public-anon-key"
//!
//! [query]
//! retries = 1          # extra attempts after a failed network call
//! timeout_secs = 15
//!
//! [realtime]
//! heartbeat_secs = 30
//!
//! [display]
//! currency_prefix = "Rp"
//! default_theme = "system"
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`PortalConfig`] | Top-level config with TOML (de)serialisation and env overrides. |
//! | [`BackendConfig`] | Base URL and public anon key of the hosted project. |
//! | [`QueryConfig`] | Retry count and request timeout. |
//! | [`RealtimeConfig`] | Websocket heartbeat interval. |
//! | [`DisplayConfig`] | Currency prefix and default theme. |
//!
//! Every section derives `Default`, so an empty file is a valid configuration
//! (pointing at `http://localhost:54321`, the local development stack).

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Environment variable overriding [`BackendConfig::url`].
pub const ENV_BACKEND_URL: &str = "PORTAL_BACKEND_URL";
/// Environment variable overriding [`BackendConfig::anon_key`].
pub const ENV_ANON_KEY: &str = "PORTAL_ANON_KEY";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

fn default_backend_url() -> String {
    "http://localhost:54321".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            anon_key: String::new(),
        }
    }
}

impl BackendConfig {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url())
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.base_url())
    }

    /// `http(s)` is swapped for `ws(s)`.
    pub fn realtime_url(&self) -> String {
        let base = self.base_url();
        let ws = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        format!("{ws}/realtime/v1/websocket?apikey={}&vsn=1.0.0", self.anon_key)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Extra attempts after a failed network call. 0 disables retrying.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_retries() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
}

fn default_heartbeat_secs() -> u64 {
    30
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            heartbeat_secs: default_heartbeat_secs(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_currency_prefix")]
    pub currency_prefix: String,
    #[serde(default)]
    pub default_theme: Theme,
}

fn default_currency_prefix() -> String {
    "Rp".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_prefix: default_currency_prefix(),
            default_theme: Theme::default(),
        }
    }
}

impl PortalConfig {
    /// Config for a backend at `url` with the given public key.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            backend: BackendConfig {
                url: url.into(),
                anon_key: anon_key.into(),
            },
            ..Self::default()
        }
    }

    /// Builder method to set the retry count.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.query.retries = retries;
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "portal.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Apply [`ENV_BACKEND_URL`] / [`ENV_ANON_KEY`] as looked up by `lookup`.
    /// Blank values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_blank(ENV_BACKEND_URL) {
            self.backend.url = url;
        }
        if let Some(key) = non_blank(ENV_ANON_KEY) {
            self.backend.anon_key = key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = PortalConfig::from_toml("").unwrap();
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.query.retries, 1);
        assert_eq!(config.realtime.heartbeat_secs, 30);
        assert_eq!(config.display.currency_prefix, "Rp");
    }

    #[test]
    fn test_partial_sections() {
        let config = PortalConfig::from_toml(
            r#"
            [backend]
            url = "https://rw05.example.co/"
            anon_key = "anon"

            [query]
            retries = 3

            [display]
            default_theme = "dark"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url(), "https://rw05.example.co");
        assert_eq!(config.backend.rest_url(), "https://rw05.example.co/rest/v1");
        assert_eq!(config.query.retries, 3);
        assert_eq!(config.query.timeout_secs, 15);
        assert_eq!(config.display.default_theme, Theme::Dark);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PortalConfig::new("https://a.example.co", "key").with_retries(2);
        let text = config.to_toml().unwrap();
        assert_eq!(PortalConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_realtime_url() {
        let config = PortalConfig::new("https://a.example.co", "k1");
        assert_eq!(
            config.backend.realtime_url(),
            "wss://a.example.co/realtime/v1/websocket?apikey=k1&vsn=1.0.0"
        );
        let local = PortalConfig::new("http://localhost:54321", "k2");
        assert!(local.backend.realtime_url().starts_with("ws://localhost:54321/"));
    }

    #[test]
    fn test_overrides() {
        let config = PortalConfig::default().with_overrides(|key| match key {
            ENV_BACKEND_URL => Some("https://override.example.co".to_string()),
            ENV_ANON_KEY => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.backend.url, "https://override.example.co");
        assert_eq!(config.backend.anon_key, "");
    }
}
