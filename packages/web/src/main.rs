use api::{ApiError, BackendClient, SharedStore};
use dioxus::prelude::*;
use portal::config::{ENV_ANON_KEY, ENV_BACKEND_URL};
use portal::PortalConfig;

use ui::{use_theme_provider, AuthProvider, RenderErrorTrap, Toaster};
use views::{
    Activities, Dashboard, Finance, Gallery, Landing, Login, Members, NotFound, Notifications,
    PortalShell, Reports,
};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Landing {},
    #[route("/login")]
    Login {},
    #[layout(PortalShell)]
        #[route("/dashboard")]
        Dashboard {},
        #[route("/finance")]
        Finance {},
        #[route("/activities")]
        Activities {},
        #[route("/gallery")]
        Gallery {},
        #[route("/members")]
        Members {},
        #[route("/notifications")]
        Notifications {},
        #[route("/reports")]
        Reports {},
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

const FAVICON: Asset = asset!("/assets/favicon.svg");
const MAIN_CSS: Asset = asset!("/assets/main.css");
const PORTAL_TOML: &str = include_str!("../portal.toml");

fn main() {
    #[cfg(debug_assertions)]
    let level = tracing::Level::DEBUG;
    #[cfg(not(debug_assertions))]
    let level = tracing::Level::INFO;
    dioxus::logger::init(level).expect("failed to initialise logger");

    dioxus::launch(App);
}

/// Embedded `portal.toml` with build-time environment overrides.
fn load_config() -> PortalConfig {
    let config = PortalConfig::from_toml(PORTAL_TOML).unwrap_or_else(|e| {
        tracing::error!("invalid embedded {}: {e}", PortalConfig::filename());
        PortalConfig::default()
    });
    config.with_overrides(|key| match key {
        ENV_BACKEND_URL => option_env!("PORTAL_BACKEND_URL").map(str::to_string),
        ENV_ANON_KEY => option_env!("PORTAL_ANON_KEY").map(str::to_string),
        _ => None,
    })
}

/// Client for `config`, falling back to the default backend when `config` is rejected.
fn make_client(config: PortalConfig, storage: SharedStore) -> Result<BackendClient, ApiError> {
    #[cfg(not(target_arch = "wasm32"))]
    let result = BackendClient::from_env(config, storage.clone());
    #[cfg(target_arch = "wasm32")]
    let result = BackendClient::new(config, storage.clone());

    result.or_else(|e| {
        tracing::error!("backend configuration rejected, using defaults: {e}");
        BackendClient::new(PortalConfig::default(), storage)
    })
}

/// Provides `client` to everything below it.
#[component]
fn BackendScope(client: BackendClient, children: Element) -> Element {
    use_context_provider(move || client);
    rsx! {
        {children}
    }
}

#[component]
fn App() -> Element {
    let storage = use_context_provider(ui::make_store);
    let config = use_hook(load_config);
    let default_theme = config.display.default_theme;
    let client_storage = storage.clone();
    let client = use_hook(move || make_client(config, client_storage).map_err(|e| e.to_string()));
    use_theme_provider(storage, default_theme);

    let body = match client {
        Ok(client) => rsx! {
            BackendScope {
                client,
                RenderErrorTrap {
                    Toaster {
                        AuthProvider {
                            Router::<Route> {}
                        }
                    }
                }
            }
        },
        Err(message) => rsx! {
            div {
                class: "login-container",
                p { class: "form-error", "Backend unavailable: {message}" }
            }
        },
    };

    rsx! {
        // Global app resources
        document::Link { rel: "icon", href: FAVICON }
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        document::Link { rel: "stylesheet", href: ui::PORTAL_CSS }

        {body}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use store::MemoryStore;

    #[test]
    fn test_rejected_config_falls_back_to_default_backend() {
        let client = make_client(
            PortalConfig::new("not a url", "anon"),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();
        assert_ne!(client.config().backend.url, "not a url");
    }
}
