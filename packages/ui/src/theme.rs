//! Light/dark theme preference.
//!
//! The preference is one string under [`store::THEME_KEY`]. It is applied as a
//! `data-theme` attribute on `<html>`; `System` removes the attribute so the
//! stylesheet's `prefers-color-scheme` rules decide.

use api::SharedStore;
use dioxus::prelude::*;
use portal::Theme;
use store::{KeyValueStore, StoreError, THEME_KEY};

use crate::icons::{FaCircleHalfStroke, FaMoon, FaSun};
use crate::Icon;

pub type ThemeSignal = Signal<Theme>;

pub fn load_theme<S: KeyValueStore + ?Sized>(store: &S, fallback: Theme) -> Theme {
    store
        .get(THEME_KEY)
        .and_then(|value| Theme::parse(&value))
        .unwrap_or(fallback)
}

pub fn save_theme<S: KeyValueStore + ?Sized>(store: &S, theme: Theme) -> Result<(), StoreError> {
    store.set(THEME_KEY, theme.as_str())
}

pub fn apply_theme(theme: Theme) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        else {
            return;
        };
        let _ = match theme {
            Theme::System => root.remove_attribute("data-theme"),
            other => root.set_attribute("data-theme", other.as_str()),
        };
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::debug!("theme {} (not applied off the web)", theme.as_str());
    }
}

/// Provide the theme signal, loaded from `store`, and keep `<html>` in sync.
pub fn use_theme_provider(store: SharedStore, fallback: Theme) -> ThemeSignal {
    let theme = use_context_provider(|| Signal::new(load_theme(store.as_ref(), fallback)));
    use_effect(move || apply_theme(theme()));
    theme
}

pub fn use_theme() -> ThemeSignal {
    use_context::<ThemeSignal>()
}

/// Cycles light, dark and system, persisting each choice.
#[component]
pub fn ThemeToggle() -> Element {
    let mut theme = use_theme();
    let store = use_context::<SharedStore>();

    let onclick = move |_| {
        let next = theme().next();
        if let Err(e) = save_theme(store.as_ref(), next) {
            tracing::warn!("could not save theme: {e}");
        }
        theme.set(next);
    };

    let title = format!("Theme: {}", theme().as_str());
    let icon = match theme() {
        Theme::Light => rsx! { Icon { icon: FaSun, width: 16, height: 16 } },
        Theme::Dark => rsx! { Icon { icon: FaMoon, width: 16, height: 16 } },
        Theme::System => rsx! { Icon { icon: FaCircleHalfStroke, width: 16, height: 16 } },
    };
    rsx! {
        button {
            class: "theme-toggle",
            title: "{title}",
            onclick: onclick,
            {icon}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    #[test]
    fn test_load_and_save() {
        let store = MemoryStore::new();
        assert_eq!(load_theme(&store, Theme::System), Theme::System);

        save_theme(&store, Theme::Dark).unwrap();
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(load_theme(&store, Theme::System), Theme::Dark);

        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(load_theme(&store, Theme::Light), Theme::Light);
    }
}
