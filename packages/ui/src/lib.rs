//! Shared UI for the membership portal.
//!
//! Context layout expected by the components in this crate, from the root
//! down:
//!
//! - [`api::BackendClient`] and [`api::SharedStore`] contexts (provided by the
//!   platform binary),
//! - [`RenderErrorTrap`], [`Toaster`] and [`AuthProvider`],
//! - the platform router, whose routes render the views in [`views`].

use std::time::Duration;

use dioxus::prelude::*;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub const PORTAL_CSS: Asset = asset!("/assets/portal.css");

mod auth;
pub use auth::{use_auth, use_backend, use_capabilities, AuthProvider, LogoutButton};

pub mod toast;
pub use toast::{use_toasts, Toaster, Toasts};

mod report;
pub use report::{or_default, report_error};

mod error_trap;
pub use error_trap::{ErrorCounter, RenderErrorTrap};

mod theme;
pub use theme::{apply_theme, load_theme, save_theme, use_theme, use_theme_provider, ThemeSignal, ThemeToggle};

mod storage;
pub use storage::make_store;

pub mod download;
pub use download::{download_csv, DownloadError};

mod cards;
pub use cards::{EmptyState, InsightList, Loading, StatCard};

pub mod chart;
pub use chart::BarChart;

mod navbar;
pub use navbar::{NavBadge, Navbar, UserMenu};

pub mod views;

/// Sleep without blocking the UI thread.
pub(crate) async fn sleep(duration: Duration) {
    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::sleep(duration).await;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::sleep(duration).await;
    }
}
