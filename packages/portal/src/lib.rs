//! Domain types and client-side computations for the membership portal.
//!
//! Nothing in this crate performs I/O: rows come in already fetched, and every
//! function is a plain reduction over them.

pub mod activities;
pub mod aggregate;
pub mod config;
pub mod export;
pub mod format;
pub mod gallery;
pub mod insights;
pub mod models;
pub mod notifications;
pub mod report;
pub mod roles;
pub mod session;
pub mod stats;
pub mod theme;

pub use activities::UpcomingActivity;
pub use aggregate::{sum_by, FinanceSummary, MonthKey};
pub use config::PortalConfig;
pub use export::{CsvRow, ExportError, Report};
pub use insights::Insight;
pub use models::{
    Activity, ActivityRegistration, ActivityStatus, ExpenseRecord, GalleryItem, IncomeRecord,
    MembershipStatus, MonthlyDue, Notification, PaymentStatus, Poll, PollStatus, Profile, Role,
    RoleAssignment,
};
pub use report::ErrorReport;
pub use roles::{Capabilities, RoleSet};
pub use session::{AuthUser, SessionState};
pub use stats::{DashboardStats, LandingStats, MemberStats};
pub use theme::Theme;
