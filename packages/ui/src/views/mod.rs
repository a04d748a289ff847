mod activities;
pub use activities::{ActivitiesView, UpcomingList};

mod dashboard;
pub use dashboard::DashboardView;

mod finance;
pub use finance::FinanceView;

mod gallery;
pub use gallery::{GalleryGrid, GalleryView};

mod landing;
pub use landing::{LandingView, WATCHED_TABLES};

mod login;
pub use login::LoginView;

mod members;
pub use members::MembersView;

mod notifications;
pub use notifications::NotificationsView;

mod reports;
pub use reports::ReportsView;
