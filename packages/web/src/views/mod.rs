mod landing;
pub use landing::Landing;

mod login;
pub use login::Login;

mod shell;
pub use shell::PortalShell;

mod pages;
pub use pages::{Activities, Dashboard, Finance, Gallery, Members, Notifications, Reports};

mod not_found;
pub use not_found::NotFound;
