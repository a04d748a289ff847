//! Process-wide session state: who is signed in, their profile and roles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Profile, RoleAssignment};
use crate::roles::{Capabilities, RoleSet};

/// The authenticated user as reported by the auth endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub user: Option<AuthUser>,
    pub access_token: Option<String>,
    pub profile: Option<Profile>,
    pub roles: RoleSet,
    /// True until the first session lookup has finished.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            access_token: None,
            profile: None,
            roles: RoleSet::default(),
            loading: true,
        }
    }
}

impl SessionState {
    /// A session for a freshly authenticated user. Profile and roles are left
    /// empty until they are fetched for the new user id.
    pub fn signed_in(user: AuthUser, access_token: String) -> Self {
        Self {
            user: Some(user),
            access_token: Some(access_token),
            profile: None,
            roles: RoleSet::default(),
            loading: false,
        }
    }

    /// Attach the profile and role rows fetched for the current user. Role rows
    /// for any other user id are ignored.
    pub fn with_profile(mut self, profile: Option<Profile>, roles: &[RoleAssignment]) -> Self {
        let Some(user_id) = self.user_id() else {
            return self;
        };
        self.profile = profile.filter(|p| p.id == user_id);
        self.roles = RoleSet::new(
            roles
                .iter()
                .filter(|r| r.user_id == user_id)
                .map(|r| r.role),
        );
        self
    }

    /// Forget everything about the previous user.
    pub fn sign_out(&mut self) {
        *self = Self {
            loading: false,
            ..Self::default()
        };
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Protected pages send the visitor to the login page.
    pub fn needs_login(&self) -> bool {
        !self.loading && !self.is_authenticated()
    }

    /// The login page moves on once a session has been applied.
    pub fn is_ready(&self) -> bool {
        !self.loading && self.is_authenticated()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::from_roles(&self.roles)
    }

    /// Name shown in the navigation bar.
    pub fn display_name(&self) -> &str {
        if let Some(profile) = &self.profile {
            return &profile.full_name;
        }
        self.user
            .as_ref()
            .and_then(|u| u.email.as_deref())
            .unwrap_or("Guest")
    }
}
