//! Authentication context and hooks for the UI.

use api::{queries, BackendClient, Session};
use dioxus::prelude::*;
use portal::{Capabilities, SessionState};
use tracing::{error, info};

use crate::report::report_error;

/// The backend client provided by the app root.
pub fn use_backend() -> BackendClient {
    use_context::<BackendClient>()
}

/// Get the current session state.
/// Returns a signal that updates when the user signs in or out.
pub fn use_auth() -> Signal<SessionState> {
    use_context::<Signal<SessionState>>()
}

/// Capability flags of the signed-in member.
pub fn use_capabilities() -> Capabilities {
    use_auth()().capabilities()
}

/// Provider component that manages session state.
/// Wrap the router with this component, inside the [`BackendClient`] context.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let client = use_backend();
    let state = use_context_provider(|| Signal::new(SessionState::default()));

    // Restore the stored session on mount, then follow auth events for the
    // lifetime of the app.
    use_hook(move || {
        spawn(async move {
            let auth = client.auth();
            let mut events = auth.on_auth_state_change();

            match auth.get_session().await {
                Ok(Some(session)) => load_session(&client, state, session).await,
                Ok(None) => finish_loading(state),
                Err(e) => {
                    report_error("Restoring session", &e, false);
                    finish_loading(state);
                }
            }

            while let Some(event) = events.next().await {
                match event.session() {
                    Some(session) => load_session(&client, state, session.clone()).await,
                    None => {
                        let mut state = state;
                        state.write().sign_out();
                    }
                }
            }
        })
    });

    rsx! {
        {children}
    }
}

fn finish_loading(mut state: Signal<SessionState>) {
    state.write().loading = false;
}

/// Switch to `session` and fetch its profile and roles. Fetch failures are
/// logged only; the session continues without a profile and with no roles.
async fn load_session(client: &BackendClient, mut state: Signal<SessionState>, session: Session) {
    let user_id = session.user.id;
    {
        let current = state.peek();
        if current.user_id() == Some(user_id)
            && current.access_token.as_deref() == Some(session.access_token.as_str())
            && (current.profile.is_some() || !current.roles.is_empty())
        {
            return;
        }
    }
    state.set(SessionState::signed_in(session.user, session.access_token));

    let (profile, roles) = match queries::fetch_profile_and_roles(client, user_id).await {
        Ok(rows) => rows,
        Err(e) => {
            error!("could not load profile for {user_id}: {e}");
            (None, Vec::new())
        }
    };

    // Signed out (or switched user) while fetching.
    let current = state.peek().clone();
    if current.user_id() != Some(user_id) {
        return;
    }
    let next = current.with_profile(profile, &roles);
    info!(
        "session ready for {user_id}: {} role(s)",
        next.roles.iter().count()
    );
    state.set(next);
}

/// Button to sign the current member out.
#[component]
pub fn LogoutButton(
    #[props(default = "Sign out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let client = use_backend();

    let onclick = move |_| {
        let client = client.clone();
        async move {
            if let Err(e) = client.auth().sign_out().await {
                report_error("Signing out", &e, true);
            }
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
