use api::queries;
use dioxus::prelude::*;
use portal::{MemberStats, Profile};

use crate::{report_error, use_backend, use_capabilities, EmptyState, Loading, StatCard};

/// Whether `profile` matches the search box. Matches name, house number and
/// member number, case-insensitively.
fn matches(profile: &Profile, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hit = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&needle));
    hit(Some(profile.full_name.as_str()))
        || hit(profile.house_number.as_deref())
        || hit(profile.member_number.as_deref())
}

/// Member directory. Only shown to members who can manage membership.
#[component]
pub fn MembersView() -> Element {
    let caps = use_capabilities();
    if !caps.can_manage_members {
        return rsx! {
            section {
                class: "view members",
                h1 { "Members" }
                EmptyState { message: "Only the board can view the member directory." }
            }
        };
    }

    rsx! { MemberDirectory {} }
}

#[component]
fn MemberDirectory() -> Element {
    let client = use_backend();
    let mut profiles = use_signal(|| Option::<Vec<Profile>>::None);
    let mut search = use_signal(String::new);

    let _loader = use_resource(move || {
        let client = client.clone();
        async move {
            let rows = match queries::fetch_profiles(&client).await {
                Ok(rows) => rows,
                Err(e) => {
                    report_error("Loading members", &e, true);
                    Vec::new()
                }
            };
            profiles.set(Some(rows));
        }
    });

    let Some(all) = profiles() else {
        return rsx! { Loading {} };
    };
    let stats = MemberStats::from_profiles(&all);
    let visible: Vec<Profile> = all.into_iter().filter(|p| matches(p, &search())).collect();

    rsx! {
        section {
            class: "view members",
            h1 { "Members" }
            div {
                class: "stat-grid",
                StatCard { label: "Total", value: "{stats.total}" }
                StatCard { label: "Active", value: "{stats.active}" }
                StatCard { label: "Pending", value: "{stats.pending}" }
                StatCard { label: "Inactive", value: "{stats.inactive}" }
            }
            input {
                class: "search",
                r#type: "search",
                placeholder: "Search by name, house or member number",
                value: "{search}",
                oninput: move |evt| search.set(evt.value()),
            }
            if visible.is_empty() {
                EmptyState { message: "No members match." }
            } else {
                table {
                    class: "table",
                    thead {
                        tr {
                            th { "Name" }
                            th { "House" }
                            th { "Member no." }
                            th { "Phone" }
                            th { "Status" }
                        }
                    }
                    tbody {
                        for profile in visible {
                            tr {
                                key: "{profile.id}",
                                td {
                                    span { class: "avatar", {profile.initials()} }
                                    "{profile.full_name}"
                                }
                                td { {profile.house_number.clone().unwrap_or_default()} }
                                td { {profile.member_number.clone().unwrap_or_default()} }
                                td { {profile.phone.clone().unwrap_or_default()} }
                                td {
                                    span {
                                        class: "status status--{profile.status.as_str()}",
                                        {profile.status.label()}
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal::models::MembershipStatus;
    use uuid::Uuid;

    fn profile(name: &str, house: Option<&str>, number: Option<&str>) -> Profile {
        Profile {
            id: Uuid::nil(),
            full_name: name.to_string(),
            house_number: house.map(str::to_string),
            phone: None,
            email: None,
            status: MembershipStatus::Active,
            member_number: number.map(str::to_string),
            avatar_url: None,
            created_at: None,
        }
    }

    #[test]
    fn test_search_matches_any_field() {
        let p = profile("Budi Santoso", Some("C-07"), Some("RW-0042"));
        assert!(matches(&p, ""));
        assert!(matches(&p, "  budi "));
        assert!(matches(&p, "c-07"));
        assert!(matches(&p, "0042"));
        assert!(!matches(&p, "siti"));
    }

    #[test]
    fn test_search_skips_missing_fields() {
        let p = profile("Siti Rahma", None, None);
        assert!(!matches(&p, "b-12"));
        assert!(matches(&p, "rahma"));
    }
}
