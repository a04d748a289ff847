//! # Data access
//!
//! One function per dataset a view needs. Each builds its [`Query`], runs it
//! through the shared [`BackendClient`] and reduces the rows with `portal`.
//! Functions that need several tables issue their requests concurrently.
//!
//! | Function | Tables | Result |
//! |----------|--------|--------|
//! | [`fetch_profile`] / [`fetch_roles`] | `profiles`, `user_roles` | one member's profile and roles |
//! | [`fetch_profiles`] / [`fetch_member_stats`] | `profiles` | member list, status counts |
//! | [`fetch_dues_for_year`] | `monthly_dues` | dues of one year |
//! | [`fetch_finance_summary`] | `monthly_dues`, `income`, `expenses` | [`FinanceSummary`] |
//! | [`fetch_upcoming_activities`] | `activities`, `activity_registrations` | activities with fill levels |
//! | [`fetch_gallery`] | `gallery` | newest first |
//! | [`fetch_notifications`] / [`fetch_unread_notifications`] | `notifications` | own and broadcast rows |
//! | [`count_active_polls`] | `polls` | count only |
//! | [`fetch_dashboard`] | all of the above | [`Dashboard`] |
//! | [`fetch_landing_stats`] | `profiles`, `activities`, `gallery` | public counts |
//! | [`fetch_report`] | per report | CSV text |

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use futures::try_join;
use portal::activities::{self, UpcomingActivity};
use portal::aggregate::{monthly_dues_total, monthly_series, FinanceSummary, MonthKey};
use portal::export::{export_rows, finance_ledger, DueLine, Report};
use portal::insights::{self, Insight, InsightInput};
use portal::{
    gallery, notifications, Activity, ActivityRegistration, DashboardStats, ExpenseRecord,
    GalleryItem, IncomeRecord, LandingStats, MemberStats, MonthlyDue, Notification, Profile,
    RoleAssignment,
};
use uuid::Uuid;

use crate::client::BackendClient;
use crate::error::ApiError;
use crate::query::{Direction, Query};

pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const USER_ROLES: &str = "user_roles";
    pub const MONTHLY_DUES: &str = "monthly_dues";
    pub const INCOME: &str = "income";
    pub const EXPENSES: &str = "expenses";
    pub const ACTIVITIES: &str = "activities";
    pub const ACTIVITY_REGISTRATIONS: &str = "activity_registrations";
    pub const GALLERY: &str = "gallery";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const POLLS: &str = "polls";
}

/// Upcoming activities shown on the dashboard.
pub const DASHBOARD_ACTIVITY_LIMIT: usize = 5;

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

pub async fn fetch_profile(client: &BackendClient, user_id: Uuid) -> Result<Option<Profile>, ApiError> {
    client
        .fetch_one(Query::table(tables::PROFILES).eq("id", user_id))
        .await
}

pub async fn fetch_roles(client: &BackendClient, user_id: Uuid) -> Result<Vec<RoleAssignment>, ApiError> {
    client
        .fetch(&Query::table(tables::USER_ROLES).select("user_id,role").eq("user_id", user_id))
        .await
}

/// Profile and roles of `user_id`, fetched together.
pub async fn fetch_profile_and_roles(
    client: &BackendClient,
    user_id: Uuid,
) -> Result<(Option<Profile>, Vec<RoleAssignment>), ApiError> {
    try_join!(fetch_profile(client, user_id), fetch_roles(client, user_id))
}

pub async fn fetch_profiles(client: &BackendClient) -> Result<Vec<Profile>, ApiError> {
    client
        .fetch(&Query::table(tables::PROFILES).order("full_name", Direction::Ascending))
        .await
}

pub async fn fetch_member_stats(client: &BackendClient) -> Result<MemberStats, ApiError> {
    let profiles: Vec<Profile> = client
        .fetch(&Query::table(tables::PROFILES).select("id,full_name,status"))
        .await?;
    Ok(MemberStats::from_profiles(&profiles))
}

// ---------------------------------------------------------------------------
// Finance
// ---------------------------------------------------------------------------

pub async fn fetch_dues_for_year(client: &BackendClient, year: i32) -> Result<Vec<MonthlyDue>, ApiError> {
    client
        .fetch(
            &Query::table(tables::MONTHLY_DUES)
                .eq("year", year)
                .order("month", Direction::Ascending),
        )
        .await
}

async fn fetch_dues_for_years(client: &BackendClient, years: &[i32]) -> Result<Vec<MonthlyDue>, ApiError> {
    client
        .fetch(
            &Query::table(tables::MONTHLY_DUES)
                .in_list("year", years.iter())
                .order("year", Direction::Ascending)
                .order("month", Direction::Ascending),
        )
        .await
}

pub async fn fetch_paid_dues(client: &BackendClient) -> Result<Vec<MonthlyDue>, ApiError> {
    client
        .fetch(&Query::table(tables::MONTHLY_DUES).eq("status", "paid"))
        .await
}

pub async fn fetch_income(client: &BackendClient) -> Result<Vec<IncomeRecord>, ApiError> {
    client
        .fetch(&Query::table(tables::INCOME).order("date", Direction::Descending))
        .await
}

pub async fn fetch_expenses(client: &BackendClient) -> Result<Vec<ExpenseRecord>, ApiError> {
    client
        .fetch(&Query::table(tables::EXPENSES).order("date", Direction::Descending))
        .await
}

pub async fn fetch_finance_summary(client: &BackendClient) -> Result<FinanceSummary, ApiError> {
    let (dues, income, expenses) = try_join!(
        fetch_paid_dues(client),
        fetch_income(client),
        fetch_expenses(client)
    )?;
    Ok(FinanceSummary::from_rows(&dues, &income, &expenses))
}

// ---------------------------------------------------------------------------
// Activities, gallery, notifications, polls
// ---------------------------------------------------------------------------

/// Every activity, most recent start first.
pub async fn fetch_activities(client: &BackendClient) -> Result<Vec<Activity>, ApiError> {
    client
        .fetch(&Query::table(tables::ACTIVITIES).order("start_time", Direction::Descending))
        .await
}

/// Active activities starting after `now`, soonest first, with registration counts.
pub async fn fetch_upcoming_activities(
    client: &BackendClient,
    now: DateTime<Utc>,
    limit: Option<usize>,
) -> Result<Vec<UpcomingActivity>, ApiError> {
    let mut query = Query::table(tables::ACTIVITIES)
        .eq("status", "active")
        .gt("start_time", timestamp(now))
        .order("start_time", Direction::Ascending);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    let list: Vec<Activity> = client.fetch(&query).await?;
    if list.is_empty() {
        return Ok(Vec::new());
    }

    let registrations: Vec<ActivityRegistration> = client
        .fetch(
            &Query::table(tables::ACTIVITY_REGISTRATIONS)
                .select("activity_id")
                .in_list("activity_id", list.iter().map(|a| a.id)),
        )
        .await?;
    Ok(activities::with_registrations(&list, &registrations, now))
}

pub async fn fetch_gallery(client: &BackendClient, limit: Option<usize>) -> Result<Vec<GalleryItem>, ApiError> {
    let mut query = Query::table(tables::GALLERY)
        .order_nulls_last("event_date", Direction::Descending)
        .order("created_at", Direction::Descending);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    let items = client.fetch(&query).await?;
    Ok(gallery::newest_first(items))
}

fn addressed_to(user_id: Uuid) -> Query {
    Query::table(tables::NOTIFICATIONS).any_of([
        format!("user_id.eq.{user_id}"),
        "user_id.is.null".to_string(),
    ])
}

pub async fn fetch_notifications(client: &BackendClient, user_id: Uuid) -> Result<Vec<Notification>, ApiError> {
    client
        .fetch(&addressed_to(user_id).order("created_at", Direction::Descending))
        .await
}

pub async fn fetch_unread_notifications(client: &BackendClient, user_id: Uuid) -> Result<usize, ApiError> {
    let rows: Vec<Notification> = client
        .fetch(&addressed_to(user_id).eq("is_read", false))
        .await?;
    Ok(notifications::unread_count(&rows, user_id))
}

pub async fn count_active_polls(client: &BackendClient) -> Result<usize, ApiError> {
    client
        .count(&Query::table(tables::POLLS).select("id").eq("status", "active"))
        .await
}

// ---------------------------------------------------------------------------
// Dashboard and landing page
// ---------------------------------------------------------------------------

/// Everything the signed-in dashboard renders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub upcoming: Vec<UpcomingActivity>,
    /// Paid dues per month of the current year.
    pub monthly_dues: [f64; 12],
}

impl Dashboard {
    pub fn insights(&self) -> Vec<Insight> {
        insights::generate(&InsightInput {
            previous_month_dues: self.stats.previous_month_dues,
            current_month_dues: self.stats.current_month_dues,
            pending_members: self.stats.members.pending,
            balance: self.stats.finance.balance,
            upcoming: &self.upcoming,
        })
    }
}

/// All dashboard datasets, fetched concurrently. Fails if any of them fails.
pub async fn fetch_dashboard(
    client: &BackendClient,
    user_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<Dashboard, ApiError> {
    let current = MonthKey::of(now.date_naive());
    let previous = current.previous();
    let mut years = vec![previous.year, current.year];
    years.dedup();

    let unread = async {
        match user_id {
            Some(id) => fetch_unread_notifications(client, id).await,
            None => Ok(0),
        }
    };

    let (members, finance, dues, active_polls, upcoming, unread_notifications) = try_join!(
        fetch_member_stats(client),
        fetch_finance_summary(client),
        fetch_dues_for_years(client, &years),
        count_active_polls(client),
        fetch_upcoming_activities(client, now, None),
        unread,
    )?;

    let stats = DashboardStats {
        members,
        finance,
        current_month_dues: monthly_dues_total(&dues, current),
        previous_month_dues: monthly_dues_total(&dues, previous),
        active_polls,
        upcoming_activities: upcoming.len(),
        unread_notifications,
    };
    let upcoming = upcoming.into_iter().take(DASHBOARD_ACTIVITY_LIMIT).collect();
    Ok(Dashboard {
        stats,
        upcoming,
        monthly_dues: monthly_series(&dues, current.year),
    })
}

pub async fn fetch_landing_stats(client: &BackendClient, now: DateTime<Utc>) -> Result<LandingStats, ApiError> {
    let members = Query::table(tables::PROFILES).select("id").eq("status", "active");
    let upcoming = Query::table(tables::ACTIVITIES)
        .select("id")
        .eq("status", "active")
        .gt("start_time", timestamp(now));
    let photos = Query::table(tables::GALLERY).select("id");
    let (active_members, upcoming_activities, gallery_items) = try_join!(
        client.count(&members),
        client.count(&upcoming),
        client.count(&photos),
    )?;
    Ok(LandingStats {
        active_members,
        upcoming_activities,
        gallery_items,
    })
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

async fn fetch_all_dues(client: &BackendClient) -> Result<Vec<MonthlyDue>, ApiError> {
    client
        .fetch(
            &Query::table(tables::MONTHLY_DUES)
                .order("year", Direction::Descending)
                .order("month", Direction::Descending),
        )
        .await
}

/// CSV text of `report`.
pub async fn fetch_report(client: &BackendClient, report: Report) -> Result<String, ApiError> {
    let csv = match report {
        Report::Members => export_rows(&fetch_profiles(client).await?)?,
        Report::Dues => {
            let (dues, profiles) = try_join!(fetch_all_dues(client), fetch_profiles(client))?;
            let names: HashMap<Uuid, String> = profiles
                .into_iter()
                .map(|p| (p.id, p.full_name))
                .collect();
            let lines: Vec<DueLine> = dues
                .into_iter()
                .map(|due| DueLine {
                    member_name: names.get(&due.user_id).cloned(),
                    due,
                })
                .collect();
            export_rows(&lines)?
        }
        Report::Finance => {
            let (income, expenses) = try_join!(fetch_income(client), fetch_expenses(client))?;
            export_rows(&finance_ledger(&income, &expenses))?
        }
        Report::Activities => export_rows(&fetch_activities(client).await?)?,
    };
    Ok(csv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use portal::PortalConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> BackendClient {
        BackendClient::in_memory(PortalConfig::new(server.uri(), "anon").with_retries(0)).unwrap()
    }

    async fn rows(server: &MockServer, table: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{table}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn count(server: &MockServer, table: &str, total: usize) {
        Mock::given(method("HEAD"))
            .and(path(format!("/rest/v1/{table}")))
            .respond_with(
                ResponseTemplate::new(200).insert_header("content-range", format!("*/{total}")),
            )
            .mount(server)
            .await;
    }

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[tokio::test]
    async fn test_finance_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/monthly_dues"))
            .and(query_param("status", "eq.paid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": id(1), "user_id": id(9), "amount": 50000.0, "status": "paid", "month": 9, "year": 2026},
                {"id": id(2), "user_id": id(9), "amount": 50000.0, "status": "paid", "month": 10, "year": 2026}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        rows(&server, "income", json!([
            {"id": id(3), "title": "Donasi", "amount": 250000.0, "date": "2026-10-01"}
        ]))
        .await;
        rows(&server, "expenses", json!([
            {"id": id(4), "category": "Kebersihan", "amount": 400000.0, "date": "2026-10-02"}
        ]))
        .await;

        let summary = fetch_finance_summary(&client(&server)).await.unwrap();
        assert_eq!(summary.dues_total, 100000.0);
        assert_eq!(summary.other_income, 250000.0);
        assert_eq!(summary.total_income, 350000.0);
        assert_eq!(summary.total_expenses, 400000.0);
        assert_eq!(summary.balance, -50000.0);
    }

    #[tokio::test]
    async fn test_upcoming_activities_with_registrations() {
        let server = MockServer::start().await;
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap();
        Mock::given(method("GET"))
            .and(path("/rest/v1/activities"))
            .and(query_param("status", "eq.active"))
            .and(query_param("start_time", "gt.2026-10-16T08:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": id(1), "title": "Kerja bakti", "start_time": "2026-10-18T07:00:00Z", "capacity": 5, "status": "active"},
                {"id": id(2), "title": "Senam pagi", "start_time": "2026-10-19T06:00:00Z", "status": "active"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/activity_registrations"))
            .and(query_param("activity_id", format!("in.({},{})", id(1), id(2))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"activity_id": id(1)}, {"activity_id": id(1)},
                {"activity_id": id(1)}, {"activity_id": id(1)}, {"activity_id": id(2)}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let list = fetch_upcoming_activities(&client(&server), now, None)
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].activity.title, "Kerja bakti");
        assert_eq!(list[0].registrations, 4);
        assert_eq!(list[0].fill_percent, Some(80));
        assert_eq!(list[1].fill_percent, None);
    }

    #[tokio::test]
    async fn test_no_upcoming_skips_registrations() {
        let server = MockServer::start().await;
        rows(&server, "activities", json!([])).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/activity_registrations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let list = fetch_upcoming_activities(&client(&server), Utc::now(), Some(5))
            .await
            .unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_unread_notifications_filter() {
        let server = MockServer::start().await;
        let me = id(7);
        Mock::given(method("GET"))
            .and(path("/rest/v1/notifications"))
            .and(query_param("or", format!("(user_id.eq.{me},user_id.is.null)")))
            .and(query_param("is_read", "eq.false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": id(1), "user_id": me, "title": "Iuran", "is_read": false, "created_at": "2026-10-01T00:00:00Z"},
                {"id": id(2), "user_id": null, "title": "Rapat", "is_read": false, "created_at": "2026-10-02T00:00:00Z"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(fetch_unread_notifications(&client(&server), me).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_gallery_limit_keeps_dated_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/gallery"))
            .and(query_param("order", "event_date.desc.nullslast,created_at.desc"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": id(1), "title": "Lomba", "image_url": "https://cdn.example.org/1.jpg", "event_date": "2026-08-17"},
                {"id": id(2), "title": "Kerja bakti", "image_url": "https://cdn.example.org/2.jpg", "event_date": "2026-09-20"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let items = fetch_gallery(&client(&server), Some(2)).await.unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Kerja bakti", "Lomba"]);
    }

    #[tokio::test]
    async fn test_landing_stats() {
        let server = MockServer::start().await;
        count(&server, "profiles", 120).await;
        count(&server, "activities", 3).await;
        count(&server, "gallery", 42).await;

        let stats = fetch_landing_stats(&client(&server), Utc::now()).await.unwrap();
        assert_eq!(
            stats,
            LandingStats {
                active_members: 120,
                upcoming_activities: 3,
                gallery_items: 42,
            }
        );
    }

    #[tokio::test]
    async fn test_dashboard() {
        let server = MockServer::start().await;
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap();
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": id(1), "full_name": "A", "status": "active"},
                {"id": id(2), "full_name": "B", "status": "pending"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/monthly_dues"))
            .and(query_param("year", "in.(2025,2026)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": id(3), "user_id": id(1), "amount": 100.0, "status": "paid", "month": 12, "year": 2025},
                {"id": id(4), "user_id": id(1), "amount": 150.0, "status": "paid", "month": 1, "year": 2026},
                {"id": id(5), "user_id": id(2), "amount": 999.0, "status": "pending", "month": 1, "year": 2026}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/monthly_dues"))
            .and(query_param("status", "eq.paid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        rows(&server, "income", json!([])).await;
        rows(&server, "expenses", json!([])).await;
        rows(&server, "activities", json!([])).await;
        rows(&server, "notifications", json!([])).await;
        count(&server, "polls", 2).await;

        let dashboard = fetch_dashboard(&client(&server), Some(id(1)), now)
            .await
            .unwrap();
        assert_eq!(dashboard.stats.members.pending, 1);
        assert_eq!(dashboard.stats.previous_month_dues, 100.0);
        assert_eq!(dashboard.stats.current_month_dues, 150.0);
        assert_eq!(dashboard.stats.active_polls, 2);
        assert_eq!(dashboard.monthly_dues[0], 150.0);
        assert_eq!(
            dashboard.insights(),
            vec![
                Insight::DuesIncrease { percent: 50 },
                Insight::PendingMembers { count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_dues_report_joins_names() {
        let server = MockServer::start().await;
        rows(&server, "monthly_dues", json!([
            {"id": id(3), "user_id": id(1), "amount": 50000.0, "payment_date": "2026-10-05", "status": "paid", "month": 10, "year": 2026},
            {"id": id(4), "user_id": id(8), "amount": 50000.0, "status": "pending", "month": 10, "year": 2026}
        ]))
        .await;
        rows(&server, "profiles", json!([
            {"id": id(1), "full_name": "Budi Santoso", "status": "active"}
        ]))
        .await;

        let csv = fetch_report(&client(&server), Report::Dues).await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("\"Budi Santoso\""));
        assert!(lines[2].starts_with("\"-\""));
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "JWT expired"})))
            .mount(&server)
            .await;

        let err = fetch_profiles(&client(&server)).await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
