//! # Row models read from the hosted backend
//!
//! Every struct here mirrors one table (or view) of the association database as
//! the portal reads it. The backend owns the schema, its constraints and every
//! mutation; the portal treats these rows as read-mostly projections.
//!
//! | Struct | Table | Notes |
//! |--------|-------|-------|
//! | [`Profile`] | `profiles` | one per member, `status` drives admin actions |
//! | [`RoleAssignment`] | `user_roles` | several rows per user are allowed |
//! | [`MonthlyDue`] | `monthly_dues` | aggregated client-side into income figures |
//! | [`IncomeRecord`] | `other_income` | one-off income |
//! | [`ExpenseRecord`] | `expenses` | |
//! | [`Activity`] | `activities` | filtered to future, active items for display |
//! | [`ActivityRegistration`] | `activity_registrations` | counted per activity |
//! | [`GalleryItem`] | `gallery` | listed newest-first |
//! | [`Notification`] | `notifications` | `user_id == None` is a broadcast |
//! | [`Poll`] | `polls` | counted for the "active polls" badge |
//!
//! Enumerated columns decode into closed Rust enums; an unknown string is a decode
//! error rather than a silent fallback.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Membership lifecycle of a profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Pending,
    Active,
    Inactive,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Pending => "pending",
            MembershipStatus::Active => "active",
            MembershipStatus::Inactive => "inactive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MembershipStatus::Pending => "Pending",
            MembershipStatus::Active => "Active",
            MembershipStatus::Inactive => "Inactive",
        }
    }
}

/// A member profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: MembershipStatus,
    #[serde(default)]
    pub member_number: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Initials for the avatar fallback ("Siti Rahma" -> "SR").
    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Committee and membership roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Chair,
    ViceChair,
    Secretary,
    AssistantSecretary,
    Treasurer,
    Committee,
    Member,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Chair => "Chair",
            Role::ViceChair => "Vice Chair",
            Role::Secretary => "Secretary",
            Role::AssistantSecretary => "Assistant Secretary",
            Role::Treasurer => "Treasurer",
            Role::Committee => "Committee",
            Role::Member => "Member",
        }
    }
}

/// One row of `user_roles`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub user_id: Uuid,
    pub role: Role,
}

/// Confirmation state of a dues payment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Rejected,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Rejected => "Rejected",
        }
    }
}

/// A monthly dues payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDue {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: PaymentStatus,
    /// 1..=12
    pub month: u32,
    pub year: i32,
}

impl MonthlyDue {
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }
}

/// One-off income such as donations or hall rental.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub id: Uuid,
    pub title: String,
    pub amount: f64,
    pub date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    Active,
    Cancelled,
    Completed,
}

/// A community activity members can register for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub fee: Option<f64>,
    #[serde(default)]
    pub status: ActivityStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityRegistration {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub activity_id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A notification addressed to one member, or to everyone when `user_id` is `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    Active,
    Closed,
    #[default]
    Draft,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub status: PollStatus,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}
