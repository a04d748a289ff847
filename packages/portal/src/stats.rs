//! Headline counts for the dashboard and the public landing page.

use serde::{Deserialize, Serialize};

use crate::aggregate::FinanceSummary;
use crate::models::{MembershipStatus, Profile};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStats {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub inactive: usize,
}

impl MemberStats {
    pub fn from_profiles(profiles: &[Profile]) -> Self {
        let count = |status: MembershipStatus| profiles.iter().filter(|p| p.status == status).count();
        Self {
            total: profiles.len(),
            active: count(MembershipStatus::Active),
            pending: count(MembershipStatus::Pending),
            inactive: count(MembershipStatus::Inactive),
        }
    }
}

/// Everything the dashboard header cards show.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub members: MemberStats,
    pub finance: FinanceSummary,
    pub current_month_dues: f64,
    pub previous_month_dues: f64,
    pub active_polls: usize,
    pub upcoming_activities: usize,
    pub unread_notifications: usize,
}

/// Public figures shown before sign-in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandingStats {
    pub active_members: usize,
    pub upcoming_activities: usize,
    pub gallery_items: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile(status: MembershipStatus) -> Profile {
        Profile {
            id: Uuid::nil(),
            full_name: "Warga".to_string(),
            house_number: None,
            phone: None,
            email: None,
            status,
            member_number: None,
            avatar_url: None,
            created_at: None,
        }
    }

    #[test]
    fn test_member_stats() {
        let stats = MemberStats::from_profiles(&[
            profile(MembershipStatus::Active),
            profile(MembershipStatus::Active),
            profile(MembershipStatus::Pending),
            profile(MembershipStatus::Inactive),
        ]);
        assert_eq!(
            stats,
            MemberStats {
                total: 4,
                active: 2,
                pending: 1,
                inactive: 1
            }
        );
        assert_eq!(MemberStats::from_profiles(&[]), MemberStats::default());
    }
}
