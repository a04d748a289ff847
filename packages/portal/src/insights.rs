//! Dashboard insights derived from already-aggregated figures.

use serde::{Deserialize, Serialize};

use crate::activities::UpcomingActivity;

/// Activities at or above this fill percentage are flagged.
pub const NEARLY_FULL_PERCENT: u32 = 80;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Insight {
    DuesIncrease { percent: i64 },
    DuesDecrease { percent: i64 },
    PendingMembers { count: usize },
    NegativeBalance { amount: f64 },
    ActivityNearlyFull { title: String, percent: u32 },
}

impl Insight {
    pub fn message(&self) -> String {
        match self {
            Insight::DuesIncrease { percent } => {
                format!("Dues collected rose {percent}% compared to last month")
            }
            Insight::DuesDecrease { percent } => {
                format!("Dues collected fell {percent}% compared to last month")
            }
            Insight::PendingMembers { count } => {
                format!("{count} membership application(s) awaiting approval")
            }
            Insight::NegativeBalance { .. } => {
                "Expenses currently exceed income".to_string()
            }
            Insight::ActivityNearlyFull { title, percent } => {
                format!("\"{title}\" is {percent}% full")
            }
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Insight::DuesDecrease { .. } | Insight::NegativeBalance { .. }
        )
    }
}

/// Compare this month's confirmed dues with last month's.
///
/// Nothing is emitted when last month is zero, whatever this month holds.
pub fn month_over_month(previous: f64, current: f64) -> Option<Insight> {
    if previous <= 0.0 {
        return None;
    }
    if current > previous {
        let percent = ((current - previous) / previous * 100.0).round() as i64;
        Some(Insight::DuesIncrease { percent })
    } else if current < previous {
        let percent = ((previous - current) / previous * 100.0).round() as i64;
        Some(Insight::DuesDecrease { percent })
    } else {
        None
    }
}

/// Everything [`generate`] looks at.
#[derive(Clone, Debug, Default)]
pub struct InsightInput<'a> {
    pub previous_month_dues: f64,
    pub current_month_dues: f64,
    pub pending_members: usize,
    pub balance: f64,
    pub upcoming: &'a [UpcomingActivity],
}

pub fn generate(input: &InsightInput<'_>) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(trend) = month_over_month(input.previous_month_dues, input.current_month_dues) {
        insights.push(trend);
    }
    if input.pending_members > 0 {
        insights.push(Insight::PendingMembers {
            count: input.pending_members,
        });
    }
    if input.balance < 0.0 {
        insights.push(Insight::NegativeBalance {
            amount: input.balance,
        });
    }
    for upcoming in input.upcoming {
        if let Some(percent) = upcoming.fill_percent {
            if percent >= NEARLY_FULL_PERCENT {
                insights.push(Insight::ActivityNearlyFull {
                    title: upcoming.activity.title.clone(),
                    percent,
                });
            }
        }
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, ActivityStatus};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn test_increase() {
        assert_eq!(
            month_over_month(100.0, 150.0),
            Some(Insight::DuesIncrease { percent: 50 })
        );
        // (133 - 99) / 99 = 34.34% -> 34
        assert_eq!(
            month_over_month(99.0, 133.0),
            Some(Insight::DuesIncrease { percent: 34 })
        );
    }

    #[test]
    fn test_decrease() {
        assert_eq!(
            month_over_month(200.0, 50.0),
            Some(Insight::DuesDecrease { percent: 75 })
        );
        assert_eq!(
            month_over_month(200.0, 0.0),
            Some(Insight::DuesDecrease { percent: 100 })
        );
    }

    #[test]
    fn test_zero_previous_emits_nothing() {
        assert_eq!(month_over_month(0.0, 0.0), None);
        assert_eq!(month_over_month(0.0, 500_000.0), None);
    }

    #[test]
    fn test_equal_totals_emit_nothing() {
        assert_eq!(month_over_month(300.0, 300.0), None);
    }

    #[test]
    fn test_generate_collects_all_kinds() {
        let upcoming = vec![UpcomingActivity {
            activity: Activity {
                id: Uuid::nil(),
                title: "Kerja bakti".to_string(),
                description: None,
                location: None,
                start_time: Utc.with_ymd_and_hms(2026, 11, 1, 7, 0, 0).unwrap(),
                end_time: None,
                capacity: Some(10),
                fee: None,
                status: ActivityStatus::Active,
            },
            registrations: 9,
            fill_percent: Some(90),
        }];
        let insights = generate(&InsightInput {
            previous_month_dues: 100.0,
            current_month_dues: 120.0,
            pending_members: 2,
            balance: -5.0,
            upcoming: &upcoming,
        });
        assert_eq!(insights.len(), 4);
        assert_eq!(insights[0], Insight::DuesIncrease { percent: 20 });
        assert_eq!(insights[1], Insight::PendingMembers { count: 2 });
        assert!(insights[2].is_warning());
        assert_eq!(
            insights[3].message(),
            "\"Kerja bakti\" is 90% full"
        );
    }

    #[test]
    fn test_generate_quiet_month() {
        let insights = generate(&InsightInput::default());
        assert!(insights.is_empty());
    }
}
