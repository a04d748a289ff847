//! Upcoming-activity selection and fill levels.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Activity, ActivityRegistration, ActivityStatus};

/// An activity together with how many members registered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpcomingActivity {
    pub activity: Activity,
    pub registrations: usize,
    /// `None` when the activity has no capacity limit.
    pub fill_percent: Option<u32>,
}

/// Active activities starting after `now`, soonest first.
pub fn upcoming(activities: &[Activity], now: DateTime<Utc>) -> Vec<Activity> {
    let mut list: Vec<Activity> = activities
        .iter()
        .filter(|a| a.status == ActivityStatus::Active && a.start_time > now)
        .cloned()
        .collect();
    list.sort_by_key(|a| a.start_time);
    list
}

/// Registrations per activity id.
pub fn registration_counts(registrations: &[ActivityRegistration]) -> HashMap<Uuid, usize> {
    let mut counts = HashMap::new();
    for reg in registrations {
        *counts.entry(reg.activity_id).or_insert(0) += 1;
    }
    counts
}

/// Percentage of `capacity` taken, capped at 100. `None` without a positive capacity.
pub fn fill_level(capacity: Option<u32>, registrations: usize) -> Option<u32> {
    let capacity = capacity.filter(|c| *c > 0)?;
    let percent = (registrations as f64 / capacity as f64 * 100.0).round() as u32;
    Some(percent.min(100))
}

/// Combine [`upcoming`] with registration counts.
pub fn with_registrations(
    activities: &[Activity],
    registrations: &[ActivityRegistration],
    now: DateTime<Utc>,
) -> Vec<UpcomingActivity> {
    let counts = registration_counts(registrations);
    upcoming(activities, now)
        .into_iter()
        .map(|activity| {
            let registrations = counts.get(&activity.id).copied().unwrap_or(0);
            let fill_percent = fill_level(activity.capacity, registrations);
            UpcomingActivity {
                activity,
                registrations,
                fill_percent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn activity(id: u128, day: u32, status: ActivityStatus, capacity: Option<u32>) -> Activity {
        Activity {
            id: Uuid::from_u128(id),
            title: format!("Activity {id}"),
            description: None,
            location: Some("Balai warga".to_string()),
            start_time: Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap(),
            end_time: None,
            capacity,
            fee: None,
            status,
        }
    }

    fn registration(activity: u128) -> ActivityRegistration {
        ActivityRegistration {
            id: None,
            activity_id: Uuid::from_u128(activity),
            user_id: None,
        }
    }

    #[test]
    fn test_upcoming_filters_and_sorts() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let list = upcoming(
            &[
                activity(1, 25, ActivityStatus::Active, None),
                activity(2, 10, ActivityStatus::Active, None),
                activity(3, 20, ActivityStatus::Cancelled, None),
                activity(4, 18, ActivityStatus::Active, None),
            ],
            now,
        );
        let ids: Vec<u128> = list.iter().map(|a| a.id.as_u128()).collect();
        assert_eq!(ids, vec![4, 1]);
    }

    #[test]
    fn test_fill_level() {
        assert_eq!(fill_level(Some(20), 5), Some(25));
        assert_eq!(fill_level(Some(3), 2), Some(67));
        assert_eq!(fill_level(Some(10), 12), Some(100));
        assert_eq!(fill_level(Some(0), 1), None);
        assert_eq!(fill_level(None, 4), None);
    }

    #[test]
    fn test_with_registrations() {
        let now = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        let items = with_registrations(
            &[
                activity(1, 5, ActivityStatus::Active, Some(4)),
                activity(2, 6, ActivityStatus::Active, None),
            ],
            &[registration(1), registration(1), registration(1), registration(2)],
            now,
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].registrations, 3);
        assert_eq!(items[0].fill_percent, Some(75));
        assert_eq!(items[1].registrations, 1);
        assert_eq!(items[1].fill_percent, None);
    }
}
