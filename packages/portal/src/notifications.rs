use uuid::Uuid;

use crate::models::Notification;

/// Whether `notification` is addressed to `user_id`, either directly or as a broadcast.
pub fn is_for(notification: &Notification, user_id: Uuid) -> bool {
    match notification.user_id {
        Some(recipient) => recipient == user_id,
        None => true,
    }
}

/// Unread notifications for `user_id`, broadcasts included.
pub fn unread_count(notifications: &[Notification], user_id: Uuid) -> usize {
    notifications
        .iter()
        .filter(|n| !n.is_read && is_for(n, user_id))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn notification(user_id: Option<Uuid>, is_read: bool) -> Notification {
        Notification {
            id: Uuid::nil(),
            user_id,
            title: "Rapat bulanan".to_string(),
            message: None,
            is_read,
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_unread_count() {
        let me = Uuid::from_u128(1);
        let other = Uuid::from_u128(2);
        let rows = vec![
            notification(Some(me), false),
            notification(Some(me), true),
            notification(None, false),
            notification(None, true),
            notification(Some(other), false),
        ];
        assert_eq!(unread_count(&rows, me), 2);
        assert_eq!(unread_count(&rows, other), 2);
        assert_eq!(unread_count(&[], me), 0);
    }
}
