use chrono::NaiveDate;

use crate::models::GalleryItem;

fn sort_date(item: &GalleryItem) -> Option<NaiveDate> {
    item.event_date
        .or_else(|| item.created_at.map(|ts| ts.date_naive()))
}

/// Sort by event date (or upload date) descending; undated items go last.
pub fn newest_first(mut items: Vec<GalleryItem>) -> Vec<GalleryItem> {
    items.sort_by(|a, b| sort_date(b).cmp(&sort_date(a)));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn item(title: &str, event: Option<(i32, u32, u32)>, created: Option<(i32, u32, u32)>) -> GalleryItem {
        GalleryItem {
            id: Uuid::nil(),
            title: title.to_string(),
            description: None,
            image_url: format!("https://cdn.example.org/{title}.jpg"),
            event_date: event.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            created_at: created.map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_newest_first() {
        let sorted = newest_first(vec![
            item("old", Some((2025, 8, 17)), None),
            item("undated", None, None),
            item("new", Some((2026, 8, 17)), None),
            item("uploaded", None, Some((2026, 1, 1))),
        ]);
        let titles: Vec<&str> = sorted.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "uploaded", "old", "undated"]);
    }
}
