use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SummaryOptions;

/// One completed summarization.
///
/// `collection_id` is a weak reference: it may point at a collection that no
/// longer exists, and readers must treat that the same as "uncategorized".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub settings: SummaryOptions,
}

impl HistoryItem {
    pub fn new(url: String, title: String, summary: String, settings: SummaryOptions) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            url,
            title,
            summary,
            timestamp: Utc::now(),
            collection_id: None,
            settings,
        }
    }

    pub fn in_collection(mut self, collection_id: Option<String>) -> Self {
        self.collection_id = collection_id;
        self
    }
}

/// Newest first. Stable, so items sharing a timestamp keep their relative order.
pub fn sort_newest_first(items: &mut [HistoryItem]) {
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn uncategorized_items_omit_collection_id() {
        let item = HistoryItem::new(
            "https://example.com".to_string(),
            "Example".to_string(),
            "Short".to_string(),
            SummaryOptions::default(),
        );
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("collectionId").is_none());
        assert!(value.get("timestamp").unwrap().is_string());
    }

    #[test]
    fn decodes_stored_record() {
        let raw = json!({
            "id": "1700000000000",
            "url": "https://example.com/a",
            "title": "A",
            "summary": "text",
            "timestamp": "2024-01-02T03:04:05.000Z",
            "collectionId": "coll_1",
            "settings": { "length": "short", "type": "technical", "language": "German" }
        });
        let item: HistoryItem = serde_json::from_value(raw).unwrap();
        assert_eq!(item.collection_id.as_deref(), Some("coll_1"));
        assert_eq!(item.timestamp, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(item.settings.language, "German");
    }

    #[test]
    fn sorts_newest_first() {
        let mut items: Vec<HistoryItem> = [10, 30, 20]
            .into_iter()
            .map(|secs| HistoryItem {
                id: secs.to_string(),
                url: String::new(),
                title: String::new(),
                summary: String::new(),
                timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
                collection_id: None,
                settings: SummaryOptions::default(),
            })
            .collect();
        sort_newest_first(&mut items);
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["30", "20", "10"]);
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = HistoryItem::new(String::new(), String::new(), String::new(), SummaryOptions::default());
        let b = HistoryItem::new(String::new(), String::new(), String::new(), SummaryOptions::default());
        assert_ne!(a.id, b.id);
    }
}
