use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const COLLECTION_ID_PREFIX: &str = "coll_";

/// A user-defined grouping for history items. Names need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Collection {
    /// Returns `None` for a blank name.
    pub fn new(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            id: format!("{}{}", COLLECTION_ID_PREFIX, Uuid::new_v4().simple()),
            name: name.to_string(),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        assert!(Collection::new("").is_none());
        assert!(Collection::new("   \t").is_none());
    }

    #[test]
    fn name_is_trimmed_and_id_prefixed() {
        let c = Collection::new("  Work ").unwrap();
        assert_eq!(c.name, "Work");
        assert!(c.id.starts_with(COLLECTION_ID_PREFIX));
    }

    #[test]
    fn rapid_creation_yields_distinct_ids() {
        let a = Collection::new("Work").unwrap();
        let b = Collection::new("Work").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serializes_created_at_in_camel_case() {
        let c = Collection::new("Reading").unwrap();
        let value = serde_json::to_value(&c).unwrap();
        assert!(value.get("createdAt").is_some());
    }
}
