mod collections;
mod history;
pub mod memory;
pub mod repair;
mod schema;
mod settings;
mod sqlite;
mod store;

use std::sync::Arc;

pub use collections::CollectionRepository;
pub use history::{HistoryRepository, DEFAULT_MAX_HISTORY_ITEMS};
pub use memory::MemoryStore;
pub use settings::SettingsRepository;
pub use sqlite::SqliteStore;
pub use store::{KvStore, COLLECTIONS_KEY, HISTORY_KEY, SETTINGS_KEY};

use crate::error::{AppError, Result};
use crate::models::SummarySettings;

/// The three repositories over one shared store, built once per process.
pub struct Repositories<S> {
    pub settings: SettingsRepository<S>,
    pub history: HistoryRepository<S>,
    pub collections: CollectionRepository<S>,
}

impl<S: KvStore> Repositories<S> {
    pub fn new(store: Arc<S>, max_history_items: usize) -> Self {
        let history = HistoryRepository::new(Arc::clone(&store), max_history_items);
        Self {
            settings: SettingsRepository::new(Arc::clone(&store)),
            collections: CollectionRepository::new(store, history.clone()),
            history,
        }
    }

    /// First-run setup: default settings and an empty history list.
    ///
    /// An undecodable settings record is left in place and `defaults` are
    /// returned, so history and collections stay usable.
    pub async fn initialize(&self, defaults: SummarySettings) -> Result<SummarySettings> {
        let settings = match self.settings.ensure_initialized(defaults.clone()).await {
            Ok(settings) => settings,
            Err(AppError::InvalidSettings(e)) => {
                tracing::warn!("Stored settings cannot be read ({}); leaving them as is", e);
                defaults
            }
            Err(e) => return Err(e),
        };
        if self.history.is_uninitialized().await? {
            self.history.initialize_empty().await?;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn initialize_writes_defaults_once() {
        let store = Arc::new(MemoryStore::new());
        let repos = Repositories::new(Arc::clone(&store), DEFAULT_MAX_HISTORY_ITEMS);

        repos.initialize(SummarySettings::default()).await.unwrap();
        assert_eq!(store.raw(HISTORY_KEY), Some(json!([])));
        assert!(store.raw(SETTINGS_KEY).is_some());

        let writes = store.writes().len();
        repos.initialize(SummarySettings::default()).await.unwrap();
        assert_eq!(store.writes().len(), writes);
    }

    #[tokio::test]
    async fn initialize_leaves_existing_history() {
        let store = Arc::new(MemoryStore::new());
        store.seed(HISTORY_KEY, json!({ "0": { "id": "a" } }));
        let repos = Repositories::new(Arc::clone(&store), DEFAULT_MAX_HISTORY_ITEMS);

        repos.initialize(SummarySettings::default()).await.unwrap();
        assert_eq!(store.raw(HISTORY_KEY), Some(json!({ "0": { "id": "a" } })));
    }

    #[tokio::test]
    async fn initialize_tolerates_undecodable_settings() {
        let store = Arc::new(MemoryStore::new());
        let bad = json!({ "apiKey": "sk-x", "summaryLength": "long" });
        store.seed(SETTINGS_KEY, bad.clone());
        let repos = Repositories::new(Arc::clone(&store), DEFAULT_MAX_HISTORY_ITEMS);

        let settings = repos.initialize(SummarySettings::default()).await.unwrap();
        assert_eq!(settings, SummarySettings::default());
        assert_eq!(store.raw(SETTINGS_KEY), Some(bad));
        assert_eq!(store.raw(HISTORY_KEY), Some(json!([])));
    }

    #[tokio::test]
    async fn initialize_still_reports_store_outages() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let repos = Repositories::new(Arc::clone(&store), DEFAULT_MAX_HISTORY_ITEMS);

        let err = repos.initialize(SummarySettings::default()).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn works_over_sqlite() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        let repos = Repositories::new(store, DEFAULT_MAX_HISTORY_ITEMS);

        let work = repos.collections.add("Work").await.unwrap().unwrap();
        assert_eq!(repos.collections.list().await.unwrap(), vec![work]);
        assert!(repos.history.list().await.unwrap().is_empty());
    }
}
