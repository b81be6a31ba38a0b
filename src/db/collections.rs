use std::sync::Arc;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::Collection;

use super::history::HistoryRepository;
use super::repair::normalize_collections;
use super::store::{KvStore, COLLECTIONS_KEY};

/// User-defined collections, stored in insertion order.
///
/// Deleting a collection also clears the reference from every history item
/// that pointed at it. That touches two keys with no transaction between them.
pub struct CollectionRepository<S> {
    store: Arc<S>,
    history: HistoryRepository<S>,
}

impl<S> Clone for CollectionRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            history: self.history.clone(),
        }
    }
}

impl<S: KvStore> CollectionRepository<S> {
    pub fn new(store: Arc<S>, history: HistoryRepository<S>) -> Self {
        Self { store, history }
    }

    pub async fn list(&self) -> Result<Vec<Collection>> {
        let raw = self.store.get(COLLECTIONS_KEY).await?;
        let repaired = normalize_collections(raw, Utc::now());

        if repaired.needs_write_back {
            if let Err(e) = self.save(&repaired.records).await {
                tracing::error!("Failed to write back repaired collections: {}", e);
            }
        }

        Ok(repaired.records)
    }

    pub async fn save(&self, collections: &[Collection]) -> Result<()> {
        let value = serde_json::to_value(collections)?;
        self.store.set(COLLECTIONS_KEY, value).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Collection>> {
        Ok(self.list().await?.into_iter().find(|c| c.id == id))
    }

    /// Create and persist a collection. A blank name is ignored and yields `None`.
    pub async fn add(&self, name: &str) -> Result<Option<Collection>> {
        let Some(collection) = Collection::new(name) else {
            tracing::debug!("Ignoring collection with blank name");
            return Ok(None);
        };

        let mut collections = self.list().await?;
        collections.push(collection.clone());
        self.save(&collections).await?;

        tracing::info!("Created collection {} ({})", collection.name, collection.id);
        Ok(Some(collection))
    }

    /// Remove the collection, then uncategorize the history items that
    /// referenced it.
    ///
    /// If the collection write succeeds and the history write fails, the
    /// collection stays deleted and `AppError::CascadeIncomplete` is returned;
    /// the leftover references are dangling and tolerated on read. Retrying
    /// the delete finishes the cleanup.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut collections = self.list().await?;
        let before = collections.len();
        collections.retain(|c| c.id != id);
        if collections.len() != before {
            self.save(&collections).await?;
        }

        if let Err(e) = self.clear_references(id).await {
            tracing::error!(
                collection_id = id,
                "Collection deleted but history still references it: {}",
                e
            );
            return Err(AppError::CascadeIncomplete {
                collection_id: id.to_string(),
                source: Box::new(e),
            });
        }

        Ok(())
    }

    async fn clear_references(&self, id: &str) -> Result<()> {
        let mut items = self.history.list().await?;
        let mut cleared = 0;
        for item in items.iter_mut() {
            if item.collection_id.as_deref() == Some(id) {
                item.collection_id = None;
                cleared += 1;
            }
        }
        tracing::debug!("Cleared collection {} from {} history items", id, cleared);
        self.history.save(items).await
    }
}
