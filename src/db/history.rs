use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::error::Result;
use crate::models::{sort_newest_first, HistoryItem};

use super::repair::normalize_history;
use super::store::{KvStore, HISTORY_KEY};

pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 50;

/// History of completed summaries, stored newest first under one key.
///
/// Every operation reads and writes the whole list. Concurrent writers from
/// other processes are last-writer-wins.
pub struct HistoryRepository<S> {
    store: Arc<S>,
    max_items: usize,
}

impl<S> Clone for HistoryRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            max_items: self.max_items,
        }
    }
}

impl<S: KvStore> HistoryRepository<S> {
    /// `max_items == 0` keeps everything.
    pub fn new(store: Arc<S>, max_items: usize) -> Self {
        Self { store, max_items }
    }

    pub async fn list(&self) -> Result<Vec<HistoryItem>> {
        let raw = self.store.get(HISTORY_KEY).await?;
        let repaired = normalize_history(raw, Utc::now());
        let mut items = repaired.records;

        // Sorted but never capped here: a read must not drop records.
        if repaired.needs_write_back {
            sort_newest_first(&mut items);
            if let Err(e) = self.write(&items).await {
                tracing::error!("Failed to write back repaired history: {}", e);
            }
        }

        Ok(items)
    }

    /// Replace the stored history with `items`, newest first.
    pub async fn save(&self, mut items: Vec<HistoryItem>) -> Result<()> {
        self.bound(&mut items);
        self.write(&items).await
    }

    /// Read, append, save. Not atomic with respect to other writers.
    pub async fn add(&self, item: HistoryItem) -> Result<()> {
        let mut items = self.list().await?;
        items.push(item);
        self.save(items).await
    }

    /// Returns whether an item was removed. Nothing is written when `id` is unknown.
    pub async fn delete_item(&self, id: &str) -> Result<bool> {
        let mut items = self.list().await?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            tracing::debug!("History item {} not found; nothing to delete", id);
            return Ok(false);
        }
        self.save(items).await?;
        Ok(true)
    }

    /// Replace the item with the same id. Returns whether one was found.
    pub async fn update_item(&self, item: HistoryItem) -> Result<bool> {
        let mut items = self.list().await?;
        let Some(slot) = items.iter_mut().find(|existing| existing.id == item.id) else {
            tracing::debug!("History item {} not found; nothing to update", item.id);
            return Ok(false);
        };
        *slot = item;
        self.save(items).await?;
        Ok(true)
    }

    pub async fn clear(&self) -> Result<()> {
        self.write(&[]).await
    }

    fn bound(&self, items: &mut Vec<HistoryItem>) {
        sort_newest_first(items);
        if self.max_items > 0 && items.len() > self.max_items {
            items.truncate(self.max_items);
        }
    }

    async fn write(&self, items: &[HistoryItem]) -> Result<()> {
        let value = serde_json::to_value(items)?;
        self.store.set(HISTORY_KEY, value).await
    }

    /// True when nothing has ever been stored under the history key.
    pub(crate) async fn is_uninitialized(&self) -> Result<bool> {
        Ok(self.store.get(HISTORY_KEY).await?.is_none())
    }

    pub(crate) async fn initialize_empty(&self) -> Result<()> {
        self.store.set(HISTORY_KEY, Value::Array(Vec::new())).await
    }
}
