use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::SummarySettings;

use super::store::{KvStore, SETTINGS_KEY};

/// The single settings record. No read-repair: a value that does not decode
/// is reported to the caller.
pub struct SettingsRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for SettingsRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KvStore> SettingsRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn get(&self) -> Result<Option<SummarySettings>> {
        match self.store.get(SETTINGS_KEY).await? {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| AppError::InvalidSettings(e.to_string())),
        }
    }

    pub async fn get_or_default(&self) -> Result<SummarySettings> {
        Ok(self.get().await?.unwrap_or_default())
    }

    pub async fn save(&self, settings: &SummarySettings) -> Result<()> {
        let value = serde_json::to_value(settings)?;
        self.store.set(SETTINGS_KEY, value).await
    }

    /// Write `defaults` if nothing is stored yet. Returns whatever is in effect.
    pub async fn ensure_initialized(&self, defaults: SummarySettings) -> Result<SummarySettings> {
        if let Some(existing) = self.get().await? {
            return Ok(existing);
        }
        tracing::info!("No settings stored; writing defaults");
        self.save(&defaults).await?;
        Ok(defaults)
    }
}
