use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ai::DEFAULT_MAX_CONTENT_CHARS;
use crate::db::DEFAULT_MAX_HISTORY_ITEMS;
use crate::error::{AppError, Result};
use crate::services::DEFAULT_MIN_CONTENT_LENGTH;

const APP_DIR: &str = "page-summarizer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Seeds the stored settings on first run.
    pub openai_api_key: Option<String>,

    /// Newest entries kept in history; 0 keeps everything.
    #[serde(default = "default_max_history_items")]
    pub max_history_items: usize,

    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("summaries.db").to_string_lossy().to_string()
}

fn default_max_history_items() -> usize {
    DEFAULT_MAX_HISTORY_ITEMS
}

fn default_min_content_length() -> usize {
    DEFAULT_MIN_CONTENT_LENGTH
}

fn default_max_content_chars() -> usize {
    DEFAULT_MAX_CONTENT_CHARS
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            openai_api_key: None,
            max_history_items: default_max_history_items(),
            min_content_length: default_min_content_length(),
            max_content_chars: default_max_content_chars(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Read the user's config file, creating it with defaults when missing.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No config at {}; writing defaults", path.display());
                let config = Config::default();
                config.save_to(path)?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join(APP_DIR).join("config.toml")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
