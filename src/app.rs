use std::fmt::Write as _;
use std::sync::Arc;

use crate::ai::{is_credential_error, Summarizer};
use crate::cli::{AppAction, SettingField};
use crate::config::Config;
use crate::db::{KvStore, Repositories, SqliteStore};
use crate::error::{AppError, Result};
use crate::models::{
    HistoryItem, SettingsProblem, SummaryLength, SummarySettings, SummaryType, SUPPORTED_LANGUAGES,
};
use crate::services::PageExtractor;

pub struct App<S> {
    pub repos: Repositories<S>,
    summarizer: Summarizer,
    extractor: PageExtractor,
    default_api_key: Option<String>,
}

impl App<SqliteStore> {
    pub async fn new(config: &Config) -> Result<Self> {
        let store = SqliteStore::new(&config.db_path).await?;
        Self::with_store(Arc::new(store), config)
    }
}

impl<S: KvStore> App<S> {
    pub fn with_store(store: Arc<S>, config: &Config) -> Result<Self> {
        Ok(Self {
            repos: Repositories::new(store, config.max_history_items),
            summarizer: Summarizer::new(config.request_timeout(), config.max_content_chars)?,
            extractor: PageExtractor::new(config.request_timeout(), config.min_content_length)?,
            default_api_key: config.openai_api_key.clone(),
        })
    }

    pub async fn initialize(&self) -> Result<SummarySettings> {
        let defaults = SummarySettings::with_api_key(self.default_api_key.as_deref());
        self.repos.initialize(defaults).await
    }

    /// Run one action and return the text to show the user.
    pub async fn handle_action(&self, action: AppAction) -> Result<String> {
        let mut out = String::new();
        match action {
            AppAction::Summarize { url, collection_id } => {
                let item = self.summarize_page(&url, collection_id).await?;
                let _ = writeln!(out, "{}\n{}\n", item.title, item.url);
                out.push_str(&item.summary);
            }

            AppAction::ListHistory { collection_id } => {
                let mut items = self.repos.history.list().await?;
                let collections = self.repos.collections.list().await?;
                if let Some(id) = collection_id.as_deref() {
                    items.retain(|item| item.collection_id.as_deref() == Some(id));
                }
                if items.is_empty() {
                    out.push_str("No history yet.");
                }
                for item in items {
                    // Dangling references show as uncategorized.
                    let collection = item
                        .collection_id
                        .as_deref()
                        .and_then(|id| collections.iter().find(|c| c.id == id))
                        .map(|c| c.name.as_str())
                        .unwrap_or("-");
                    let _ = writeln!(
                        out,
                        "{}  {}  [{}]  {}\n    {}",
                        item.id,
                        item.timestamp.format("%Y-%m-%d %H:%M"),
                        collection,
                        item.title,
                        item.url
                    );
                }
            }

            AppAction::DeleteHistoryItem(id) => {
                if self.repos.history.delete_item(&id).await? {
                    let _ = write!(out, "Deleted {}", id);
                } else {
                    let _ = write!(out, "No history item {}", id);
                }
            }

            AppAction::MoveHistoryItem { id, collection_id } => {
                if self.move_to_collection(&id, collection_id).await? {
                    let _ = write!(out, "Updated {}", id);
                } else {
                    let _ = write!(out, "No history item {}", id);
                }
            }

            AppAction::ClearHistory => {
                self.repos.history.clear().await?;
                out.push_str("History cleared.");
            }

            AppAction::ListCollections => {
                let collections = self.repos.collections.list().await?;
                if collections.is_empty() {
                    out.push_str("No collections.");
                }
                for c in collections {
                    let _ = writeln!(out, "{}  {}  (created {})", c.id, c.name, c.created_at.format("%Y-%m-%d"));
                }
            }

            AppAction::AddCollection(name) => match self.repos.collections.add(&name).await? {
                Some(c) => {
                    let _ = write!(out, "Created {} ({})", c.name, c.id);
                }
                None => out.push_str("Collection name cannot be blank."),
            },

            AppAction::DeleteCollection(id) => {
                self.repos.collections.delete(&id).await?;
                let _ = write!(out, "Deleted collection {}", id);
            }

            AppAction::ShowSettings => {
                let settings = self.repos.settings.get_or_default().await?;
                let _ = writeln!(out, "api-key:  {}", mask_key(&settings.api_key));
                let _ = writeln!(out, "length:   {}", settings.summary_length.as_str());
                let _ = writeln!(out, "type:     {}", settings.summary_type.as_str());
                let _ = write!(out, "language: {}", settings.selected_language);
                for problem in settings.validate() {
                    let hint = match problem {
                        SettingsProblem::MissingApiKey => "no API key set; use `set api-key <key>`",
                        SettingsProblem::MalformedApiKey => "API key should start with sk-",
                        SettingsProblem::MissingLanguage => "no output language set",
                    };
                    let _ = write!(out, "\nwarning: {}", hint);
                }
            }

            AppAction::SetSetting(field, value) => {
                self.update_setting(field, &value).await?;
                out.push_str("Settings saved.");
            }

            AppAction::ListLanguages => out.push_str(&SUPPORTED_LANGUAGES.join("\n")),
        }
        Ok(out)
    }

    /// Extract, summarize with the current settings, and record the result.
    pub async fn summarize_page(
        &self,
        url: &str,
        collection_id: Option<String>,
    ) -> Result<HistoryItem> {
        let settings = self.repos.settings.get_or_default().await?;
        if let Some(id) = collection_id.as_deref() {
            if self.repos.collections.get(id).await?.is_none() {
                tracing::warn!("Collection {} does not exist; saving reference anyway", id);
            }
        }

        let page = self.extractor.extract(url).await?;
        let options = settings.options();
        let summary = match self
            .summarizer
            .summarize(&page.content, &settings.api_key, &options)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                if is_credential_error(&e) {
                    tracing::error!("Summary failed; check the API key with `set api-key`: {}", e);
                }
                return Err(e);
            }
        };

        let item = HistoryItem::new(page.url, page.title, summary, options).in_collection(collection_id);
        self.repos.history.add(item.clone()).await?;
        tracing::info!(
            "Saved summary {} of {} using {}",
            item.id,
            item.url,
            self.summarizer.model_version()
        );
        Ok(item)
    }

    /// Re-categorize a history item. `None` makes it uncategorized.
    pub async fn move_to_collection(&self, id: &str, collection_id: Option<String>) -> Result<bool> {
        let items = self.repos.history.list().await?;
        let Some(mut item) = items.into_iter().find(|item| item.id == id) else {
            return Ok(false);
        };
        item.collection_id = collection_id;
        self.repos.history.update_item(item).await
    }

    /// Change one field and save the whole settings record. An undecodable
    /// stored record is replaced, starting from defaults.
    pub async fn update_setting(&self, field: SettingField, value: &str) -> Result<SummarySettings> {
        let mut settings = match self.repos.settings.get_or_default().await {
            Ok(settings) => settings,
            Err(AppError::InvalidSettings(e)) => {
                tracing::warn!("Stored settings cannot be read ({}); starting from defaults", e);
                SummarySettings::with_api_key(self.default_api_key.as_deref())
            }
            Err(e) => return Err(e),
        };
        match field {
            SettingField::ApiKey => settings.api_key = value.trim().to_string(),
            SettingField::Length => {
                settings.summary_length = SummaryLength::parse(value).ok_or_else(|| {
                    AppError::Config(format!("length must be short, medium or detailed, not {}", value))
                })?
            }
            SettingField::Type => {
                settings.summary_type = SummaryType::parse(value).ok_or_else(|| {
                    AppError::Config(format!(
                        "type must be key_points, narrative or technical, not {}",
                        value
                    ))
                })?
            }
            SettingField::Language => {
                let language = value.trim();
                if language.is_empty() {
                    return Err(AppError::Config("language cannot be blank".to_string()));
                }
                settings.selected_language = language.to_string();
            }
        }
        self.repos.settings.save(&settings).await?;
        Ok(settings)
    }
}

fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", tail)
}
