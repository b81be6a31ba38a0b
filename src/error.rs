use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Storage operation on '{key}' failed: {message}")]
    StoreOperation { key: String, message: String },

    #[error("Collection {collection_id} was deleted but history references could not be cleared: {source}")]
    CascadeIncomplete {
        collection_id: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Stored settings are invalid: {0}")]
    InvalidSettings(String),

    #[error("{0}")]
    Extraction(String),

    #[error("Cannot run on this page: {0}")]
    RestrictedPage(String),

    #[error("Summary API error: {0}")]
    SummaryApi(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn store(key: &str, message: impl Into<String>) -> Self {
        AppError::StoreOperation {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
