mod collection;
mod history;
mod languages;
mod settings;

pub use collection::{Collection, COLLECTION_ID_PREFIX};
pub use history::{sort_newest_first, HistoryItem};
pub use languages::SUPPORTED_LANGUAGES;
pub use settings::{
    SettingsProblem, SummaryLength, SummaryOptions, SummarySettings, SummaryType, DEFAULT_LANGUAGE,
};
