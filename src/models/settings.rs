use serde::{Deserialize, Serialize};

pub const DEFAULT_LANGUAGE: &str = "English";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Detailed,
}

impl SummaryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Detailed => "detailed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "short" => Some(SummaryLength::Short),
            "medium" => Some(SummaryLength::Medium),
            "detailed" => Some(SummaryLength::Detailed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    #[default]
    KeyPoints,
    Narrative,
    Technical,
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::KeyPoints => "key_points",
            SummaryType::Narrative => "narrative",
            SummaryType::Technical => "technical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "key_points" => Some(SummaryType::KeyPoints),
            "narrative" => Some(SummaryType::Narrative),
            "technical" => Some(SummaryType::Technical),
            _ => None,
        }
    }
}

/// The single user settings record.
///
/// Saved wholesale: there is no per-field update, callers always pass the
/// full record back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummarySettings {
    pub api_key: String,
    pub summary_length: SummaryLength,
    pub summary_type: SummaryType,
    pub selected_language: String,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            summary_length: SummaryLength::default(),
            summary_type: SummaryType::default(),
            selected_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsProblem {
    MissingApiKey,
    MalformedApiKey,
    MissingLanguage,
}

impl SummarySettings {
    pub fn with_api_key(api_key: Option<&str>) -> Self {
        Self {
            api_key: api_key.unwrap_or_default().to_string(),
            ..Self::default()
        }
    }

    /// Snapshot of the options that shape a summary, stored with each
    /// history item.
    pub fn options(&self) -> SummaryOptions {
        SummaryOptions {
            length: self.summary_length,
            summary_type: self.summary_type,
            language: self.selected_language.clone(),
        }
    }

    /// Problems a front end should report before attempting a summary.
    pub fn validate(&self) -> Vec<SettingsProblem> {
        let mut problems = Vec::new();
        let key = self.api_key.trim();
        if key.is_empty() {
            problems.push(SettingsProblem::MissingApiKey);
        } else if !key.starts_with("sk-") {
            problems.push(SettingsProblem::MalformedApiKey);
        }
        if self.selected_language.trim().is_empty() {
            problems.push(SettingsProblem::MissingLanguage);
        }
        problems
    }
}

/// Length, type and language used to produce one summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOptions {
    #[serde(default)]
    pub length: SummaryLength,
    #[serde(rename = "type", default)]
    pub summary_type: SummaryType,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummarySettings::default().options()
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}
