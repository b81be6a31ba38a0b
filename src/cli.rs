use clap::{Parser, Subcommand, ValueEnum};

/// Summarize web pages and keep the results in a local history.
#[derive(Debug, Parser)]
#[command(name = "page-summarizer", version, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarize a page and add it to history
    Summarize {
        url: String,
        /// File the summary into this collection
        #[arg(long)]
        collection: Option<String>,
    },
    /// List history, newest first
    History {
        /// Only show items in this collection
        #[arg(long)]
        collection: Option<String>,
    },
    /// Delete a history item
    Delete { id: String },
    /// Put a history item in a collection; `none` uncategorizes it
    Move { id: String, collection: String },
    /// Delete all history
    ClearHistory,
    /// List collections
    Collections,
    /// Create a collection
    AddCollection {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Delete a collection (its items are kept, uncategorized)
    DeleteCollection { id: String },
    /// Show settings
    Settings,
    /// Change one setting
    Set {
        field: SettingField,
        #[arg(required = true, num_args = 1..)]
        value: Vec<String>,
    },
    /// List supported output languages
    Languages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SettingField {
    ApiKey,
    Length,
    Type,
    Language,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Summarize {
        url: String,
        collection_id: Option<String>,
    },
    ListHistory {
        collection_id: Option<String>,
    },
    DeleteHistoryItem(String),
    MoveHistoryItem {
        id: String,
        collection_id: Option<String>,
    },
    ClearHistory,
    ListCollections,
    AddCollection(String),
    DeleteCollection(String),
    ShowSettings,
    SetSetting(SettingField, String),
    ListLanguages,
}

impl From<Command> for AppAction {
    fn from(command: Command) -> Self {
        match command {
            Command::Summarize { url, collection } => AppAction::Summarize {
                url,
                collection_id: collection,
            },
            Command::History { collection } => AppAction::ListHistory {
                collection_id: collection,
            },
            Command::Delete { id } => AppAction::DeleteHistoryItem(id),
            Command::Move { id, collection } => AppAction::MoveHistoryItem {
                id,
                collection_id: (collection != "none").then_some(collection),
            },
            Command::ClearHistory => AppAction::ClearHistory,
            Command::Collections => AppAction::ListCollections,
            Command::AddCollection { name } => AppAction::AddCollection(name.join(" ")),
            Command::DeleteCollection { id } => AppAction::DeleteCollection(id),
            Command::Settings => AppAction::ShowSettings,
            Command::Set { field, value } => AppAction::SetSetting(field, value.join(" ")),
            Command::Languages => AppAction::ListLanguages,
        }
    }
}
