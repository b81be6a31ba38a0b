mod summarizer;

pub use summarizer::{is_credential_error, Summarizer, DEFAULT_MAX_CONTENT_CHARS};
