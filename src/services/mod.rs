mod page_extractor;

pub use page_extractor::{check_url, Page, PageExtractor, DEFAULT_MIN_CONTENT_LENGTH};
