//! Key-value persistence contract.
//!
//! Every persisted record lives under one key as a JSON value. A `set`
//! replaces the whole value or fails; there is no merge and no transaction
//! spanning more than one key.

use std::future::Future;

use serde_json::Value;

use crate::error::Result;

pub const SETTINGS_KEY: &str = "summarizer_settings";
pub const HISTORY_KEY: &str = "summarizer_history";
pub const COLLECTIONS_KEY: &str = "summarizer_collections";

/// Raw storage I/O.
///
/// Implementations report an unreachable store as `AppError::StoreUnavailable`
/// and a failed read or write as `AppError::StoreOperation`. Absence of a key
/// is `Ok(None)`, never an error.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>>> + Send;

    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<()>> + Send;
}
