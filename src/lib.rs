//! Summarize web pages and keep the results.
//!
//! Settings, history and collections each live under one key of a local
//! key-value store ([`db::KvStore`]). Reads go through a repair layer that
//! turns legacy or corrupted shapes back into well-formed lists, so callers
//! always get clean records.

pub mod ai;
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use app::App;
pub use config::Config;
pub use error::{AppError, Result};
