use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};

use super::schema::SCHEMA;
use super::store::KvStore;

/// Key-value store backed by a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("{}: {}", db_path, e)))?;
        Self::init(conn).await
    }

    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok::<_, rusqlite::Error>(())
        })
        .await
        .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        Ok(Self { conn })
    }
}

fn store_error(key: &str, err: tokio_rusqlite::Error) -> AppError {
    match err {
        tokio_rusqlite::Error::ConnectionClosed => {
            AppError::StoreUnavailable("database connection closed".to_string())
        }
        other => AppError::store(key, other.to_string()),
    }
}

impl KvStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let owned_key = key.to_string();
        let text = self
            .conn
            .call(move |conn| {
                let text = conn
                    .query_row(
                        "SELECT value FROM kv WHERE key = ?1",
                        params![owned_key],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok::<_, rusqlite::Error>(text)
            })
            .await
            .map_err(|e| store_error(key, e))?;

        Ok(text.map(|text| match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                // Hand the raw text to the caller so read-repair can deal with it.
                tracing::warn!("Value stored under '{}' is not valid JSON: {}", key, e);
                Value::String(text)
            }
        }))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let owned_key = key.to_string();
        let text = serde_json::to_string(&value)?;
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO kv (key, value) VALUES (?1, ?2)
                       ON CONFLICT(key) DO UPDATE SET
                           value = excluded.value,
                           updated_at = datetime('now')"#,
                    params![owned_key, text],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .map_err(|e| store_error(key, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert_eq!(store.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_replaces_whole_value() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert_ok!(store.set("k", json!({ "a": 1, "b": 2 })).await);
        assert_ok!(store.set("k", json!([1, 2, 3])).await);
        assert_eq!(store.get("k").await.unwrap(), Some(json!([1, 2, 3])));
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteStore::new(path).await.unwrap();
            store.set("k", json!({ "x": "y" })).await.unwrap();
        }

        let store = SqliteStore::new(path).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({ "x": "y" })));
    }

    #[tokio::test]
    async fn unparseable_text_is_returned_as_string() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store
            .conn
            .call(|conn| {
                conn.execute(
                    "INSERT INTO kv (key, value) VALUES ('k', 'not json {')",
                    [],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .unwrap();

        assert_eq!(
            store.get("k").await.unwrap(),
            Some(Value::String("not json {".to_string()))
        );
    }

    #[tokio::test]
    async fn unopenable_path_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("store.db");
        let result = SqliteStore::new(path.to_str().unwrap()).await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }
}
