//! String key/value storage with last-write-wins semantics.
//!
//! Values are read back exactly as written. JSON helpers treat unparsable
//! values as absent so a corrupt entry never breaks the caller.

use crate::{CacheDb, Error};
use serde::{Serialize, de::DeserializeOwned};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Fixed key names used by the reader session.
pub mod keys {
    pub const THEME: &str = "theme";
    pub const QURAN_PROGRESS: &str = "quran_progress";
    pub const READING_STREAK: &str = "reading_streak";
    pub const LAST_VISIT_DATE: &str = "last_visit_date";
    pub const LAST_READ_DATE: &str = "last_read_date";
    pub const DHIKR_PROGRESS: &str = "dhikr_progress";
    pub const CACHED_PRAYER_TIMES: &str = "cached_prayer_times";
    pub const GEO_PERMISSION: &str = "geo_permission";
}

/// Persistent key/value storage backed by the `local_storage` table.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    db: CacheDb,
}

impl CacheDb {
    pub fn local_storage(&self) -> LocalStorage {
        LocalStorage { db: self.clone() }
    }
}

impl LocalStorage {
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result =
                    conn.query_row("SELECT value FROM local_storage WHERE key = ?1", params![key], |row| row.get(0));

                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let key = key.to_string();
        let value = value.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    params![key, value, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Read a JSON value; missing or malformed entries yield `None`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        let Some(raw) = self.get_item(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::debug!(key, "ignoring malformed stored value: {e}");
                Ok(None)
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), Error> {
        let raw = serde_json::to_string(value).map_err(|e| Error::InvalidInput(e.to_string()))?;
        self.set_item(key, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_set_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let storage = db.local_storage();

        assert_eq!(storage.get_item(keys::THEME).await.unwrap(), None);
        storage.set_item(keys::THEME, "light").await.unwrap();
        assert_eq!(storage.get_item(keys::THEME).await.unwrap().as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let storage = db.local_storage();

        storage.set_item(keys::READING_STREAK, "1").await.unwrap();
        storage.set_item(keys::READING_STREAK, "2").await.unwrap();
        assert_eq!(storage.get_item(keys::READING_STREAK).await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_malformed_json_reads_as_none() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let storage = db.local_storage();

        storage.set_item(keys::QURAN_PROGRESS, "{not json").await.unwrap();
        let parsed: Option<BTreeMap<u32, u32>> = storage.get_json(keys::QURAN_PROGRESS).await.unwrap();
        assert!(parsed.is_none());
    }

    #[tokio::test]
    async fn test_json_roundtrip_uses_string_keys() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let storage = db.local_storage();

        let progress = BTreeMap::from([(2u32, 5u32)]);
        storage.set_json(keys::QURAN_PROGRESS, &progress).await.unwrap();
        assert_eq!(storage.get_item(keys::QURAN_PROGRESS).await.unwrap().as_deref(), Some("{\"2\":5}"));
    }
}
