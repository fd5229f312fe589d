//! Named response stores.
//!
//! A store is identified by a version tag. Opening a new tag yields an empty
//! store; entries of older tags stay on disk untouched. Within a store, each
//! request key maps to exactly one captured response and writes replace it.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Identifies a request in a store: method plus canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    /// Key for a GET request, the only method the offline cache handles.
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: "GET".into(), url: url.into() }
    }

    /// Content hash used as the primary key column.
    pub fn hash(&self) -> String {
        compute_cache_key(&self.method, &self.url)
    }
}

/// A full captured HTTP response: status, headers and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CapturedResponse {
    /// Final URL the response was served from.
    pub url: String,
    pub status: u16,
    /// Header name/value pairs in received order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedResponse {
    /// Whether the status is 2xx.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Summary row for a registered store.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoreInfo {
    pub name: String,
    pub created_at: String,
    pub installed_at: Option<String>,
    pub entries: u64,
}

/// Handle to one named store inside a [`CacheDb`].
#[derive(Debug, Clone)]
pub struct ResponseStore {
    db: CacheDb,
    name: String,
}

impl CacheDb {
    /// Open (registering if needed) the store with the given version tag.
    pub async fn open_store(&self, name: &str) -> Result<ResponseStore, Error> {
        if name.is_empty() {
            return Err(Error::InvalidInput("store name cannot be empty".into()));
        }

        let store_name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let created = self
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let n = conn.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![store_name, now],
                )?;
                Ok(n)
            })
            .await
            .map_err(Error::from)?;

        if created > 0 {
            tracing::info!(store = name, "created cache store");
        }

        Ok(ResponseStore { db: self.clone(), name: name.to_string() })
    }

    /// All registered stores, oldest first, with entry counts.
    pub async fn list_stores(&self) -> Result<Vec<StoreInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, s.created_at, s.installed_at,
                        (SELECT COUNT(*) FROM cached_responses r WHERE r.store = s.name)
                     FROM cache_stores s ORDER BY s.created_at ASC, s.name ASC",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok(StoreInfo {
                        name: row.get(0)?,
                        created_at: row.get(1)?,
                        installed_at: row.get(2)?,
                        entries: row.get::<_, i64>(3)? as u64,
                    })
                })?;
                let stores = rows.collect::<Result<Vec<_>, _>>()?;
                Ok(stores)
            })
            .await
            .map_err(Error::from)
    }
}

/// Raw column values for one row, encoded outside the database thread.
struct EncodedEntry {
    key_hash: String,
    method: String,
    request_url: String,
    final_url: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
}

impl EncodedEntry {
    fn new(key: &RequestKey, response: &CapturedResponse) -> Result<Self, Error> {
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;
        Ok(Self {
            key_hash: key.hash(),
            method: key.method.clone(),
            request_url: key.url.clone(),
            final_url: response.url.clone(),
            status: response.status,
            headers_json,
            body: response.body.clone(),
        })
    }

    fn upsert(&self, conn: &rusqlite::Connection, store: &str, stored_at: &str) -> Result<(), Error> {
        conn.execute(
            "INSERT INTO cached_responses (
                store, key_hash, method, request_url, final_url,
                status_code, headers_json, body, stored_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(store, key_hash) DO UPDATE SET
                method = excluded.method,
                request_url = excluded.request_url,
                final_url = excluded.final_url,
                status_code = excluded.status_code,
                headers_json = excluded.headers_json,
                body = excluded.body,
                stored_at = excluded.stored_at",
            params![
                store,
                &self.key_hash,
                &self.method,
                &self.request_url,
                &self.final_url,
                self.status,
                &self.headers_json,
                &self.body,
                stored_at,
            ],
        )?;
        Ok(())
    }
}

impl ResponseStore {
    /// Version tag of this store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store every entry in one transaction.
    ///
    /// Either all entries are written and the store is marked installed, or
    /// nothing changes. Returns the number of entries written.
    pub async fn add_all(&self, entries: &[(RequestKey, CapturedResponse)]) -> Result<usize, Error> {
        let encoded = entries
            .iter()
            .map(|(key, response)| EncodedEntry::new(key, response))
            .collect::<Result<Vec<_>, _>>()?;
        let store = self.name.clone();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                for entry in &encoded {
                    entry.upsert(&tx, &store, &now)?;
                }
                tx.execute("UPDATE cache_stores SET installed_at = ?1 WHERE name = ?2", params![now, store])?;
                tx.commit()?;
                Ok(encoded.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the response for `key`.
    pub async fn put(&self, key: &RequestKey, response: &CapturedResponse) -> Result<(), Error> {
        let entry = EncodedEntry::new(key, response)?;
        let store = self.name.clone();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> { entry.upsert(conn, &store, &now) })
            .await
            .map_err(Error::from)
    }

    /// Look up the stored response for `key`.
    ///
    /// Returns None if the store has no entry for it.
    pub async fn match_request(&self, key: &RequestKey) -> Result<Option<CapturedResponse>, Error> {
        let store = self.name.clone();
        let key_hash = key.hash();

        let row = self
            .db
            .conn
            .call(move |conn| -> Result<Option<(String, u16, String, Vec<u8>)>, Error> {
                let result = conn.query_row(
                    "SELECT final_url, status_code, headers_json, body
                     FROM cached_responses WHERE store = ?1 AND key_hash = ?2",
                    params![store, key_hash],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                );

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some((url, status, headers_json, body)) = row else {
            return Ok(None);
        };

        let headers = serde_json::from_str(&headers_json)
            .map_err(|e| Error::CorruptEntry(format!("{}: {e}", key.url)))?;

        Ok(Some(CapturedResponse { url, status, headers, body }))
    }

    /// Number of entries in this store.
    pub async fn len(&self) -> Result<u64, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cached_responses WHERE store = ?1", params![store], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }

    /// Whether a bulk `add_all` has completed for this store.
    pub async fn is_installed(&self) -> Result<bool, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let installed: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1 AND installed_at IS NOT NULL)",
                    params![store],
                    |row| row.get(0),
                )?;
                Ok(installed)
            })
            .await
            .map_err(Error::from)
    }
}
