//! SQLite-backed named response stores.
//!
//! Stores are scoped by a version tag and hold full captured responses keyed
//! by request. Access is async via tokio-rusqlite, with WAL mode and
//! versioned schema migrations.

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use store::{CapturedResponse, RequestKey, ResponseStore, StoreInfo};
