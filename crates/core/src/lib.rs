//! Core types and shared functionality for noor.
//!
//! This crate provides:
//! - Named response stores with a SQLite backend
//! - Local key-value storage and reader session state
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod session;

pub use cache::{CacheDb, CapturedResponse, RequestKey, ResponseStore};
pub use config::AppConfig;
pub use error::Error;
pub use session::Session;
