//! Client code for noor.
//!
//! This crate provides the network transport and the offline resource cache
//! that decides, per request, between the network and the named store.

pub mod fetch;
pub mod offline;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, Transport};
pub use offline::{Manifest, OfflineCache, OfflineConfig, RequestClass, ResponseSource, Served, classify};
