//! Request classification: dynamic (network-first) or static (cache-first).

use serde::{Deserialize, Serialize};

/// Retrieval policy a request falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestClass {
    /// API or third-party content; served network-first.
    Dynamic,
    /// Everything else; served cache-first.
    Static,
}

impl RequestClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestClass::Dynamic => "dynamic",
            RequestClass::Static => "static",
        }
    }
}

/// Classify `url` by plain substring match against `markers`.
pub fn classify<S: AsRef<str>>(url: &str, markers: &[S]) -> RequestClass {
    if markers.iter().any(|m| url.contains(m.as_ref())) { RequestClass::Dynamic } else { RequestClass::Static }
}
