//! cache_install tool implementation.
//!
//! Re-runs the install step: fetches every manifest asset and stores them
//! together, or stores nothing.

use noor_client::{FetchClient, OfflineCache};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the cache_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInstallOutput {
    /// Name of the populated store.
    pub store: String,
    /// Number of assets written.
    pub installed: usize,
    /// Manifest URLs that were fetched.
    pub assets: Vec<String>,
}

/// Implementation of the cache_install tool.
pub async fn install_impl(cache: &OfflineCache<FetchClient>) -> Result<CallToolResult, McpError> {
    let installed = cache.install().await?;

    let output = CacheInstallOutput {
        store: cache.store().name().to_string(),
        installed,
        assets: cache.manifest().entries().iter().map(|e| e.url.to_string()).collect(),
    };
    json_result(&output)
}
