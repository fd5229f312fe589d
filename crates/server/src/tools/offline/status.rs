//! cache_status tool implementation.

use noor_client::{FetchClient, OfflineCache};
use noor_core::{CacheDb, cache::StoreInfo};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the cache_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatusOutput {
    /// Store selected by the configured version tag.
    pub active_store: String,
    pub entries: u64,
    pub installed: bool,
    /// Manifest URLs populated at install time.
    pub manifest: Vec<String>,
    /// Every store in the database, including ones left by older versions.
    pub stores: Vec<StoreInfo>,
}

/// Implementation of the cache_status tool.
pub async fn status_impl(db: &CacheDb, cache: &OfflineCache<FetchClient>) -> Result<CallToolResult, McpError> {
    let store = cache.store();

    let output = CacheStatusOutput {
        active_store: store.name().to_string(),
        entries: store.len().await?,
        installed: store.is_installed().await?,
        manifest: cache.manifest().entries().iter().map(|e| e.url.to_string()).collect(),
        stores: db.list_stores().await?,
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{offline_state, output_text};
    use noor_core::{CapturedResponse, RequestKey};

    #[tokio::test]
    async fn test_status_reports_active_and_old_stores() {
        let state = offline_state().await;
        state.db.open_store("islamic-v0").await.unwrap();

        let response = CapturedResponse {
            url: "http://127.0.0.1:1/quran".into(),
            status: 200,
            headers: Vec::new(),
            body: b"quran".to_vec(),
        };
        state
            .cache
            .store()
            .put(&RequestKey::get("http://127.0.0.1:1/quran"), &response)
            .await
            .unwrap();

        let result = status_impl(&state.db, &state.cache).await.unwrap();
        let output: CacheStatusOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(output.active_store, "islamic-v1");
        assert_eq!(output.entries, 1);
        assert!(!output.installed);
        assert_eq!(output.manifest.len(), 5);
        assert_eq!(output.manifest[0], "http://127.0.0.1:1/");
        assert_eq!(output.stores.len(), 2);
    }
}
