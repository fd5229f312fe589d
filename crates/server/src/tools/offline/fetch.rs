//! resource_fetch and cache_match tool implementations.
//!
//! `resource_fetch` routes a request through the offline cache exactly as a
//! page load would. `cache_match` only looks in the store.

use noor_client::{FetchClient, OfflineCache};
use noor_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ResponseView;
use crate::tools::json_result;

/// Parameters for the resource_fetch and cache_match tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceParams {
    /// Absolute URL, or a path resolved against the configured origin (e.g. "/quran").
    pub url: String,
}

/// Output from the resource_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceFetchOutput {
    /// Requested URL after resolution.
    pub url: String,
    /// "dynamic" (network first) or "static" (cache first).
    pub class: String,
    /// "network" or "cache".
    pub source: String,
    pub response: ResponseView,
}

/// Output from the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchOutput {
    pub url: String,
    pub response: ResponseView,
}

/// Implementation of the resource_fetch tool.
pub async fn fetch_impl(cache: &OfflineCache<FetchClient>, params: ResourceParams) -> Result<CallToolResult, McpError> {
    let served = cache.handle(&params.url).await?;

    let output = ResourceFetchOutput {
        url: served.url.to_string(),
        class: served.class.as_str().to_string(),
        source: served.source.as_str().to_string(),
        response: ResponseView::from(&served.response),
    };
    json_result(&output)
}

/// Implementation of the cache_match tool.
pub async fn match_impl(cache: &OfflineCache<FetchClient>, params: ResourceParams) -> Result<CallToolResult, McpError> {
    let url = cache.resolve(&params.url)?;
    let response = cache
        .lookup(url.as_str())
        .await?
        .ok_or_else(|| Error::CacheMiss(url.to_string()))?;

    json_result(&CacheMatchOutput { url: url.to_string(), response: ResponseView::from(&response) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{offline_state, output_text};
    use noor_core::{CapturedResponse, RequestKey};

    fn css() -> CapturedResponse {
        CapturedResponse {
            url: "http://127.0.0.1:1/static/css/main.css".into(),
            status: 200,
            headers: vec![("content-type".into(), "text/css".into())],
            body: b"body{direction:rtl}".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_fetch_static_hit_served_from_cache() {
        let state = offline_state().await;
        let key = RequestKey::get("http://127.0.0.1:1/static/css/main.css");
        state.cache.store().put(&key, &css()).await.unwrap();

        let params = ResourceParams { url: "/static/css/main.css".into() };
        let result = fetch_impl(&state.cache, params).await.unwrap();

        let output: ResourceFetchOutput = serde_json::from_str(&output_text(&result)).unwrap();
        assert_eq!(output.class, "static");
        assert_eq!(output.source, "cache");
        assert_eq!(output.response.body.as_deref(), Some("body{direction:rtl}"));
    }

    #[tokio::test]
    async fn test_fetch_dynamic_offline_miss_is_error() {
        let state = offline_state().await;
        let params = ResourceParams { url: "/api/prayer-times".into() };

        let err = fetch_impl(&state.cache, params).await.unwrap_err();
        assert_eq!(err.code.0, -32008, "got {}", err.message);
    }

    #[tokio::test]
    async fn test_fetch_dynamic_offline_hit_served_from_cache() {
        let state = offline_state().await;
        let stored = CapturedResponse {
            url: "http://127.0.0.1:1/api/hadith".into(),
            status: 200,
            headers: vec![("content-type".into(), "application/json".into())],
            body: br#"{"hadith":[]}"#.to_vec(),
        };
        let key = RequestKey::get("http://127.0.0.1:1/api/hadith");
        state.cache.store().put(&key, &stored).await.unwrap();

        let params = ResourceParams { url: "/api/hadith".into() };
        let result = fetch_impl(&state.cache, params).await.unwrap();

        let output: ResourceFetchOutput = serde_json::from_str(&output_text(&result)).unwrap();
        assert_eq!(output.class, "dynamic");
        assert_eq!(output.source, "cache");
        assert_eq!(output.response.status, 200);
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let state = offline_state().await;
        let params = ResourceParams { url: "ftp://example.com/file".into() };

        let result = fetch_impl(&state.cache, params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_match_miss() {
        let state = offline_state().await;
        let params = ResourceParams { url: "/quran".into() };

        let err = match_impl(&state.cache, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
        assert!(err.message.contains("/quran"));
    }

    #[tokio::test]
    async fn test_match_hit() {
        let state = offline_state().await;
        let key = RequestKey::get("http://127.0.0.1:1/static/css/main.css");
        state.cache.store().put(&key, &css()).await.unwrap();

        let params = ResourceParams { url: "http://127.0.0.1:1/static/css/main.css".into() };
        let result = match_impl(&state.cache, params).await.unwrap();

        let output: CacheMatchOutput = serde_json::from_str(&output_text(&result)).unwrap();
        assert_eq!(output.response.body_bytes, 19);
    }
}
