//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

use crate::state::AppState;
use crate::tools::offline::{
    fetch::{ResourceParams, fetch_impl, match_impl},
    install::install_impl,
    status::status_impl,
};
use crate::tools::session::{
    dhikr::{DhikrGetParams, DhikrSaveParams, dhikr_get_impl, dhikr_save_impl},
    prayer::{PrayerDueParams, PrayerTimesSetParams, prayer_due_impl, prayer_times_set_impl},
    reading::{ReadingSaveParams, reading_save_impl},
    theme::theme_toggle_impl,
    visit::{SessionVisitParams, visit_impl},
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for noor.
#[derive(Clone)]
pub struct NoorServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl NoorServer {
    /// Create a new server handler over shared state.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// Fetch a resource through the offline cache.
    ///
    /// API and third-party requests go to the network first and fall back to
    /// the stored copy; everything else is served from the store first.
    #[tool(
        description = "Fetch a URL or origin-relative path through the offline cache. Returns the response and whether it came from the network or the cache."
    )]
    async fn resource_fetch(&self, params: Parameters<ResourceParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.state.cache, params.0).await
    }

    #[tool(description = "Look up a URL in the offline cache without touching the network.")]
    async fn cache_match(&self, params: Parameters<ResourceParams>) -> Result<CallToolResult, McpError> {
        match_impl(&self.state.cache, params.0).await
    }

    /// Re-run the install step for the static asset manifest.
    #[tool(description = "Fetch and store every static asset in the manifest. Stores all assets or none.")]
    async fn cache_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.state.cache).await
    }

    #[tool(description = "Report the active cache store, its entry count, the manifest, and all stores on disk.")]
    async fn cache_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.state.db, &self.state.cache).await
    }

    #[tool(
        description = "Register a page visit for the day and return the reading streak, theme, reading progress, and location prompt state."
    )]
    async fn session_visit(&self, params: Parameters<SessionVisitParams>) -> Result<CallToolResult, McpError> {
        visit_impl(&self.state.session, params.0).await
    }

    #[tool(description = "Save Quran reading progress (surah, ayah). Progress only moves forward and extends the daily streak.")]
    async fn reading_save(&self, params: Parameters<ReadingSaveParams>) -> Result<CallToolResult, McpError> {
        reading_save_impl(&self.state.session, params.0).await
    }

    #[tool(description = "Get today's dhikr counters. Counters reset at the start of each day.")]
    async fn dhikr_get(&self, params: Parameters<DhikrGetParams>) -> Result<CallToolResult, McpError> {
        dhikr_get_impl(&self.state.session, params.0).await
    }

    #[tool(description = "Save the repetition count for one dhikr card.")]
    async fn dhikr_save(&self, params: Parameters<DhikrSaveParams>) -> Result<CallToolResult, McpError> {
        dhikr_save_impl(&self.state.session, params.0).await
    }

    #[tool(description = "Cache the daily prayer timetable used by prayer_due.")]
    async fn prayer_times_set(&self, params: Parameters<PrayerTimesSetParams>) -> Result<CallToolResult, McpError> {
        prayer_times_set_impl(&self.state.session, params.0).await
    }

    #[tool(description = "Check whether a prayer is due at the given minute according to the cached timetable.")]
    async fn prayer_due(&self, params: Parameters<PrayerDueParams>) -> Result<CallToolResult, McpError> {
        prayer_due_impl(&self.state.session, params.0).await
    }

    #[tool(description = "Toggle the color theme between dark and light and return the new theme.")]
    async fn theme_toggle(&self) -> Result<CallToolResult, McpError> {
        theme_toggle_impl(&self.state.session).await
    }
}

impl ServerHandler for NoorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "noor".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
