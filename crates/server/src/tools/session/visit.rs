//! session_visit tool implementation.
//!
//! Runs the page-load bookkeeping: registers the daily visit and reports
//! the state a freshly loaded page renders.

use std::collections::BTreeMap;

use noor_core::Session;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::parse_day;
use crate::tools::json_result;

/// Parameters for the session_visit tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SessionVisitParams {
    /// Day of the visit as YYYY-MM-DD (default: today).
    #[serde(default)]
    pub date: Option<String>,

    /// Record that the location permission prompt has been shown.
    #[serde(default)]
    pub geo_prompt_shown: bool,
}

/// Output from the session_visit tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionVisitOutput {
    pub streak: u32,
    /// "dark" or "light".
    pub theme: String,
    /// Furthest ayah read per surah.
    pub reading_progress: BTreeMap<u32, u32>,
    pub geo_permission_asked: bool,
}

/// Implementation of the session_visit tool.
pub async fn visit_impl(session: &Session, params: SessionVisitParams) -> Result<CallToolResult, McpError> {
    let today = parse_day(params.date.as_deref())?;

    let streak = session.register_visit(today).await?;
    if params.geo_prompt_shown {
        session.mark_geo_permission_asked().await?;
    }

    let output = SessionVisitOutput {
        streak,
        theme: session.theme().await?.as_str().to_string(),
        reading_progress: session.reading_progress().await?,
        geo_permission_asked: session.geo_permission_asked().await?,
    };
    json_result(&output)
}
