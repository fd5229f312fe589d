//! dhikr_get and dhikr_save tool implementations.

use std::collections::BTreeMap;

use noor_core::Session;
use noor_core::session::DhikrProgress;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::parse_day;
use crate::tools::json_result;

/// Parameters for the dhikr_get tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DhikrGetParams {
    /// Day as YYYY-MM-DD (default: today).
    #[serde(default)]
    pub date: Option<String>,
}

/// Parameters for the dhikr_save tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DhikrSaveParams {
    /// Identifier of the dhikr card.
    pub card_id: String,
    /// Repetitions completed so far today.
    pub count: u32,
    /// Day as YYYY-MM-DD (default: today).
    #[serde(default)]
    pub date: Option<String>,
}

/// Output from the dhikr tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DhikrOutput {
    /// Day the counts belong to (YYYY-MM-DD).
    pub date: String,
    pub counts: BTreeMap<String, u32>,
}

impl From<DhikrProgress> for DhikrOutput {
    fn from(progress: DhikrProgress) -> Self {
        Self { date: progress.date.format("%Y-%m-%d").to_string(), counts: progress.counts }
    }
}

/// Implementation of the dhikr_get tool.
pub async fn dhikr_get_impl(session: &Session, params: DhikrGetParams) -> Result<CallToolResult, McpError> {
    let today = parse_day(params.date.as_deref())?;
    let progress = session.dhikr_progress(today).await?;
    json_result(&DhikrOutput::from(progress))
}

/// Implementation of the dhikr_save tool.
pub async fn dhikr_save_impl(session: &Session, params: DhikrSaveParams) -> Result<CallToolResult, McpError> {
    let today = parse_day(params.date.as_deref())?;
    let progress = session.save_dhikr(&params.card_id, params.count, today).await?;
    json_result(&DhikrOutput::from(progress))
}
