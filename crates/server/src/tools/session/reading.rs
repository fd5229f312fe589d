//! reading_save tool implementation.

use noor_core::Session;
use noor_core::session::ProgressUpdate;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::parse_day;
use crate::tools::json_result;

/// Parameters for the reading_save tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadingSaveParams {
    /// Surah number, starting at 1.
    pub surah: u32,
    /// Ayah number within the surah, starting at 1.
    pub ayah: u32,
    /// Day of reading as YYYY-MM-DD (default: today).
    #[serde(default)]
    pub date: Option<String>,
}

/// Output from the reading_save tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadingSaveOutput {
    pub update: ProgressUpdate,
    /// Furthest ayah recorded for the surah after the call.
    pub furthest_ayah: u32,
}

/// Implementation of the reading_save tool.
pub async fn reading_save_impl(session: &Session, params: ReadingSaveParams) -> Result<CallToolResult, McpError> {
    let today = parse_day(params.date.as_deref())?;
    let update = session.save_progress(params.surah, params.ayah, today).await?;
    let furthest_ayah = session
        .reading_progress()
        .await?
        .get(&params.surah)
        .copied()
        .unwrap_or_default();

    json_result(&ReadingSaveOutput { update, furthest_ayah })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{offline_state, output_text};

    fn params(surah: u32, ayah: u32) -> ReadingSaveParams {
        ReadingSaveParams { surah, ayah, date: Some("2024-03-11".into()) }
    }

    #[tokio::test]
    async fn test_reading_advances_then_unchanged() {
        let state = offline_state().await;

        let result = reading_save_impl(&state.session, params(2, 255)).await.unwrap();
        let output: ReadingSaveOutput = serde_json::from_str(&output_text(&result)).unwrap();
        assert_eq!(output.update, ProgressUpdate::Advanced { streak: 1, streak_extended: true });
        assert_eq!(output.furthest_ayah, 255);

        let result = reading_save_impl(&state.session, params(2, 100)).await.unwrap();
        let output: ReadingSaveOutput = serde_json::from_str(&output_text(&result)).unwrap();
        assert_eq!(output.update, ProgressUpdate::Unchanged);
        assert_eq!(output.furthest_ayah, 255);
    }

    #[tokio::test]
    async fn test_reading_zero_ayah_rejected() {
        let state = offline_state().await;
        assert!(reading_save_impl(&state.session, params(1, 0)).await.is_err());
    }
}
