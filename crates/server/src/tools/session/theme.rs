//! theme_toggle tool implementation.

use noor_core::Session;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the theme_toggle tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ThemeToggleOutput {
    /// Theme after the toggle: "dark" or "light".
    pub theme: String,
}

/// Implementation of the theme_toggle tool.
pub async fn theme_toggle_impl(session: &Session) -> Result<CallToolResult, McpError> {
    let theme = session.toggle_theme().await?;
    json_result(&ThemeToggleOutput { theme: theme.as_str().to_string() })
}
