//! prayer_times_set and prayer_due tool implementations.

use noor_core::Session;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::parse_time;
use crate::tools::json_result;

/// Parameters for the prayer_times_set tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PrayerTimesSetParams {
    /// Timetable object mapping prayer names to "HH:MM" strings,
    /// e.g. {"Fajr": "04:12 (EET)", "Dhuhr": "11:52"}.
    pub timings: serde_json::Value,
}

/// Parameters for the prayer_due tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PrayerDueParams {
    /// Time to check as HH:MM (default: now).
    #[serde(default)]
    pub time: Option<String>,
}

/// Output from the prayer_due tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PrayerDueOutput {
    /// Prayer due at the given minute, if any.
    pub prayer: Option<String>,
    /// Notification text for the due prayer.
    pub announcement: Option<String>,
}

/// Output from the prayer_times_set tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PrayerTimesSetOutput {
    pub stored: bool,
}

/// Implementation of the prayer_times_set tool.
pub async fn prayer_times_set_impl(
    session: &Session, params: PrayerTimesSetParams,
) -> Result<CallToolResult, McpError> {
    session.set_prayer_times(&params.timings).await?;
    json_result(&PrayerTimesSetOutput { stored: true })
}

/// Implementation of the prayer_due tool.
pub async fn prayer_due_impl(session: &Session, params: PrayerDueParams) -> Result<CallToolResult, McpError> {
    let now = parse_time(params.time.as_deref())?;
    let due = session.due_prayer(now).await?;

    let output = PrayerDueOutput {
        prayer: due.map(|p| p.key().to_string()),
        announcement: due.map(|p| p.announcement()),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{offline_state, output_text};

    fn at(time: &str) -> PrayerDueParams {
        PrayerDueParams { time: Some(time.into()) }
    }

    async fn due(session: &Session, time: &str) -> PrayerDueOutput {
        let result = prayer_due_impl(session, at(time)).await.unwrap();
        serde_json::from_str(&output_text(&result)).unwrap()
    }

    #[tokio::test]
    async fn test_due_after_timetable_set() {
        let state = offline_state().await;
        let timings = serde_json::json!({"Fajr": "04:12 (EET)", "Maghrib": "18:05"});
        prayer_times_set_impl(&state.session, PrayerTimesSetParams { timings }).await.unwrap();

        let output = due(&state.session, "18:05").await;
        assert_eq!(output.prayer.as_deref(), Some("Maghrib"));
        assert!(output.announcement.unwrap().contains("المغرب"));

        let output = due(&state.session, "18:06").await;
        assert!(output.prayer.is_none());
    }

    #[tokio::test]
    async fn test_nothing_due_without_timetable() {
        let state = offline_state().await;
        let output = due(&state.session, "04:12").await;
        assert!(output.prayer.is_none());
        assert!(output.announcement.is_none());
    }

    #[tokio::test]
    async fn test_non_object_timetable_rejected() {
        let state = offline_state().await;
        let params = PrayerTimesSetParams { timings: serde_json::json!(["04:12"]) };
        assert!(prayer_times_set_impl(&state.session, params).await.is_err());
    }
}
