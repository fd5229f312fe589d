//! Reading progress and the daily streak.
//!
//! Progress maps a surah number to the furthest ayah read and only moves
//! forward. The streak grows by one on the first reading of a calendar day;
//! a visit after a skipped day resets it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Session;
use super::keys;
use crate::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Result of [`Session::save_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressUpdate {
    /// The ayah was not beyond what was already recorded.
    Unchanged,
    /// Progress moved forward.
    Advanced {
        streak: u32,
        /// True when this was the first reading today.
        streak_extended: bool,
    },
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v, DATE_FORMAT).ok())
}

impl Session {
    /// Current streak; unparsable values count as zero.
    pub async fn streak(&self) -> Result<u32, Error> {
        let raw = self.storage.get_item(keys::READING_STREAK).await?;
        Ok(raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
    }

    async fn set_streak(&self, streak: u32) -> Result<(), Error> {
        self.storage.set_item(keys::READING_STREAK, &streak.to_string()).await
    }

    /// Furthest ayah read per surah.
    pub async fn reading_progress(&self) -> Result<BTreeMap<u32, u32>, Error> {
        Ok(self.storage.get_json(keys::QURAN_PROGRESS).await?.unwrap_or_default())
    }

    /// Record a page visit on `today` and return the streak to display.
    ///
    /// The first visit of a day keeps the streak if the previous visit was
    /// yesterday and resets it otherwise. A reader with no recorded visit
    /// keeps whatever streak is stored.
    pub async fn register_visit(&self, today: NaiveDate) -> Result<u32, Error> {
        let last_visit = self.storage.get_item(keys::LAST_VISIT_DATE).await?;
        let mut streak = self.streak().await?;

        if parse_date(last_visit.as_deref()) != Some(today) {
            let yesterday = today.pred_opt();
            let continued = parse_date(last_visit.as_deref()).is_some_and(|d| Some(d) == yesterday);
            if !continued && last_visit.is_some() {
                tracing::debug!(previous = streak, "streak broken");
                streak = 0;
            }
            self.storage.set_item(keys::LAST_VISIT_DATE, &today.format(DATE_FORMAT).to_string()).await?;
            self.set_streak(streak).await?;
        }

        Ok(streak)
    }

    /// Record that ayah `ayah` of surah `surah` was read on `today`.
    pub async fn save_progress(&self, surah: u32, ayah: u32, today: NaiveDate) -> Result<ProgressUpdate, Error> {
        if surah == 0 || ayah == 0 {
            return Err(Error::InvalidInput("surah and ayah are 1-based".into()));
        }

        let mut progress = self.reading_progress().await?;
        if progress.get(&surah).is_some_and(|&read| read >= ayah) {
            return Ok(ProgressUpdate::Unchanged);
        }

        progress.insert(surah, ayah);
        self.storage.set_json(keys::QURAN_PROGRESS, &progress).await?;

        let (streak, streak_extended) = self.record_reading(today).await?;
        Ok(ProgressUpdate::Advanced { streak, streak_extended })
    }

    /// Count today toward the streak once.
    async fn record_reading(&self, today: NaiveDate) -> Result<(u32, bool), Error> {
        let today_str = today.format(DATE_FORMAT).to_string();
        let last_read = self.storage.get_item(keys::LAST_READ_DATE).await?;

        if last_read.as_deref() == Some(today_str.as_str()) {
            return Ok((self.streak().await?, false));
        }

        let streak = self.streak().await?.saturating_add(1);
        self.set_streak(streak).await?;
        self.storage.set_item(keys::LAST_READ_DATE, &today_str).await?;
        tracing::info!(streak, "reading streak extended");
        Ok((streak, true))
    }
}
