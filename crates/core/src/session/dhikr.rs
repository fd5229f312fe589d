//! Dhikr counters, reset at the start of each day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Session;
use super::keys;
use crate::Error;

/// Counts per dhikr card for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhikrProgress {
    pub date: NaiveDate,
    #[serde(default)]
    pub counts: BTreeMap<String, u32>,
}

impl DhikrProgress {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, counts: BTreeMap::new() }
    }
}

impl Session {
    /// Today's counters. A stored day other than `today` is replaced by an
    /// empty record, which is persisted.
    pub async fn dhikr_progress(&self, today: NaiveDate) -> Result<DhikrProgress, Error> {
        let saved: Option<DhikrProgress> = self.storage.get_json(keys::DHIKR_PROGRESS).await?;
        match saved {
            Some(progress) if progress.date == today => Ok(progress),
            _ => {
                let fresh = DhikrProgress::new(today);
                self.storage.set_json(keys::DHIKR_PROGRESS, &fresh).await?;
                Ok(fresh)
            }
        }
    }

    /// Store the current count for one card.
    pub async fn save_dhikr(&self, card_id: &str, count: u32, today: NaiveDate) -> Result<DhikrProgress, Error> {
        if card_id.is_empty() {
            return Err(Error::InvalidInput("card_id cannot be empty".into()));
        }

        let mut progress = self.dhikr_progress(today).await?;
        progress.counts.insert(card_id.to_string(), count);
        self.storage.set_json(keys::DHIKR_PROGRESS, &progress).await?;
        Ok(progress)
    }
}
