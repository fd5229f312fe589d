//! Prayer-time due check over the cached timetable.
//!
//! The timetable is a JSON object mapping prayer names to strings whose
//! first five characters are `HH:MM` (e.g. `"04:12 (EET)"`).

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Session;
use super::keys;
use crate::Error;

/// The five daily prayers, in checking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 5] = [Prayer::Fajr, Prayer::Dhuhr, Prayer::Asr, Prayer::Maghrib, Prayer::Isha];

    /// Key used in the timetable JSON.
    pub fn key(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    pub fn arabic_name(self) -> &'static str {
        match self {
            Prayer::Fajr => "الفجر",
            Prayer::Dhuhr => "الظهر",
            Prayer::Asr => "العصر",
            Prayer::Maghrib => "المغرب",
            Prayer::Isha => "العشاء",
        }
    }

    /// Notification text shown when the prayer is due.
    pub fn announcement(self) -> String {
        format!("🕌 حان الآن موعد صلاة {}", self.arabic_name())
    }
}

/// First prayer whose time matches `now` to the minute.
///
/// Malformed timetables yield `None`.
pub fn due_prayer(timetable: &str, now: NaiveTime) -> Option<Prayer> {
    let times: Value = serde_json::from_str(timetable).ok()?;
    let now = now.format("%H:%M").to_string();

    Prayer::ALL.into_iter().find(|prayer| {
        times
            .get(prayer.key())
            .and_then(Value::as_str)
            .and_then(|t| t.get(..5))
            .is_some_and(|hhmm| hhmm == now)
    })
}

impl Session {
    /// Replace the cached timetable.
    pub async fn set_prayer_times(&self, timetable: &Value) -> Result<(), Error> {
        if !timetable.is_object() {
            return Err(Error::InvalidInput("prayer timetable must be a JSON object".into()));
        }
        self.storage.set_json(keys::CACHED_PRAYER_TIMES, timetable).await
    }

    /// Prayer due at `now` according to the cached timetable, if any.
    pub async fn due_prayer(&self, now: NaiveTime) -> Result<Option<Prayer>, Error> {
        let Some(timetable) = self.storage.get_item(keys::CACHED_PRAYER_TIMES).await? else {
            return Ok(None);
        };
        Ok(due_prayer(&timetable, now))
    }
}
