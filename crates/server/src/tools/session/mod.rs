//! Tools over the reader session.
//!
//! Each tool accepts an optional day or time so callers and tests can pin
//! the clock; when omitted the local clock is used.

pub mod dhikr;
pub mod prayer;
pub mod reading;
pub mod theme;
pub mod visit;

use chrono::{Local, NaiveDate, NaiveTime};
use noor_core::Error;

/// Parse `YYYY-MM-DD`, defaulting to today.
pub(crate) fn parse_day(value: Option<&str>) -> Result<NaiveDate, Error> {
    match value {
        Some(v) => NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
            .map_err(|e| Error::InvalidInput(format!("date must be YYYY-MM-DD: {e}"))),
        None => Ok(Local::now().date_naive()),
    }
}

/// Parse `HH:MM`, defaulting to the current local time.
pub(crate) fn parse_time(value: Option<&str>) -> Result<NaiveTime, Error> {
    match value {
        Some(v) => NaiveTime::parse_from_str(v.trim(), "%H:%M")
            .map_err(|e| Error::InvalidInput(format!("time must be HH:MM: {e}"))),
        None => Ok(Local::now().time()),
    }
}
