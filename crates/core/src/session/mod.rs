//! Reader session state kept in local storage.
//!
//! [`Session`] owns the storage handle; every operation reads and writes
//! through it, so callers pass the session by reference instead of sharing
//! ambient globals. Dates and times are supplied by the caller.

pub mod dhikr;
pub mod prayer;
pub mod storage;
pub mod streak;

pub use dhikr::DhikrProgress;
pub use prayer::Prayer;
pub use storage::{LocalStorage, keys};
pub use streak::ProgressUpdate;

use crate::Error;
use serde::{Deserialize, Serialize};

/// Color theme. Dark is the default when nothing is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Per-reader session state.
#[derive(Debug, Clone)]
pub struct Session {
    storage: LocalStorage,
}

impl Session {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    pub async fn theme(&self) -> Result<Theme, Error> {
        let stored = self.storage.get_item(keys::THEME).await?;
        Ok(Theme::from_stored(stored.as_deref()))
    }

    /// Flip the theme and persist the new value.
    pub async fn toggle_theme(&self) -> Result<Theme, Error> {
        let next = self.theme().await?.toggled();
        self.storage.set_item(keys::THEME, next.as_str()).await?;
        Ok(next)
    }

    /// Whether the reader has already been asked for location access.
    pub async fn geo_permission_asked(&self) -> Result<bool, Error> {
        Ok(self.storage.get_item(keys::GEO_PERMISSION).await?.is_some())
    }

    pub async fn mark_geo_permission_asked(&self) -> Result<(), Error> {
        self.storage.set_item(keys::GEO_PERMISSION, "asked").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CacheDb;

    async fn session() -> Session {
        let db = CacheDb::open_in_memory().await.unwrap();
        Session::new(db.local_storage())
    }

    #[tokio::test]
    async fn test_theme_defaults_to_dark() {
        let session = session().await;
        assert_eq!(session.theme().await.unwrap(), Theme::Dark);
    }

    #[tokio::test]
    async fn test_toggle_theme_persists() {
        let session = session().await;
        assert_eq!(session.toggle_theme().await.unwrap(), Theme::Light);
        assert_eq!(session.storage.get_item(keys::THEME).await.unwrap().as_deref(), Some("light"));
        assert_eq!(session.toggle_theme().await.unwrap(), Theme::Dark);
        assert_eq!(session.theme().await.unwrap(), Theme::Dark);
    }

    #[tokio::test]
    async fn test_geo_permission() {
        let session = session().await;
        assert!(!session.geo_permission_asked().await.unwrap());
        session.mark_geo_permission_asked().await.unwrap();
        assert!(session.geo_permission_asked().await.unwrap());
    }
}
