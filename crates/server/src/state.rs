//! Shared server state.
//!
//! One `AppState` is built at startup and shared by every tool call: the
//! offline cache for the configured version tag and the reader session.

use noor_client::{FetchClient, FetchConfig, OfflineCache, OfflineConfig};
use noor_core::{AppConfig, CacheDb, Error, Session};

pub struct AppState {
    pub config: AppConfig,
    pub db: CacheDb,
    pub cache: OfflineCache<FetchClient>,
    pub session: Session,
}

impl AppState {
    /// Open the database at `config.db_path` and build the state on it.
    pub async fn open(config: AppConfig) -> Result<Self, Error> {
        let db = CacheDb::open(&config.db_path).await?;
        Self::with_db(config, db).await
    }

    pub async fn with_db(config: AppConfig, db: CacheDb) -> Result<Self, Error> {
        let store = db.open_store(&config.cache_name).await?;
        let transport = FetchClient::new(FetchConfig::from(&config))?;
        let cache = OfflineCache::new(transport, store, OfflineConfig::try_from(&config)?)?;
        let session = Session::new(db.local_storage());

        Ok(Self { config, db, cache, session })
    }
}
