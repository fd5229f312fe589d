//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (NOOR_*)
//! 2. TOML config file (if NOOR_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (NOOR_*)
/// 2. TOML config file (if NOOR_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite database holding cache stores and local storage.
    ///
    /// Set via NOOR_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Version tag naming the active cache store.
    ///
    /// Bumping it starts a new, empty store. Set via NOOR_CACHE_NAME.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Origin that manifest paths are resolved against.
    ///
    /// Set via NOOR_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Static asset manifest, pre-populated at install time.
    ///
    /// Set via NOOR_STATIC_ASSETS (array syntax, e.g. `["/","/quran"]`) or the TOML file.
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<String>,

    /// URL substrings that mark a request as dynamic (network-first).
    #[serde(default = "default_dynamic_markers")]
    pub dynamic_markers: Vec<String>,

    /// Write static responses fetched on a cache miss into the store.
    ///
    /// Off by default: only the install step populates static entries.
    #[serde(default)]
    pub store_static_misses: bool,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via NOOR_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via NOOR_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via NOOR_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./noor-cache.sqlite")
}

fn default_cache_name() -> String {
    "islamic-v1".into()
}

fn default_origin() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_static_assets() -> Vec<String> {
    ["/", "/static/css/main.css", "/static/js/main.js", "/quran", "/hadith"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_dynamic_markers() -> Vec<String> {
    ["/api/", "cdn.jsdelivr.net", "api.alquran.cloud"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_user_agent() -> String {
    "noor/0.1".into()
}

fn default_max_bytes() -> usize {
    10_485_760 // 10MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_name: default_cache_name(),
            origin: default_origin(),
            static_assets: default_static_assets(),
            dynamic_markers: default_dynamic_markers(),
            store_static_misses: false,
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `NOOR_`
    /// 2. TOML file from `NOOR_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NOOR_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NOOR_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./noor-cache.sqlite"));
        assert_eq!(config.cache_name, "islamic-v1");
        assert_eq!(config.origin, "http://127.0.0.1:5000");
        assert_eq!(config.static_assets.len(), 5);
        assert_eq!(config.static_assets[0], "/");
        assert_eq!(config.dynamic_markers, vec!["/api/", "cdn.jsdelivr.net", "api.alquran.cloud"]);
        assert!(!config.store_static_misses);
        assert_eq!(config.user_agent, "noor/0.1");
        assert_eq!(config.timeout_ms, 20_000);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_load_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "noor.toml",
                r#"
                cache_name = "islamic-v2"
                static_assets = ["/", "/quran"]
                store_static_misses = true
                "#,
            )?;
            jail.set_env("NOOR_CONFIG_FILE", "noor.toml");
            jail.set_env("NOOR_TIMEOUT_MS", "5000");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.cache_name, "islamic-v2");
            assert_eq!(config.static_assets, vec!["/", "/quran"]);
            assert!(config.store_static_misses);
            assert_eq!(config.timeout_ms, 5000);
            assert_eq!(config.origin, "http://127.0.0.1:5000");
            Ok(())
        });
    }
}
