use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, File};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub backend: BackendSettings,
    pub api: ApiSettings,
    pub search: SearchSettings,
    pub leaderboard: LeaderboardSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
    pub environment: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Sqlite,
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

/// Hosted backend-as-a-service reached over its REST interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    pub store: StoreKind,
    pub url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
    /// Shared secret for the keyed submission endpoint. Unset means every
    /// keyed submission is rejected.
    pub submission_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    pub debounce_ms: u64,
    pub player_min_query_len: usize,
    pub quick_min_query_len: usize,
    pub mobile_breakpoint_px: u32,
    pub mobile_min_query_len: usize,
    pub result_limit: usize,
}

impl SearchSettings {
    /// Quiet interval before a search is dispatched.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardSettings {
    pub page_size: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "Tier Board".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
                environment: Environment::Development,
            },
            database: DatabaseSettings {
                url: "sqlite://tier_board.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            backend: BackendSettings {
                store: StoreKind::Sqlite,
                url: "http://localhost:54321".to_string(),
                api_key: String::new(),
                timeout_seconds: 15,
            },
            api: ApiSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
                submission_key: None,
            },
            search: SearchSettings {
                debounce_ms: 800,
                player_min_query_len: 3,
                quick_min_query_len: 2,
                mobile_breakpoint_px: 768,
                mobile_min_query_len: 3,
                result_limit: 20,
            },
            leaderboard: LeaderboardSettings {
                page_size: 50,
            },
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("TIER_BOARD").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Load an explicit config file instead of the `config/` directory.
    /// Environment overrides still apply on top.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("TIER_BOARD").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.leaderboard.page_size == 0 {
            return Err("Leaderboard page size must be positive".to_string());
        }

        if self.database.max_connections == 0 {
            return Err("Database pool needs at least one connection".to_string());
        }

        let search = &self.search;
        if search.player_min_query_len == 0 || search.quick_min_query_len == 0 {
            return Err("Search minimum query lengths must be positive".to_string());
        }
        if search.mobile_min_query_len < search.quick_min_query_len {
            return Err("Mobile minimum query length cannot be looser than desktop".to_string());
        }
        if search.result_limit == 0 {
            return Err("Search result limit must be positive".to_string());
        }

        if self.backend.store == StoreKind::Rest && self.backend.url.trim().is_empty() {
            return Err("REST store selected but backend.url is empty".to_string());
        }

        Ok(())
    }
}
