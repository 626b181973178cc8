//! Application Configuration
//!
//! This module provides configuration management for the application,
//! supporting YAML configuration files with sensible defaults and a few
//! environment/command line overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use actix_web::Error;

use crate::sayings::{SayingStorage, sqlite_store::SQLiteSayingStore, mock_store::MockSayingStore};

/// Config file read when `RICKBOT_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Saying store backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StoreBackend {
    SQLite,
    Mock,
}

impl Default for StoreBackend {
    fn default() -> Self {
        StoreBackend::SQLite
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::SQLite),
            "mock" => Ok(StoreBackend::Mock),
            _ => Err(format!("Unknown store backend: {}", s))
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Saying store configuration
    pub store: StoreConfig,
    /// Quote submission and rendering rules
    pub quotes: QuotesConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Number of worker threads
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            workers: 4,
        }
    }
}

/// Saying store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store backend type
    pub backend: StoreBackend,
    /// Database file path
    pub db_path: String,
    /// Connection pool size
    pub pool_size: u32,
    /// Enable WAL mode
    pub wal_mode: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::SQLite,
            db_path: "rick.db".to_string(),
            pool_size: 4,
            wal_mode: false,
        }
    }
}

impl StoreConfig {
    /// Create a saying store instance based on the configuration
    pub fn create_store(&self) -> Result<Arc<dyn SayingStorage>, Error> {
        match self.backend {
            StoreBackend::SQLite => Ok(Arc::new(SQLiteSayingStore::open(self)?)),
            StoreBackend::Mock => Ok(Arc::new(MockSayingStore::new())),
        }
    }
}

/// Quote rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuotesConfig {
    /// Submissions must be longer than this many characters
    pub min_length: usize,
    /// Reinterpret stored text as double-encoded (latin-1 then utf-8) on retrieval
    pub legacy_decoding: bool,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            min_length: 4,
            legacy_decoding: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Path to log configuration file
    pub config_file: String,
    /// Log file used when the log configuration file is missing
    pub fallback_log_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            config_file: "server_log.yaml".to_string(),
            fallback_log_file: "rickbot.log".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `RICKBOT_CONFIG` or `config.yaml`, then apply
    /// environment overrides. Defaults are used when the file does not exist.
    ///
    /// Runs before the logger is up, so nothing here logs.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("RICKBOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file, use defaults if not found
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Self::from_yaml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from YAML text. Missing sections fall back to defaults.
    pub fn from_yaml(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// `DB_FILE` overrides the database path, `STORE_BACKEND` the backend.
    pub fn apply_env_overrides(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Ok(path) = env::var("DB_FILE") {
            self.store.db_path = path;
        }
        if let Ok(backend) = env::var("STORE_BACKEND") {
            self.store.backend = backend.parse::<StoreBackend>()?;
        }
        Ok(())
    }

    /// A first argument of `debug` binds to localhost:8080 instead of the configured address.
    pub fn apply_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(first) = args.into_iter().next() {
            if first.as_ref().eq_ignore_ascii_case("debug") {
                self.server.host = "127.0.0.1".to_string();
                self.server.port = 8080;
            }
        }
    }
}
