//! Application State Management
//!
//! This module provides the application state that contains all services
//! and their dependencies, following the dependency injection pattern.

use std::sync::Arc;
use actix_web::Error;
use log::info;

use crate::config::{AppConfig, StoreBackend};
use crate::sayings::{SayingStorage, mock_store::MockSayingStore};
use crate::service::QuoteService;

/// Application state containing all services and their dependencies
#[derive(Clone)]
pub struct AppState {
    pub quote_service: Arc<QuoteService>,
    pub config: AppConfig,
}

impl AppState {
    /// Create application state from configuration
    pub fn from_config(config: AppConfig) -> Result<Self, Error> {
        info!("Initializing application state with configuration");

        match config.store.backend {
            StoreBackend::SQLite => {
                info!("Using SQLite saying store with db_path: {}, pool_size: {}, wal_mode: {}",
                      config.store.db_path, config.store.pool_size, config.store.wal_mode);
            }
            StoreBackend::Mock => info!("Using mock saying store"),
        }
        let store = config.store.create_store()?;

        info!("Application state initialized successfully");
        Ok(Self::with_store(store, config))
    }

    /// Create application state around an already built store
    pub fn with_store(store: Arc<dyn SayingStorage>, config: AppConfig) -> Self {
        let quote_service = Arc::new(QuoteService::new(store, config.quotes.clone()));
        Self { quote_service, config }
    }

    /// Create application state for testing with the mock backend
    pub fn new_for_testing() -> Self {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Mock;
        Self::with_store(Arc::new(MockSayingStore::new()), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_for_testing_starts_empty() {
        let state = AppState::new_for_testing();
        assert_eq!(state.config.store.backend, StoreBackend::Mock);
        assert!(state.quote_service.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_from_config_with_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.store.db_path = dir.path().join("rick.db").to_string_lossy().into_owned();

        let state = AppState::from_config(config).unwrap();
        let id = state.quote_service.insert_quote("Pass the butter").unwrap();
        assert_eq!(state.quote_service.get_quote_by_id(id).unwrap().text, "Pass the butter");
    }
}
