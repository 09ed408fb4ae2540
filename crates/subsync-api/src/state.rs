//! Application state.

use std::sync::Arc;

use subsync_bus::EventPublisher;
use subsync_storage::MediaStore;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<MediaStore>,
    pub bus: Arc<EventPublisher>,
}

impl AppState {
    /// Create new application state from the environment.
    ///
    /// Constructs the publisher without connecting; the caller decides when
    /// (and whether) to open the bus connection.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = MediaStore::from_env().await?;
        let bus = EventPublisher::from_env()?;

        Ok(Self {
            config,
            store: Arc::new(store),
            bus: Arc::new(bus),
        })
    }

    /// Assemble state from prebuilt components.
    pub fn with_parts(config: ApiConfig, store: Arc<MediaStore>, bus: Arc<EventPublisher>) -> Self {
        Self { config, store, bus }
    }
}
