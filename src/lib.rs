//! IT Manager dashboard core
//!
//! Session handling, the equipment collection controller, toast
//! notifications and role-filtered navigation for the IT equipment
//! dashboard, talking to the external inventory REST API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use api::InventoryApi;
use services::notifications::{Clock, SystemClock};
use storage::KeyValueStore;

/// Application state shared by every screen
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, api: Arc<dyn InventoryApi>, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(config, api, store, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: AppConfig,
        api: Arc<dyn InventoryApi>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let services = services::Services::new(api, store, clock, &config.notifications);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
