//! Application state for the analysis API.

use std::sync::Arc;

use raster_store::{scene, RasterService, TimeoutRasterService};

use crate::config::ApiConfig;

/// Shared application state. Everything here is read-only after startup;
/// requests never coordinate through shared mutable data.
pub struct AppState {
    /// The raster backend, wrapped with the configured call deadline.
    pub service: Arc<dyn RasterService>,

    /// Runtime configuration (study region, timeout).
    pub config: ApiConfig,
}

impl AppState {
    /// Wire the service against the deterministic demo backend. A live
    /// satellite catalog would slot in as another [`RasterService`]
    /// implementation here.
    pub fn new(config: ApiConfig) -> Self {
        let backend: Arc<dyn RasterService> = Arc::new(scene::demo_service());
        let service = Arc::new(TimeoutRasterService::new(backend, config.request_timeout));
        Self {
            service,
            config,
        }
    }
}
