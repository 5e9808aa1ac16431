use crate::api::error::ServerError;
use std::sync::{Arc, OnceLock};
use vigil_monitor::MonitoringService;
use vigil_settings::VigilServerConfig;

pub struct AppState {
    /// Set once the monitoring config and every reference are loaded.
    pub service: OnceLock<Arc<MonitoringService>>,
    pub config: Arc<VigilServerConfig>,
}

impl AppState {
    pub fn new(config: VigilServerConfig) -> Self {
        AppState {
            service: OnceLock::new(),
            config: Arc::new(config),
        }
    }

    pub fn with_service(config: VigilServerConfig, service: MonitoringService) -> Self {
        let state = AppState::new(config);
        // freshly created, cannot already be set
        let _ = state.service.set(Arc::new(service));
        state
    }

    pub fn service(&self) -> Result<Arc<MonitoringService>, ServerError> {
        self.service.get().cloned().ok_or(ServerError::NotInitialized)
    }
}
