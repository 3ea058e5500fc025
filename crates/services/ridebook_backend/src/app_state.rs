// --- File: crates/services/ridebook_backend/src/app_state.rs ---
use ridebook_common::{create_client, internal_error, RidebookError};
use ridebook_config::AppConfig;
use ridebook_platform::{RestPlatformClient, SchedulingPlatform};
use ridebook_session::SessionContext;
use std::sync::Arc;
use tracing::info;

/// Everything the routers share: immutable configuration, the one platform
/// client, and the session context built around it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub platform: Arc<dyn SchedulingPlatform>,
    pub session: SessionContext,
}

impl AppState {
    /// Wires the state around an already constructed platform.
    pub fn new(config: Arc<AppConfig>, platform: Arc<dyn SchedulingPlatform>) -> Self {
        let session = SessionContext::new(platform.clone(), &config.session);
        Self {
            config,
            platform,
            session,
        }
    }

    /// Builds the REST platform client from configuration.
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, RidebookError> {
        let http = create_client(config.platform.timeout_secs, false)
            .map_err(|e| internal_error(format!("Failed to build HTTP client: {e}")))?;
        let client = RestPlatformClient::new(http, &config.platform)?;
        info!(
            "Scheduling platform client ready for {} (api key: {})",
            config.platform.base_url,
            if config.platform.api_key.is_some() {
                "configured"
            } else {
                "not configured"
            }
        );
        Ok(Self::new(config, Arc::new(client)))
    }
}
