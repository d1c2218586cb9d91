//! Health Check Commands
//!
//! Commands for checking the health status of backend services.

use tracing::warn;

use crate::models::response::{CommandResponse, HealthResponse};
use crate::state::AppState;

/// Get the health status of the tree store and completion provider.
///
/// With `probe_provider` set, the provider endpoint is also contacted.
pub async fn get_health(state: &AppState, probe_provider: bool) -> CommandResponse<HealthResponse> {
    let mut health = HealthResponse::default();

    // Check database health
    health.database = state.is_database_healthy();

    // Check provider configuration
    health.provider_configured = state.is_provider_configured();
    health.provider = state.provider().name().to_string();
    health.model = state.provider().model().to_string();

    if probe_provider {
        let reachable = match state.provider().health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "health: provider probe failed");
                false
            }
        };
        health.provider_reachable = Some(reachable);
    }

    // Overall status
    let provider_ok = health.provider_configured && health.provider_reachable.unwrap_or(true);
    health.status = if health.database && provider_ok {
        "healthy".to_string()
    } else {
        "degraded".to_string()
    };

    CommandResponse::ok(health)
}
