//! Mirror API Server Entry Point
//!
//! Bootstraps telemetry and configuration, then starts the Axum HTTP server
//! over the in-memory document store.

use std::sync::Arc;

use axum::Router;
use mirror_api::telemetry::{init_tracer, TelemetryConfig};
use mirror_api::{create_api_router, ApiConfig, ApiError, ApiResult, AuthConfig, SharedStore};
use mirror_core::ConfigError;
use mirror_storage::InMemoryStore;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let api_config = ApiConfig::from_env().map_err(config_error)?;
    let auth_config = AuthConfig::from_env();

    let store: SharedStore = Arc::new(InMemoryStore::new());
    let app: Router = create_api_router(store, &api_config, auth_config)?;

    let addr = api_config.socket_addr().map_err(config_error)?;
    tracing::info!(%addr, environment = %api_config.environment, "Starting Mirror API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn config_error(err: ConfigError) -> ApiError {
    ApiError::internal_error(format!("Invalid configuration: {}", err))
}
