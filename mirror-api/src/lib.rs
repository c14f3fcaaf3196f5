//! Mirror API - REST/WebSocket API Layer
//!
//! This crate exposes the Mirror zone backend over HTTP (Axum) and a
//! WebSocket gateway for game clients. Every inbound payload passes through
//! the validation contracts in `mirror-core` before it reaches storage.

#[macro_use]
mod macros;

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod extractors;
pub mod middleware;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod validation;
pub mod ws;

// Re-export commonly used types
pub use auth::{
    authenticate, generate_jwt_token, validate_jwt_token, verify_ws_secret, AuthConfig,
    AuthContext, Claims, FixedClock, JwtClock, JwtSecret, SystemClock,
};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode, ViolationReport};
pub use events::{WsRequest, WsResponse, ZoneEvent};
pub use middleware::{auth_middleware, AuthExtractor};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::{create_api_router, RouterBuilder};
pub use state::{AppState, SharedStore};
pub use validation::{validated, ValidatedPayload};
