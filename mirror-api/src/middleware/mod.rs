//! Middleware modules for the Mirror API
//!
//! - `auth`: caller identity middleware and the typed `AuthExtractor`
//!
//! # Middleware Order
//!
//! ```ignore
//! Router::new()
//!     .route("/space/search", get(handler))
//!     // Innermost: only on identity-protected routes
//!     .layer(middleware::from_fn_with_state(auth_config, auth_middleware))
//!     // Outermost, applied once to the whole router
//!     .layer(middleware::from_fn(observability_middleware))
//! ```

mod auth;

pub use auth::{auth_middleware, AuthExtractor, AuthMiddlewareError};
