//! Shared application state for Axum routers.

use std::sync::Arc;

use mirror_storage::MirrorStore;

use crate::auth::AuthConfig;

/// Store handle shared by routes and the WebSocket gateway.
pub type SharedStore = Arc<dyn MirrorStore>;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub auth: Arc<AuthConfig>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(store: SharedStore, auth: AuthConfig) -> Self {
        Self {
            store,
            auth: Arc::new(auth),
            start_time: std::time::Instant::now(),
        }
    }
}

// Use macro to reduce boilerplate for FromRef implementations
crate::impl_from_ref!(SharedStore, store);
crate::impl_from_ref!(Arc<AuthConfig>, auth);
crate::impl_from_ref!(std::time::Instant, start_time);
