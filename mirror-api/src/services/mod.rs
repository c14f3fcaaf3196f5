//! Service Layer
//!
//! Operations shared by the REST routes and the WebSocket gateway. Each one
//! takes the raw payload, validates it and talks to the store.

mod zone_service;

pub use zone_service::*;
