//! WebSocket Zone Gateway
//!
//! Game clients connect to `/` (or `/ws`) with the shared secret in the
//! `Authorization` header and exchange JSON envelopes:
//!
//! ```text
//! -> { "event": "zone_get_environment", "data": { "id": "<object id>" } }
//! <- { "event": "zone_get_environment", "status": 200, "result": { ... } }
//! ```
//!
//! Each inbound text frame gets exactly one response frame, in order. Event
//! handlers share validation and storage logic with the REST routes through
//! [`crate::services`].

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{header, HeaderMap},
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use mirror_core::{ObjectId, RawSearchQuery};
use mirror_storage::MirrorStore;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::verify_ws_secret;
use crate::error::{ApiError, ApiResult};
use crate::events::{EnvironmentRef, EnvironmentUpdate, WsRequest, WsResponse, ZoneEvent, ERROR_EVENT};
use crate::services;
use crate::state::{AppState, SharedStore};
use crate::telemetry::with_metrics;

/// WebSocket upgrade handler.
///
/// The secret is checked before the upgrade, so a bad or missing
/// `Authorization` header gets a plain `401` and no socket.
pub async fn ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: Option<WebSocketUpgrade>,
) -> ApiResult<Response> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    if let Err(err) = verify_ws_secret(&state.auth, auth_header) {
        warn!(reason = %err.message, "Refused WebSocket upgrade");
        return Err(err);
    }

    let ws = ws.ok_or_else(|| ApiError::invalid_input("Expected a WebSocket upgrade request"))?;
    let store = state.store.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, store)))
}

/// Handle an individual WebSocket connection until the client leaves.
async fn handle_socket(socket: WebSocket, store: SharedStore) {
    let connection_id = Uuid::now_v7();
    with_metrics(|m| m.ws_connected());
    info!(connection_id = %connection_id, "WebSocket connected");

    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        let response = match msg {
            Ok(Message::Text(text)) => dispatch_frame(store.as_ref(), &text).await,
            Ok(Message::Binary(data)) => {
                debug!(connection_id = %connection_id, len = data.len(), "Rejected binary frame");
                WsResponse::err(
                    ERROR_EVENT,
                    ApiError::invalid_input("Binary frames are not supported"),
                )
            }
            Ok(Message::Ping(_)) => {
                // Pong is sent by axum
                debug!(connection_id = %connection_id, "Received ping");
                continue;
            }
            Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => {
                debug!(connection_id = %connection_id, "Client sent close frame");
                break;
            }
            Err(e) => {
                warn!(connection_id = %connection_id, error = %e, "WebSocket receive error");
                break;
            }
        };

        if let Err(e) = send_response(&mut sender, &response).await {
            warn!(connection_id = %connection_id, error = %e, "Failed to send response, closing");
            break;
        }
    }

    with_metrics(|m| m.ws_disconnected());
    info!(connection_id = %connection_id, "WebSocket disconnected");
}

async fn send_response(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    response: &WsResponse,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(response).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Decode one text frame and answer it.
pub async fn dispatch_frame(store: &dyn MirrorStore, text: &str) -> WsResponse {
    match serde_json::from_str::<WsRequest>(text) {
        Ok(request) => dispatch(store, request).await,
        Err(e) => {
            debug!(error = %e, "Malformed WebSocket frame");
            WsResponse::err(ERROR_EVENT, ApiError::from(e))
        }
    }
}

/// Route a decoded envelope to its handler.
pub async fn dispatch(store: &dyn MirrorStore, request: WsRequest) -> WsResponse {
    let Some(event) = ZoneEvent::parse(&request.event) else {
        with_metrics(|m| m.record_ws_event("unknown", false));
        debug!(event = %request.event, "Unknown WebSocket event");
        let error = ApiError::unknown_event(&request.event);
        return WsResponse::err(request.event, error);
    };

    let result = handle_event(store, event, request.data).await;
    with_metrics(|m| m.record_ws_event(event.as_str(), result.is_ok()));
    match result {
        Ok(value) => WsResponse::ok(event.as_str(), value),
        Err(error) => {
            debug!(event = %event, code = %error.code, "WebSocket event failed");
            WsResponse::err(event.as_str(), error)
        }
    }
}

async fn handle_event(store: &dyn MirrorStore, event: ZoneEvent, data: Value) -> ApiResult<Value> {
    match event {
        ZoneEvent::GetEnvironment => {
            let target: EnvironmentRef = serde_json::from_value(data)?;
            let id = ObjectId::parse(&target.id)?;
            to_result(services::get_environment(store, &id).await?)
        }
        ZoneEvent::UpdateEnvironment => {
            let update: EnvironmentUpdate = serde_json::from_value(data)?;
            let id = ObjectId::parse(&update.id)?;
            to_result(services::update_environment(store, &id, update.dto).await?)
        }
        ZoneEvent::UpdateSpaceObjectTags => {
            to_result(services::update_space_object_tags(store, data).await?)
        }
        ZoneEvent::SearchSpaces => {
            let raw = match data {
                Value::Null => RawSearchQuery::default(),
                data => RawSearchQuery::from_value(data)?,
            };
            to_result(services::search_spaces(store, &raw).await?)
        }
    }
}

fn to_result<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::internal_error(format!("Failed to encode result: {}", e)))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Gateway routes: `/` and its `/ws` alias.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .with_state(state)
}
