//! WebSocket Message Envelopes
//!
//! Every inbound text frame is a [`WsRequest`] naming a [`ZoneEvent`]; every
//! frame the gateway sends back is a [`WsResponse`] echoing the event name
//! with an HTTP-style status and either a `result` or an `error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ApiError;

/// Event name used when a frame is not a readable envelope.
pub const ERROR_EVENT: &str = "error";

/// Events handled by the zone gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneEvent {
    GetEnvironment,
    UpdateEnvironment,
    UpdateSpaceObjectTags,
    SearchSpaces,
}

impl ZoneEvent {
    pub const ALL: [ZoneEvent; 4] = [
        ZoneEvent::GetEnvironment,
        ZoneEvent::UpdateEnvironment,
        ZoneEvent::UpdateSpaceObjectTags,
        ZoneEvent::SearchSpaces,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneEvent::GetEnvironment => "zone_get_environment",
            ZoneEvent::UpdateEnvironment => "zone_update_environment",
            ZoneEvent::UpdateSpaceObjectTags => "zone_update_space_object_tags",
            ZoneEvent::SearchSpaces => "zone_search_spaces",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.as_str() == name)
    }
}

impl fmt::Display for ZoneEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// INBOUND
// ============================================================================

/// Inbound frame: `{ "event": <name>, "data": <payload> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsRequest {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl WsRequest {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// `data` of `zone_get_environment`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentRef {
    pub id: String,
}

/// `data` of `zone_update_environment`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvironmentUpdate {
    pub id: String,
    #[serde(default)]
    pub dto: Value,
}

// ============================================================================
// OUTBOUND
// ============================================================================

/// Outbound frame answering one inbound frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsResponse {
    pub event: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl WsResponse {
    pub fn ok(event: impl Into<String>, result: Value) -> Self {
        Self {
            event: event.into(),
            status: 200,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(event: impl Into<String>, error: ApiError) -> Self {
        Self {
            event: event.into(),
            status: error.status_code().as_u16(),
            result: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_event_names_round_trip() {
        for event in ZoneEvent::ALL {
            assert_eq!(ZoneEvent::parse(event.as_str()), Some(event));
        }
        assert_eq!(ZoneEvent::parse("zone_delete_everything"), None);
    }

    #[test]
    fn test_request_without_data() {
        let request: WsRequest =
            serde_json::from_str(r#"{"event":"zone_search_spaces"}"#).expect("parse");
        assert_eq!(request.data, Value::Null);
    }

    #[test]
    fn test_success_envelope_shape() {
        let response = WsResponse::ok("zone_get_environment", json!({ "glow": true }));
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(
            value,
            json!({ "event": "zone_get_environment", "status": 200, "result": { "glow": true } })
        );
    }

    #[test]
    fn test_error_envelope_uses_http_status() {
        let response = WsResponse::err("zone_nope", ApiError::unknown_event("zone_nope"));
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["error"]["code"], json!("UNKNOWN_EVENT"));
        assert!(value.get("result").is_none());
        assert_eq!(response.error.map(|e| e.code), Some(ErrorCode::UnknownEvent));
    }
}
