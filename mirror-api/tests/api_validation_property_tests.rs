//! Property-Based Tests for the API Validation Layer
//!
//! For any inbound payload:
//! - a well-formed tag update on an existing space object is applied verbatim
//! - a malformed `spaceObjectId` yields `400 VALIDATION_FAILED` naming that field
//! - duplicate tags are reported on `tags` and nothing is written
//! - a bearer token not signed with the server secret never authenticates
//! - an unknown gateway event is answered with `404` under its own name

use mirror_api::error::ErrorCode;
use mirror_api::events::WsRequest;
use mirror_api::{authenticate, services, ws, AuthConfig, JwtSecret};
use mirror_core::{SpaceObject, TagType};
use mirror_storage::MirrorStore;
use mirror_test_utils::fixtures::{known_object_id, seeded_store, KNOWN_OBJECT_ID};
use mirror_test_utils::generators::*;
use proptest::prelude::*;
use serde_json::{json, Value};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
}

fn detail_fields(details: Option<&Value>) -> Vec<String> {
    details
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|d| d["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

async fn stored_object(store: &dyn MirrorStore) -> Option<SpaceObject> {
    store.space_object_get(&known_object_id()).await.ok().flatten()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Valid plain tag updates replace exactly the named tag type.
    #[test]
    fn prop_valid_tag_update_applied(mut body in arb_valid_plain_tag_update()) {
        body["spaceObjectId"] = json!(KNOWN_OBJECT_ID);
        let expected_tags = body["tags"].clone();
        let tag_type = body["tagType"].as_str().unwrap_or_default().to_string();

        let updated = runtime().block_on(async {
            let seeded = seeded_store().await;
            services::update_space_object_tags(&seeded.store, body).await
        });

        let updated = updated.map_err(|e| TestCaseError::fail(format!("{:?}", e)))?;
        let json = serde_json::to_value(&updated).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(&json["tags"][tag_type.as_str()], &expected_tags);
        prop_assert_eq!(json["tags"].as_object().map(|m| m.len()), Some(1));
    }

    /// Third-party records are accepted and stored with their natural keys.
    #[test]
    fn prop_valid_third_party_update_applied(mut body in arb_valid_third_party_tag_update()) {
        body["spaceObjectId"] = json!(KNOWN_OBJECT_ID);
        let count = body["tags"].as_array().map(Vec::len).unwrap_or_default();

        let updated = runtime().block_on(async {
            let seeded = seeded_store().await;
            services::update_space_object_tags(&seeded.store, body).await
        });

        let updated = updated.map_err(|e| TestCaseError::fail(format!("{:?}", e)))?;
        let stored = updated.tags.get(TagType::ThirdParty).map(|list| list.len());
        prop_assert_eq!(stored, Some(count));
    }

    /// A malformed identifier is a validation failure on spaceObjectId.
    #[test]
    fn prop_malformed_object_id_rejected(
        id in arb_malformed_object_id(),
        tag_type in arb_plain_tag_type(),
        tags in arb_unique_tags(1, 5),
    ) {
        let body = json!({ "spaceObjectId": id, "tagType": tag_type.as_str(), "tags": tags });

        let result = runtime().block_on(async {
            let seeded = seeded_store().await;
            services::update_space_object_tags(&seeded.store, body).await
        });

        let error = result.err().ok_or_else(|| TestCaseError::fail("expected rejection"))?;
        prop_assert_eq!(error.code, ErrorCode::ValidationFailed);
        prop_assert_eq!(detail_fields(error.details.as_ref()), vec!["spaceObjectId".to_string()]);
    }

    /// Duplicate tags are rejected before the store is touched.
    #[test]
    fn prop_duplicate_tags_not_written(
        tag_type in arb_plain_tag_type(),
        tags in arb_tags_with_duplicate(),
    ) {
        let body = json!({
            "spaceObjectId": KNOWN_OBJECT_ID,
            "tagType": tag_type.as_str(),
            "tags": tags,
        });

        let (result, after) = runtime().block_on(async {
            let seeded = seeded_store().await;
            let result = services::update_space_object_tags(&seeded.store, body).await;
            (result, stored_object(&seeded.store).await)
        });

        let error = result.err().ok_or_else(|| TestCaseError::fail("expected rejection"))?;
        prop_assert_eq!(error.code, ErrorCode::ValidationFailed);
        prop_assert!(detail_fields(error.details.as_ref()).contains(&"tags".to_string()));
        let after = after.ok_or_else(|| TestCaseError::fail("space object missing"))?;
        prop_assert!(after.tags.get(tag_type).is_none());
    }

    /// Tokens minted with another secret never authenticate.
    #[test]
    fn prop_foreign_tokens_rejected(
        user in "[a-z]{1,12}",
        foreign in "[a-zA-Z0-9]{32,48}",
    ) {
        let server = AuthConfig {
            jwt_secret: JwtSecret::new("property-test-server-secret-0123456789".to_string())
                .map_err(|e| TestCaseError::fail(e.to_string()))?,
            ..AuthConfig::default()
        };
        prop_assume!(foreign != server.jwt_secret.expose());
        let client = AuthConfig {
            jwt_secret: JwtSecret::new(foreign).map_err(|e| TestCaseError::fail(e.to_string()))?,
            ..AuthConfig::default()
        };
        let token = mirror_api::generate_jwt_token(&client, user)
            .map_err(|e| TestCaseError::fail(e.message))?;

        let header = format!("Bearer {}", token);
        let error = authenticate(&server, Some(&header))
            .err()
            .ok_or_else(|| TestCaseError::fail("foreign token accepted"))?;
        prop_assert_eq!(error.status_code().as_u16(), 401);
    }

    /// Unknown gateway events come back as 404 under the name they were sent with.
    #[test]
    fn prop_unknown_events_are_404(event in "[a-z_]{1,24}") {
        prop_assume!(mirror_api::ZoneEvent::parse(&event).is_none());

        let response = runtime().block_on(async {
            let seeded = seeded_store().await;
            ws::dispatch(&seeded.store, WsRequest::new(event.clone(), json!({}))).await
        });

        prop_assert_eq!(response.event, event);
        prop_assert_eq!(response.status, 404);
        prop_assert_eq!(response.error.map(|e| e.code), Some(ErrorCode::UnknownEvent));
    }
}
