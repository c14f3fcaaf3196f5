//! Zone operations: space search, space object tag updates and environment
//! reads and writes.

use mirror_core::{
    EntityKind, Environment, ObjectId, RawSearchQuery, SpaceObject, StorageError,
    UpdateEnvironmentPayload, UpdateSpaceObjectTagsPayload,
};
use mirror_storage::{MirrorStore, SpacePage};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::validation::validated;

/// Parse, validate and run a raw search query.
pub async fn search_spaces(store: &dyn MirrorStore, raw: &RawSearchQuery) -> ApiResult<SpacePage> {
    let query = validated(raw)?;
    let page = store.space_search(&query).await?;
    tracing::debug!(
        total = page.total,
        returned = page.data.len(),
        sort_key = %query.sort_key,
        sort_direction = %query.sort_direction,
        "Space search completed"
    );
    Ok(page)
}

/// Replace one tag type's tags on a space object.
///
/// A `null` body is an empty payload, so it is reported field by field.
pub async fn update_space_object_tags(
    store: &dyn MirrorStore,
    body: Value,
) -> ApiResult<SpaceObject> {
    let payload = match body {
        Value::Null => UpdateSpaceObjectTagsPayload::default(),
        body => UpdateSpaceObjectTagsPayload::from_value(body)?,
    };
    let request = validated(&payload)?;
    let updated = store.space_object_update_tags(&request).await?;
    tracing::info!(
        space_object_id = %request.space_object_id,
        tag_type = %request.tag_type,
        tag_count = request.tags.len(),
        "Space object tags replaced"
    );
    Ok(updated)
}

/// Fetch an environment by id.
pub async fn get_environment(store: &dyn MirrorStore, id: &ObjectId) -> ApiResult<Environment> {
    store
        .environment_get(id)
        .await?
        .ok_or_else(|| not_found(EntityKind::Environment, id))
}

/// Apply a partial environment update.
pub async fn update_environment(
    store: &dyn MirrorStore,
    id: &ObjectId,
    dto: Value,
) -> ApiResult<Environment> {
    let payload = UpdateEnvironmentPayload::from_value(dto)?;
    let update = validated(&payload)?;
    let updated = store.environment_update(id, &update).await?;
    tracing::info!(environment_id = %id, "Environment updated");
    Ok(updated)
}

fn not_found(entity: EntityKind, id: &ObjectId) -> ApiError {
    StorageError::NotFound {
        entity,
        id: id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use mirror_test_utils::fixtures::{seeded_store, KNOWN_OBJECT_ID};
    use serde_json::json;

    #[tokio::test]
    async fn test_tag_update_on_seeded_object() -> ApiResult<()> {
        let seeded = seeded_store().await;
        let updated = update_space_object_tags(
            &seeded.store,
            json!({ "spaceObjectId": KNOWN_OBJECT_ID, "tagType": "MATERIAL", "tags": ["oak"] }),
        )
        .await?;
        assert_eq!(updated.id.as_str(), KNOWN_OBJECT_ID);
        Ok(())
    }

    #[tokio::test]
    async fn test_tag_update_unknown_object_is_not_found() {
        let seeded = seeded_store().await;
        let err = update_space_object_tags(
            &seeded.store,
            json!({ "spaceObjectId": "aaaaaaaaaaaaaaaaaaaaaaaa", "tagType": "USER", "tags": ["a"] }),
        )
        .await
        .expect_err("unknown object");
        assert_eq!(err.code, ErrorCode::EntityNotFound);
    }

    #[tokio::test]
    async fn test_non_object_body_is_invalid_input() {
        let seeded = seeded_store().await;
        let err = update_space_object_tags(&seeded.store, json!(42))
            .await
            .expect_err("not an object");
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_get_environment_paths() {
        let seeded = seeded_store().await;
        let found = get_environment(&seeded.store, &seeded.environment.id).await;
        assert_eq!(found.ok(), Some(seeded.environment.clone()));

        let missing = get_environment(&seeded.store, &ObjectId::new())
            .await
            .expect_err("unknown id");
        assert_eq!(missing.code, ErrorCode::EntityNotFound);
    }

    #[tokio::test]
    async fn test_update_environment_validates_dto() {
        let seeded = seeded_store().await;
        let id = seeded.environment.id.clone();

        let updated = update_environment(&seeded.store, &id, json!({ "ssao": true, "glow": true }))
            .await
            .expect("valid update");
        assert!(updated.ssao && updated.glow);

        let err = update_environment(&seeded.store, &id, json!({ "fogDensity": "thick" }))
            .await
            .expect_err("bad density");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_search_with_tag_filter() -> ApiResult<()> {
        let seeded = seeded_store().await;
        let raw = RawSearchQuery::from_pairs([("tag", "nature"), ("tagType", "THEME")]);
        let page = search_spaces(&seeded.store, &raw).await?;
        assert_eq!(page.total, 2);
        Ok(())
    }
}
