//! Async storage trait for Mirror documents.
//!
//! Route handlers and the WebSocket gateway only see this trait, so the
//! backing store can be swapped without touching the transport layer.

use ::async_trait::async_trait;
use mirror_core::{
    Environment, MirrorResult, ObjectId, PaginatedSearchQuery, Space, SpaceObject,
    UpdateEnvironmentRequest, UpdateSpaceObjectTagsRequest,
};

use crate::search::SpacePage;

#[async_trait]
pub trait MirrorStore: Send + Sync {
    // ========================================================================
    // SPACE OPERATIONS
    // ========================================================================

    /// Insert a new space.
    async fn space_insert(&self, space: &Space) -> MirrorResult<()>;

    /// Get a space by ID.
    async fn space_get(&self, id: &ObjectId) -> MirrorResult<Option<Space>>;

    /// Search spaces with a validated query.
    async fn space_search(&self, query: &PaginatedSearchQuery) -> MirrorResult<SpacePage>;

    // ========================================================================
    // SPACE OBJECT OPERATIONS
    // ========================================================================

    async fn space_object_insert(&self, object: &SpaceObject) -> MirrorResult<()>;

    async fn space_object_get(&self, id: &ObjectId) -> MirrorResult<Option<SpaceObject>>;

    /// Replace the tags of one type on a space object and return the result.
    async fn space_object_update_tags(
        &self,
        request: &UpdateSpaceObjectTagsRequest,
    ) -> MirrorResult<SpaceObject>;

    // ========================================================================
    // ENVIRONMENT OPERATIONS
    // ========================================================================

    async fn environment_insert(&self, environment: &Environment) -> MirrorResult<()>;

    async fn environment_get(&self, id: &ObjectId) -> MirrorResult<Option<Environment>>;

    /// Apply a partial update and return the updated environment.
    async fn environment_update(
        &self,
        id: &ObjectId,
        update: &UpdateEnvironmentRequest,
    ) -> MirrorResult<Environment>;

    /// Cheap round trip used by the readiness endpoint.
    async fn health_check(&self) -> MirrorResult<()> {
        Ok(())
    }
}
