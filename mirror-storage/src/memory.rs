//! In-memory store backing the API in development and tests.

use ::async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use mirror_core::{
    EntityKind, Environment, MirrorResult, ObjectId, PaginatedSearchQuery, Space, SpaceObject,
    StorageError, UpdateEnvironmentRequest, UpdateSpaceObjectTagsRequest,
};

use crate::search::{search_spaces, SpacePage};
use crate::store::MirrorStore;

/// Thread-safe in-memory document store.
///
/// Clones share the same underlying maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    spaces: Arc<RwLock<HashMap<ObjectId, Space>>>,
    space_objects: Arc<RwLock<HashMap<ObjectId, SpaceObject>>>,
    environments: Arc<RwLock<HashMap<ObjectId, Environment>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn clear(&self) {
        self.spaces.write().await.clear();
        self.space_objects.write().await.clear();
        self.environments.write().await.clear();
    }

    pub async fn space_count(&self) -> usize {
        self.spaces.read().await.len()
    }

    pub async fn space_object_count(&self) -> usize {
        self.space_objects.read().await.len()
    }

    pub async fn environment_count(&self) -> usize {
        self.environments.read().await.len()
    }
}

fn not_found(entity: EntityKind, id: &ObjectId) -> StorageError {
    StorageError::NotFound {
        entity,
        id: id.to_string(),
    }
}

fn insert_new<T: Clone>(
    map: &mut HashMap<ObjectId, T>,
    entity: EntityKind,
    id: &ObjectId,
    value: &T,
) -> Result<(), StorageError> {
    if map.contains_key(id) {
        return Err(StorageError::AlreadyExists {
            entity,
            id: id.to_string(),
        });
    }
    map.insert(id.clone(), value.clone());
    Ok(())
}

#[async_trait]
impl MirrorStore for InMemoryStore {
    async fn space_insert(&self, space: &Space) -> MirrorResult<()> {
        let mut spaces = self.spaces.write().await;
        insert_new(&mut spaces, EntityKind::Space, &space.id, space)?;
        Ok(())
    }

    async fn space_get(&self, id: &ObjectId) -> MirrorResult<Option<Space>> {
        Ok(self.spaces.read().await.get(id).cloned())
    }

    async fn space_search(&self, query: &PaginatedSearchQuery) -> MirrorResult<SpacePage> {
        let spaces = self.spaces.read().await;
        Ok(search_spaces(spaces.values(), query)?)
    }

    async fn space_object_insert(&self, object: &SpaceObject) -> MirrorResult<()> {
        let mut objects = self.space_objects.write().await;
        insert_new(&mut objects, EntityKind::SpaceObject, &object.id, object)?;
        Ok(())
    }

    async fn space_object_get(&self, id: &ObjectId) -> MirrorResult<Option<SpaceObject>> {
        Ok(self.space_objects.read().await.get(id).cloned())
    }

    async fn space_object_update_tags(
        &self,
        request: &UpdateSpaceObjectTagsRequest,
    ) -> MirrorResult<SpaceObject> {
        let mut objects = self.space_objects.write().await;
        let object = objects
            .get_mut(&request.space_object_id)
            .ok_or_else(|| not_found(EntityKind::SpaceObject, &request.space_object_id))?;
        object.replace_tags(request.tag_type, request.tags.clone(), Utc::now());
        Ok(object.clone())
    }

    async fn environment_insert(&self, environment: &Environment) -> MirrorResult<()> {
        let mut environments = self.environments.write().await;
        insert_new(
            &mut environments,
            EntityKind::Environment,
            &environment.id,
            environment,
        )?;
        Ok(())
    }

    async fn environment_get(&self, id: &ObjectId) -> MirrorResult<Option<Environment>> {
        Ok(self.environments.read().await.get(id).cloned())
    }

    async fn environment_update(
        &self,
        id: &ObjectId,
        update: &UpdateEnvironmentRequest,
    ) -> MirrorResult<Environment> {
        let mut environments = self.environments.write().await;
        let environment = environments
            .get_mut(id)
            .ok_or_else(|| not_found(EntityKind::Environment, id))?;
        environment.apply(update, Utc::now());
        Ok(environment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_core::{MirrorError, TagList, TagType};

    #[tokio::test]
    async fn test_space_object_tag_update() {
        let store = InMemoryStore::new();
        let object = SpaceObject::new(ObjectId::new(), "lamp", Utc::now());
        store.space_object_insert(&object).await.expect("insert");

        let updated = store
            .space_object_update_tags(&UpdateSpaceObjectTagsRequest {
                space_object_id: object.id.clone(),
                tag_type: TagType::Material,
                tags: TagList::Plain(vec!["brass".into()]),
            })
            .await
            .expect("update");

        assert_eq!(
            updated.tags.get(TagType::Material),
            Some(&TagList::Plain(vec!["brass".into()]))
        );
        let stored = store
            .space_object_get(&object.id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_tags_unknown_object() {
        let store = InMemoryStore::new();
        let result = store
            .space_object_update_tags(&UpdateSpaceObjectTagsRequest {
                space_object_id: ObjectId::new(),
                tag_type: TagType::User,
                tags: TagList::Plain(vec!["a".into()]),
            })
            .await;
        assert!(matches!(
            result,
            Err(MirrorError::Storage(StorageError::NotFound {
                entity: EntityKind::SpaceObject,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryStore::new();
        let environment = Environment::new(ObjectId::new(), Utc::now());
        store.environment_insert(&environment).await.expect("insert");
        assert!(store.environment_insert(&environment).await.is_err());
        assert_eq!(store.environment_count().await, 1);
    }

    #[tokio::test]
    async fn test_environment_update() {
        let store = InMemoryStore::new();
        let environment = Environment::new(ObjectId::new(), Utc::now());
        store.environment_insert(&environment).await.expect("insert");

        let update = UpdateEnvironmentRequest {
            glow: Some(true),
            fog_density: Some(0.5),
            ..Default::default()
        };
        let updated = store
            .environment_update(&environment.id, &update)
            .await
            .expect("update");
        assert!(updated.glow);
        assert_eq!(updated.fog_density, 0.5);
        assert!(updated.updated_at >= environment.updated_at);
    }

    #[tokio::test]
    async fn test_search_through_store() {
        let store = InMemoryStore::new();
        store
            .space_insert(&Space::new("Forest", "user-1", Utc::now()))
            .await
            .expect("insert");
        store
            .space_insert(&Space::new("Desert", "user-1", Utc::now()))
            .await
            .expect("insert");

        let query = PaginatedSearchQuery {
            search: Some("for".into()),
            ..Default::default()
        };
        let page = store.space_search(&query).await.expect("search");
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].name, "Forest");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryStore::new();
        let clone = store.clone();
        store
            .space_insert(&Space::new("Shared", "user-1", Utc::now()))
            .await
            .expect("insert");
        assert_eq!(clone.space_count().await, 1);
        clone.clear().await;
        assert_eq!(store.space_count().await, 0);
    }
}
