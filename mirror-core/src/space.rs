//! Spaces and the objects placed in them

use serde::{Deserialize, Serialize};

use crate::enums::TagType;
use crate::identity::{ObjectId, Timestamp};
use crate::tags::{TagList, Tags};

/// A space: a navigable world owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Owner's user id, as issued by the identity provider
    pub creator: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<ObjectId>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl Space {
    pub fn new(name: impl Into<String>, creator: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            description: String::new(),
            creator: creator.into(),
            tags: Tags::new(),
            environment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tag_type: TagType, tags: TagList) -> Self {
        self.tags.replace(tag_type, tags);
        self
    }
}

/// An object placed inside a space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SpaceObject {
    pub id: ObjectId,
    pub space_id: ObjectId,
    pub name: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub tags: Tags,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl SpaceObject {
    pub fn new(space_id: ObjectId, name: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: ObjectId::new(),
            space_id,
            name: name.into(),
            tags: Tags::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the tags of one type and stamp `updated_at`.
    pub fn replace_tags(&mut self, tag_type: TagType, tags: TagList, now: Timestamp) {
        self.tags.replace(tag_type, tags);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_replace_tags_keeps_other_types() {
        let now = Utc::now();
        let mut object = SpaceObject::new(ObjectId::new(), "lamp", now);
        object.replace_tags(TagType::User, TagList::Plain(vec!["a".into()]), now);
        object.replace_tags(TagType::Theme, TagList::Plain(vec!["b".into()]), now);

        let later = now + Duration::seconds(5);
        object.replace_tags(TagType::User, TagList::Plain(vec!["c".into()]), later);

        assert_eq!(
            object.tags.get(TagType::User),
            Some(&TagList::Plain(vec!["c".into()]))
        );
        assert_eq!(
            object.tags.get(TagType::Theme),
            Some(&TagList::Plain(vec!["b".into()]))
        );
        assert_eq!(object.updated_at, later);
    }

    #[test]
    fn test_space_serializes_camel_case() {
        let space = Space::new("Forest", "user-1", Utc::now())
            .with_tags(TagType::Theme, TagList::Plain(vec!["forest".into()]));
        let json = serde_json::to_value(&space).expect("serialize");
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["tags"]["THEME"][0], "forest");
    }
}
