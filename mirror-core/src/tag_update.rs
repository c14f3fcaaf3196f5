//! Space object tag update request

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::TagType;
use crate::identity::ObjectId;
use crate::tags::{matches_tag_type, TagList, MAX_TAGS_PER_TYPE};
use crate::validation::{
    decode_required, rules, FieldRules, Rule, Validator, Violation, ViolationKind,
};

/// Tag update payload as received on the wire, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSpaceObjectTagsPayload {
    pub space_object_id: Option<Value>,
    pub tag_type: Option<Value>,
    pub tags: Option<Value>,
}

/// Validated tag update: replace the tags of one type on a space object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpaceObjectTagsRequest {
    pub space_object_id: ObjectId,
    pub tag_type: TagType,
    pub tags: TagList,
}

static VALIDATOR: Lazy<Validator<UpdateSpaceObjectTagsPayload>> = Lazy::new(|| {
    Validator::new()
        .field(
            FieldRules::new("spaceObjectId", |p: &UpdateSpaceObjectTagsPayload| {
                p.space_object_id.as_ref()
            })
            .rule(rules::required())
            .rule(rules::object_id()),
        )
        .field(
            FieldRules::new("tagType", |p: &UpdateSpaceObjectTagsPayload| p.tag_type.as_ref())
                .rule(rules::required())
                .rule(rules::is_enum(TagType::allowed())),
        )
        .field(
            FieldRules::new("tags", |p: &UpdateSpaceObjectTagsPayload| p.tags.as_ref())
                .rule(rules::required())
                .rule(rules::array())
                .rule(tags_match_tag_type())
                .rule(rules::array_max_size(MAX_TAGS_PER_TYPE))
                .rule(rules::unique_tags()),
        )
});

/// Plain tag types take strings, `THIRD_PARTY` takes records. With an
/// unusable `tagType` the elements must still be uniformly one or the other.
fn tags_match_tag_type() -> Rule<UpdateSpaceObjectTagsPayload> {
    Rule::new(
        "tagsMatchTagType",
        ViolationKind::InvalidType,
        |value, payload: &UpdateSpaceObjectTagsPayload| {
            let Some(Value::Array(items)) = value else {
                return Ok(());
            };
            match payload.parsed_tag_type() {
                Some(tag_type) if matches_tag_type(items, tag_type) => Ok(()),
                Some(tag_type) if tag_type.uses_records() => {
                    Err(format!("must be third-party tag records for tag type {}", tag_type))
                }
                Some(tag_type) => Err(format!("must be strings for tag type {}", tag_type)),
                None if matches_tag_type(items, TagType::User)
                    || matches_tag_type(items, TagType::ThirdParty) =>
                {
                    Ok(())
                }
                None => Err("must be all strings or all third-party tag records".to_string()),
            }
        },
    )
    .halting()
}

impl UpdateSpaceObjectTagsPayload {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    fn parsed_tag_type(&self) -> Option<TagType> {
        self.tag_type
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| TagType::parse(s).ok())
    }

    /// Every violation of the payload, in field declaration order.
    pub fn violations(&self) -> Vec<Violation> {
        VALIDATOR.validate(self)
    }

    /// Validate and convert into a typed request.
    pub fn validate(&self) -> Result<UpdateSpaceObjectTagsRequest, Vec<Violation>> {
        VALIDATOR.check(self)?;
        self.decode().map_err(|violation| vec![violation])
    }

    fn decode(&self) -> Result<UpdateSpaceObjectTagsRequest, Violation> {
        let space_object_id = decode_required("spaceObjectId", self.space_object_id.as_ref())?;
        let tag_type: TagType = decode_required("tagType", self.tag_type.as_ref())?;
        let items: Vec<Value> = decode_required("tags", self.tags.as_ref())?;
        let tags = TagList::from_values(&items, tag_type).map_err(|e| {
            Violation::new(
                "tags",
                "tagsMatchTagType",
                ViolationKind::InvalidType,
                format!("tags has an unexpected shape: {}", e),
            )
        })?;
        Ok(UpdateSpaceObjectTagsRequest {
            space_object_id,
            tag_type,
            tags,
        })
    }
}
