//! Tag values and tag collections

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::enums::TagType;

/// Maximum number of tags a single tag type may hold on one document.
pub const MAX_TAGS_PER_TYPE: usize = 15;

/// Structured tag sourced from an external tagging provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyTag {
    pub name: String,
    pub third_party_source_home_page_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_party_source_public_page_url: Option<String>,
}

impl ThirdPartyTag {
    pub fn new(name: impl Into<String>, home_page_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            third_party_source_home_page_url: home_page_url.into(),
            third_party_source_public_page_url: None,
        }
    }

    pub fn with_public_page_url(mut self, url: impl Into<String>) -> Self {
        self.third_party_source_public_page_url = Some(url.into());
        self
    }

    /// Two records name the same tag when they share a name and a provider.
    /// The public page URL is presentation data and does not participate.
    pub fn key(&self) -> TagKey {
        TagKey::ThirdParty {
            name: self.name.clone(),
            provider: self.third_party_source_home_page_url.clone(),
        }
    }
}

/// Equality key used for tag uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagKey {
    Plain(String),
    ThirdParty { name: String, provider: String },
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKey::Plain(tag) => write!(f, "'{}'", tag),
            TagKey::ThirdParty { name, provider } => write!(f, "'{}' from {}", name, provider),
        }
    }
}

/// Uniqueness key of a raw tag element.
///
/// Returns `None` for elements that are neither a string nor a record with a
/// string `name` and `thirdPartySourceHomePageUrl`; shape rules report those.
pub fn tag_key(value: &Value) -> Option<TagKey> {
    match value {
        Value::String(tag) => Some(TagKey::Plain(tag.clone())),
        Value::Object(record) => {
            let name = record.get("name")?.as_str()?;
            let provider = record.get("thirdPartySourceHomePageUrl")?.as_str()?;
            Some(TagKey::ThirdParty {
                name: name.to_string(),
                provider: provider.to_string(),
            })
        }
        _ => None,
    }
}

/// Whether a raw tag array has the element shape a tag type demands.
pub fn matches_tag_type(items: &[Value], tag_type: TagType) -> bool {
    if tag_type.uses_records() {
        items
            .iter()
            .all(|item| item.is_object() && ThirdPartyTag::deserialize(item).is_ok())
    } else {
        items.iter().all(Value::is_string)
    }
}

/// Ordered tags of a single tag type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum TagList {
    Plain(Vec<String>),
    ThirdParty(Vec<ThirdPartyTag>),
}

impl TagList {
    pub fn len(&self) -> usize {
        match self {
            TagList::Plain(tags) => tags.len(),
            TagList::ThirdParty(tags) => tags.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<TagKey> {
        match self {
            TagList::Plain(tags) => tags.iter().cloned().map(TagKey::Plain).collect(),
            TagList::ThirdParty(tags) => tags.iter().map(ThirdPartyTag::key).collect(),
        }
    }

    /// Whether this list holds a tag with the given name. Third-party tags
    /// match on their `name`.
    pub fn contains_name(&self, needle: &str) -> bool {
        match self {
            TagList::Plain(tags) => tags.iter().any(|t| t == needle),
            TagList::ThirdParty(tags) => tags.iter().any(|t| t.name == needle),
        }
    }

    /// Decode a raw tag array for the given tag type.
    pub fn from_values(items: &[Value], tag_type: TagType) -> Result<Self, serde_json::Error> {
        let items = Value::Array(items.to_vec());
        if tag_type.uses_records() {
            Ok(TagList::ThirdParty(serde_json::from_value(items)?))
        } else {
            Ok(TagList::Plain(serde_json::from_value(items)?))
        }
    }
}

/// Tags of a document, grouped by tag type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<TagType, TagList>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag_type: TagType) -> Option<&TagList> {
        self.0.get(&tag_type)
    }

    /// Replace every tag of one type.
    pub fn replace(&mut self, tag_type: TagType, tags: TagList) {
        self.0.insert(tag_type, tags);
    }

    pub fn with(mut self, tag_type: TagType, tags: TagList) -> Self {
        self.replace(tag_type, tags);
        self
    }

    /// Whether every name in `names` appears under `tag_type`.
    pub fn contains_all(&self, tag_type: TagType, names: &[String]) -> bool {
        match self.get(tag_type) {
            Some(list) => names.iter().all(|name| list.contains_name(name)),
            None => names.is_empty(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TagType, &TagList)> {
        self.0.iter()
    }
}
