//! Paginated Search Query Contract
//!
//! A search query arrives loosely typed: from a query string every value is
//! a string and a repeated key may or may not have been collapsed into a
//! single value. [`normalize`] applies defaults and coerces a scalar `tag`
//! into a one-element sequence; [`validate`] then runs the field rules and
//! produces a typed [`PaginatedSearchQuery`].
//!
//! Both pagination idioms (`page`/`perPage` and `startItem`/`numberOfItems`)
//! are carried through untouched; the search handler decides which to honor.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{SortDirection, TagType};
use crate::validation::{
    as_non_negative_integer, decode, is_empty_value, rules, FieldRules, Validator, Violation,
    ViolationKind,
};

/// Sort key applied when the query names none.
pub const DEFAULT_SORT_KEY: &str = "updatedAt";

/// Search query as received, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSearchQuery {
    pub field: Option<Value>,
    pub search: Option<Value>,
    pub sort_key: Option<Value>,
    pub sort_direction: Option<Value>,
    pub page: Option<Value>,
    pub per_page: Option<Value>,
    pub tag: Option<Value>,
    pub tag_type: Option<Value>,
    pub start_item: Option<Value>,
    pub number_of_items: Option<Value>,
}

impl RawSearchQuery {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Build from decoded query-string pairs.
    ///
    /// A key seen once yields a string; a key seen several times yields an
    /// array of its values in order. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let Some(slot) = query.slot_mut(key.as_ref()) else {
                continue;
            };
            let value = Value::String(value.into());
            *slot = Some(match slot.take() {
                None => value,
                Some(Value::Array(mut items)) => {
                    items.push(value);
                    Value::Array(items)
                }
                Some(previous) => Value::Array(vec![previous, value]),
            });
        }
        query
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<Value>> {
        let slot = match key {
            "field" => &mut self.field,
            "search" => &mut self.search,
            "sortKey" => &mut self.sort_key,
            "sortDirection" => &mut self.sort_direction,
            "page" => &mut self.page,
            "perPage" => &mut self.per_page,
            "tag" => &mut self.tag,
            "tagType" => &mut self.tag_type,
            "startItem" => &mut self.start_item,
            "numberOfItems" => &mut self.number_of_items,
            _ => return None,
        };
        Some(slot)
    }

    /// Whether `tag` holds at least one element.
    fn has_tags(&self) -> bool {
        self.tag.as_ref().is_some_and(|tag| !is_empty_value(tag))
    }
}

/// Normalized, validated search query ready for a search handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PaginatedSearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub sort_key: String,
    pub sort_direction: SortDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_type: Option<TagType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_item: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_items: Option<u64>,
}

impl Default for PaginatedSearchQuery {
    fn default() -> Self {
        Self {
            field: None,
            search: None,
            sort_key: DEFAULT_SORT_KEY.to_string(),
            sort_direction: SortDirection::default(),
            page: None,
            per_page: None,
            tag: None,
            tag_type: None,
            start_item: None,
            number_of_items: None,
        }
    }
}

impl PaginatedSearchQuery {
    /// Normalize then validate.
    pub fn parse(raw: RawSearchQuery) -> Result<Self, Vec<Violation>> {
        validate(&normalize(raw))
    }

    /// Whether the offset/limit idiom was supplied.
    pub fn uses_offset(&self) -> bool {
        self.start_item.is_some() || self.number_of_items.is_some()
    }
}

/// Apply defaults and coerce a scalar `tag` into a one-element sequence.
pub fn normalize(mut raw: RawSearchQuery) -> RawSearchQuery {
    if raw.sort_key.as_ref().map_or(true, Value::is_null) {
        raw.sort_key = Some(Value::String(DEFAULT_SORT_KEY.to_string()));
    }
    if raw.sort_direction.as_ref().map_or(true, Value::is_null) {
        raw.sort_direction = Some(Value::String(SortDirection::default().as_str().to_string()));
    }
    raw.tag = match raw.tag.take() {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(Value::Array(items)),
        Some(scalar) => Some(Value::Array(vec![scalar])),
    };
    raw
}

static VALIDATOR: Lazy<Validator<RawSearchQuery>> = Lazy::new(|| {
    Validator::new()
        .field(
            FieldRules::new("field", |q: &RawSearchQuery| q.field.as_ref())
                .optional()
                .rule(rules::string()),
        )
        .field(
            FieldRules::new("search", |q: &RawSearchQuery| q.search.as_ref())
                .optional()
                .rule(rules::string()),
        )
        .field(
            FieldRules::new("sortKey", |q: &RawSearchQuery| q.sort_key.as_ref())
                .optional()
                .rule(rules::string()),
        )
        .field(
            FieldRules::new("sortDirection", |q: &RawSearchQuery| q.sort_direction.as_ref())
                .optional()
                .rule(rules::is_enum(SortDirection::allowed()).with_name("isSortDirection")),
        )
        .field(
            FieldRules::new("page", |q: &RawSearchQuery| q.page.as_ref())
                .optional()
                .rule(rules::non_negative_integer()),
        )
        .field(
            FieldRules::new("perPage", |q: &RawSearchQuery| q.per_page.as_ref())
                .optional()
                .rule(rules::non_negative_integer()),
        )
        .field(
            FieldRules::new("tag", |q: &RawSearchQuery| q.tag.as_ref())
                .optional()
                .rule(rules::array())
                .rule(rules::array_of_strings()),
        )
        .field(
            FieldRules::new("tagType", |q: &RawSearchQuery| q.tag_type.as_ref())
                .validate_if(RawSearchQuery::has_tags)
                .rule(rules::required_when_present("tag"))
                .rule(rules::is_enum(TagType::allowed())),
        )
        .field(
            FieldRules::new("startItem", |q: &RawSearchQuery| q.start_item.as_ref())
                .optional()
                .rule(rules::non_negative_integer()),
        )
        .field(
            FieldRules::new("numberOfItems", |q: &RawSearchQuery| q.number_of_items.as_ref())
                .optional()
                .rule(rules::non_negative_integer()),
        )
});

/// Validate a normalized query and convert it into its typed form.
///
/// `tagType` is only checked when `tag` is non-empty; otherwise a malformed
/// `tagType` is dropped rather than reported.
pub fn validate(query: &RawSearchQuery) -> Result<PaginatedSearchQuery, Vec<Violation>> {
    VALIDATOR.check(query)?;
    decode_query(query).map_err(|violation| vec![violation])
}

fn decode_query(query: &RawSearchQuery) -> Result<PaginatedSearchQuery, Violation> {
    let integer = |field: &str, value: Option<&Value>| -> Result<Option<u64>, Violation> {
        match value.filter(|v| !v.is_null()) {
            None => Ok(None),
            Some(v) => as_non_negative_integer(v).map(Some).ok_or_else(|| {
                Violation::new(
                    field,
                    "isNumeric",
                    ViolationKind::InvalidType,
                    format!("{} must be a non-negative integer", field),
                )
            }),
        }
    };

    let tag: Option<Vec<String>> = decode("tag", query.tag.as_ref())?;
    let tag_type = if query.has_tags() {
        decode("tagType", query.tag_type.as_ref())?
    } else {
        query
            .tag_type
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| TagType::parse(s).ok())
    };

    Ok(PaginatedSearchQuery {
        field: decode("field", query.field.as_ref())?,
        search: decode("search", query.search.as_ref())?,
        sort_key: decode("sortKey", query.sort_key.as_ref())?
            .unwrap_or_else(|| DEFAULT_SORT_KEY.to_string()),
        sort_direction: decode("sortDirection", query.sort_direction.as_ref())?.unwrap_or_default(),
        page: integer("page", query.page.as_ref())?,
        per_page: integer("perPage", query.per_page.as_ref())?,
        tag,
        tag_type,
        start_item: integer("startItem", query.start_item.as_ref())?,
        number_of_items: integer("numberOfItems", query.number_of_items.as_ref())?,
    })
}
