//! Enum types for Mirror entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EnumParseError;

// ============================================================================
// TAG TYPES
// ============================================================================

/// Category of a tag attached to a space or space object.
///
/// Every category except [`TagType::ThirdParty`] holds plain string tags;
/// third-party tags are structured records sourced from an external provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagType {
    /// Free-form tags chosen by the owner
    User,
    /// Keywords surfaced by search
    Search,
    /// Material names (wood, metal, ...)
    Material,
    /// Visual or narrative themes
    Theme,
    /// Scripts attached by AI tooling
    AiScripts,
    /// Structured tags from an external tagging provider
    ThirdParty,
}

impl TagType {
    /// Every tag type, in declaration order.
    pub const ALL: [TagType; 6] = [
        TagType::User,
        TagType::Search,
        TagType::Material,
        TagType::Theme,
        TagType::AiScripts,
        TagType::ThirdParty,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TagType::User => "USER",
            TagType::Search => "SEARCH",
            TagType::Material => "MATERIAL",
            TagType::Theme => "THEME",
            TagType::AiScripts => "AI_SCRIPTS",
            TagType::ThirdParty => "THIRD_PARTY",
        }
    }

    /// Exhaustive membership test over the wire representation.
    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        Self::ALL
            .iter()
            .copied()
            .find(|tag_type| tag_type.as_str() == s)
            .ok_or_else(|| EnumParseError::new("TagType", s, Self::allowed()))
    }

    /// Whether tags of this type are structured records rather than strings.
    pub fn uses_records(&self) -> bool {
        matches!(self, TagType::ThirdParty)
    }

    /// Allowed wire values, for error messages.
    pub fn allowed() -> Vec<&'static str> {
        Self::ALL.iter().map(TagType::as_str).collect()
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagType {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// SORTING
// ============================================================================

/// Sort direction for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub const ALL: [SortDirection; 2] = [SortDirection::Asc, SortDirection::Desc];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        Self::ALL
            .iter()
            .copied()
            .find(|direction| direction.as_str() == s)
            .ok_or_else(|| EnumParseError::new("SortDirection", s, Self::allowed()))
    }

    pub fn allowed() -> Vec<&'static str> {
        Self::ALL.iter().map(SortDirection::as_str).collect()
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_type_roundtrip_wire_values() {
        for tag_type in TagType::ALL {
            assert_eq!(TagType::parse(tag_type.as_str()), Ok(tag_type));
            let json = serde_json::to_string(&tag_type).expect("serialize");
            assert_eq!(json, format!("\"{}\"", tag_type.as_str()));
        }
    }

    #[test]
    fn test_tag_type_parse_is_exact() {
        assert!(TagType::parse("user").is_err());
        assert!(TagType::parse("").is_err());
        let err = TagType::parse("FRIEND").expect_err("unknown tag type");
        assert_eq!(err.value, "FRIEND");
        assert!(err.allowed.contains(&"THIRD_PARTY".to_string()));
    }

    #[test]
    fn test_only_third_party_uses_records() {
        assert!(TagType::ThirdParty.uses_records());
        assert!(!TagType::User.uses_records());
        assert!(!TagType::Search.uses_records());
    }

    #[test]
    fn test_sort_direction_default_and_parse() {
        assert_eq!(SortDirection::default(), SortDirection::Desc);
        assert_eq!(SortDirection::parse("asc"), Ok(SortDirection::Asc));
        assert!(SortDirection::parse("ASC").is_err());
        assert!(SortDirection::parse("up").is_err());
    }
}
