//! Error types for Mirror operations

use thiserror::Error;

use crate::validation::Violation;

/// Document kinds referenced by errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Space,
    SpaceObject,
    Environment,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Space => "Space",
            EntityKind::SpaceObject => "SpaceObject",
            EntityKind::Environment => "Environment",
        };
        f.write_str(name)
    }
}

/// Error when a document identifier is malformed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ObjectIdParseError {
    #[error("Invalid id '{value}': expected 24 characters, got {length}")]
    InvalidLength { value: String, length: usize },

    #[error("Invalid id '{value}': expected hexadecimal characters")]
    InvalidCharacters { value: String },
}

/// Error when a string is not a member of a closed enumeration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid {type_name} '{value}', expected one of: {}", .allowed.join(", "))]
pub struct EnumParseError {
    pub type_name: &'static str,
    pub value: String,
    pub allowed: Vec<String>,
}

impl EnumParseError {
    pub fn new(type_name: &'static str, value: &str, allowed: Vec<&'static str>) -> Self {
        Self {
            type_name,
            value: value.to_string(),
            allowed: allowed.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: EntityKind, id: String },

    #[error("{entity} with id {id} already exists")]
    AlreadyExists { entity: EntityKind, id: String },

    #[error("Unsupported search field '{field}'")]
    UnsupportedSearchField { field: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Request rejected with {} violation(s)", .violations.len())]
    Rejected { violations: Vec<Violation> },
}

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationError::Rejected { violations } => violations,
        }
    }
}

impl From<Vec<Violation>> for ValidationError {
    fn from(violations: Vec<Violation>) -> Self {
        ValidationError::Rejected { violations }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Mirror errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MirrorError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<Vec<Violation>> for MirrorError {
    fn from(violations: Vec<Violation>) -> Self {
        MirrorError::Validation(ValidationError::from(violations))
    }
}

/// Result type for Mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parse_error_lists_allowed_values() {
        let err = EnumParseError::new("SortDirection", "up", vec!["asc", "desc"]);
        assert_eq!(
            err.to_string(),
            "Invalid SortDirection 'up', expected one of: asc, desc"
        );
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::NotFound {
            entity: EntityKind::Environment,
            id: "507f1f77bcf86cd799439011".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Environment with id 507f1f77bcf86cd799439011 not found"
        );
    }

    #[test]
    fn test_mirror_error_from_violations() {
        let err = MirrorError::from(Vec::<Violation>::new());
        assert!(matches!(err, MirrorError::Validation(_)));
    }
}
