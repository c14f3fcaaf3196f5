//! Mirror Core - Domain Types and Request Contracts
//!
//! Data structures shared by every Mirror crate, plus the two contracts every
//! inbound request passes through before reaching a handler:
//!
//! - the Field Validation Contract ([`validation`]): ordered per-field rules
//!   evaluated by one generic validator that accumulates [`Violation`]s;
//! - the Paginated Search Query Contract ([`search`]): normalization and
//!   validation of loosely-typed search queries.
//!
//! Nothing here performs I/O.

pub mod enums;
pub mod environment;
pub mod error;
pub mod identity;
pub mod search;
pub mod space;
pub mod tag_update;
pub mod tags;
pub mod validation;

pub use enums::{SortDirection, TagType};
pub use environment::{
    Color, Environment, Sun, UpdateEnvironmentPayload, UpdateEnvironmentRequest,
};
pub use error::{
    ConfigError, EntityKind, EnumParseError, MirrorError, MirrorResult, ObjectIdParseError,
    StorageError, ValidationError,
};
pub use identity::{ObjectId, Timestamp, OBJECT_ID_LEN};
pub use search::{normalize, PaginatedSearchQuery, RawSearchQuery, DEFAULT_SORT_KEY};
pub use space::{Space, SpaceObject};
pub use tag_update::{UpdateSpaceObjectTagsPayload, UpdateSpaceObjectTagsRequest};
pub use tags::{TagKey, TagList, Tags, ThirdPartyTag, MAX_TAGS_PER_TYPE};
pub use validation::{FieldRules, Rule, Validator, Violation, ViolationKind};
