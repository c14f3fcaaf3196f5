//! Custom extractors that reject with [`ApiError`](crate::error::ApiError)
//! bodies instead of axum's plain-text rejections.

mod path_id;
mod search_query;

pub use path_id::PathObjectId;
pub use search_query::SearchQuery;
