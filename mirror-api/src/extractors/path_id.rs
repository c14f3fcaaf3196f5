//! Path extractor for document identifiers.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use mirror_core::ObjectId;

use crate::error::ApiError;

/// Extracts a single `:id` path parameter as an [`ObjectId`].
///
/// A malformed identifier is rejected with `400 INVALID_FORMAT`.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_environment(PathObjectId(id): PathObjectId) -> ApiResult<Json<Environment>> {
///     // id is a validated ObjectId
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathObjectId(pub ObjectId);

#[async_trait]
impl<S> FromRequestParts<S> for PathObjectId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_input(format!("Missing path parameter: {}", e)))?;
        Ok(PathObjectId(ObjectId::parse(&raw)?))
    }
}
