//! Query-string extractor for space search.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use mirror_core::RawSearchQuery;

use crate::error::ApiError;

/// Collects the query string into a [`RawSearchQuery`].
///
/// Pairs are kept in order, so `?tag=a&tag=b` becomes a two-element `tag`
/// sequence while `?tag=a` stays a scalar for normalization to coerce.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery(pub RawSearchQuery);

#[async_trait]
impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs): Query<Vec<(String, String)>> = Query::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_input(format!("Malformed query string: {}", e)))?;
        Ok(SearchQuery(RawSearchQuery::from_pairs(pairs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::{json, Value};

    async fn extract(uri: &str) -> RawSearchQuery {
        let (mut parts, _) = Request::builder()
            .uri(uri)
            .body(())
            .expect("request")
            .into_parts();
        SearchQuery::from_request_parts(&mut parts, &())
            .await
            .expect("extract")
            .0
    }

    #[tokio::test]
    async fn test_single_tag_stays_scalar() {
        let raw = extract("/space/search?tag=nature").await;
        assert_eq!(raw.tag, Some(Value::String("nature".into())));
    }

    #[tokio::test]
    async fn test_repeated_tag_becomes_sequence() {
        let raw = extract("/space/search?tag=a&tag=b&tagType=THEME").await;
        assert_eq!(raw.tag, Some(json!(["a", "b"])));
        assert_eq!(raw.tag_type, Some(json!("THEME")));
    }

    #[tokio::test]
    async fn test_empty_query() {
        assert_eq!(extract("/space/search").await, RawSearchQuery::default());
    }
}
