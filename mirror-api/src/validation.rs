//! Request Validation Bridge
//!
//! Connects the field rule engine in `mirror-core` to the API layer. Each
//! inbound payload type implements [`ValidatedPayload`]; [`validated`] runs
//! its rules, records rejections and converts the violation list into a
//! `ValidationFailed` [`ApiError`].

use mirror_core::{
    PaginatedSearchQuery, RawSearchQuery, UpdateEnvironmentPayload, UpdateEnvironmentRequest,
    UpdateSpaceObjectTagsPayload, UpdateSpaceObjectTagsRequest, Violation,
};

use crate::error::{ApiError, ApiResult};
use crate::telemetry::with_metrics;

/// A raw inbound payload that converts into a typed request once its field
/// rules pass.
pub trait ValidatedPayload {
    /// Typed request produced on success.
    type Output;

    /// Label used in logs and the `payload` metric label.
    const NAME: &'static str;

    fn check(&self) -> Result<Self::Output, Vec<Violation>>;
}

impl ValidatedPayload for UpdateSpaceObjectTagsPayload {
    type Output = UpdateSpaceObjectTagsRequest;
    const NAME: &'static str = "UpdateSpaceObjectTagsRequest";

    fn check(&self) -> Result<Self::Output, Vec<Violation>> {
        self.validate()
    }
}

impl ValidatedPayload for UpdateEnvironmentPayload {
    type Output = UpdateEnvironmentRequest;
    const NAME: &'static str = "UpdateEnvironmentRequest";

    fn check(&self) -> Result<Self::Output, Vec<Violation>> {
        self.validate()
    }
}

impl ValidatedPayload for RawSearchQuery {
    type Output = PaginatedSearchQuery;
    const NAME: &'static str = "PaginatedSearchQuery";

    fn check(&self) -> Result<Self::Output, Vec<Violation>> {
        PaginatedSearchQuery::parse(self.clone())
    }
}

/// Validate a payload, reporting every violation at once on failure.
pub fn validated<P: ValidatedPayload>(payload: &P) -> ApiResult<P::Output> {
    payload.check().map_err(|violations| reject(P::NAME, &violations))
}

/// Log and count a rejected payload, then build the client-facing error.
pub fn reject(payload: &str, violations: &[Violation]) -> ApiError {
    with_metrics(|m| {
        for violation in violations {
            m.record_validation_failure(payload, &violation.rule);
        }
    });
    tracing::debug!(
        payload = payload,
        violation_count = violations.len(),
        fields = ?violations.iter().map(|v| v.field.as_str()).collect::<Vec<_>>(),
        "Rejected payload"
    );
    ApiError::validation_failed(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_valid_tag_update_passes_through() -> ApiResult<()> {
        let payload = UpdateSpaceObjectTagsPayload::from_value(json!({
            "spaceObjectId": "507f1f77bcf86cd799439011",
            "tagType": "THEME",
            "tags": ["a", "b"]
        }))?;
        let request = validated(&payload)?;
        assert_eq!(request.tags.len(), 2);
        Ok(())
    }

    #[test]
    fn test_rejection_carries_every_violation() -> ApiResult<()> {
        let payload = UpdateSpaceObjectTagsPayload::from_value(json!({
            "spaceObjectId": "nope",
            "tagType": "THEME",
            "tags": ["a", "a"]
        }))?;
        let err = validated(&payload).expect_err("invalid payload");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.expect("details");
        let fields: Vec<_> = details
            .as_array()
            .expect("array")
            .iter()
            .map(|d| d["field"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(fields, vec!["spaceObjectId", "tags"]);
        Ok(())
    }

    #[test]
    fn test_search_query_is_normalized_before_validation() -> ApiResult<()> {
        let query = RawSearchQuery::from_pairs([("search", "forest")]);
        let parsed = validated(&query)?;
        assert_eq!(parsed.sort_key, "updatedAt");
        Ok(())
    }

    #[test]
    fn test_environment_payload_rejected() -> ApiResult<()> {
        let payload = UpdateEnvironmentPayload::from_value(json!({ "skyTopColor": [1, 2] }))?;
        let err = validated(&payload).expect_err("bad colour");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        Ok(())
    }
}
