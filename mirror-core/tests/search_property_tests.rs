//! Property-Based Tests for the Paginated Search Query Contract
//!
//! For any raw search query:
//! - omitted `sortKey`/`sortDirection` normalize to `updatedAt`/`desc`
//! - a non-empty `tag` without `tagType` is a conditional-requirement violation
//! - a scalar `tag` is coerced into a one-element sequence before validation
//! - numeric fields survive the string transport unchanged

use mirror_core::search::{normalize, validate};
use mirror_core::{
    PaginatedSearchQuery, RawSearchQuery, SortDirection, TagType, ViolationKind,
};
use mirror_test_utils::assertions::assert_violation_count;
use mirror_test_utils::generators::*;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Sort defaults apply whenever sort fields are absent.
    #[test]
    fn prop_sort_defaults(raw in arb_raw_query_without_sort_or_tags()) {
        let normalized = normalize(raw);
        prop_assert_eq!(normalized.sort_key.clone(), Some(json!("updatedAt")));
        prop_assert_eq!(normalized.sort_direction.clone(), Some(json!("desc")));

        let query = validate(&normalized).map_err(|v| TestCaseError::fail(format!("{:?}", v)))?;
        prop_assert_eq!(query.sort_key, "updatedAt");
        prop_assert_eq!(query.sort_direction, SortDirection::Desc);
    }

    /// Tags without a tag type are rejected on tagType.
    #[test]
    fn prop_tags_require_tag_type(
        raw in arb_raw_query_without_sort_or_tags(),
        tags in arb_unique_tags(1, 5),
    ) {
        let raw = RawSearchQuery { tag: Some(json!(tags)), ..raw };
        let violations = PaginatedSearchQuery::parse(raw).err().unwrap_or_default();
        assert_violation_count(
            &violations,
            "tagType",
            ViolationKind::ConditionallyRequiredFieldMissing,
            1,
        );
        prop_assert_eq!(violations.len(), 1);
    }

    /// A scalar tag becomes a one-element sequence.
    #[test]
    fn prop_scalar_tag_coerced(tag in arb_tag(), tag_type in arb_tag_type()) {
        let raw = RawSearchQuery::from_pairs([("tag", tag.clone()), ("tagType", tag_type.as_str().to_string())]);
        prop_assert_eq!(raw.tag.clone(), Some(json!(tag.clone())));

        let normalized = normalize(raw);
        prop_assert_eq!(normalized.tag.clone(), Some(json!([tag.clone()])));

        let query = validate(&normalized).map_err(|v| TestCaseError::fail(format!("{:?}", v)))?;
        prop_assert_eq!(query.tag, Some(vec![tag]));
        prop_assert_eq!(query.tag_type, Some(tag_type));
    }

    /// Repeated tag keys become a sequence in arrival order.
    #[test]
    fn prop_repeated_tags_preserved(tags in arb_unique_tags(2, 8)) {
        let mut pairs: Vec<(&str, String)> = tags.iter().map(|t| ("tag", t.clone())).collect();
        pairs.push(("tagType", "THEME".to_string()));
        let query = PaginatedSearchQuery::parse(RawSearchQuery::from_pairs(pairs))
            .map_err(|v| TestCaseError::fail(format!("{:?}", v)))?;
        prop_assert_eq!(query.tag, Some(tags));
        prop_assert_eq!(query.tag_type, Some(TagType::Theme));
    }

    /// An unknown tagType alongside tags is a single enum violation.
    #[test]
    fn prop_unknown_tag_type_with_tags(tag in arb_tag(), tag_type in arb_unknown_tag_type()) {
        let violations = PaginatedSearchQuery::parse(RawSearchQuery::from_pairs([
            ("tag", tag),
            ("tagType", tag_type),
        ]))
        .err()
        .unwrap_or_default();
        prop_assert_eq!(violations.len(), 1);
        prop_assert_eq!(violations[0].kind, ViolationKind::InvalidEnumValue);
        prop_assert_eq!(violations[0].field.as_str(), "tagType");
    }

    /// Both pagination idioms are carried through unchanged.
    #[test]
    fn prop_pagination_fields_preserved(
        page in 0u64..1_000,
        per_page in 0u64..1_000,
        start in 0u64..10_000,
        count in 0u64..1_000,
    ) {
        let query = PaginatedSearchQuery::parse(RawSearchQuery::from_value(json!({
            "page": page.to_string(),
            "perPage": per_page,
            "startItem": start.to_string(),
            "numberOfItems": count,
        })).map_err(|e| TestCaseError::fail(e.to_string()))?)
        .map_err(|v| TestCaseError::fail(format!("{:?}", v)))?;
        prop_assert_eq!(query.page, Some(page));
        prop_assert_eq!(query.per_page, Some(per_page));
        prop_assert_eq!(query.start_item, Some(start));
        prop_assert_eq!(query.number_of_items, Some(count));
    }

    /// Sort directions outside {asc, desc} are rejected.
    #[test]
    fn prop_bad_sort_direction(direction in "[a-zA-Z]{1,10}") {
        prop_assume!(direction != "asc" && direction != "desc");
        let violations = PaginatedSearchQuery::parse(RawSearchQuery::from_pairs([
            ("sortDirection", direction),
        ]))
        .err()
        .unwrap_or_default();
        prop_assert_eq!(violations.len(), 1);
        prop_assert_eq!(violations[0].rule.as_str(), "isSortDirection");
    }
}

// ============================================================================
// CONCRETE SCENARIOS
// ============================================================================

#[test]
fn test_bare_scalar_tag_scenario() {
    let raw = RawSearchQuery::from_value(json!({ "tag": "nature" })).expect("object");

    let normalized = normalize(raw);
    assert_eq!(normalized.tag, Some(json!(["nature"])));

    let violations = validate(&normalized).expect_err("tagType required");
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "tagType");
    assert_eq!(
        violations[0].kind,
        ViolationKind::ConditionallyRequiredFieldMissing
    );
}
