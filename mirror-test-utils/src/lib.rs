//! Mirror Test Utilities
//!
//! Shared test infrastructure for the Mirror workspace:
//! - Proptest generators for identifiers, tags and raw payloads
//! - Fixtures for spaces, space objects and environments
//! - A seeded in-memory store
//! - Assertions over violation lists

pub use mirror_storage::InMemoryStore;

pub use mirror_core::{
    Environment, ObjectId, PaginatedSearchQuery, RawSearchQuery, Space, SpaceObject, TagList,
    TagType, Tags, ThirdPartyTag, Timestamp, UpdateEnvironmentPayload,
    UpdateSpaceObjectTagsPayload, Violation, ViolationKind, MAX_TAGS_PER_TYPE,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Mirror request payloads.

    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::collections::BTreeSet;

    /// Generate a well-formed 24-character hex identifier string.
    pub fn arb_object_id_string() -> impl Strategy<Value = String> {
        "[0-9a-fA-F]{24}"
    }

    /// Generate a parsed ObjectId.
    pub fn arb_object_id() -> impl Strategy<Value = ObjectId> {
        "[0-9a-f]{24}".prop_filter_map("hex id", |s| ObjectId::parse(&s).ok())
    }

    /// Generate a string that is not a valid identifier.
    pub fn arb_malformed_object_id() -> impl Strategy<Value = String> {
        prop_oneof![
            "[0-9a-f]{1,23}",
            "[0-9a-f]{25,40}",
            "[0-9a-f]{10}[g-z][0-9a-f]{13}",
        ]
    }

    /// Generate a tag type whose tags are plain strings.
    pub fn arb_plain_tag_type() -> impl Strategy<Value = TagType> {
        prop::sample::select(
            TagType::ALL
                .iter()
                .copied()
                .filter(|t| !t.uses_records())
                .collect::<Vec<_>>(),
        )
    }

    /// Generate any tag type.
    pub fn arb_tag_type() -> impl Strategy<Value = TagType> {
        prop::sample::select(TagType::ALL.to_vec())
    }

    /// Generate a string that is not a tag type.
    pub fn arb_unknown_tag_type() -> impl Strategy<Value = String> {
        "[a-z_]{1,12}".prop_filter("not a tag type", |s| TagType::parse(s).is_err())
    }

    /// Generate a plain tag.
    pub fn arb_tag() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,15}"
    }

    /// Generate `min..=max` mutually distinct plain tags.
    pub fn arb_unique_tags(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set(arb_tag(), min..=max)
            .prop_map(|set: BTreeSet<String>| set.into_iter().collect::<Vec<_>>())
            .prop_shuffle()
    }

    /// Generate tags with at least one repeated entry.
    pub fn arb_tags_with_duplicate() -> impl Strategy<Value = Vec<String>> {
        (arb_unique_tags(1, 10), any::<prop::sample::Index>(), any::<prop::sample::Index>())
            .prop_map(|(mut tags, pick, place)| {
                let duplicate = tags[pick.index(tags.len())].clone();
                let at = place.index(tags.len() + 1);
                tags.insert(at, duplicate);
                tags
            })
    }

    /// Generate a third-party tag record.
    pub fn arb_third_party_tag() -> impl Strategy<Value = ThirdPartyTag> {
        (
            arb_tag(),
            "https://[a-z]{3,10}\\.example",
            proptest::option::of("https://[a-z]{3,10}\\.example/[a-z]{1,8}"),
        )
            .prop_map(|(name, home, public)| ThirdPartyTag {
                name,
                third_party_source_home_page_url: home,
                third_party_source_public_page_url: public,
            })
    }

    /// Generate `min..=max` third-party tags with distinct natural keys.
    pub fn arb_unique_third_party_tags(
        min: usize,
        max: usize,
    ) -> impl Strategy<Value = Vec<ThirdPartyTag>> {
        prop::collection::vec(arb_third_party_tag(), min..=max * 2).prop_filter_map(
            "enough distinct keys",
            move |candidates| {
                let mut seen = std::collections::HashSet::new();
                let unique: Vec<_> = candidates
                    .into_iter()
                    .filter(|tag| seen.insert(tag.key()))
                    .take(max)
                    .collect();
                (unique.len() >= min).then_some(unique)
            },
        )
    }

    /// Generate a valid plain-tag update payload as JSON.
    pub fn arb_valid_plain_tag_update() -> impl Strategy<Value = Value> {
        (
            arb_object_id_string(),
            arb_plain_tag_type(),
            arb_unique_tags(1, MAX_TAGS_PER_TYPE),
        )
            .prop_map(|(id, tag_type, tags)| {
                json!({ "spaceObjectId": id, "tagType": tag_type.as_str(), "tags": tags })
            })
    }

    /// Generate a valid third-party tag update payload as JSON.
    pub fn arb_valid_third_party_tag_update() -> impl Strategy<Value = Value> {
        (
            arb_object_id_string(),
            arb_unique_third_party_tags(1, MAX_TAGS_PER_TYPE),
        )
            .prop_map(|(id, tags)| {
                json!({ "spaceObjectId": id, "tagType": "THIRD_PARTY", "tags": tags })
            })
    }

    /// Generate a free-text search term.
    pub fn arb_search_term() -> impl Strategy<Value = String> {
        "[a-zA-Z ]{1,20}"
    }

    /// Generate a sort key, known or not.
    pub fn arb_sort_key() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("updatedAt".to_string()),
            Just("createdAt".to_string()),
            Just("name".to_string()),
            "[a-zA-Z]{1,12}",
        ]
    }

    /// Generate a raw search query whose values are all well-typed strings,
    /// as a query-string transport would deliver them. `sortKey`,
    /// `sortDirection`, `tag` and `tagType` are always absent.
    pub fn arb_raw_query_without_sort_or_tags() -> impl Strategy<Value = RawSearchQuery> {
        (
            proptest::option::of(prop::sample::select(vec!["name", "description"])),
            proptest::option::of(arb_search_term()),
            proptest::option::of(1u64..50),
            proptest::option::of(1u64..100),
            proptest::option::of(0u64..500),
            proptest::option::of(0u64..100),
        )
            .prop_map(|(field, search, page, per_page, start, count)| {
                let mut pairs: Vec<(&str, String)> = Vec::new();
                if let Some(field) = field {
                    pairs.push(("field", field.to_string()));
                }
                if let Some(search) = search {
                    pairs.push(("search", search));
                }
                if let Some(page) = page {
                    pairs.push(("page", page.to_string()));
                }
                if let Some(per_page) = per_page {
                    pairs.push(("perPage", per_page.to_string()));
                }
                if let Some(start) = start {
                    pairs.push(("startItem", start.to_string()));
                }
                if let Some(count) = count {
                    pairs.push(("numberOfItems", count.to_string()));
                }
                RawSearchQuery::from_pairs(pairs)
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built documents for common scenarios.

    use super::*;
    use chrono::{Duration, Utc};
    use mirror_storage::MirrorStore;

    /// Identifier used by the concrete scenarios in tests.
    pub const KNOWN_OBJECT_ID: &str = "507f1f77bcf86cd799439011";

    /// Owner used for fixture spaces.
    pub const FIXTURE_USER: &str = "fixture-user";

    pub fn known_object_id() -> ObjectId {
        ObjectId::parse(KNOWN_OBJECT_ID).unwrap_or_default()
    }

    pub fn environment_fixture() -> Environment {
        Environment::new(ObjectId::new(), Utc::now())
    }

    pub fn space_fixture(name: &str) -> Space {
        Space::new(name, FIXTURE_USER, Utc::now())
    }

    pub fn space_object_fixture(space_id: ObjectId) -> SpaceObject {
        SpaceObject::new(space_id, "fixture object", Utc::now())
    }

    /// Documents inserted by [`seeded_store`].
    #[derive(Debug, Clone)]
    pub struct Seeded {
        pub store: InMemoryStore,
        pub spaces: Vec<Space>,
        pub space_object: SpaceObject,
        pub environment: Environment,
    }

    /// An in-memory store holding three tagged spaces, one space object with
    /// the [`KNOWN_OBJECT_ID`] and one environment.
    pub async fn seeded_store() -> Seeded {
        let store = InMemoryStore::new();
        let base = Utc::now();

        let spaces = vec![
            Space::new("Forest Glade", FIXTURE_USER, base)
                .with_description("A quiet clearing")
                .with_tags(
                    TagType::Theme,
                    TagList::Plain(vec!["nature".into(), "calm".into()]),
                ),
            Space::new("Neon City", FIXTURE_USER, base + Duration::seconds(1))
                .with_description("Rain and signs")
                .with_tags(TagType::Theme, TagList::Plain(vec!["urban".into()])),
            Space::new("Riverside", FIXTURE_USER, base + Duration::seconds(2))
                .with_description("Water and forest")
                .with_tags(TagType::Theme, TagList::Plain(vec!["nature".into()])),
        ];
        for space in &spaces {
            if let Err(err) = store.space_insert(space).await {
                panic!("seed space: {err}");
            }
        }

        let mut space_object = space_object_fixture(spaces[0].id.clone());
        space_object.id = known_object_id();
        if let Err(err) = store.space_object_insert(&space_object).await {
            panic!("seed space object: {err}");
        }

        let environment = environment_fixture();
        if let Err(err) = store.environment_insert(&environment).await {
            panic!("seed environment: {err}");
        }

        Seeded {
            store,
            spaces,
            space_object,
            environment,
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over violation lists.

    use super::*;

    /// Assert that exactly `count` violations of `kind` name `field`.
    #[track_caller]
    pub fn assert_violation_count(
        violations: &[Violation],
        field: &str,
        kind: ViolationKind,
        count: usize,
    ) {
        let found = violations
            .iter()
            .filter(|v| v.field == field && v.kind == kind)
            .count();
        assert_eq!(
            found, count,
            "expected {count} {kind:?} violation(s) on {field}, got: {violations:?}"
        );
    }

    /// Assert that some violation of `kind` names `field`.
    #[track_caller]
    pub fn assert_has_violation(violations: &[Violation], field: &str, kind: ViolationKind) {
        assert!(
            violations.iter().any(|v| v.field == field && v.kind == kind),
            "expected a {kind:?} violation on {field}, got: {violations:?}"
        );
    }

    /// Assert that no violation names `field`.
    #[track_caller]
    pub fn assert_field_clean(violations: &[Violation], field: &str) {
        assert!(
            violations.iter().all(|v| v.field != field),
            "expected no violations on {field}, got: {violations:?}"
        );
    }
}
