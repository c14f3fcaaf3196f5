//! OpenAPI Specification for the Mirror API
//!
//! Generated with utoipa from the route annotations and the schema derives
//! on request and response types.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode, ViolationReport};
use crate::routes::{environment, health, space, space_object, util};
use crate::routes::health::{Readiness, StatusReport};
use crate::telemetry::metrics;

use mirror_core::{
    Environment, ObjectId, PaginatedSearchQuery, SortDirection, Space, SpaceObject, Sun, TagList,
    TagType, ThirdPartyTag, UpdateEnvironmentRequest, UpdateSpaceObjectTagsRequest, Violation,
    ViolationKind,
};
use mirror_storage::SpacePage;

/// OpenAPI document for the Mirror API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mirror API",
        description = "Space search, space object tagging and environment settings for The Mirror",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "The Mirror", url = "https://themirror.space")
    ),
    servers(
        (url = "https://api.themirror.space", description = "Production"),
        (url = "http://localhost:9000", description = "Local Development")
    ),
    tags(
        (name = "Spaces", description = "Paginated space search"),
        (name = "Space Objects", description = "Per-type tag replacement on space objects"),
        (name = "Environments", description = "Sky, fog, sun and lighting settings"),
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Util", description = "Server metadata"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        space::search_spaces,
        space_object::update_tags,
        environment::get_environment,
        environment::update_environment,
        health::ping,
        health::liveness,
        health::readiness,
        util::version,
        metrics::metrics_handler,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode, ViolationReport, Violation, ViolationKind,

            // === Identity & Enums ===
            ObjectId, TagType, SortDirection,

            // === Tags ===
            ThirdPartyTag, TagList, UpdateSpaceObjectTagsRequest,

            // === Spaces ===
            Space, SpaceObject, SpacePage, PaginatedSearchQuery,

            // === Environments ===
            Environment, Sun, UpdateEnvironmentRequest,

            // === Health ===
            Readiness, StatusReport,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("HS256 caller identity token"))
                        .build(),
                ),
            );
        }
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    }
}

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
