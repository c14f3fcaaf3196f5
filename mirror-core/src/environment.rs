//! Zone environment settings (sky, sun, fog and post-processing)

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::{ObjectId, Timestamp};
use crate::validation::{
    as_non_negative_integer, decode, rules, FieldRules, Rule, Validator, Violation, ViolationKind,
};

/// Linear RGB triple.
pub type Color = [f64; 3];

/// A directional light in the sky.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Sun {
    /// Degrees clockwise from north
    pub azimuth: f64,
    /// Degrees above the horizon
    pub elevation: f64,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<f64>))]
    pub color: Color,
    pub intensity: f64,
}

impl Default for Sun {
    fn default() -> Self {
        Self {
            azimuth: 135.0,
            elevation: 45.0,
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

/// Rendering environment of a space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: ObjectId,
    /// Name of the preset the settings were derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<f64>))]
    pub sky_top_color: Color,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<f64>))]
    pub sky_horizon_color: Color,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<f64>))]
    pub sky_bottom_color: Color,
    pub suns: Vec<Sun>,
    pub sun_count: u32,
    pub fog_enabled: bool,
    pub fog_volumetric: bool,
    pub fog_density: f64,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<f64>))]
    pub fog_color: Color,
    pub ssao: bool,
    pub glow: bool,
    pub global_illumination: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl Environment {
    /// Default daylight environment.
    pub fn new(id: ObjectId, now: Timestamp) -> Self {
        Self {
            id,
            environment: None,
            sky_top_color: [0.0, 0.4, 0.85],
            sky_horizon_color: [0.65, 0.8, 0.95],
            sky_bottom_color: [0.2, 0.2, 0.25],
            suns: vec![Sun::default()],
            sun_count: 1,
            fog_enabled: false,
            fog_volumetric: false,
            fog_density: 0.01,
            fog_color: [0.8, 0.85, 0.9],
            ssao: true,
            glow: false,
            global_illumination: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update field by field and stamp `updated_at`.
    pub fn apply(&mut self, update: &UpdateEnvironmentRequest, now: Timestamp) {
        if let Some(environment) = &update.environment {
            self.environment = Some(environment.clone());
        }
        if let Some(color) = update.sky_top_color {
            self.sky_top_color = color;
        }
        if let Some(color) = update.sky_horizon_color {
            self.sky_horizon_color = color;
        }
        if let Some(color) = update.sky_bottom_color {
            self.sky_bottom_color = color;
        }
        if let Some(suns) = &update.suns {
            self.suns = suns.clone();
            self.sun_count = u32::try_from(suns.len()).unwrap_or(u32::MAX);
        }
        if let Some(sun_count) = update.sun_count {
            self.sun_count = sun_count;
        }
        if let Some(enabled) = update.fog_enabled {
            self.fog_enabled = enabled;
        }
        if let Some(volumetric) = update.fog_volumetric {
            self.fog_volumetric = volumetric;
        }
        if let Some(density) = update.fog_density {
            self.fog_density = density;
        }
        if let Some(color) = update.fog_color {
            self.fog_color = color;
        }
        if let Some(ssao) = update.ssao {
            self.ssao = ssao;
        }
        if let Some(glow) = update.glow {
            self.glow = glow;
        }
        if let Some(gi) = update.global_illumination {
            self.global_illumination = gi;
        }
        self.updated_at = now;
    }
}

/// Environment update payload as received, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateEnvironmentPayload {
    pub environment: Option<Value>,
    pub sky_top_color: Option<Value>,
    pub sky_horizon_color: Option<Value>,
    pub sky_bottom_color: Option<Value>,
    pub suns: Option<Value>,
    pub sun_count: Option<Value>,
    pub fog_enabled: Option<Value>,
    pub fog_volumetric: Option<Value>,
    pub fog_density: Option<Value>,
    pub fog_color: Option<Value>,
    pub ssao: Option<Value>,
    pub glow: Option<Value>,
    pub global_illumination: Option<Value>,
}

/// Validated partial environment update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnvironmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<f64>>))]
    pub sky_top_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<f64>>))]
    pub sky_horizon_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<f64>>))]
    pub sky_bottom_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suns: Option<Vec<Sun>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sun_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fog_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fog_volumetric: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fog_density: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<f64>>))]
    pub fog_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssao: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_illumination: Option<bool>,
}

fn suns_shape() -> Rule<UpdateEnvironmentPayload> {
    Rule::new("isSunArray", ViolationKind::InvalidType, |value, _| match value {
        Some(Value::Array(items)) if items.iter().all(|sun| Sun::deserialize(sun).is_ok()) => {
            Ok(())
        }
        Some(Value::Array(_)) => {
            Err("must contain sun objects with azimuth, elevation, color and intensity".to_string())
        }
        _ => Ok(()),
    })
    .halting()
}

fn sun_count_matches_suns() -> Rule<UpdateEnvironmentPayload> {
    Rule::new(
        "sunCountMatchesSuns",
        ViolationKind::InvalidType,
        |value, payload: &UpdateEnvironmentPayload| {
            let count = value.and_then(as_non_negative_integer);
            let suns = payload.suns.as_ref().and_then(Value::as_array).map(Vec::len);
            match (count, suns) {
                (Some(count), Some(len)) if count != len as u64 => Err(format!(
                    "must equal the number of suns ({}), got {}",
                    len, count
                )),
                _ => Ok(()),
            }
        },
    )
}

fn color_field(
    name: &'static str,
    accessor: fn(&UpdateEnvironmentPayload) -> Option<&Value>,
) -> FieldRules<UpdateEnvironmentPayload> {
    FieldRules::new(name, accessor).optional().rule(rules::triple())
}

fn flag_field(
    name: &'static str,
    accessor: fn(&UpdateEnvironmentPayload) -> Option<&Value>,
) -> FieldRules<UpdateEnvironmentPayload> {
    FieldRules::new(name, accessor).optional().rule(rules::boolean())
}

static VALIDATOR: Lazy<Validator<UpdateEnvironmentPayload>> = Lazy::new(|| {
    Validator::new()
        .field(
            FieldRules::new("environment", |p: &UpdateEnvironmentPayload| p.environment.as_ref())
                .optional()
                .rule(rules::string()),
        )
        .field(color_field("skyTopColor", |p| p.sky_top_color.as_ref()))
        .field(color_field("skyHorizonColor", |p| p.sky_horizon_color.as_ref()))
        .field(color_field("skyBottomColor", |p| p.sky_bottom_color.as_ref()))
        .field(
            FieldRules::new("suns", |p: &UpdateEnvironmentPayload| p.suns.as_ref())
                .optional()
                .rule(rules::array())
                .rule(suns_shape()),
        )
        .field(
            FieldRules::new("sunCount", |p: &UpdateEnvironmentPayload| p.sun_count.as_ref())
                .optional()
                .rule(rules::non_negative_integer().with_name("isInt"))
                .rule(sun_count_matches_suns()),
        )
        .field(flag_field("fogEnabled", |p| p.fog_enabled.as_ref()))
        .field(flag_field("fogVolumetric", |p| p.fog_volumetric.as_ref()))
        .field(
            FieldRules::new("fogDensity", |p: &UpdateEnvironmentPayload| p.fog_density.as_ref())
                .optional()
                .rule(rules::finite_number()),
        )
        .field(color_field("fogColor", |p| p.fog_color.as_ref()))
        .field(flag_field("ssao", |p| p.ssao.as_ref()))
        .field(flag_field("glow", |p| p.glow.as_ref()))
        .field(flag_field("globalIllumination", |p| p.global_illumination.as_ref()))
});

impl UpdateEnvironmentPayload {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn violations(&self) -> Vec<Violation> {
        VALIDATOR.validate(self)
    }

    /// Validate and convert into a typed partial update.
    pub fn validate(&self) -> Result<UpdateEnvironmentRequest, Vec<Violation>> {
        VALIDATOR.check(self)?;
        self.decode().map_err(|violation| vec![violation])
    }

    fn decode(&self) -> Result<UpdateEnvironmentRequest, Violation> {
        Ok(UpdateEnvironmentRequest {
            environment: decode("environment", self.environment.as_ref())?,
            sky_top_color: decode("skyTopColor", self.sky_top_color.as_ref())?,
            sky_horizon_color: decode("skyHorizonColor", self.sky_horizon_color.as_ref())?,
            sky_bottom_color: decode("skyBottomColor", self.sky_bottom_color.as_ref())?,
            suns: decode("suns", self.suns.as_ref())?,
            sun_count: sun_count(self.sun_count.as_ref())?,
            fog_enabled: decode("fogEnabled", self.fog_enabled.as_ref())?,
            fog_volumetric: decode("fogVolumetric", self.fog_volumetric.as_ref())?,
            fog_density: decode("fogDensity", self.fog_density.as_ref())?,
            fog_color: decode("fogColor", self.fog_color.as_ref())?,
            ssao: decode("ssao", self.ssao.as_ref())?,
            glow: decode("glow", self.glow.as_ref())?,
            global_illumination: decode("globalIllumination", self.global_illumination.as_ref())?,
        })
    }
}

fn sun_count(value: Option<&Value>) -> Result<Option<u32>, Violation> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    as_non_negative_integer(value)
        .and_then(|n| u32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| {
            Violation::new(
                "sunCount",
                "isInt",
                ViolationKind::InvalidType,
                "sunCount must be a non-negative integer",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn payload(value: Value) -> UpdateEnvironmentPayload {
        UpdateEnvironmentPayload::from_value(value).expect("object payload")
    }

    #[test]
    fn test_partial_update_applies_only_given_fields() {
        let now = Utc::now();
        let mut environment = Environment::new(ObjectId::new(), now);
        let before = environment.clone();

        let update = payload(json!({"environment": "demo", "skyTopColor": [1, 2, 1]}))
            .validate()
            .expect("valid");
        environment.apply(&update, now);

        assert_eq!(environment.environment.as_deref(), Some("demo"));
        assert_eq!(environment.sky_top_color, [1.0, 2.0, 1.0]);
        assert_eq!(environment.fog_color, before.fog_color);
        assert_eq!(environment.suns, before.suns);
    }

    #[test]
    fn test_color_must_be_triple() {
        let violations = payload(json!({"fogColor": [1, 2]})).violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "fogColor");
        assert_eq!(violations[0].kind, ViolationKind::InvalidType);

        let violations = payload(json!({"skyTopColor": ["red", 0, 0]})).violations();
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_flags_must_be_booleans() {
        let violations = payload(json!({"ssao": "yes", "glow": 1})).violations();
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["ssao", "glow"]);
    }

    #[test]
    fn test_sun_count_must_match_suns() {
        let violations = payload(json!({
            "suns": [{"azimuth": 0, "elevation": 30, "color": [1, 1, 1], "intensity": 1}],
            "sunCount": 2
        }))
        .violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "sunCountMatchesSuns");
    }

    #[test]
    fn test_sun_count_string_must_match_suns() {
        let sun = json!({"azimuth": 0, "elevation": 30, "color": [1, 1, 1], "intensity": 1});
        let violations = payload(json!({"suns": [sun.clone(), sun.clone()], "sunCount": "1"})).violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "sunCount");
        assert_eq!(violations[0].rule, "sunCountMatchesSuns");

        let now = Utc::now();
        let mut environment = Environment::new(ObjectId::new(), now);
        let update = payload(json!({"suns": [sun.clone(), sun], "sunCount": "2"}))
            .validate()
            .expect("valid");
        environment.apply(&update, now);
        assert_eq!(environment.suns.len(), 2);
        assert_eq!(environment.sun_count, 2);
    }

    #[test]
    fn test_suns_update_sets_count() {
        let now = Utc::now();
        let mut environment = Environment::new(ObjectId::new(), now);
        let update = payload(json!({"suns": []})).validate().expect("valid");
        environment.apply(&update, now);
        assert!(environment.suns.is_empty());
        assert_eq!(environment.sun_count, 0);
    }

    #[test]
    fn test_malformed_sun_rejected() {
        let violations = payload(json!({"suns": [{"azimuth": 0}]})).violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "isSunArray");
    }

    #[test]
    fn test_environment_serializes_camel_case() {
        let environment = Environment::new(ObjectId::new(), Utc::now());
        let json = serde_json::to_value(&environment).expect("serialize");
        for key in [
            "ssao",
            "glow",
            "fogColor",
            "fogDensity",
            "fogEnabled",
            "fogVolumetric",
            "globalIllumination",
            "skyBottomColor",
            "skyHorizonColor",
            "skyTopColor",
            "sunCount",
            "suns",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
