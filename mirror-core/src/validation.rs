//! Field Validation Contract
//!
//! Request payloads arrive as loosely-typed JSON. Instead of failing on the
//! first serde error, each payload is deserialized into a struct whose fields
//! are raw [`serde_json::Value`]s and then checked by a [`Validator`]: an
//! ordered list of [`FieldRules`], each binding a field name to an ordered
//! list of [`Rule`]s. Every failing rule yields one [`Violation`]; violations
//! accumulate across fields.
//!
//! Within a field, rules run in declaration order. Presence and type/shape
//! rules are *halting*: once one fails, the remaining rules of that field are
//! skipped. A field may be gated by a predicate over the whole input
//! ("validate-if"), so the effective rule set is decided per request.
//!
//! # Example
//! ```
//! use mirror_core::validation::{rules, FieldRules, Validator, ViolationKind};
//! use serde_json::{json, Value};
//!
//! struct Payload { name: Option<Value> }
//!
//! let validator = Validator::new()
//!     .field(FieldRules::new("name", |p: &Payload| p.name.as_ref())
//!         .rule(rules::required())
//!         .rule(rules::string()));
//!
//! let violations = validator.validate(&Payload { name: Some(json!(42)) });
//! assert_eq!(violations.len(), 1);
//! assert_eq!(violations[0].kind, ViolationKind::InvalidType);
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// VIOLATIONS
// ============================================================================

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ViolationKind {
    /// A required field is absent or empty
    MissingField,
    /// A field has the wrong type or shape
    InvalidType,
    /// A field is not a member of its enumerated set
    InvalidEnumValue,
    /// An array exceeds its maximum size
    ArrayTooLarge,
    /// An array contains two equal elements
    DuplicateElement,
    /// A field required by another field's presence is missing
    ConditionallyRequiredFieldMissing,
}

/// One structured validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Violation {
    /// Wire name of the offending field
    pub field: String,
    /// Name of the rule that failed (e.g. `arrayMaxSize`)
    pub rule: String,
    /// Failure category
    pub kind: ViolationKind,
    /// Human-readable reason
    pub message: String,
}

impl Violation {
    pub fn new(
        field: impl Into<String>,
        rule: impl Into<String>,
        kind: ViolationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            kind,
            message: message.into(),
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

/// Outcome of a single rule: `Err` carries the reason, phrased to follow the
/// field name ("must not be empty").
pub type Check = Result<(), String>;

type Predicate<T> = Box<dyn Fn(Option<&Value>, &T) -> Check + Send + Sync>;

/// A named, pure predicate over one field's value and the whole input.
pub struct Rule<T> {
    name: &'static str,
    kind: ViolationKind,
    halts: bool,
    check: Predicate<T>,
}

impl<T: 'static> Rule<T> {
    pub fn new(
        name: &'static str,
        kind: ViolationKind,
        check: impl Fn(Option<&Value>, &T) -> Check + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            kind,
            halts: false,
            check: Box::new(check),
        }
    }

    /// Skip the field's remaining rules when this one fails.
    pub fn halting(mut self) -> Self {
        self.halts = true;
        self
    }

    /// Report failures of this rule under a different name.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ViolationKind {
        self.kind
    }
}

impl<T> std::fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("halts", &self.halts)
            .finish()
    }
}

/// Ordered rules bound to one field of `T`.
pub struct FieldRules<T> {
    field: &'static str,
    accessor: fn(&T) -> Option<&Value>,
    optional: bool,
    gate: Option<fn(&T) -> bool>,
    rules: Vec<Rule<T>>,
}

impl<T: 'static> FieldRules<T> {
    pub fn new(field: &'static str, accessor: fn(&T) -> Option<&Value>) -> Self {
        Self {
            field,
            accessor,
            optional: false,
            gate: None,
            rules: Vec::new(),
        }
    }

    /// Skip every rule when the field is absent or null.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Evaluate this field's rules only when `predicate` holds for the input.
    pub fn validate_if(mut self, predicate: fn(&T) -> bool) -> Self {
        self.gate = Some(predicate);
        self
    }

    pub fn rule(mut self, rule: Rule<T>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    fn evaluate(&self, input: &T, violations: &mut Vec<Violation>) {
        if let Some(gate) = self.gate {
            if !gate(input) {
                return;
            }
        }

        let value = (self.accessor)(input).filter(|v| !v.is_null());
        if self.optional && value.is_none() {
            return;
        }

        for rule in &self.rules {
            if let Err(reason) = (rule.check)(value, input) {
                violations.push(Violation::new(
                    self.field,
                    rule.name,
                    rule.kind,
                    format!("{} {}", self.field, reason),
                ));
                if rule.halts {
                    break;
                }
            }
        }
    }
}

/// Generic validator: runs every field's rules in declaration order.
pub struct Validator<T> {
    fields: Vec<FieldRules<T>>,
}

impl<T: 'static> Validator<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn field(mut self, rules: FieldRules<T>) -> Self {
        self.fields.push(rules);
        self
    }

    /// Collect every violation for `input`; empty means valid.
    pub fn validate(&self, input: &T) -> Vec<Violation> {
        let mut violations = Vec::new();
        for field in &self.fields {
            field.evaluate(input, &mut violations);
        }
        violations
    }

    pub fn check(&self, input: &T) -> Result<(), Vec<Violation>> {
        let violations = self.validate(input);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(FieldRules::field)
    }
}

impl<T: 'static> Default for Validator<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// VALUE HELPERS
// ============================================================================

/// Whether a present value counts as "empty" for presence checks.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Read a non-negative integer from a JSON number or a numeric string.
///
/// Query-string transports deliver every value as a string, so `"2"` and `2`
/// are treated alike.
pub fn as_non_negative_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Decode a field that already passed its rules into its typed form.
///
/// A decode failure after validation means the rules and the target type
/// disagree; it is reported as an `InvalidType` violation on the field.
pub fn decode<T: DeserializeOwned>(field: &str, value: Option<&Value>) -> Result<Option<T>, Violation> {
    match value.filter(|v| !v.is_null()) {
        None => Ok(None),
        Some(v) => T::deserialize(v).map(Some).map_err(|e| {
            Violation::new(
                field,
                "type",
                ViolationKind::InvalidType,
                format!("{} has an unexpected shape: {}", field, e),
            )
        }),
    }
}

/// Like [`decode`], for fields whose rules guarantee presence.
pub fn decode_required<T: DeserializeOwned>(field: &str, value: Option<&Value>) -> Result<T, Violation> {
    decode(field, value)?.ok_or_else(|| {
        Violation::new(
            field,
            "required",
            ViolationKind::MissingField,
            format!("{} should not be empty", field),
        )
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// STANDARD RULES
// ============================================================================

/// Reusable rules. Type/shape rules pass on absent values; pair them with
/// [`required`] or [`FieldRules::optional`].
pub mod rules {
    use super::*;
    use crate::identity::ObjectId;
    use crate::tags::tag_key;
    use std::collections::HashSet;

    /// Fails when the value is absent, null, a blank string or an empty array.
    pub fn required<T: 'static>() -> Rule<T> {
        Rule::new("required", ViolationKind::MissingField, |value, _| {
            match value {
                Some(v) if !is_empty_value(v) => Ok(()),
                _ => Err("should not be empty".to_string()),
            }
        })
        .halting()
    }

    /// Presence check for fields demanded by another field's presence.
    pub fn required_when_present<T: 'static>(other: &'static str) -> Rule<T> {
        Rule::new(
            "required",
            ViolationKind::ConditionallyRequiredFieldMissing,
            move |value, _| match value {
                Some(v) if !is_empty_value(v) => Ok(()),
                _ => Err(format!("is required when {} is provided", other)),
            },
        )
        .halting()
    }

    pub fn string<T: 'static>() -> Rule<T> {
        Rule::new("isString", ViolationKind::InvalidType, |value, _| match value {
            None | Some(Value::String(_)) => Ok(()),
            Some(other) => Err(format!("must be a string, got {}", type_name(other))),
        })
        .halting()
    }

    pub fn boolean<T: 'static>() -> Rule<T> {
        Rule::new("isBoolean", ViolationKind::InvalidType, |value, _| match value {
            None | Some(Value::Bool(_)) => Ok(()),
            Some(other) => Err(format!("must be a boolean, got {}", type_name(other))),
        })
        .halting()
    }

    pub fn finite_number<T: 'static>() -> Rule<T> {
        Rule::new("isNumber", ViolationKind::InvalidType, |value, _| match value {
            None => Ok(()),
            Some(Value::Number(n)) if n.as_f64().is_some_and(f64::is_finite) => Ok(()),
            Some(other) => Err(format!("must be a finite number, got {}", type_name(other))),
        })
        .halting()
    }

    pub fn array<T: 'static>() -> Rule<T> {
        Rule::new("isArray", ViolationKind::InvalidType, |value, _| match value {
            None | Some(Value::Array(_)) => Ok(()),
            Some(other) => Err(format!("must be an array, got {}", type_name(other))),
        })
        .halting()
    }

    pub fn array_of_strings<T: 'static>() -> Rule<T> {
        Rule::new("isString", ViolationKind::InvalidType, |value, _| match value {
            None => Ok(()),
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => Ok(()),
            Some(_) => Err("each value must be a string".to_string()),
        })
        .halting()
    }

    /// 24-character hex document identifier.
    pub fn object_id<T: 'static>() -> Rule<T> {
        Rule::new("isMongoId", ViolationKind::InvalidType, |value, _| match value {
            None => Ok(()),
            Some(Value::String(s)) if ObjectId::is_valid(s) => Ok(()),
            Some(_) => Err("must be a 24-character hexadecimal identifier".to_string()),
        })
        .halting()
    }

    /// Membership in a closed set of string values.
    pub fn is_enum<T: 'static>(allowed: Vec<&'static str>) -> Rule<T> {
        Rule::new("isEnum", ViolationKind::InvalidEnumValue, move |value, _| {
            match value {
                None => Ok(()),
                Some(Value::String(s)) if allowed.contains(&s.as_str()) => Ok(()),
                Some(_) => Err(format!(
                    "must be one of the following values: {}",
                    allowed.join(", ")
                )),
            }
        })
        .halting()
    }

    /// Number or numeric string holding a non-negative integer.
    pub fn non_negative_integer<T: 'static>() -> Rule<T> {
        Rule::new("isNumeric", ViolationKind::InvalidType, |value, _| match value {
            None => Ok(()),
            Some(v) if as_non_negative_integer(v).is_some() => Ok(()),
            Some(_) => Err("must be a non-negative integer".to_string()),
        })
        .halting()
    }

    /// Array of exactly three finite numbers (an RGB triple or a vector).
    pub fn triple<T: 'static>() -> Rule<T> {
        Rule::new("isTriple", ViolationKind::InvalidType, |value, _| match value {
            None => Ok(()),
            Some(Value::Array(items))
                if items.len() == 3
                    && items
                        .iter()
                        .all(|v| v.as_f64().is_some_and(f64::is_finite)) =>
            {
                Ok(())
            }
            Some(_) => Err("must be an array of exactly 3 finite numbers".to_string()),
        })
        .halting()
    }

    pub fn array_max_size<T: 'static>(max: usize) -> Rule<T> {
        Rule::new("arrayMaxSize", ViolationKind::ArrayTooLarge, move |value, _| {
            match value {
                Some(Value::Array(items)) if items.len() > max => Err(format!(
                    "must contain no more than {} elements, got {}",
                    max,
                    items.len()
                )),
                _ => Ok(()),
            }
        })
    }

    /// No two tags equal: plain tags by string equality, third-party tags by
    /// their natural key.
    pub fn unique_tags<T: 'static>() -> Rule<T> {
        Rule::new("isUniqueTags", ViolationKind::DuplicateElement, |value, _| {
            let Some(Value::Array(items)) = value else {
                return Ok(());
            };
            let mut seen = HashSet::with_capacity(items.len());
            for key in items.iter().filter_map(tag_key) {
                if let Some(duplicate) = seen.replace(key) {
                    return Err(format!("must not contain duplicates ({})", duplicate));
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Sample {
        name: Option<Value>,
        items: Option<Value>,
        kind: Option<Value>,
    }

    fn sample_validator() -> Validator<Sample> {
        Validator::new()
            .field(
                FieldRules::new("name", |p: &Sample| p.name.as_ref())
                    .rule(rules::required())
                    .rule(rules::string()),
            )
            .field(
                FieldRules::new("items", |p: &Sample| p.items.as_ref())
                    .optional()
                    .rule(rules::array())
                    .rule(rules::array_max_size(2))
                    .rule(rules::unique_tags()),
            )
            .field(
                FieldRules::new("kind", |p: &Sample| p.kind.as_ref())
                    .validate_if(|p| p.items.is_some())
                    .rule(rules::required_when_present("items"))
                    .rule(rules::is_enum(vec!["A", "B"])),
            )
    }

    #[test]
    fn test_valid_input_has_no_violations() {
        let sample = Sample {
            name: Some(json!("ok")),
            items: Some(json!(["x"])),
            kind: Some(json!("A")),
        };
        assert!(sample_validator().check(&sample).is_ok());
    }

    #[test]
    fn test_required_halts_field() {
        let violations = sample_validator().validate(&Sample::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
        assert_eq!(violations[0].kind, ViolationKind::MissingField);
        assert_eq!(violations[0].message, "name should not be empty");
    }

    #[test]
    fn test_blank_string_is_missing() {
        let sample = Sample {
            name: Some(json!("   ")),
            ..Default::default()
        };
        let violations = sample_validator().validate(&sample);
        assert_eq!(violations[0].kind, ViolationKind::MissingField);
    }

    #[test]
    fn test_non_halting_rules_accumulate() {
        let sample = Sample {
            name: Some(json!("ok")),
            items: Some(json!(["x", "y", "x"])),
            kind: Some(json!("B")),
        };
        let kinds: Vec<_> = sample_validator()
            .validate(&sample)
            .into_iter()
            .map(|v| v.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![ViolationKind::ArrayTooLarge, ViolationKind::DuplicateElement]
        );
    }

    #[test]
    fn test_gate_skips_field() {
        let sample = Sample {
            name: Some(json!("ok")),
            kind: Some(json!("not-an-enum-member")),
            ..Default::default()
        };
        assert!(sample_validator().validate(&sample).is_empty());
    }

    #[test]
    fn test_gate_enables_conditional_requirement() {
        let sample = Sample {
            name: Some(json!("ok")),
            items: Some(json!(["x"])),
            ..Default::default()
        };
        let violations = sample_validator().validate(&sample);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "kind");
        assert_eq!(
            violations[0].kind,
            ViolationKind::ConditionallyRequiredFieldMissing
        );
    }

    #[test]
    fn test_enum_violation_names_allowed_set() {
        let sample = Sample {
            name: Some(json!("ok")),
            items: Some(json!(["x"])),
            kind: Some(json!("C")),
        };
        let violations = sample_validator().validate(&sample);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "isEnum");
        assert!(violations[0].message.contains("A, B"));
    }

    #[test]
    fn test_violations_follow_declaration_order() {
        let sample = Sample {
            name: Some(json!(7)),
            items: Some(json!("not-an-array")),
            kind: None,
        };
        let fields: Vec<_> = sample_validator()
            .validate(&sample)
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(fields, vec!["name", "items", "kind"]);
    }

    #[test]
    fn test_numeric_strings_count_as_integers() {
        assert_eq!(as_non_negative_integer(&json!("12")), Some(12));
        assert_eq!(as_non_negative_integer(&json!(3)), Some(3));
        assert_eq!(as_non_negative_integer(&json!(-1)), None);
        assert_eq!(as_non_negative_integer(&json!("1.5")), None);
        assert_eq!(as_non_negative_integer(&json!(true)), None);
    }

    #[test]
    fn test_violation_serializes_field_rule_message() {
        let violation = Violation::new(
            "tags",
            "arrayMaxSize",
            ViolationKind::ArrayTooLarge,
            "tags must contain no more than 15 elements, got 16",
        );
        let json = serde_json::to_value(&violation).expect("serialize");
        assert_eq!(json["field"], "tags");
        assert_eq!(json["rule"], "arrayMaxSize");
        assert_eq!(json["kind"], "ArrayTooLarge");
    }
}
