//! Declarative option schemas.
//!
//! Every operation publishes an [`OptionsSchema`]: for each option, the JSON types it
//! accepts and either a default or "required". The manager composes that schema with the
//! reserved options it owns ([`with_reserved`](OptionsSchema::with_reserved)) and resolves
//! the caller's raw mapping against the result:
//!
//! | Option | Types | Default | Meaning |
//! |---|---|---|---|
//! | `iteration_index` | int | 0 | position of the record in pre-pass order, set per record |
//! | `from_id` | null, int | null | skip records whose current token id is below this |
//! | `to_id` | null, int | null | skip records whose current token id is above this |
//!
//! Resolution rejects unknown options, missing required options and values of a type
//! the option does not allow. Defaults are type-checked like caller values, so an option
//! declared `string` with no default must be supplied.

use crate::error::ValidationError;
use crate::naming::TokenId;
use serde_json::{Map, Value};
use std::fmt;

/// Option mapping as supplied by the caller.
pub type RawOptions = Map<String, Value>;

pub const ITERATION_INDEX: &str = "iteration_index";
pub const FROM_ID: &str = "from_id";
pub const TO_ID: &str = "to_id";

/// Options injected into every schema by the manager.
pub const RESERVED_OPTIONS: [&str; 3] = [ITERATION_INDEX, FROM_ID, TO_ID];

/// JSON shape an option value may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Null,
    Int,
    Bool,
    String,
    /// Array of strings.
    StringList,
    /// Object whose values are all strings.
    StringMap,
}

impl OptionType {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            OptionType::Null => value.is_null(),
            OptionType::Int => value.as_i64().is_some(),
            OptionType::Bool => value.is_boolean(),
            OptionType::String => value.is_string(),
            OptionType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            OptionType::StringMap => value
                .as_object()
                .is_some_and(|map| map.values().all(Value::is_string)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OptionType::Null => "null",
            OptionType::Int => "int",
            OptionType::Bool => "bool",
            OptionType::String => "string",
            OptionType::StringList => "string[]",
            OptionType::StringMap => "map<string, string>",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Human-readable type of an arbitrary JSON value, for error messages.
fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_types(types: &[OptionType]) -> String {
    types.iter().map(|t| t.name()).collect::<Vec<_>>().join(" | ")
}

/// Declaration of a single option.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    /// `None` means the caller must supply the option.
    pub default: Option<Value>,
    pub allowed: Vec<OptionType>,
    pub description: &'static str,
}

impl OptionSpec {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn allowed_types(&self) -> String {
        join_types(&self.allowed)
    }
}

/// Ordered set of option declarations for one operation.
#[derive(Debug, Clone, Default)]
pub struct OptionsSchema {
    specs: Vec<(&'static str, OptionSpec)>,
}

impl OptionsSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option the caller must supply.
    pub fn required(
        mut self,
        name: &'static str,
        allowed: &[OptionType],
        description: &'static str,
    ) -> Self {
        self.specs.push((
            name,
            OptionSpec {
                default: None,
                allowed: allowed.to_vec(),
                description,
            },
        ));
        self
    }

    /// Declare an option with a default value.
    pub fn optional(
        mut self,
        name: &'static str,
        default: Value,
        allowed: &[OptionType],
        description: &'static str,
    ) -> Self {
        self.specs.push((
            name,
            OptionSpec {
                default: Some(default),
                allowed: allowed.to_vec(),
                description,
            },
        ));
        self
    }

    pub fn options(&self) -> impl Iterator<Item = (&'static str, &OptionSpec)> {
        self.specs.iter().map(|(name, spec)| (*name, spec))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.iter().any(|(n, _)| *n == name)
    }

    /// Extend this schema with the reserved options.
    ///
    /// Fails if the operation already declares one of them.
    pub fn with_reserved(self) -> Result<Self, ValidationError> {
        if let Some(name) = RESERVED_OPTIONS.into_iter().find(|r| self.contains(r)) {
            return Err(ValidationError::ReservedOption(name));
        }
        Ok(self
            .optional(
                ITERATION_INDEX,
                Value::from(0),
                &[OptionType::Int],
                "Position of the record in the processing order (set per record)",
            )
            .optional(
                FROM_ID,
                Value::Null,
                &[OptionType::Null, OptionType::Int],
                "Skip records whose token id is lower than this",
            )
            .optional(
                TO_ID,
                Value::Null,
                &[OptionType::Null, OptionType::Int],
                "Skip records whose token id is greater than this",
            ))
    }

    /// Merge `raw` over the declared defaults and type-check the result.
    pub fn resolve(
        &self,
        operation: &str,
        raw: &RawOptions,
    ) -> Result<ResolvedOptions, ValidationError> {
        if let Some(unknown) = raw.keys().find(|k| !self.contains(k)) {
            return Err(ValidationError::UnknownOption {
                operation: operation.to_string(),
                name: unknown.clone(),
            });
        }

        let mut values = Map::new();
        for (name, spec) in &self.specs {
            let value = match raw.get(*name).or(spec.default.as_ref()) {
                Some(v) => v.clone(),
                None => {
                    return Err(ValidationError::MissingOption {
                        operation: operation.to_string(),
                        name: name.to_string(),
                    });
                }
            };
            if !spec.allowed.iter().any(|t| t.matches(&value)) {
                return Err(ValidationError::InvalidOptionType {
                    name: name.to_string(),
                    expected: spec.allowed_types(),
                    found: describe(&value).to_string(),
                });
            }
            values.insert(name.to_string(), value);
        }

        Ok(ResolvedOptions { values })
    }
}

/// Inclusive token id window from `from_id`/`to_id`; an unset bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl IdRange {
    pub fn contains(&self, token_id: TokenId) -> bool {
        let id = i128::from(token_id);
        let above_from = self.from.is_none_or(|from| id >= i128::from(from));
        let below_to = self.to.is_none_or(|to| id <= i128::from(to));
        above_from && below_to
    }
}

/// Options after defaults, reserved options and type checks have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    values: Map<String, Value>,
}

impl ResolvedOptions {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn mistyped(&self, name: &str, expected: OptionType) -> ValidationError {
        ValidationError::InvalidOptionType {
            name: name.to_string(),
            expected: expected.name().to_string(),
            found: self
                .values
                .get(name)
                .map(describe)
                .unwrap_or("undefined")
                .to_string(),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, ValidationError> {
        self.get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.mistyped(name, OptionType::Int))
    }

    pub fn opt_int(&self, name: &str) -> Result<Option<i64>, ValidationError> {
        match self.get(name) {
            Some(Value::Null) => Ok(None),
            _ => self.int(name).map(Some),
        }
    }

    pub fn string(&self, name: &str) -> Result<&str, ValidationError> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| self.mistyped(name, OptionType::String))
    }

    pub fn opt_string(&self, name: &str) -> Result<Option<&str>, ValidationError> {
        match self.get(name) {
            Some(Value::Null) => Ok(None),
            _ => self.string(name).map(Some),
        }
    }

    /// String list; `null` reads as empty.
    pub fn string_list(&self, name: &str) -> Result<Vec<&str>, ValidationError> {
        match self.get(name) {
            Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().ok_or_else(|| self.mistyped(name, OptionType::StringList)))
                .collect(),
            _ => Err(self.mistyped(name, OptionType::StringList)),
        }
    }

    /// String map in declaration order; `null` reads as empty.
    pub fn string_map(&self, name: &str) -> Result<Vec<(&str, &str)>, ValidationError> {
        match self.get(name) {
            Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| {
                    v.as_str()
                        .map(|v| (k.as_str(), v))
                        .ok_or_else(|| self.mistyped(name, OptionType::StringMap))
                })
                .collect(),
            _ => Err(self.mistyped(name, OptionType::StringMap)),
        }
    }

    pub fn iteration_index(&self) -> usize {
        self.get(ITERATION_INDEX)
            .and_then(Value::as_u64)
            .and_then(|i| usize::try_from(i).ok())
            .unwrap_or(0)
    }

    pub(crate) fn set_iteration_index(&mut self, index: usize) {
        self.values
            .insert(ITERATION_INDEX.to_string(), Value::from(index));
    }

    pub fn range(&self) -> Result<IdRange, ValidationError> {
        Ok(IdRange {
            from: self.opt_int(FROM_ID)?,
            to: self.opt_int(TO_ID)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawOptions {
        match value {
            Value::Object(map) => map,
            _ => panic!("raw options must be an object"),
        }
    }

    fn schema() -> OptionsSchema {
        OptionsSchema::new()
            .required("start_from_id", &[OptionType::Int], "start")
            .optional(
                "label",
                Value::Null,
                &[OptionType::Null, OptionType::String],
                "label",
            )
            .optional(
                "remove",
                json!([]),
                &[OptionType::Null, OptionType::StringList],
                "remove",
            )
    }

    // =========================================================================
    // Schema composition
    // =========================================================================

    #[test]
    fn reserved_options_are_appended() {
        let composed = schema().with_reserved().unwrap();
        for name in RESERVED_OPTIONS {
            assert!(composed.contains(name));
        }
    }

    #[test]
    fn redeclaring_reserved_option_is_error() {
        for name in RESERVED_OPTIONS {
            let s = OptionsSchema::new().optional(name, Value::Null, &[OptionType::Null], "x");
            assert!(matches!(
                s.with_reserved(),
                Err(ValidationError::ReservedOption(n)) if n == name
            ));
        }
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    #[test]
    fn defaults_fill_unset_options() {
        let resolved = schema()
            .with_reserved()
            .unwrap()
            .resolve("renumber", &raw(json!({"start_from_id": 5})))
            .unwrap();

        assert_eq!(resolved.int("start_from_id").unwrap(), 5);
        assert_eq!(resolved.opt_string("label").unwrap(), None);
        assert!(resolved.string_list("remove").unwrap().is_empty());
        assert_eq!(resolved.iteration_index(), 0);
        assert_eq!(resolved.range().unwrap(), IdRange::default());
    }

    #[test]
    fn missing_required_option_is_error() {
        let result = schema().resolve("renumber", &RawOptions::new());
        assert!(matches!(
            result,
            Err(ValidationError::MissingOption { name, .. }) if name == "start_from_id"
        ));
    }

    #[test]
    fn unknown_option_is_error() {
        let result = schema().resolve(
            "renumber",
            &raw(json!({"start_from_id": 1, "strat_from_id": 2})),
        );
        assert!(matches!(
            result,
            Err(ValidationError::UnknownOption { name, .. }) if name == "strat_from_id"
        ));
    }

    #[test]
    fn wrong_type_is_error() {
        let result = schema().resolve("renumber", &raw(json!({"start_from_id": "10"})));
        match result {
            Err(ValidationError::InvalidOptionType {
                name,
                expected,
                found,
            }) => {
                assert_eq!(name, "start_from_id");
                assert_eq!(expected, "int");
                assert_eq!(found, "string");
            }
            other => panic!("expected type error, got {other:?}"),
        }
    }

    #[test]
    fn float_is_not_int() {
        let result = schema().resolve("renumber", &raw(json!({"start_from_id": 1.5})));
        assert!(matches!(
            result,
            Err(ValidationError::InvalidOptionType { found, .. }) if found == "float"
        ));
    }

    #[test]
    fn list_with_non_string_is_error() {
        let result = schema().resolve(
            "renumber",
            &raw(json!({"start_from_id": 1, "remove": ["Hat", 3]})),
        );
        assert!(matches!(result, Err(ValidationError::InvalidOptionType { .. })));
    }

    #[test]
    fn string_map_keeps_declaration_order() {
        let s = OptionsSchema::new().optional(
            "traits",
            json!({}),
            &[OptionType::StringMap],
            "traits",
        );
        let resolved = s
            .resolve("update", &raw(json!({"traits": {"Hat": "Cap", "Eyes": "Red"}})))
            .unwrap();
        assert_eq!(
            resolved.string_map("traits").unwrap(),
            vec![("Hat", "Cap"), ("Eyes", "Red")]
        );
    }

    #[test]
    fn range_bounds_come_from_reserved_options() {
        let resolved = OptionsSchema::new()
            .with_reserved()
            .unwrap()
            .resolve("noop", &raw(json!({"from_id": 2, "to_id": 4})))
            .unwrap();
        assert_eq!(
            resolved.range().unwrap(),
            IdRange {
                from: Some(2),
                to: Some(4)
            }
        );
    }

    #[test]
    fn iteration_index_is_overwritten_per_record() {
        let mut resolved = OptionsSchema::new()
            .with_reserved()
            .unwrap()
            .resolve("noop", &RawOptions::new())
            .unwrap();
        resolved.set_iteration_index(7);
        assert_eq!(resolved.iteration_index(), 7);
    }

    // =========================================================================
    // IdRange
    // =========================================================================

    #[test]
    fn open_range_contains_everything() {
        let range = IdRange::default();
        assert!(range.contains(0));
        assert!(range.contains(u64::MAX));
    }

    #[test]
    fn bounds_are_inclusive() {
        let range = IdRange {
            from: Some(3),
            to: Some(5),
        };
        let inside: Vec<u64> = (0..8).filter(|id| range.contains(*id)).collect();
        assert_eq!(inside, vec![3, 4, 5]);
    }

    #[test]
    fn negative_from_includes_zero() {
        let range = IdRange {
            from: Some(-1),
            to: None,
        };
        assert!(range.contains(0));
    }
}
