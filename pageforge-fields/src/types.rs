//! The entity field reference type.
//!
//! Serializes to the camelCase wire form stored inside component props:
//!
//! ```json
//! { "field": "promo.title", "constantValue": "", "constantValueEnabled": false }
//! ```
//!
//! When `constantValueEnabled` is true the constant is authoritative and
//! `field` is ignored; when false and `field` is empty the constant acts as
//! a plain fallback. For struct-typed fields, `constantValueOverride` marks
//! which properties take the constant while the rest stay entity-sourced.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FieldsError, Result};

/// A reference to entity data or an author-supplied constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityField<T = Value> {
    /// Dot-separated path into the content document; empty when unbound.
    pub field: String,
    pub constant_value: T,
    pub constant_value_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_value_override: Option<IndexMap<String, bool>>,
}

impl EntityField<Value> {
    /// A reference pinned to a constant value.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self {
            field: String::new(),
            constant_value: value.into(),
            constant_value_enabled: true,
            constant_value_override: None,
        }
    }

    /// A reference bound to an entity field path.
    pub fn entity(path: impl Into<String>) -> Self {
        Self {
            field: path.into(),
            constant_value: Value::Null,
            constant_value_enabled: false,
            constant_value_override: None,
        }
    }

    /// Attach a constant without enabling it (fallback / override source).
    pub fn with_constant(mut self, value: impl Into<Value>) -> Self {
        self.constant_value = value.into();
        self
    }

    /// Mark one property as taking the constant during struct resolution.
    pub fn with_override(mut self, key: impl Into<String>, enabled: bool) -> Self {
        self.constant_value_override
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), enabled);
        self
    }

    /// Parse a raw props value into a reference.
    ///
    /// The `field` and `constantValue` keys are required; a value missing
    /// either is a malformed reference. Everything else is tolerated:
    /// unknown keys are dropped, a missing override map defaults to none.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let Some(obj) = raw.as_object() else {
            return Err(FieldsError::MalformedReference { missing: "field" });
        };
        if !obj.contains_key("field") {
            return Err(FieldsError::MalformedReference { missing: "field" });
        }
        if !obj.contains_key("constantValue") {
            return Err(FieldsError::MalformedReference {
                missing: "constantValue",
            });
        }
        Ok(serde_json::from_value(raw.clone())?)
    }

    /// Whether any property has a truthy override entry.
    pub fn has_overrides(&self) -> bool {
        self.constant_value_override
            .as_ref()
            .is_some_and(|map| map.values().any(|on| *on))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constant_builder() {
        let field = EntityField::constant("Hello");
        assert!(field.constant_value_enabled);
        assert_eq!(field.field, "");
        assert_eq!(field.constant_value, json!("Hello"));
    }

    #[test]
    fn entity_builder() {
        let field = EntityField::entity("promo.title");
        assert!(!field.constant_value_enabled);
        assert_eq!(field.field, "promo.title");
        assert_eq!(field.constant_value, Value::Null);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let field = EntityField::entity("name").with_constant("fallback");
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(
            value,
            json!({
                "field": "name",
                "constantValue": "fallback",
                "constantValueEnabled": false
            })
        );
    }

    #[test]
    fn override_map_round_trips() {
        let field = EntityField::constant(json!({ "title": "C" }))
            .with_override("title", true)
            .with_override("description", false);
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(
            value["constantValueOverride"],
            json!({ "title": true, "description": false })
        );
        let parsed = EntityField::from_value(&value).unwrap();
        assert_eq!(parsed, field);
        assert!(parsed.has_overrides());
    }

    #[test]
    fn from_value_rejects_missing_keys() {
        assert!(matches!(
            EntityField::from_value(&json!({ "constantValue": "x" })),
            Err(FieldsError::MalformedReference { missing: "field" })
        ));
        assert!(matches!(
            EntityField::from_value(&json!({ "field": "x" })),
            Err(FieldsError::MalformedReference {
                missing: "constantValue"
            })
        ));
        assert!(EntityField::from_value(&json!("not an object")).is_err());
    }

    #[test]
    fn from_value_tolerates_unknown_keys() {
        let parsed = EntityField::from_value(&json!({
            "field": "a.b",
            "constantValue": null,
            "constantValueEnabled": false,
            "somethingElse": 42
        }))
        .unwrap();
        assert_eq!(parsed.field, "a.b");
    }

    #[test]
    fn has_overrides_requires_a_truthy_entry() {
        let field = EntityField::constant(json!({})).with_override("title", false);
        assert!(!field.has_overrides());
    }
}
