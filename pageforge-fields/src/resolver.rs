//! Field resolution against a content document snapshot.
//!
//! [`DocumentContext`] bundles the document and the active locale and is
//! passed explicitly wherever resolution happens; there is no ambient
//! document or locale state anywhere in the engine.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::types::EntityField;

/// A content document snapshot plus the locale to resolve against.
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    pub document: &'a Value,
    pub locale: &'a str,
}

impl<'a> DocumentContext<'a> {
    pub fn new(document: &'a Value, locale: &'a str) -> Self {
        Self { document, locale }
    }

    /// Resolve an entity field reference.
    ///
    /// - Constant enabled and present: the constant, with embedded-field
    ///   interpolation applied.
    /// - Empty path: the constant verbatim as a fallback, or `None`.
    /// - Otherwise: walk the document by the dot path. A missing segment
    ///   logs a warning and yields `None`; the constant is *not* used as a
    ///   substitute for a path miss.
    pub fn resolve(&self, field: &EntityField<Value>) -> Option<Value> {
        if field.constant_value_enabled {
            // The constant is authoritative; the path is ignored even when
            // the constant is absent.
            if field.constant_value.is_null() {
                return None;
            }
            return Some(self.interpolate(&field.constant_value));
        }
        if field.field.is_empty() {
            if field.constant_value.is_null() {
                return None;
            }
            return Some(field.constant_value.clone());
        }
        self.resolve_path(&field.field)
    }

    /// Resolve a raw props value as an entity field reference.
    ///
    /// Malformed references (missing `field`/`constantValue` keys) warn
    /// once and yield `None`.
    pub fn resolve_raw(&self, raw: &Value) -> Option<Value> {
        match EntityField::from_value(raw) {
            Ok(field) => self.resolve(&field),
            Err(e) => {
                warn!(error = %e, "skipping malformed entity field reference");
                None
            }
        }
    }

    /// Resolve and deserialize into a concrete type.
    pub fn resolve_as<T: DeserializeOwned>(&self, field: &EntityField<Value>) -> Option<T> {
        let value = self.resolve(field)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!(field = %field.field, error = %e, "resolved value has unexpected shape");
                None
            }
        }
    }

    /// Walk the document by a dot-separated path.
    ///
    /// Objects are stepped by key, arrays by numeric segment. The terminal
    /// value is returned as-is, untransformed. Any missing segment warns
    /// with the offending path and yields `None`; this is a frequent,
    /// expected state for optional entity fields.
    pub fn resolve_path(&self, path: &str) -> Option<Value> {
        let mut current = self.document;
        for segment in path.split('.') {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => {
                    warn!(field = %path, segment = %segment, "entity field path not present in document");
                    return None;
                }
            }
        }
        Some(current.clone())
    }

    /// Resolve a struct-typed field with per-property constant overrides.
    ///
    /// With the constant enabled this is ordinary resolution (the whole
    /// constant, interpolated). Otherwise the entity-sourced struct is the
    /// base; the constant is interpolated as a whole, and every property
    /// whose override entry is `true` takes the interpolated constant while
    /// the rest keep the entity-sourced value verbatim. A missing or
    /// non-object base merges into an empty struct.
    pub fn resolve_struct(&self, field: &EntityField<Value>) -> Option<Value> {
        if field.constant_value_enabled {
            return self.resolve(field);
        }

        let base = self.resolve(field);
        let mut merged = match base {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        if let Some(overrides) = &field.constant_value_override {
            let resolved_constant = self.interpolate(&field.constant_value);
            if let Value::Object(constant) = &resolved_constant {
                for (key, enabled) in overrides {
                    if !*enabled {
                        continue;
                    }
                    if let Some(value) = constant.get(key) {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        Some(Value::Object(merged))
    }
}
