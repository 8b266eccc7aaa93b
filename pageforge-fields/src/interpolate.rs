//! Embedded-field interpolation: `[[dot.path]]` tokens inside constants.
//!
//! Tokens are resolved entity-sourced against the document, recursively;
//! a resolved value may itself contain tokens. Unresolved tokens become the
//! empty string; object and array results are JSON-stringified. The walk
//! rewrites string leaves only and special-cases locale maps: with the
//! requested locale present, just that locale's value is token-resolved in
//! place and sibling locales are preserved; with it absent, the whole value
//! collapses to the empty string.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use crate::resolver::DocumentContext;
use crate::translatable::{is_locale_map, localized};

/// The embedded-field token: `[[` body `]]` with a non-empty, bracket-free
/// body. Single brackets never match.
static EMBEDDED_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").expect("embedded field pattern is valid"));

/// Cut-off for self-referential documents; tokens past this depth resolve
/// to the empty string.
const MAX_DEPTH: usize = 16;

impl DocumentContext<'_> {
    /// Apply embedded-field interpolation to a value.
    pub fn interpolate(&self, value: &Value) -> Value {
        self.interpolate_at(value, 0)
    }

    fn interpolate_at(&self, value: &Value, depth: usize) -> Value {
        match value {
            Value::String(s) => Value::String(self.interpolate_str(s, depth)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.interpolate_at(item, depth))
                    .collect(),
            ),
            Value::Object(map) => {
                if is_locale_map(value) {
                    return self.interpolate_locale_map(value, map, depth);
                }
                Value::Object(
                    map.iter()
                        .map(|(key, item)| (key.clone(), self.interpolate_at(item, depth)))
                        .collect(),
                )
            }
            // Numbers, booleans, null: never rewritten.
            other => other.clone(),
        }
    }

    fn interpolate_locale_map(
        &self,
        original: &Value,
        map: &Map<String, Value>,
        depth: usize,
    ) -> Value {
        match localized(original, self.locale) {
            Some(selected) => {
                let mut out = map.clone();
                out.insert(self.locale.to_string(), self.interpolate_at(selected, depth));
                Value::Object(out)
            }
            // Missing translation: the whole value fails closed.
            None => Value::String(String::new()),
        }
    }

    fn interpolate_str(&self, input: &str, depth: usize) -> String {
        if !input.contains("[[") {
            return input.to_string();
        }
        EMBEDDED_FIELD
            .replace_all(input, |caps: &regex::Captures<'_>| {
                self.resolve_token(&caps[1], depth)
            })
            .into_owned()
    }

    fn resolve_token(&self, path: &str, depth: usize) -> String {
        if depth >= MAX_DEPTH {
            warn!(field = %path, "embedded field recursion limit reached");
            return String::new();
        }
        let Some(resolved) = self.resolve_path(path) else {
            return String::new();
        };
        let selected = if is_locale_map(&resolved) {
            match localized(&resolved, self.locale) {
                Some(value) => value.clone(),
                None => return String::new(),
            }
        } else {
            resolved
        };
        render(&self.interpolate_at(&selected, depth + 1))
    }
}

/// Display form of a resolved token value.
fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        composite => serde_json::to_string(composite).unwrap_or_default(),
    }
}
