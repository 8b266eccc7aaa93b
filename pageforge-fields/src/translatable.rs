//! Translatable values: locale maps that fail closed.
//!
//! A value is a locale map when it is an object carrying
//! `hasLocalizedValue: "true"` alongside per-locale entries. Missing
//! translations deliberately resolve to nothing rather than falling back to
//! another locale; an untranslated page must not leak a different
//! language's text.

use serde_json::Value;

/// Marker key identifying a locale map.
pub const LOCALIZED_MARKER: &str = "hasLocalizedValue";

/// Whether a value is a locale map.
pub fn is_locale_map(value: &Value) -> bool {
    value
        .get(LOCALIZED_MARKER)
        .and_then(Value::as_str)
        .is_some_and(|marker| marker == "true")
}

/// Select the requested locale from a value.
///
/// Non-locale-map values pass through unchanged. A locale map missing the
/// requested key yields `None`; this is a normal authoring state, so no
/// warning is logged.
pub fn localized<'a>(value: &'a Value, locale: &str) -> Option<&'a Value> {
    if !is_locale_map(value) {
        return Some(value);
    }
    value.get(locale)
}

/// Collapse a value to its locale-selected form, cloning.
///
/// Locale maps missing the requested locale collapse to the empty string.
pub fn collapse_localized(value: &Value, locale: &str) -> Value {
    match localized(value, locale) {
        Some(v) => v.clone(),
        None => Value::String(String::new()),
    }
}
