//! Per-slot visibility: does this sub-element have anything to show?
//!
//! A slot renders when its resolved value carries content and the
//! ancestor's show/hide toggle allows it. Entity-sourced cards resolve
//! slot bindings against the card's `parentData` item; constant-sourced
//! cards resolve each slot's own entity field. During interactive editing
//! an always-show override bypasses the data-presence check so authors can
//! see and fill empty slots, but never the ancestor toggle.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use pageforge_fields::{is_locale_map, localized, DocumentContext};
use pageforge_layout::Instance;

use crate::types::CardInstance;

/// Whether resolution happens in an interactive editing session or on a
/// live page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    Editing,
    Live,
}

/// Compute the render flag for every slot a card carries.
///
/// `parent_styles` is the owning wrapper's style map; a `show{Slot}` key
/// set to `false` hides that slot on every card regardless of data.
pub fn compute_visibility(
    card: &CardInstance,
    parent_styles: &Map<String, Value>,
    ctx: &DocumentContext<'_>,
    mode: ResolveMode,
) -> IndexMap<String, bool> {
    let mut flags = IndexMap::with_capacity(card.slots.len());
    for (slot_name, instances) in &card.slots {
        let toggle = parent_styles
            .get(&toggle_key(slot_name))
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let visible = toggle
            && (mode == ResolveMode::Editing || slot_has_content(card, instances, ctx));
        flags.insert(slot_name.clone(), visible);
    }
    flags
}

fn slot_has_content(
    card: &CardInstance,
    instances: &[Instance],
    ctx: &DocumentContext<'_>,
) -> bool {
    instances
        .iter()
        .any(|inst| instance_has_content(card, inst, ctx))
}

fn instance_has_content(
    card: &CardInstance,
    inst: &Instance,
    ctx: &DocumentContext<'_>,
) -> bool {
    // An entity-sourced card's item payload supersedes the slot's own
    // stored binding.
    if let Some(parent) = &card.parent_data {
        if let Some(item_path) = inst.props.get("itemPath").and_then(Value::as_str) {
            let item_ctx = DocumentContext::new(&parent.item, ctx.locale);
            return item_ctx
                .resolve_path(item_path)
                .is_some_and(|value| is_renderable(&value, ctx.locale));
        }
    }
    match inst.props.get("data") {
        Some(raw) => ctx
            .resolve_raw(raw)
            .is_some_and(|value| is_renderable(&value, ctx.locale)),
        None => false,
    }
}

/// Whether a resolved value has content worth rendering.
///
/// Empty strings, nulls, missing translations, url-less images, and
/// label-less links all count as empty.
pub fn is_renderable(value: &Value, locale: &str) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(_) | Value::Bool(_) => true,
        Value::Array(items) => items.iter().any(|item| is_renderable(item, locale)),
        Value::Object(map) => {
            if is_locale_map(value) {
                return match localized(value, locale) {
                    Some(selected) => is_renderable(selected, locale),
                    None => false,
                };
            }
            if let Some(url) = map.get("url") {
                return is_renderable(url, locale);
            }
            if let Some(label) = map.get("label") {
                return is_renderable(label, locale);
            }
            map.values().any(|member| is_renderable(member, locale))
        }
    }
}

fn toggle_key(slot_name: &str) -> String {
    let mut chars = slot_name.chars();
    match chars.next() {
        Some(first) => format!("show{}{}", first.to_uppercase(), chars.as_str()),
        None => "show".to_string(),
    }
}
