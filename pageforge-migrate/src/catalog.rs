//! The shipped migration catalog for the built-in component set.
//!
//! History, oldest first:
//! - v1: `PromoBlock` was renamed to `PromoSection`.
//! - v2: `PromoSection` moved from flat `heroTitle`/`heroImage` strings to
//!   entity field props, so authors can re-bind them to document fields.
//! - v3: `EventCardsWrapper` cards gained nested title/image slot
//!   instances; cards saved before that get defaults seeded.
//! - v4: `LegacyBanner` was retired and its instances are dropped.

use serde_json::{json, Map, Value};

use pageforge_cards::CardsWrapper;
use pageforge_fields::EntityField;
use pageforge_layout::{slot_instance_id, ComponentRegistry};

use crate::error::Result;
use crate::registry::MigrationRegistry;

/// Build the pipeline for the built-in component set.
///
/// The component registry supplies default props for the slot instances
/// the v3 migration introduces.
pub fn builtin_migrations(components: &ComponentRegistry) -> Result<MigrationRegistry> {
    let components = components.clone();
    MigrationRegistry::builder()
        .renamed(1, "PromoBlock", "PromoSection")
        .updated(2, "PromoSection", promo_to_entity_fields)
        .updated(3, "EventCardsWrapper", move |props, doc| {
            seed_card_slots(&components, props, doc)
        })
        .removed(4, "LegacyBanner")
        .build()
}

/// v2: flat hero strings become constant entity fields. Absent legacy
/// values fall back to the document's business name / empty image rather
/// than failing.
fn promo_to_entity_fields(
    mut props: Map<String, Value>,
    document: &Value,
) -> Result<Map<String, Value>> {
    let title = props
        .remove("heroTitle")
        .and_then(|v| v.as_str().map(str::to_string))
        .or_else(|| {
            document
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_default();
    let image_url = props
        .remove("heroImage")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    props.insert(
        "title".into(),
        serde_json::to_value(EntityField::constant(title))?,
    );
    props.insert(
        "image".into(),
        serde_json::to_value(EntityField::constant(json!({ "url": image_url })))?,
    );
    Ok(props)
}

/// v3: cards that predate nested slots get one default title and image
/// slot instance each, ids derived from the card id. Props that don't
/// parse as a wrapper pass through untouched for a later attempt.
fn seed_card_slots(
    components: &ComponentRegistry,
    mut props: Map<String, Value>,
    _document: &Value,
) -> Result<Map<String, Value>> {
    let Ok(mut wrapper) = serde_json::from_value::<CardsWrapper>(Value::Object(props.clone()))
    else {
        return Ok(props);
    };

    for card in &mut wrapper.cards {
        if !card.slots.is_empty() {
            continue;
        }
        for (slot_name, type_name) in [("title", "TitleSlot"), ("image", "ImageSlot")] {
            let mut inst = components.default_instance(type_name);
            inst.set_id(slot_instance_id(card.id.as_str(), slot_name));
            card.slots.insert(slot_name.to_string(), vec![inst]);
        }
    }

    props.insert("collection".into(), serde_json::to_value(&wrapper.collection)?);
    props.insert("cards".into(), serde_json::to_value(&wrapper.cards)?);
    Ok(props)
}
