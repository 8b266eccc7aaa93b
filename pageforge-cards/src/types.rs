//! Card and collection wrapper types.
//!
//! `CardInstance` is one rendered element of a collection; its nested slot
//! instances use the shared page-tree `Instance` shape so they serialize
//! exactly like any other component. `parentData` is only present on
//! entity-sourced cards and carries the resolved item payload for the
//! card's position; at render time it supersedes the card's own stored
//! bindings. `conditionalRender` is derived, never authored.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pageforge_fields::EntityField;
use pageforge_layout::{generate_id, slot_instance_id, ComponentRegistry, Instance};

/// Stable identity of a card within one collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Mint a fresh id for a card of the given component type.
    pub fn generate(card_type: &str) -> Self {
        Self(generate_id(card_type))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The entity-sourced payload backing one card position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentData {
    /// The collection's field path.
    pub field: String,
    /// The resolved item at this card's position.
    pub item: Value,
}

/// One rendered element of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInstance {
    pub id: CardId,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub styles: Map<String, Value>,
    #[serde(default)]
    pub slots: IndexMap<String, Vec<Instance>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_data: Option<ParentData>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub conditional_render: IndexMap<String, bool>,
}

impl CardInstance {
    /// Rewrite this card's id and every nested slot instance id to match.
    pub fn rewrite_id(&mut self, new_id: CardId) {
        for (slot_name, instances) in &mut self.slots {
            for inst in instances {
                inst.set_id(slot_instance_id(new_id.as_str(), slot_name));
            }
        }
        self.id = new_id;
    }
}

/// A collection component: the ordered cards plus the field describing
/// their source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardsWrapper {
    pub collection: EntityField<Value>,
    #[serde(default)]
    pub cards: Vec<CardInstance>,
}

impl CardsWrapper {
    /// A wrapper bound to a live entity list.
    pub fn entity_sourced(path: impl Into<String>) -> Self {
        Self {
            collection: EntityField::entity(path),
            cards: Vec::new(),
        }
    }

    /// A wrapper whose card list is authored directly.
    pub fn constant_sourced(refs: Vec<Option<CardId>>) -> Self {
        let items: Vec<Value> = refs
            .into_iter()
            .map(|id| match id {
                Some(id) => serde_json::json!({ "id": id }),
                None => serde_json::json!({}),
            })
            .collect();
        Self {
            collection: EntityField::constant(Value::Array(items)),
            cards: Vec::new(),
        }
    }

    /// Find a card by id.
    pub fn card(&self, id: &CardId) -> Option<&CardInstance> {
        self.cards.iter().find(|card| &card.id == id)
    }

    /// The authored `{id}` backreferences in the constant branch, in
    /// order. Entries without a usable string id come back as `None`;
    /// full item structs left over from authoring parse the same way.
    pub fn constant_refs(&self) -> Vec<Option<CardId>> {
        match &self.collection.constant_value {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.get("id")
                        .and_then(Value::as_str)
                        .map(CardId::from)
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Factory describing what a freshly created card looks like.
#[derive(Debug, Clone)]
pub struct CardTemplate {
    pub card_type: String,
    /// `(slot name, component type)` pairs, in display order.
    pub slot_types: Vec<(String, String)>,
    pub styles: Map<String, Value>,
}

impl CardTemplate {
    pub fn new(card_type: impl Into<String>) -> Self {
        Self {
            card_type: card_type.into(),
            slot_types: Vec::new(),
            styles: Map::new(),
        }
    }

    /// Declare a slot, builder style.
    pub fn with_slot(mut self, slot_name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.slot_types.push((slot_name.into(), type_name.into()));
        self
    }

    /// Default top-level card styles.
    pub fn with_styles(mut self, styles: Map<String, Value>) -> Self {
        self.styles = styles;
        self
    }

    /// Build a default card at the given position: fresh id, one default
    /// instance per declared slot, slot ids derived from the card id.
    pub fn instantiate(&self, registry: &ComponentRegistry, index: usize) -> CardInstance {
        let id = CardId::generate(&self.card_type);
        let mut slots = IndexMap::new();
        for (slot_name, type_name) in &self.slot_types {
            let mut inst = registry.default_instance(type_name);
            inst.set_id(slot_instance_id(id.as_str(), slot_name));
            slots.insert(slot_name.clone(), vec![inst]);
        }
        CardInstance {
            id,
            index,
            styles: self.styles.clone(),
            slots,
            parent_data: None,
            conditional_render: IndexMap::new(),
        }
    }
}
