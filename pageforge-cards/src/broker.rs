//! Shared card styling: one card's look propagates to its siblings.
//!
//! The broker is ephemeral, scoped to one collection's editing session, and
//! never serialized into the page tree. Cards publish their styling into it
//! when the author edits them and pull from it otherwise; both directions
//! compare deeply and do nothing on equality, which is the sole safeguard
//! against runaway reentrant update cycles in the cooperative scheduler.
//! Only visual style fields travel this way; a card's bound data is never
//! overwritten by a sibling.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CardsError, Result};
use crate::types::{CardId, CardInstance, CardsWrapper};

/// The styling every card in a collection shares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedCardStyle {
    #[serde(default)]
    pub card_styles: Map<String, Value>,
    /// Per-slot style maps, keyed by slot name.
    #[serde(default)]
    pub slot_styles: IndexMap<String, Map<String, Value>>,
}

impl SharedCardStyle {
    /// Extract a card's current styling: its top-level styles plus each
    /// slot's `styles` prop.
    pub fn of(card: &CardInstance) -> Self {
        let mut slot_styles = IndexMap::new();
        for (slot_name, instances) in &card.slots {
            let Some(inst) = instances.first() else {
                continue;
            };
            if let Some(Value::Object(styles)) = inst.props.get("styles") {
                slot_styles.insert(slot_name.clone(), styles.clone());
            }
        }
        Self {
            card_styles: card.styles.clone(),
            slot_styles,
        }
    }
}

/// Per-collection ephemeral style channel.
#[derive(Debug, Default)]
pub struct CardStyleBroker {
    state: Option<SharedCardStyle>,
}

impl CardStyleBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current shared styling, if any card has published yet.
    pub fn read(&self) -> Option<&SharedCardStyle> {
        self.state.as_ref()
    }

    /// Replace the shared styling wholesale.
    pub fn write(&mut self, next: SharedCardStyle) {
        self.state = Some(next);
    }

    /// Drop the session state.
    pub fn clear(&mut self) {
        self.state = None;
    }

    /// A card pushes its styling into the broker: it just became the
    /// source of truth. No-op (returns false) when the broker already
    /// holds equal styling.
    pub fn publish(&mut self, card: &CardInstance) -> bool {
        let view = SharedCardStyle::of(card);
        if self.state.as_ref() == Some(&view) {
            return false;
        }
        self.state = Some(view);
        true
    }

    /// Merge the broker's styling onto a card: top-level styles and each
    /// slot's `styles` prop take broker values key by key, leaving every
    /// non-style prop untouched. Returns whether the card changed; false
    /// means the card was already in sync and no re-render is owed.
    pub fn apply(&self, card: &mut CardInstance) -> bool {
        let Some(shared) = &self.state else {
            return false;
        };
        let mut changed = false;

        for (key, value) in &shared.card_styles {
            if card.styles.get(key) != Some(value) {
                card.styles.insert(key.clone(), value.clone());
                changed = true;
            }
        }

        for (slot_name, styles) in &shared.slot_styles {
            let Some(instances) = card.slots.get_mut(slot_name) else {
                continue;
            };
            for inst in instances {
                let entry = inst
                    .props
                    .entry("styles")
                    .or_insert_with(|| Value::Object(Map::new()));
                let Value::Object(slot_styles) = entry else {
                    continue;
                };
                for (key, value) in styles {
                    if slot_styles.get(key) != Some(value) {
                        slot_styles.insert(key.clone(), value.clone());
                        changed = true;
                    }
                }
            }
        }

        changed
    }
}

/// One collection's interactive editing session: the wrapper plus its
/// style channel. The broker lives and dies with the session; persisting
/// the wrapper afterwards carries the synchronized styles, not the broker.
#[derive(Debug)]
pub struct CollectionSession {
    wrapper: CardsWrapper,
    broker: CardStyleBroker,
}

impl CollectionSession {
    pub fn new(wrapper: CardsWrapper) -> Self {
        Self {
            wrapper,
            broker: CardStyleBroker::new(),
        }
    }

    pub fn wrapper(&self) -> &CardsWrapper {
        &self.wrapper
    }

    pub fn broker(&self) -> &CardStyleBroker {
        &self.broker
    }

    /// End the session, discarding the ephemeral broker state.
    pub fn into_wrapper(self) -> CardsWrapper {
        self.wrapper
    }

    /// Author edits one card's styling. The edited card becomes the source
    /// of truth; every sibling converges within this one synchronous call.
    /// Returns how many sibling cards changed.
    pub fn edit_card_styles(
        &mut self,
        id: &CardId,
        card_styles: Map<String, Value>,
        slot_styles: IndexMap<String, Map<String, Value>>,
    ) -> Result<usize> {
        let position = self
            .wrapper
            .cards
            .iter()
            .position(|card| &card.id == id)
            .ok_or_else(|| CardsError::UnknownCard { id: id.to_string() })?;

        {
            let card = &mut self.wrapper.cards[position];
            for (key, value) in card_styles {
                card.styles.insert(key, value);
            }
            for (slot_name, styles) in slot_styles {
                let Some(instances) = card.slots.get_mut(&slot_name) else {
                    continue;
                };
                for inst in instances {
                    let entry = inst
                        .props
                        .entry("styles")
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(existing) = entry {
                        for (key, value) in &styles {
                            existing.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
        }

        self.broker.publish(&self.wrapper.cards[position]);
        Ok(self.sync())
    }

    /// Pull the broker's styling into every card. Returns how many cards
    /// changed; a second call right after returns 0.
    pub fn sync(&mut self) -> usize {
        let mut changed = 0;
        for card in &mut self.wrapper.cards {
            if self.broker.apply(card) {
                changed += 1;
            }
        }
        if changed > 0 {
            debug!(cards = changed, "synchronized sibling card styles");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CardTemplate;
    use pageforge_layout::ComponentRegistry;
    use serde_json::json;

    fn two_card_wrapper() -> CardsWrapper {
        let registry = ComponentRegistry::new();
        let template = CardTemplate::new("EventCard").with_slot("title", "TitleSlot");
        CardsWrapper {
            collection: pageforge_fields::EntityField::constant(json!([])),
            cards: vec![
                template.instantiate(&registry, 0),
                template.instantiate(&registry, 1),
            ],
        }
    }

    #[test]
    fn extract_reads_card_and_slot_styles() {
        let mut wrapper = two_card_wrapper();
        wrapper.cards[0].styles.insert("accent".into(), json!("gold"));
        let card = &mut wrapper.cards[0];
        card.slots.get_mut("title").unwrap()[0]
            .props
            .insert("styles".into(), json!({ "size": "xl" }));

        let shared = SharedCardStyle::of(&wrapper.cards[0]);
        assert_eq!(shared.card_styles["accent"], json!("gold"));
        assert_eq!(shared.slot_styles["title"]["size"], json!("xl"));
    }

    #[test]
    fn publish_then_apply_converges_siblings() {
        let mut wrapper = two_card_wrapper();
        wrapper.cards[0].styles.insert("accent".into(), json!("gold"));

        let mut broker = CardStyleBroker::new();
        assert!(broker.publish(&wrapper.cards[0]));

        let mut sibling = wrapper.cards[1].clone();
        assert!(broker.apply(&mut sibling));
        assert_eq!(sibling.styles["accent"], json!("gold"));

        // Second application is a no-op: the deep-equality guard stops the
        // cycle.
        assert!(!broker.apply(&mut sibling));
        assert!(!broker.publish(&sibling));
    }

    #[test]
    fn apply_preserves_non_style_slot_props() {
        let mut wrapper = two_card_wrapper();
        let card = &mut wrapper.cards[0];
        card.slots.get_mut("title").unwrap()[0]
            .props
            .insert("styles".into(), json!({ "size": "xl" }));
        let mut broker = CardStyleBroker::new();
        broker.publish(&wrapper.cards[0]);

        let sibling = &mut wrapper.cards[1];
        sibling.slots.get_mut("title").unwrap()[0]
            .props
            .insert("data".into(), json!({ "field": "x", "constantValue": "mine", "constantValueEnabled": true }));
        sibling.slots.get_mut("title").unwrap()[0]
            .props
            .insert("styles".into(), json!({ "size": "s", "weight": "bold" }));

        assert!(broker.apply(sibling));
        let props = &wrapper.cards[1].slots["title"][0].props;
        // Broker wins per style key; extra local keys and data survive.
        assert_eq!(props["styles"]["size"], json!("xl"));
        assert_eq!(props["styles"]["weight"], json!("bold"));
        assert_eq!(props["data"]["constantValue"], json!("mine"));
    }

    #[test]
    fn session_edit_converges_all_cards() {
        let wrapper = two_card_wrapper();
        let ids: Vec<CardId> = wrapper.cards.iter().map(|c| c.id.clone()).collect();
        let mut session = CollectionSession::new(wrapper);

        let mut styles = Map::new();
        styles.insert("accent".into(), json!("teal"));
        let mut slot_styles = IndexMap::new();
        let mut title_styles = Map::new();
        title_styles.insert("size".into(), json!("xl"));
        slot_styles.insert("title".to_string(), title_styles);

        let changed = session
            .edit_card_styles(&ids[0], styles, slot_styles)
            .unwrap();
        assert_eq!(changed, 1, "only the sibling should need an update");

        for card in &session.wrapper().cards {
            assert_eq!(card.styles["accent"], json!("teal"));
            assert_eq!(card.slots["title"][0].props["styles"]["size"], json!("xl"));
        }

        // Converged: another sync pass changes nothing.
        assert_eq!(session.sync(), 0);
    }

    #[test]
    fn session_rejects_unknown_card() {
        let mut session = CollectionSession::new(two_card_wrapper());
        let result =
            session.edit_card_styles(&CardId::from("nope"), Map::new(), IndexMap::new());
        assert!(matches!(result, Err(CardsError::UnknownCard { .. })));
    }

    #[test]
    fn broker_state_is_discarded_with_session() {
        let wrapper = two_card_wrapper();
        let session = CollectionSession::new(wrapper);
        let wrapper = session.into_wrapper();
        let revived = CollectionSession::new(wrapper);
        assert!(revived.broker().read().is_none());
    }
}
