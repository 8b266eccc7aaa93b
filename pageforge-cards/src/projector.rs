//! Collection projection: reconciling cards against their data source.
//!
//! Entity-sourced collections are positional: the live list dictates the
//! count, trailing excess is dropped, and every card carries the resolved
//! item for its position. Constant-sourced collections are identity-first:
//! the authored `{id}` list dictates count and order, and existing cards
//! are matched by id so author edits survive reorders and regeneration.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use pageforge_fields::{DocumentContext, EntityField};
use pageforge_layout::ComponentRegistry;

use crate::types::{CardId, CardInstance, CardTemplate, CardsWrapper, ParentData};
use crate::visibility::{compute_visibility, ResolveMode};

/// One data-resolution pass over a collection.
#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    pub ctx: &'a DocumentContext<'a>,
    pub registry: &'a ComponentRegistry,
    pub template: &'a CardTemplate,
}

impl Projector<'_> {
    /// Produce the next card list for a wrapper. Pure: the input wrapper is
    /// left untouched and the result replaces it wholesale.
    pub fn project(&self, wrapper: &CardsWrapper) -> CardsWrapper {
        let next = if wrapper.collection.constant_value_enabled
            || wrapper.collection.field.is_empty()
        {
            self.project_constant(wrapper)
        } else {
            self.project_entity(wrapper)
        };
        debug!(
            cards = next.cards.len(),
            entity_sourced = next.cards.first().is_some_and(|c| c.parent_data.is_some()),
            "projected collection"
        );
        next
    }

    /// Project, then stamp `conditional_render` on every card, the full
    /// data-resolution pass a collection undergoes on each state change.
    pub fn refresh(
        &self,
        wrapper: &CardsWrapper,
        parent_styles: &serde_json::Map<String, Value>,
        mode: ResolveMode,
    ) -> CardsWrapper {
        let mut next = self.project(wrapper);
        for card in &mut next.cards {
            card.conditional_render = compute_visibility(card, parent_styles, self.ctx, mode);
        }
        next
    }

    fn project_entity(&self, wrapper: &CardsWrapper) -> CardsWrapper {
        // Resolve entity-sourced regardless of any stale constant flag.
        let list_ref = EntityField {
            constant_value_enabled: false,
            ..wrapper.collection.clone()
        };
        let items = match self.ctx.resolve(&list_ref) {
            Some(Value::Array(items)) => items,
            // Missing or non-list data: no cards, no placeholders.
            _ => Vec::new(),
        };

        let mut cards = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            // Positional reuse; trailing excess simply never gets copied.
            let mut card = match wrapper.cards.get(index) {
                Some(existing) => existing.clone(),
                None => self.template.instantiate(self.registry, index),
            };
            card.index = index;
            card.parent_data = Some(ParentData {
                field: wrapper.collection.field.clone(),
                item,
            });
            cards.push(card);
        }

        CardsWrapper {
            collection: wrapper.collection.clone(),
            cards,
        }
    }

    fn project_constant(&self, wrapper: &CardsWrapper) -> CardsWrapper {
        let refs = wrapper.constant_refs();
        let mut used: HashSet<CardId> = HashSet::with_capacity(refs.len());
        let mut cards = Vec::with_capacity(refs.len());

        for (index, card_ref) in refs.iter().enumerate() {
            let mut card = match card_ref {
                // Deep copy so a duplicated id never aliases across
                // positions.
                Some(id) => match wrapper.card(id) {
                    Some(existing) => existing.clone(),
                    None => self.template.instantiate(self.registry, index),
                },
                None => self.template.instantiate(self.registry, index),
            };

            if used.contains(&card.id) {
                // Later duplicate: fresh identity, nested slot ids rewritten
                // to match.
                card.rewrite_id(CardId::generate(&self.template.card_type));
            }
            used.insert(card.id.clone());

            card.index = index;
            card.parent_data = None;
            cards.push(card);
        }

        // Reflect the final id assignment back into the wrapper so
        // re-projection is a fixed point.
        let mut collection = wrapper.collection.clone();
        collection.constant_value = Value::Array(
            cards
                .iter()
                .map(|card| serde_json::json!({ "id": card.id }))
                .collect(),
        );

        CardsWrapper { collection, cards }
    }
}
