//! Instance identity helpers.
//!
//! Component instance ids are `{TypeName}-{ulid}` strings. Nested slot
//! instances derive their id from the owning card so a card's whole subtree
//! can be re-identified after the card id changes.

use ulid::Ulid;

/// Generate a fresh instance id for the given component type.
pub fn generate_id(type_name: &str) -> String {
    format!("{type_name}-{}", Ulid::new())
}

/// The id of a nested slot instance owned by `parent_id`.
pub fn slot_instance_id(parent_id: &str, slot_name: &str) -> String {
    format!("{parent_id}-{slot_name}")
}
