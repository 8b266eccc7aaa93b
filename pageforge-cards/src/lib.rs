//! Collections of repeated data projected into card instances.
//!
//! A [`CardsWrapper`] owns an ordered list of [`CardInstance`]s and a
//! collection field describing their source: either a live entity list
//! (each card mirrors one resolved item) or an authored constant list of
//! card backreferences. The [`Projector`] reconciles the cards against that
//! source on every data-resolution pass: positionally for entity lists,
//! by identity for constant lists.
//!
//! During an editing session, sibling cards share visual styling through a
//! [`CardStyleBroker`]: one card's style change propagates to the others,
//! bounded by deep-equality guards so the cooperative re-render cycle
//! terminates. Structural data per card never synchronizes.
//!
//! [`compute_visibility`] decides, per card and slot, whether a sub-element
//! renders: resolved data must be present (unless an editing session wants
//! empty slots visible) and the ancestor's show/hide toggle must allow it.

mod broker;
mod error;
mod projector;
mod types;
mod visibility;

pub use broker::{CardStyleBroker, CollectionSession, SharedCardStyle};
pub use error::{CardsError, Result};
pub use projector::Projector;
pub use types::{CardId, CardInstance, CardTemplate, CardsWrapper, ParentData};
pub use visibility::{compute_visibility, is_renderable, ResolveMode};
