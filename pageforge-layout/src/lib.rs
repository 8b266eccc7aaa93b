//! Serialized page-tree model and component registry.
//!
//! This crate owns the persisted layout artifact: a JSON document of
//! component instances (`{ root, content, zones }`) where each instance is
//! `{ type, props }` and nested child instances live in arrays under named
//! keys inside `props.slots`. Everything here round-trips losslessly:
//! instances the engine never touches serialize back with their keys in the
//! original order, unknown props included.
//!
//! The component registry maps type names to their default props and current
//! schema version. It is consumed by the migration engine (to build
//! fully-formed nested slot instances) and by collection projection (to
//! construct default cards).

mod error;
mod ids;
mod registry;
mod tree;

pub use error::{LayoutError, Result};
pub use ids::{generate_id, slot_instance_id};
pub use registry::{ComponentDef, ComponentRegistry};
pub use tree::{Instance, PageTree, SLOTS_KEY};
