//! Component registry: type name → default props and schema version.
//!
//! The registry is the engine's window into the component catalog the
//! surrounding editor ships. Rendering hooks stay outside this crate; the
//! engine only needs to mint default instances and to know each type's
//! current schema version.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::ids::generate_id;
use crate::tree::Instance;

/// One registered component type.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub type_name: String,
    /// Current schema version of this type's props.
    pub version: u64,
    /// Props a freshly inserted instance starts with (sans `id`).
    pub default_props: Map<String, Value>,
}

impl ComponentDef {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            version: 0,
            default_props: Map::new(),
        }
    }

    /// Set the current schema version.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Set the default props.
    pub fn with_defaults(mut self, default_props: Map<String, Value>) -> Self {
        self.default_props = default_props;
        self
    }
}

/// Registry of component types known to the editor.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    defs: IndexMap<String, ComponentDef>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type, builder style. Re-registering a type
    /// replaces the previous definition.
    pub fn with(mut self, def: ComponentDef) -> Self {
        self.register(def);
        self
    }

    /// Register a component type.
    pub fn register(&mut self, def: ComponentDef) {
        debug!(type_name = %def.type_name, version = def.version, "registered component");
        self.defs.insert(def.type_name.clone(), def);
    }

    /// Look up a registered type.
    pub fn get(&self, type_name: &str) -> Option<&ComponentDef> {
        self.defs.get(type_name)
    }

    /// Current schema version of a type. Unknown types are version 0.
    pub fn version(&self, type_name: &str) -> u64 {
        self.defs.get(type_name).map(|d| d.version).unwrap_or(0)
    }

    /// Default props for a type with a freshly generated `id`, or `None`
    /// for unknown types.
    pub fn default_props(&self, type_name: &str) -> Option<Map<String, Value>> {
        let def = self.defs.get(type_name)?;
        let mut props = def.default_props.clone();
        props.insert("id".into(), Value::String(generate_id(type_name)));
        Some(props)
    }

    /// A fully-formed default instance of a type. Unknown types get empty
    /// props plus a generated id; downstream code treats unregistered
    /// components as opaque but still addressable.
    pub fn default_instance(&self, type_name: &str) -> Instance {
        let props = self.default_props(type_name).unwrap_or_else(|| {
            let mut props = Map::new();
            props.insert("id".into(), Value::String(generate_id(type_name)));
            props
        });
        Instance {
            type_name: type_name.into(),
            props,
        }
    }
}
