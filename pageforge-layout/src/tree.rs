//! The serialized page tree: component instances and their nesting.
//!
//! Wire shape:
//!
//! ```json
//! {
//!   "root": { "props": {} },
//!   "content": [ { "type": "PromoSection", "props": { "id": "...", ... } } ],
//!   "zones": { "sidebar": [ ... ] }
//! }
//! ```
//!
//! Nested child instances live in arrays under named keys inside
//! `props.slots`. Props are an open map; unknown keys belong to the
//! component that owns them and must survive every pass untouched, so
//! walkers only write a nested instance back when the visit actually
//! changed it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Props key under which nested slot instances are stored.
pub const SLOTS_KEY: &str = "slots";

/// One component instance in the page tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub props: Map<String, Value>,
}

impl Instance {
    /// Create an instance with empty props.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            props: Map::new(),
        }
    }

    /// Set a prop, builder style.
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    /// The instance id, when present and a string.
    pub fn id(&self) -> Option<&str> {
        self.props.get("id").and_then(Value::as_str)
    }

    /// Overwrite the instance id.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.props.insert("id".into(), Value::String(id.into()));
    }

    /// Names of the slots this instance carries, in stored order.
    pub fn slot_names(&self) -> Vec<String> {
        match self.props.get(SLOTS_KEY) {
            Some(Value::Object(slots)) => slots.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Parsed copies of the instances in one named slot.
    ///
    /// Entries that are not well-formed instances are skipped; they stay in
    /// the stored props untouched.
    pub fn slot(&self, name: &str) -> Vec<Instance> {
        let Some(Value::Object(slots)) = self.props.get(SLOTS_KEY) else {
            return Vec::new();
        };
        let Some(Value::Array(items)) = slots.get(name) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect()
    }

    /// Replace one named slot wholesale.
    pub fn set_slot(&mut self, name: impl Into<String>, instances: Vec<Instance>) {
        let items: Vec<Value> = instances
            .into_iter()
            .filter_map(|inst| serde_json::to_value(inst).ok())
            .collect();
        let slots = self
            .props
            .entry(SLOTS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(slots) = slots {
            slots.insert(name.into(), Value::Array(items));
        }
    }
}

/// The persisted layout artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageTree {
    #[serde(default)]
    pub root: Value,
    #[serde(default)]
    pub content: Vec<Instance>,
    #[serde(default)]
    pub zones: IndexMap<String, Vec<Instance>>,
}

impl PageTree {
    /// Parse a page tree from its serialized JSON form.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Build a page tree from an in-memory JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize back to the wire form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to an in-memory JSON value.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Visit every instance (content, zones, and nested slots) depth
    /// first, parents before children. Nested instances are passed as
    /// parsed copies.
    pub fn for_each(&self, f: &mut dyn FnMut(&Instance)) {
        for inst in &self.content {
            visit(inst, f);
        }
        for instances in self.zones.values() {
            for inst in instances {
                visit(inst, f);
            }
        }
    }

    /// Visit and possibly mutate every instance, parents before children.
    ///
    /// A nested slot instance is only written back into its parent's props
    /// when the visit changed it, so untouched subtrees keep their exact
    /// stored form.
    pub fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut Instance)) {
        for inst in &mut self.content {
            visit_mut(inst, f);
        }
        for instances in self.zones.values_mut() {
            for inst in instances {
                visit_mut(inst, f);
            }
        }
    }

    /// Drop every instance for which `keep` returns false, from content,
    /// zones, and nested slot arrays alike. Children of a dropped instance
    /// go with it. Returns how many instances were removed.
    pub fn retain_instances(&mut self, keep: &mut dyn FnMut(&Instance) -> bool) -> usize {
        let mut removed = 0;
        retain_list(&mut self.content, keep, &mut removed);
        for instances in self.zones.values_mut() {
            retain_list(instances, keep, &mut removed);
        }
        removed
    }

    /// Find an instance anywhere in the tree by id. Nested matches come
    /// back as parsed copies.
    pub fn find(&self, id: &str) -> Option<Instance> {
        let mut found = None;
        self.for_each(&mut |inst| {
            if found.is_none() && inst.id() == Some(id) {
                found = Some(inst.clone());
            }
        });
        found
    }
}

fn visit(inst: &Instance, f: &mut dyn FnMut(&Instance)) {
    f(inst);
    for name in inst.slot_names() {
        for child in inst.slot(&name) {
            visit(&child, f);
        }
    }
}

fn visit_mut(inst: &mut Instance, f: &mut dyn FnMut(&mut Instance)) {
    f(inst);
    let Some(Value::Object(slots)) = inst.props.get_mut(SLOTS_KEY) else {
        return;
    };
    for items in slots.values_mut() {
        let Value::Array(items) = items else { continue };
        for item in items.iter_mut() {
            let Ok(mut child) = serde_json::from_value::<Instance>(item.clone()) else {
                continue;
            };
            let before = match serde_json::to_value(&child) {
                Ok(v) => v,
                Err(_) => continue,
            };
            visit_mut(&mut child, f);
            match serde_json::to_value(&child) {
                Ok(after) if after != before => *item = after,
                _ => {}
            }
        }
    }
}

fn retain_list(
    list: &mut Vec<Instance>,
    keep: &mut dyn FnMut(&Instance) -> bool,
    removed: &mut usize,
) {
    list.retain(|inst| {
        let kept = keep(inst);
        if !kept {
            *removed += 1;
        }
        kept
    });
    for inst in list.iter_mut() {
        retain_slots(inst, keep, removed);
    }
}

fn retain_slots(
    inst: &mut Instance,
    keep: &mut dyn FnMut(&Instance) -> bool,
    removed: &mut usize,
) {
    let Some(Value::Object(slots)) = inst.props.get_mut(SLOTS_KEY) else {
        return;
    };
    for items in slots.values_mut() {
        let Value::Array(items) = items else { continue };
        let mut kept = Vec::with_capacity(items.len());
        for item in items.drain(..) {
            match serde_json::from_value::<Instance>(item.clone()) {
                Ok(mut child) => {
                    if keep(&child) {
                        let before = serde_json::to_value(&child).ok();
                        retain_slots(&mut child, keep, removed);
                        match serde_json::to_value(&child) {
                            Ok(after) if Some(&after) != before.as_ref() => kept.push(after),
                            _ => kept.push(item),
                        }
                    } else {
                        *removed += 1;
                    }
                }
                // Not a well-formed instance; leave it alone.
                Err(_) => kept.push(item),
            }
        }
        *items = kept;
    }
}
