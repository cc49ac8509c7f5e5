//! Per-element attribute store.
//!
//! Attributes and IDL properties are separate namespaces: this map never
//! consults the property dispatch overlay. Presence of a key means the
//! attribute exists, which is distinct from "present with empty value".

use std::collections::HashMap;

use crate::engine::ScriptEngine;

/// Hooks fired around `id` mutations so an id-based lookup index (owned by
/// the document/tree layer, not by the store) can stay consistent.
pub trait AttributeChangeListener {
    fn before_update_id(&self, old: Option<&str>, new: Option<&str>);
    fn did_modify_attribute(&self, name: &str, old: Option<&str>, new: Option<&str>);
}

pub struct ElementAttributes<E: ScriptEngine> {
    attributes: HashMap<String, E::Str>,
}

impl<E: ScriptEngine> ElementAttributes<E> {
    pub fn new() -> Self {
        Self {
            attributes: HashMap::new(),
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&E::Str> {
        self.attributes.get(name)
    }

    /// Store a retained engine string under `name`, returning the value it
    /// replaced. Dropping the returned value releases the old retention.
    pub fn set_attribute(&mut self, name: &str, value: E::Str) -> Option<E::Str> {
        self.attributes.insert(name.to_string(), value)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<E::Str> {
        self.attributes.remove(name)
    }

    /// Shallow bulk copy from another element's store (element cloning).
    pub fn copy_with(&mut self, other: &ElementAttributes<E>) {
        for (name, value) in &other.attributes {
            self.attributes.insert(name.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<E: ScriptEngine> Default for ElementAttributes<E> {
    fn default() -> Self {
        Self::new()
    }
}
