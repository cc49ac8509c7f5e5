//! Base instance shared by every node-like object: identity, class
//! back-reference, and the generic property cache that terminates the
//! dispatch chain.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::commands::TargetId;
use crate::context::BridgeContext;
use crate::engine::ScriptEngine;
use crate::registry::{ClassKind, ClassSingleton};

pub struct NodeInstance<E: ScriptEngine> {
    context: Rc<BridgeContext<E>>,
    class: Weak<ClassSingleton>,
    target: TargetId,
    node_name: String,
    properties: RefCell<HashMap<String, E::Value>>,
}

impl<E: ScriptEngine> NodeInstance<E> {
    pub(crate) fn new(context: &Rc<BridgeContext<E>>, kind: ClassKind, node_name: &str) -> Self {
        let class = Rc::downgrade(&context.class_singleton(kind));
        Self {
            context: Rc::clone(context),
            class,
            target: context.allocate_target_id(),
            node_name: node_name.to_string(),
            properties: RefCell::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &Rc<BridgeContext<E>> {
        &self.context
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// The owning class singleton. Holding an instance past its context's
    /// teardown is a programming error; this fails fast instead of
    /// resurrecting the class.
    pub fn class(&self) -> Rc<ClassSingleton> {
        self.class
            .upgrade()
            .unwrap_or_else(|| panic!("class singleton used after bridge context teardown"))
    }

    /// Terminal stage of the dispatch chain: names no class recognizes
    /// behave as plain dynamic properties.
    pub fn get_property(&self, name: &str) -> E::Value {
        match self.properties.borrow().get(name) {
            Some(value) => value.clone(),
            None => self.context.engine().undefined(),
        }
    }

    pub fn set_property(&self, name: &str, value: E::Value) {
        self.properties.borrow_mut().insert(name.to_string(), value);
    }
}
