//! Identity registry: one class singleton per (context, class) pair.
//!
//! The registry is an ownership arena: each [`BridgeContext`] owns its own
//! singleton table, and dropping the context tears the table down
//! deterministically. Instances keep `Weak` back-references; upgrading one
//! after context teardown is a programming error and fails fast.
//!
//! [`BridgeContext`]: crate::context::BridgeContext

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Identifies one script execution context within the process.
pub type ContextId = u32;

/// The bindable classes of the object model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Node,
    Element,
    ImageElement,
    Event,
    CustomEvent,
    StyleDeclaration,
}

impl ClassKind {
    pub const ALL: [ClassKind; 6] = [
        ClassKind::Node,
        ClassKind::Element,
        ClassKind::ImageElement,
        ClassKind::Event,
        ClassKind::CustomEvent,
        ClassKind::StyleDeclaration,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClassKind::Node => "Node",
            ClassKind::Element => "Element",
            ClassKind::ImageElement => "ImageElement",
            ClassKind::Event => "Event",
            ClassKind::CustomEvent => "CustomEvent",
            ClassKind::StyleDeclaration => "CSSStyleDeclaration",
        }
    }

    /// Name under which the class constructor is installed into the global
    /// object, for the classes that are script-constructible.
    pub fn global_binding(self) -> Option<&'static str> {
        match self {
            ClassKind::Element => Some("Element"),
            ClassKind::ImageElement => Some("Image"),
            ClassKind::CustomEvent => Some("CustomEvent"),
            ClassKind::StyleDeclaration => Some("CSSStyleDeclaration"),
            ClassKind::Node | ClassKind::Event => None,
        }
    }
}

/// One per (context, class). Owns the class-level binding surface;
/// instances reference it without owning it.
#[derive(Debug)]
pub struct ClassSingleton {
    kind: ClassKind,
    context: ContextId,
}

impl ClassSingleton {
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn context_id(&self) -> ContextId {
        self.context
    }
}

/// Per-context singleton table. Only ever touched from the thread owning
/// the associated script context; that discipline is a precondition, not
/// something the table enforces.
#[derive(Default)]
pub struct ClassRegistry {
    classes: RefCell<HashMap<ClassKind, Rc<ClassSingleton>>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The unique singleton for `kind` in the owning context, created on
    /// first use. Repeated calls return the same instance.
    pub fn class_singleton(&self, context: ContextId, kind: ClassKind) -> Rc<ClassSingleton> {
        Rc::clone(
            self.classes
                .borrow_mut()
                .entry(kind)
                .or_insert_with(|| Rc::new(ClassSingleton { kind, context })),
        )
    }

    pub fn len(&self) -> usize {
        self.classes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.borrow().is_empty()
    }
}
