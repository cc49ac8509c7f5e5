//! Inline style declaration overlay.
//!
//! A write-through cache: mutations update the local map and enqueue an
//! equivalent command, so reads never need a flush (unlike layout metrics,
//! style values are never host-computed).

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::OnceLock;

use tracing::debug;

use crate::commands::{CommandKind, TargetId};
use crate::context::BridgeContext;
use crate::engine::ScriptEngine;

/// Camel-case property names the host's style engine understands. Writes
/// to anything else stay local to the declaration.
const RECOGNIZED_PROPERTIES: &[&str] = &[
    "alignItems",
    "alignSelf",
    "background",
    "backgroundColor",
    "backgroundImage",
    "border",
    "borderColor",
    "borderRadius",
    "borderWidth",
    "bottom",
    "boxShadow",
    "color",
    "display",
    "flex",
    "flexBasis",
    "flexDirection",
    "flexGrow",
    "flexShrink",
    "flexWrap",
    "font",
    "fontFamily",
    "fontSize",
    "fontStyle",
    "fontWeight",
    "height",
    "justifyContent",
    "left",
    "letterSpacing",
    "lineHeight",
    "margin",
    "marginBottom",
    "marginLeft",
    "marginRight",
    "marginTop",
    "maxHeight",
    "maxWidth",
    "minHeight",
    "minWidth",
    "objectFit",
    "opacity",
    "overflow",
    "padding",
    "paddingBottom",
    "paddingLeft",
    "paddingRight",
    "paddingTop",
    "position",
    "right",
    "textAlign",
    "textDecoration",
    "top",
    "transform",
    "transition",
    "verticalAlign",
    "visibility",
    "width",
    "zIndex",
];

fn recognized_properties() -> &'static HashSet<&'static str> {
    static TABLE: OnceLock<HashSet<&'static str>> = OnceLock::new();
    TABLE.get_or_init(|| RECOGNIZED_PROPERTIES.iter().copied().collect())
}

fn is_ascii_lower(byte: u8) -> bool {
    byte.is_ascii_lowercase()
}

fn to_ascii_upper(byte: u8) -> u8 {
    byte & !((is_ascii_lower(byte) as u8) << 5)
}

/// Normalize a public property name to the camel-case form used by the
/// recognized-property table: `background-color` becomes `backgroundColor`,
/// already-camel names pass through unchanged.
pub fn normalize_property_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '-' {
            upper_next = true;
            continue;
        }
        if upper_next && ch.is_ascii() {
            normalized.push(to_ascii_upper(ch as u8) as char);
        } else {
            normalized.push(ch);
        }
        upper_next = false;
    }
    normalized
}

pub struct StyleDeclarationInstance<E: ScriptEngine> {
    context: Rc<BridgeContext<E>>,
    owner: TargetId,
    properties: RefCell<HashMap<String, E::Value>>,
}

impl<E: ScriptEngine> StyleDeclarationInstance<E> {
    pub(crate) fn new(context: &Rc<BridgeContext<E>>, owner: TargetId) -> Self {
        Self {
            context: Rc::clone(context),
            owner,
            properties: RefCell::new(HashMap::new()),
        }
    }

    pub fn owner(&self) -> TargetId {
        self.owner
    }

    /// Set a property: update the local map and, for recognized names,
    /// enqueue the equivalent command for the host.
    pub fn set_property(&self, name: &str, value: E::Value) {
        let normalized = normalize_property_name(name);
        if normalized.is_empty() {
            return;
        }
        let serialized = self.context.engine().stringify(&value);
        self.properties
            .borrow_mut()
            .insert(normalized.clone(), value);
        if recognized_properties().contains(normalized.as_str()) {
            self.context.register_command(
                self.owner,
                CommandKind::SetStyle,
                vec![normalized, serialized],
                None,
            );
        } else {
            debug!(
                target = "bridge",
                property = %normalized,
                "style property not recognized by the host; kept local"
            );
        }
    }

    /// Read a property from the local map; absent means "not set" and
    /// reads as the empty string. Never flushes.
    pub fn get_property_value(&self, name: &str) -> E::Value {
        let normalized = normalize_property_name(name);
        match self.properties.borrow().get(&normalized) {
            Some(value) => value.clone(),
            None => {
                let engine = self.context.engine();
                let empty = engine.intern("");
                engine.string_value(&empty)
            }
        }
    }

    /// Remove a property, returning its previous value. The host sees the
    /// removal as a set to the empty value.
    pub fn remove_property(&self, name: &str) -> E::Value {
        let normalized = normalize_property_name(name);
        let removed = self.properties.borrow_mut().remove(&normalized);
        if recognized_properties().contains(normalized.as_str()) {
            self.context.register_command(
                self.owner,
                CommandKind::SetStyle,
                vec![normalized, String::new()],
                None,
            );
        }
        match removed {
            Some(value) => value,
            None => {
                let engine = self.context.engine();
                let empty = engine.intern("");
                engine.string_value(&empty)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.properties.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.borrow().is_empty()
    }
}
