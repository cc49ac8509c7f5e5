//! Reference engine backend with a plain Rust value model.
//!
//! `LocalEngine` executes no script. It exists so embedders and tests can
//! drive the bridge through the [`ScriptEngine`] seam without linking a
//! production engine, and it documents the minimum an engine backend has
//! to provide.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::ScriptEngine;
use crate::registry::ClassKind;

/// Retained string handle. The `Rc` keeps the allocation alive for as long
/// as any holder retains it; the last drop releases it.
#[derive(Clone, Debug)]
pub struct LocalStr(Rc<str>);

impl AsRef<str> for LocalStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq for LocalStr {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

#[derive(Clone, Debug)]
pub enum LocalValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(LocalStr),
    Object(Rc<RefCell<HashMap<String, LocalValue>>>),
}

impl LocalValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LocalValue::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            LocalValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, LocalValue::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LocalValue::Null)
    }
}

#[derive(Default)]
pub struct LocalEngine {
    bound_classes: RefCell<HashMap<String, ClassKind>>,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for object values in tests and embedders.
    pub fn object(&self, members: Vec<(&str, LocalValue)>) -> LocalValue {
        let map = members
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<HashMap<_, _>>();
        LocalValue::Object(Rc::new(RefCell::new(map)))
    }

    /// The class constructors installed into this engine's global object.
    pub fn bound_class(&self, name: &str) -> Option<ClassKind> {
        self.bound_classes.borrow().get(name).copied()
    }
}

impl ScriptEngine for LocalEngine {
    type Value = LocalValue;
    type Str = LocalStr;

    fn undefined(&self) -> LocalValue {
        LocalValue::Undefined
    }

    fn null(&self) -> LocalValue {
        LocalValue::Null
    }

    fn number(&self, value: f64) -> LocalValue {
        LocalValue::Number(value)
    }

    fn boolean(&self, value: bool) -> LocalValue {
        LocalValue::Bool(value)
    }

    fn intern(&self, value: &str) -> LocalStr {
        LocalStr(Rc::from(value))
    }

    fn string_value(&self, value: &LocalStr) -> LocalValue {
        LocalValue::Str(value.clone())
    }

    fn string_from_utf16(&self, units: &[u16]) -> LocalStr {
        LocalStr(Rc::from(String::from_utf16_lossy(units).as_str()))
    }

    fn stringify(&self, value: &LocalValue) -> String {
        match value {
            LocalValue::Undefined => "undefined".to_string(),
            LocalValue::Null => "null".to_string(),
            LocalValue::Bool(b) => b.to_string(),
            LocalValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            LocalValue::Str(s) => s.as_ref().to_string(),
            LocalValue::Object(_) => "[object Object]".to_string(),
        }
    }

    fn to_bool(&self, value: &LocalValue) -> bool {
        match value {
            LocalValue::Undefined | LocalValue::Null => false,
            LocalValue::Bool(b) => *b,
            LocalValue::Number(n) => *n != 0.0 && !n.is_nan(),
            LocalValue::Str(s) => !s.as_ref().is_empty(),
            LocalValue::Object(_) => true,
        }
    }

    fn is_nullish(&self, value: &LocalValue) -> bool {
        matches!(value, LocalValue::Undefined | LocalValue::Null)
    }

    fn member(&self, object: &LocalValue, key: &str) -> Option<LocalValue> {
        match object {
            LocalValue::Object(map) => map.borrow().get(key).cloned(),
            _ => None,
        }
    }

    fn build_object(&self, members: Vec<(String, LocalValue)>) -> LocalValue {
        LocalValue::Object(Rc::new(RefCell::new(members.into_iter().collect())))
    }

    fn bind_class(&self, name: &str, kind: ClassKind) {
        self.bound_classes.borrow_mut().insert(name.to_string(), kind);
    }
}
