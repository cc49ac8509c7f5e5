//! Event and CustomEvent.
//!
//! Events are constructed either by script (constructor contract validated
//! here) or from a native-origin record when the host dispatches into
//! script. A native detail payload is a one-shot transfer: the buffer is
//! consumed by the decode and released immediately.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;

use crate::context::BridgeContext;
use crate::engine::ScriptEngine;
use crate::error::{BridgeError, Result};
use crate::native::{NativeCustomEventRecord, NativeEventRecord};
use crate::registry::{ClassKind, ClassSingleton};

#[derive(Clone, Copy, Debug)]
enum EventProperty {
    Type,
    Bubbles,
    Cancelable,
    DefaultPrevented,
}

fn event_property_map() -> &'static HashMap<&'static str, EventProperty> {
    static MAP: OnceLock<HashMap<&'static str, EventProperty>> = OnceLock::new();
    MAP.get_or_init(|| {
        HashMap::from([
            ("type", EventProperty::Type),
            ("bubbles", EventProperty::Bubbles),
            ("cancelable", EventProperty::Cancelable),
            ("defaultPrevented", EventProperty::DefaultPrevented),
        ])
    })
}

/// What the host needs to know after handlers ran.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

pub struct EventInstance<E: ScriptEngine> {
    context: Rc<BridgeContext<E>>,
    class: Weak<ClassSingleton>,
    event_type: RefCell<E::Str>,
    bubbles: Cell<bool>,
    cancelable: Cell<bool>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    properties: RefCell<HashMap<String, E::Value>>,
}

impl<E: ScriptEngine> std::fmt::Debug for EventInstance<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventInstance")
            .field("event_type", &self.event_type)
            .field("bubbles", &self.bubbles)
            .field("cancelable", &self.cancelable)
            .field("default_prevented", &self.default_prevented)
            .field("propagation_stopped", &self.propagation_stopped)
            .field("properties", &self.properties)
            .finish()
    }
}

impl<E: ScriptEngine> EventInstance<E> {
    /// Script-side constructor: `new Event(type, init?)`.
    pub fn new(context: &Rc<BridgeContext<E>>, args: &[E::Value]) -> Result<Self> {
        Self::construct(context, ClassKind::Event, args, "Event")
    }

    pub(crate) fn construct(
        context: &Rc<BridgeContext<E>>,
        kind: ClassKind,
        args: &[E::Value],
        class_label: &str,
    ) -> Result<Self> {
        if args.is_empty() {
            return Err(BridgeError::type_error(format!(
                "Failed to construct '{class_label}': 1 argument required, but only 0 present."
            )));
        }
        let engine = context.engine();
        let event_type = engine.intern(&engine.stringify(&args[0]));
        let event = Self::raw(context, kind, event_type);
        if let Some(init) = args.get(1).filter(|value| !engine.is_nullish(value)) {
            if let Some(bubbles) = engine.member(init, "bubbles") {
                event.bubbles.set(engine.to_bool(&bubbles));
            }
            if let Some(cancelable) = engine.member(init, "cancelable") {
                event.cancelable.set(engine.to_bool(&cancelable));
            }
        }
        Ok(event)
    }

    /// Host-side constructor from a native event record.
    pub fn from_native(context: &Rc<BridgeContext<E>>, record: NativeEventRecord) -> Self {
        Self::from_native_with_class(context, ClassKind::Event, record)
    }

    pub(crate) fn from_native_with_class(
        context: &Rc<BridgeContext<E>>,
        kind: ClassKind,
        record: NativeEventRecord,
    ) -> Self {
        let engine = context.engine();
        // The type buffer is consumed here; nothing native survives the decode.
        let event_type = engine.string_from_utf16(&record.event_type.into_units());
        let event = Self::raw(context, kind, event_type);
        event.bubbles.set(record.bubbles);
        event.cancelable.set(record.cancelable);
        event
    }

    fn raw(context: &Rc<BridgeContext<E>>, kind: ClassKind, event_type: E::Str) -> Self {
        let class = Rc::downgrade(&context.class_singleton(kind));
        Self {
            context: Rc::clone(context),
            class,
            event_type: RefCell::new(event_type),
            bubbles: Cell::new(false),
            cancelable: Cell::new(false),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
            properties: RefCell::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &Rc<BridgeContext<E>> {
        &self.context
    }

    pub fn class(&self) -> Rc<ClassSingleton> {
        self.class
            .upgrade()
            .unwrap_or_else(|| panic!("class singleton used after bridge context teardown"))
    }

    pub fn type_name(&self) -> E::Str {
        self.event_type.borrow().clone()
    }

    pub(crate) fn set_type(&self, event_type: E::Str) {
        // Previous retention released on replace.
        *self.event_type.borrow_mut() = event_type;
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles.get()
    }

    pub(crate) fn set_bubbles(&self, bubbles: bool) {
        self.bubbles.set(bubbles);
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable.get()
    }

    pub(crate) fn set_cancelable(&self, cancelable: bool) {
        self.cancelable.set(cancelable);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Marks the event canceled; a no-op on non-cancelable events.
    pub fn prevent_default(&self) {
        if self.cancelable.get() {
            self.default_prevented.set(true);
        }
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn outcome(&self) -> EventOutcome {
        EventOutcome {
            default_prevented: self.default_prevented.get(),
            propagation_stopped: self.propagation_stopped.get(),
        }
    }

    pub fn get_property(&self, name: &str) -> E::Value {
        let engine = self.context.engine();
        match event_property_map().get(name) {
            Some(EventProperty::Type) => engine.string_value(&self.event_type.borrow()),
            Some(EventProperty::Bubbles) => engine.boolean(self.bubbles.get()),
            Some(EventProperty::Cancelable) => engine.boolean(self.cancelable.get()),
            Some(EventProperty::DefaultPrevented) => engine.boolean(self.default_prevented.get()),
            None => match self.properties.borrow().get(name) {
                Some(value) => value.clone(),
                None => engine.undefined(),
            },
        }
    }

    pub fn set_property(&self, name: &str, value: E::Value) {
        if event_property_map().contains_key(name) {
            return;
        }
        self.properties.borrow_mut().insert(name.to_string(), value);
    }
}

pub struct CustomEventInstance<E: ScriptEngine> {
    event: EventInstance<E>,
    detail: RefCell<Option<E::Value>>,
}

impl<E: ScriptEngine> std::fmt::Debug for CustomEventInstance<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomEventInstance")
            .field("event", &self.event)
            .field("detail", &self.detail)
            .finish()
    }
}

impl<E: ScriptEngine> CustomEventInstance<E> {
    /// Script-side constructor: `new CustomEvent(type, init?)`. The init
    /// dictionary's `detail` is stored as an opaque boxed value.
    pub fn new(context: &Rc<BridgeContext<E>>, args: &[E::Value]) -> Result<Self> {
        let event = EventInstance::construct(context, ClassKind::CustomEvent, args, "CustomEvent")?;
        let engine = context.engine();
        let detail = args
            .get(1)
            .filter(|value| !engine.is_nullish(value))
            .and_then(|init| engine.member(init, "detail"));
        Ok(Self {
            event,
            detail: RefCell::new(detail),
        })
    }

    /// Host-side constructor. The detail payload is decoded out of the
    /// one-shot native buffer into an engine string; the buffer does not
    /// survive the call.
    pub fn from_native(context: &Rc<BridgeContext<E>>, record: NativeCustomEventRecord) -> Self {
        let event =
            EventInstance::from_native_with_class(context, ClassKind::CustomEvent, record.event);
        let engine = context.engine();
        let decoded = engine.string_from_utf16(&record.detail.into_units());
        let detail = engine.string_value(&decoded);
        Self {
            event,
            detail: RefCell::new(Some(detail)),
        }
    }

    /// Unset detail reads as null.
    pub fn detail(&self) -> E::Value {
        match self.detail.borrow().as_ref() {
            Some(value) => value.clone(),
            None => self.event.context.engine().null(),
        }
    }

    pub fn set_detail(&self, value: E::Value) {
        *self.detail.borrow_mut() = Some(value);
    }

    /// `initCustomEvent(type, bubbles?, cancelable?, detail?)`.
    ///
    /// The optional positions use inclusive arity guards: each is applied
    /// only while the total argument count stays at or below its bound, so
    /// extra trailing arguments suppress the optional updates. Positions
    /// inside the bound but absent from the call read as undefined.
    pub fn init_custom_event(&self, args: &[E::Value]) -> Result<()> {
        if args.is_empty() {
            return Err(BridgeError::type_error(
                "Failed to execute 'initCustomEvent' on 'CustomEvent': 1 argument required, but only 0 present",
            ));
        }
        let engine = self.event.context.engine();
        let event_type = engine.intern(&engine.stringify(&args[0]));
        self.event.set_type(event_type);

        let argc = args.len();
        let undefined = engine.undefined();
        if argc <= 2 {
            let bubbles = args.get(1).unwrap_or(&undefined);
            self.event.set_bubbles(engine.to_bool(bubbles));
        }
        if argc <= 3 {
            let cancelable = args.get(2).unwrap_or(&undefined);
            self.event.set_cancelable(engine.to_bool(cancelable));
        }
        if argc <= 4 {
            *self.detail.borrow_mut() = args.get(3).cloned();
        }
        Ok(())
    }

    pub fn get_property(&self, name: &str) -> E::Value {
        if name == "detail" {
            return self.detail();
        }
        self.event.get_property(name)
    }

    pub fn set_property(&self, name: &str, value: E::Value) {
        if name == "detail" {
            self.set_detail(value);
            return;
        }
        self.event.set_property(name, value);
    }
}

impl<E: ScriptEngine> Deref for CustomEventInstance<E> {
    type Target = EventInstance<E>;

    fn deref(&self) -> &EventInstance<E> {
        &self.event
    }
}
