//! Element: property dispatch over the command queue and the native
//! counterpart, plus the attribute and style surfaces.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::OnceLock;

use crate::commands::{CommandKind, TargetId};
use crate::context::BridgeContext;
use crate::engine::ScriptEngine;
use crate::error::{BridgeError, Result};
use crate::host;
use crate::native::{BoundingClientRect, LayoutMetric, NativeElementSurface, NativeHandle};
use crate::registry::ClassKind;

use super::attributes::{AttributeChangeListener, ElementAttributes};
use super::node::NodeInstance;
use super::style::StyleDeclarationInstance;

#[derive(Clone, Copy, Debug)]
enum ElementProperty {
    NodeName,
    TagName,
    Metric(LayoutMetric),
}

fn element_property_map() -> &'static HashMap<&'static str, ElementProperty> {
    static MAP: OnceLock<HashMap<&'static str, ElementProperty>> = OnceLock::new();
    MAP.get_or_init(|| {
        HashMap::from([
            ("nodeName", ElementProperty::NodeName),
            ("tagName", ElementProperty::TagName),
            (
                "offsetLeft",
                ElementProperty::Metric(LayoutMetric::OffsetLeft),
            ),
            ("offsetTop", ElementProperty::Metric(LayoutMetric::OffsetTop)),
            (
                "offsetWidth",
                ElementProperty::Metric(LayoutMetric::OffsetWidth),
            ),
            (
                "offsetHeight",
                ElementProperty::Metric(LayoutMetric::OffsetHeight),
            ),
            (
                "clientWidth",
                ElementProperty::Metric(LayoutMetric::ClientWidth),
            ),
            (
                "clientHeight",
                ElementProperty::Metric(LayoutMetric::ClientHeight),
            ),
            ("clientTop", ElementProperty::Metric(LayoutMetric::ClientTop)),
            (
                "clientLeft",
                ElementProperty::Metric(LayoutMetric::ClientLeft),
            ),
            ("scrollTop", ElementProperty::Metric(LayoutMetric::ScrollTop)),
            (
                "scrollLeft",
                ElementProperty::Metric(LayoutMetric::ScrollLeft),
            ),
            (
                "scrollWidth",
                ElementProperty::Metric(LayoutMetric::ScrollWidth),
            ),
            (
                "scrollHeight",
                ElementProperty::Metric(LayoutMetric::ScrollHeight),
            ),
        ])
    })
}

fn metric_is_writable(metric: LayoutMetric) -> bool {
    matches!(metric, LayoutMetric::ScrollTop | LayoutMetric::ScrollLeft)
}

pub struct ElementInstance<E: ScriptEngine> {
    node: NodeInstance<E>,
    tag: String,
    attributes: RefCell<ElementAttributes<E>>,
    style: StyleDeclarationInstance<E>,
    surface: Rc<NativeElementSurface>,
    attribute_listener: RefCell<Option<Rc<dyn AttributeChangeListener>>>,
}

impl<E: ScriptEngine> ElementInstance<E> {
    /// Create an element for `tag`, enqueueing its create command.
    pub fn create(context: &Rc<BridgeContext<E>>, tag: &str) -> Self {
        Self::construct(context, ClassKind::Element, tag, true)
    }

    /// Shared constructor for subclasses. When `enqueue_create` is false
    /// the subclass enqueues its own create command carrying its own
    /// counterpart handle.
    pub(crate) fn construct(
        context: &Rc<BridgeContext<E>>,
        kind: ClassKind,
        tag: &str,
        enqueue_create: bool,
    ) -> Self {
        let node = NodeInstance::new(context, kind, &tag.to_ascii_uppercase());
        let surface = Rc::new(NativeElementSurface::default());
        if enqueue_create {
            context.register_command(
                node.target(),
                CommandKind::CreateElement,
                vec![tag.to_string()],
                Some(NativeHandle::Element(Rc::clone(&surface))),
            );
        }
        let style = StyleDeclarationInstance::new(context, node.target());
        Self {
            node,
            tag: tag.to_string(),
            attributes: RefCell::new(ElementAttributes::new()),
            style,
            surface,
            attribute_listener: RefCell::new(None),
        }
    }

    pub fn node(&self) -> &NodeInstance<E> {
        &self.node
    }

    pub fn target(&self) -> TargetId {
        self.node.target()
    }

    /// Registered tag name as created (`img`), as opposed to the
    /// upper-cased `tagName` property.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn style(&self) -> &StyleDeclarationInstance<E> {
        &self.style
    }

    pub fn surface(&self) -> &Rc<NativeElementSurface> {
        &self.surface
    }

    /// Register the id-index owner's notification hooks.
    pub fn set_attribute_change_listener(&self, listener: Rc<dyn AttributeChangeListener>) {
        *self.attribute_listener.borrow_mut() = Some(listener);
    }

    /// Property dispatch. Layout metrics are host-computed: the queue is
    /// flushed before the counterpart is read, so the value reflects every
    /// previously queued mutation. Unrecognized names fall through to the
    /// node's dynamic cache.
    pub fn get_property(&self, name: &str) -> E::Value {
        let engine = self.node.context().engine();
        match element_property_map().get(name) {
            Some(ElementProperty::NodeName) | Some(ElementProperty::TagName) => {
                let interned = engine.intern(self.node.node_name());
                engine.string_value(&interned)
            }
            Some(ElementProperty::Metric(metric)) => {
                self.node.context().flush();
                engine.number(self.surface.metric(*metric))
            }
            None => self.node.get_property(name),
        }
    }

    /// Setter mirror of `get_property`: writable metrics enqueue a
    /// set-property command without blocking; read-only structural names
    /// are ignored; everything else lands in the dynamic cache.
    pub fn set_property(&self, name: &str, value: E::Value) {
        match element_property_map().get(name) {
            Some(ElementProperty::Metric(metric)) if metric_is_writable(*metric) => {
                let serialized = self.node.context().engine().stringify(&value);
                self.node.context().register_command(
                    self.node.target(),
                    CommandKind::SetProperty,
                    vec![name.to_string(), serialized],
                    None,
                );
            }
            Some(_) => {}
            None => self.node.set_property(name, value),
        }
    }

    /// Invoke one of the named operations bound at class-singleton
    /// creation. Arity is validated here, where arguments still arrive as
    /// an engine-value slice.
    pub fn call_method(&self, method: &str, args: &[E::Value]) -> Result<E::Value> {
        let engine = self.node.context().engine();
        match method {
            "setAttribute" => {
                require_args("setAttribute", 2, args.len())?;
                let name = engine.stringify(&args[0]);
                self.set_attribute(&name, args[1].clone());
                Ok(engine.undefined())
            }
            "getAttribute" => {
                require_args("getAttribute", 1, args.len())?;
                let name = engine.stringify(&args[0]);
                Ok(self.get_attribute_value(&name))
            }
            "hasAttribute" => {
                require_args("hasAttribute", 1, args.len())?;
                let name = engine.stringify(&args[0]);
                Ok(engine.boolean(self.has_attribute(&name)))
            }
            "removeAttribute" => {
                require_args("removeAttribute", 1, args.len())?;
                let name = engine.stringify(&args[0]);
                self.remove_attribute(&name);
                Ok(engine.undefined())
            }
            "getBoundingClientRect" => {
                let rect = self.get_bounding_client_rect();
                Ok(rect_object(engine, rect))
            }
            other => Err(BridgeError::type_error(format!(
                "Failed to execute '{other}' on 'Element': no such method."
            ))),
        }
    }

    /// Set an attribute: mutate the store, notify the id index when the
    /// `id` attribute changes, and enqueue the mutation for the host.
    pub fn set_attribute(&self, name: &str, value: E::Value) {
        let engine = self.node.context().engine();
        let normalized = name.to_ascii_lowercase();
        let serialized = engine.stringify(&value);
        let retained = engine.intern(&serialized);

        let old = self
            .attributes
            .borrow()
            .get_attribute(&normalized)
            .map(|value| value.as_ref().to_string());
        let listener = self.attribute_listener.borrow().clone();
        if normalized == "id" {
            if let Some(listener) = &listener {
                listener.before_update_id(old.as_deref(), Some(&serialized));
            }
        }

        // Previous retention, if any, is released here.
        self.attributes
            .borrow_mut()
            .set_attribute(&normalized, retained);

        self.node.context().register_command(
            self.node.target(),
            CommandKind::SetProperty,
            vec![normalized.clone(), serialized.clone()],
            None,
        );

        if let Some(listener) = &listener {
            listener.did_modify_attribute(&normalized, old.as_deref(), Some(&serialized));
        }
    }

    /// Attribute value as an engine value; absent reads as null.
    pub fn get_attribute_value(&self, name: &str) -> E::Value {
        let engine = self.node.context().engine();
        let normalized = name.to_ascii_lowercase();
        match self.attributes.borrow().get_attribute(&normalized) {
            Some(value) => engine.string_value(value),
            None => engine.null(),
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        let normalized = name.to_ascii_lowercase();
        self.attributes
            .borrow()
            .get_attribute(&normalized)
            .map(|value| value.as_ref().to_string())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes
            .borrow()
            .has_attribute(&name.to_ascii_lowercase())
    }

    pub fn remove_attribute(&self, name: &str) {
        let normalized = name.to_ascii_lowercase();
        let old = self
            .attributes
            .borrow()
            .get_attribute(&normalized)
            .map(|value| value.as_ref().to_string());
        if old.is_none() {
            return;
        }
        let listener = self.attribute_listener.borrow().clone();
        if normalized == "id" {
            if let Some(listener) = &listener {
                listener.before_update_id(old.as_deref(), None);
            }
        }
        // Retention released here.
        self.attributes.borrow_mut().remove_attribute(&normalized);

        self.node.context().register_command(
            self.node.target(),
            CommandKind::RemoveProperty,
            vec![normalized.clone()],
            None,
        );

        if let Some(listener) = &listener {
            listener.did_modify_attribute(&normalized, old.as_deref(), None);
        }
    }

    /// Copy another element's attribute map wholesale (cloning support).
    pub fn copy_attributes_from(&self, other: &ElementInstance<E>) {
        self.attributes
            .borrow_mut()
            .copy_with(&other.attributes.borrow());
    }

    /// Host-computed layout rect: flushes, then reads the counterpart.
    pub fn get_bounding_client_rect(&self) -> BoundingClientRect {
        self.node.context().flush();
        self.surface.bounding_client_rect()
    }

    /// Rasterize this element through the host's convert-to-image entry.
    /// Flushes first so the snapshot reflects queued mutations.
    pub fn to_blob(&self) -> Vec<u8> {
        self.node.context().flush();
        let table = host::host_table(self.node.context().host_key());
        table.convert_to_image(self.node.target())
    }
}

fn require_args(method: &str, required: usize, present: usize) -> Result<()> {
    if present < required {
        return Err(BridgeError::type_error(format!(
            "Failed to execute '{method}' on 'Element': {required} argument{} required, but only {present} present.",
            if required == 1 { "" } else { "s" },
        )));
    }
    Ok(())
}

fn rect_object<E: ScriptEngine>(engine: &E, rect: BoundingClientRect) -> E::Value {
    engine.build_object(vec![
        ("x".to_string(), engine.number(rect.x)),
        ("y".to_string(), engine.number(rect.y)),
        ("width".to_string(), engine.number(rect.width)),
        ("height".to_string(), engine.number(rect.height)),
        ("top".to_string(), engine.number(rect.top)),
        ("right".to_string(), engine.number(rect.right)),
        ("bottom".to_string(), engine.number(rect.bottom)),
        ("left".to_string(), engine.number(rect.left)),
    ])
}
