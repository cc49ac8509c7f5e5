//! Image element: the dimension properties are host-computed and force a
//! flush before reading the native counterpart; `src` and `loading` are
//! write-through string caches served locally.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::OnceLock;

use crate::commands::CommandKind;
use crate::context::BridgeContext;
use crate::engine::ScriptEngine;
use crate::native::{NativeHandle, NativeImageElement};
use crate::registry::ClassKind;

use super::element::ElementInstance;

#[derive(Clone, Copy, Debug)]
enum ImageProperty {
    Width,
    Height,
    NaturalWidth,
    NaturalHeight,
    Src,
    Loading,
}

fn image_property_map() -> &'static HashMap<&'static str, ImageProperty> {
    static MAP: OnceLock<HashMap<&'static str, ImageProperty>> = OnceLock::new();
    MAP.get_or_init(|| {
        HashMap::from([
            ("width", ImageProperty::Width),
            ("height", ImageProperty::Height),
            ("naturalWidth", ImageProperty::NaturalWidth),
            ("naturalHeight", ImageProperty::NaturalHeight),
            ("src", ImageProperty::Src),
            ("loading", ImageProperty::Loading),
        ])
    })
}

pub struct ImageElementInstance<E: ScriptEngine> {
    element: ElementInstance<E>,
    native: Rc<NativeImageElement>,
    src: RefCell<Option<E::Str>>,
    loading: RefCell<Option<E::Str>>,
}

impl<E: ScriptEngine> ImageElementInstance<E> {
    /// Construct an `img` element. The create command carries the image
    /// counterpart handle so the host binds the target id to it.
    pub fn new(context: &Rc<BridgeContext<E>>) -> Self {
        let element = ElementInstance::construct(context, ClassKind::ImageElement, "img", false);
        let native = Rc::new(NativeImageElement::default());
        context.register_command(
            element.target(),
            CommandKind::CreateElement,
            vec!["img".to_string()],
            Some(NativeHandle::Image(Rc::clone(&native))),
        );
        Self {
            element,
            native,
            src: RefCell::new(None),
            loading: RefCell::new(None),
        }
    }

    pub fn element(&self) -> &ElementInstance<E> {
        &self.element
    }

    pub fn get_property(&self, name: &str) -> E::Value {
        let engine = self.element.node().context().engine();
        match image_property_map().get(name) {
            Some(ImageProperty::Width) => {
                self.element.node().context().flush();
                engine.number(self.native.image_width())
            }
            Some(ImageProperty::Height) => {
                self.element.node().context().flush();
                engine.number(self.native.image_height())
            }
            Some(ImageProperty::NaturalWidth) => {
                self.element.node().context().flush();
                engine.number(self.native.image_natural_width())
            }
            Some(ImageProperty::NaturalHeight) => {
                self.element.node().context().flush();
                engine.number(self.native.image_natural_height())
            }
            Some(ImageProperty::Src) => match self.src.borrow().as_ref() {
                Some(value) => engine.string_value(value),
                None => engine.null(),
            },
            Some(ImageProperty::Loading) => match self.loading.borrow().as_ref() {
                Some(value) => engine.string_value(value),
                None => engine.null(),
            },
            None => self.element.get_property(name),
        }
    }

    pub fn set_property(&self, name: &str, value: E::Value) {
        let engine = self.element.node().context().engine();
        match image_property_map().get(name) {
            Some(ImageProperty::Width) | Some(ImageProperty::Height) => {
                let serialized = engine.stringify(&value);
                self.register_set(name, serialized);
            }
            Some(ImageProperty::Src) => {
                let serialized = engine.stringify(&value);
                // Replacing the cache releases the previous retention.
                *self.src.borrow_mut() = Some(engine.intern(&serialized));
                self.register_set(name, serialized);
            }
            Some(ImageProperty::Loading) => {
                let serialized = engine.stringify(&value);
                *self.loading.borrow_mut() = Some(engine.intern(&serialized));
                self.register_set(name, serialized);
            }
            Some(ImageProperty::NaturalWidth) | Some(ImageProperty::NaturalHeight) => {}
            None => self.element.set_property(name, value),
        }
    }

    fn register_set(&self, name: &str, value: String) {
        self.element.node().context().register_command(
            self.element.target(),
            CommandKind::SetProperty,
            vec![name.to_string(), value],
            None,
        );
    }
}

impl<E: ScriptEngine> Deref for ImageElementInstance<E> {
    type Target = ElementInstance<E>;

    fn deref(&self) -> &ElementInstance<E> {
        &self.element
    }
}
