use causeway::context::BridgeContext;
use causeway::engine::LocalEngine;
use causeway::registry::ClassKind;

use std::rc::Rc;

#[test]
fn class_singleton_is_unique_per_context() {
    let context = BridgeContext::new(1, 201, LocalEngine::new());

    let first = context.class_singleton(ClassKind::Element);
    let second = context.class_singleton(ClassKind::Element);
    assert!(
        Rc::ptr_eq(&first, &second),
        "repeated lookups return the same singleton"
    );
    assert_eq!(first.kind(), ClassKind::Element);
    assert_eq!(first.context_id(), 1);
}

#[test]
fn distinct_contexts_never_share_singletons() {
    let first_context = BridgeContext::new(1, 202, LocalEngine::new());
    let second_context = BridgeContext::new(2, 203, LocalEngine::new());

    for kind in ClassKind::ALL {
        let a = first_context.class_singleton(kind);
        let b = second_context.class_singleton(kind);
        assert!(
            !Rc::ptr_eq(&a, &b),
            "{} singleton leaked across contexts",
            kind.name()
        );
    }
}

#[test]
fn singletons_for_different_classes_are_distinct() {
    let context = BridgeContext::new(1, 204, LocalEngine::new());
    let element = context.class_singleton(ClassKind::Element);
    let event = context.class_singleton(ClassKind::Event);
    assert!(!Rc::ptr_eq(&element, &event));
    assert_eq!(event.kind(), ClassKind::Event);
}

#[test]
fn install_globals_binds_script_visible_constructors() {
    let context = BridgeContext::new(1, 205, LocalEngine::new());
    context.install_globals();

    let engine = context.engine();
    assert_eq!(engine.bound_class("Image"), Some(ClassKind::ImageElement));
    assert_eq!(engine.bound_class("CustomEvent"), Some(ClassKind::CustomEvent));
    assert_eq!(engine.bound_class("Element"), Some(ClassKind::Element));
    assert_eq!(
        engine.bound_class("CSSStyleDeclaration"),
        Some(ClassKind::StyleDeclaration)
    );
    assert_eq!(engine.bound_class("Node"), None, "Node has no constructor global");
    assert_eq!(engine.bound_class("Event"), None);
}
