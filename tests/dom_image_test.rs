use causeway::commands::{Command, CommandKind, TargetId};
use causeway::context::BridgeContext;
use causeway::dom::ImageElementInstance;
use causeway::engine::{LocalEngine, LocalValue, ScriptEngine};
use causeway::host::{self, HostTable, PlatformBrightness, ScreenInfo};
use causeway::native::{NativeHandle, NativeImageElement};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

struct MiniHost {
    flushes: Rc<Cell<usize>>,
    batches: Rc<RefCell<Vec<Vec<Command>>>>,
}

/// Registers a host that behaves like the real one for image elements:
/// it binds create commands to their counterpart and applies width/height
/// set-property commands to the bound counterpart.
fn register_mini_host(key: i32) -> MiniHost {
    let flushes = Rc::new(Cell::new(0usize));
    let batches: Rc<RefCell<Vec<Vec<Command>>>> = Rc::new(RefCell::new(Vec::new()));
    let bound: Rc<RefCell<HashMap<TargetId, Rc<NativeImageElement>>>> =
        Rc::new(RefCell::new(HashMap::new()));

    let flush_counter = Rc::clone(&flushes);
    let batch_log = Rc::clone(&batches);
    let table = HostTable::builder()
        .flush_commands(move |batch| {
            flush_counter.set(flush_counter.get() + 1);
            for command in batch {
                match command.kind {
                    CommandKind::CreateElement => {
                        if let Some(NativeHandle::Image(native)) = &command.native {
                            bound
                                .borrow_mut()
                                .insert(command.target, Rc::clone(native));
                        }
                    }
                    CommandKind::SetProperty => {
                        if let Some(native) = bound.borrow().get(&command.target) {
                            let value = command.args[1].parse::<f64>().unwrap_or(0.0);
                            match command.args[0].as_str() {
                                "width" => native.set_width(value),
                                "height" => native.set_height(value),
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }
            batch_log.borrow_mut().push(batch.to_vec());
        })
        .get_screen(ScreenInfo::default)
        .device_pixel_ratio(|| 1.0)
        .platform_brightness(|| PlatformBrightness::Light)
        .set_timeout(|_, _| 1)
        .set_interval(|_, _| 1)
        .clear_timeout(|_| {})
        .request_animation_frame(|_| 1)
        .cancel_animation_frame(|_| {})
        .convert_to_image(|_| Vec::new())
        .init_window(|_| {})
        .init_document(|_| {})
        .report_error(|_| {})
        .build();
    host::register_host_table(key, table);
    MiniHost { flushes, batches }
}

fn string(engine: &LocalEngine, value: &str) -> LocalValue {
    let interned = engine.intern(value);
    engine.string_value(&interned)
}

#[test]
fn creating_an_image_queues_one_create_command_with_its_counterpart() {
    let context = BridgeContext::new(1, 501, LocalEngine::new());
    let image = ImageElementInstance::new(&context);

    let queued = context.queued_commands();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].kind, CommandKind::CreateElement);
    assert_eq!(queued[0].args, ["img"]);
    assert_eq!(queued[0].target, image.target());
    assert!(
        queued[0]
            .native
            .as_ref()
            .and_then(NativeHandle::as_image)
            .is_some(),
        "create command carries the image counterpart"
    );
}

#[test]
fn src_is_served_from_the_local_cache_without_flushing() {
    let key = 502;
    let mini = register_mini_host(key);
    let context = BridgeContext::new(1, key, LocalEngine::new());
    let image = ImageElementInstance::new(&context);
    let engine = context.engine();

    assert!(image.get_property("src").is_null(), "unset src reads null");

    image.set_property("src", string(engine, "a.png"));
    assert_eq!(image.get_property("src").as_str(), Some("a.png"));
    assert_eq!(mini.flushes.get(), 0, "string reads never flush");

    image.set_property("loading", string(engine, "lazy"));
    assert_eq!(image.get_property("loading").as_str(), Some("lazy"));

    // Replacement is visible immediately.
    image.set_property("src", string(engine, "b.png"));
    assert_eq!(image.get_property("src").as_str(), Some("b.png"));
    assert_eq!(mini.flushes.get(), 0);
}

#[test]
fn dimension_reads_flush_exactly_once_each_time() {
    let key = 503;
    let mini = register_mini_host(key);
    let context = BridgeContext::new(1, key, LocalEngine::new());
    let image = ImageElementInstance::new(&context);

    let _ = image.get_property("width");
    assert_eq!(mini.flushes.get(), 1);

    // The queue is empty now; the read still flushes.
    let _ = image.get_property("naturalWidth");
    assert_eq!(mini.flushes.get(), 2);
    let _ = image.get_property("naturalHeight");
    assert_eq!(mini.flushes.get(), 3);
}

#[test]
fn width_read_after_write_sees_the_host_applied_value() {
    let key = 504;
    let _mini = register_mini_host(key);
    let context = BridgeContext::new(1, key, LocalEngine::new());
    let image = ImageElementInstance::new(&context);

    image.set_property("width", LocalValue::Number(300.0));
    image.set_property("height", LocalValue::Number(150.0));

    // No explicit flush: the getters force their own.
    assert_eq!(image.get_property("width").as_number(), Some(300.0));
    assert_eq!(image.get_property("height").as_number(), Some(150.0));
}

#[test]
fn create_set_flush_scenario_delivers_commands_in_order() {
    let key = 505;
    let mini = register_mini_host(key);
    let context = BridgeContext::new(1, key, LocalEngine::new());
    let image = ImageElementInstance::new(&context);
    let engine = context.engine();

    assert_eq!(context.pending_commands(), 1, "one create-element command");

    image.set_property("src", string(engine, "a.png"));
    let queued = context.queued_commands();
    assert_eq!(queued.len(), 2);
    assert_eq!(queued[1].kind, CommandKind::SetProperty);
    assert_eq!(queued[1].args, ["src", "a.png"]);

    context.flush();
    assert_eq!(context.pending_commands(), 0);

    let batches = mini.batches.borrow();
    assert_eq!(batches.len(), 1);
    let delivered = &batches[0];
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].kind, CommandKind::CreateElement);
    assert_eq!(delivered[0].args, ["img"]);
    assert_eq!(delivered[1].kind, CommandKind::SetProperty);
    assert_eq!(delivered[1].args, ["src", "a.png"]);
}

#[test]
fn unknown_image_properties_fall_through_to_the_element_chain() {
    let context = BridgeContext::new(1, 506, LocalEngine::new());
    let image = ImageElementInstance::new(&context);
    let engine = context.engine();

    assert_eq!(image.get_property("tagName").as_str(), Some("IMG"));

    image.set_property("alt", string(engine, "portrait"));
    assert_eq!(image.get_property("alt").as_str(), Some("portrait"));

    image.set_attribute("id", string(engine, "hero"));
    assert!(image.has_attribute("id"));
}
