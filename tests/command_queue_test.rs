use causeway::commands::{CommandKind, CommandQueue, TargetId};
use causeway::context::BridgeContext;
use causeway::engine::LocalEngine;
use causeway::host::{self, HostTable, PlatformBrightness, ScreenInfo};

use std::cell::RefCell;
use std::rc::Rc;

type Batches = Rc<RefCell<Vec<Vec<causeway::Command>>>>;

fn register_recording_host(key: i32) -> Batches {
    let batches: Batches = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&batches);
    let table = HostTable::builder()
        .flush_commands(move |batch| sink.borrow_mut().push(batch.to_vec()))
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
    batches
}

#[test]
fn commands_preserve_program_order_across_targets() {
    let mut queue = CommandQueue::new();
    let first = TargetId(1);
    let second = TargetId(2);
    let third = TargetId(3);

    queue.register_command(
        first,
        CommandKind::CreateElement,
        vec!["div".to_string()],
        None,
    );
    queue.register_command(
        second,
        CommandKind::CreateElement,
        vec!["img".to_string()],
        None,
    );
    queue.register_command(
        first,
        CommandKind::SetProperty,
        vec!["id".to_string(), "a".to_string()],
        None,
    );
    queue.register_command(
        third,
        CommandKind::SetStyle,
        vec!["width".to_string(), "10px".to_string()],
        None,
    );
    queue.register_command(
        second,
        CommandKind::SetProperty,
        vec!["src".to_string(), "b.png".to_string()],
        None,
    );

    let batch = queue.take_batch();
    let order: Vec<(TargetId, CommandKind)> =
        batch.iter().map(|command| (command.target, command.kind)).collect();
    assert_eq!(
        order,
        vec![
            (first, CommandKind::CreateElement),
            (second, CommandKind::CreateElement),
            (first, CommandKind::SetProperty),
            (third, CommandKind::SetStyle),
            (second, CommandKind::SetProperty),
        ],
    );
    assert!(queue.is_empty(), "take_batch leaves the queue empty");
}

#[test]
fn flush_hands_batch_to_host_and_clears_queue() {
    let key = 101;
    let batches = register_recording_host(key);
    let context = BridgeContext::new(1, key, LocalEngine::new());

    let a = context.allocate_target_id();
    let b = context.allocate_target_id();
    context.register_command(
        a,
        CommandKind::CreateElement,
        vec!["div".to_string()],
        None,
    );
    context.register_command(
        b,
        CommandKind::SetProperty,
        vec!["id".to_string(), "x".to_string()],
        None,
    );
    assert_eq!(context.pending_commands(), 2);

    context.flush();
    assert_eq!(context.pending_commands(), 0);

    let recorded = batches.borrow();
    assert_eq!(recorded.len(), 1, "one batch delivered");
    assert_eq!(recorded[0].len(), 2);
    assert_eq!(recorded[0][0].target, a);
    assert_eq!(recorded[0][1].target, b);
}

#[test]
fn target_ids_are_unique_and_monotonic() {
    let context = BridgeContext::new(1, 102, LocalEngine::new());
    let ids: Vec<TargetId> = (0..100).map(|_| context.allocate_target_id()).collect();
    let mut deduped = ids.clone();
    deduped.dedup();
    assert_eq!(ids, deduped);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn command_wire_shape_omits_native_handle() {
    let command = causeway::Command {
        target: TargetId(7),
        kind: CommandKind::SetProperty,
        args: vec!["src".to_string(), "a.png".to_string()],
        native: None,
    };
    assert_eq!(command.arg_count(), 2);

    let encoded = serde_json::to_value(&command).expect("serialize command");
    assert_eq!(
        encoded,
        serde_json::json!({
            "target": 7,
            "kind": "set_property",
            "args": ["src", "a.png"],
        }),
    );
}
