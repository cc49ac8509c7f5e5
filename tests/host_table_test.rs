use causeway::host::{
    self, HostTable, PlatformBrightness, ScreenInfo, TestHostTable, HOST_TABLE_VERSION,
};

use std::cell::Cell;
use std::rc::Rc;

fn full_builder() -> host::HostTableBuilder {
    HostTable::builder()
        .flush_commands(|_| {})
        .get_screen(ScreenInfo::default)
        .device_pixel_ratio(|| 2.0)
        .platform_brightness(|| PlatformBrightness::Dark)
        .set_timeout(|_, _| 1)
        .set_interval(|_, _| 1)
        .clear_timeout(|_| {})
        .request_animation_frame(|_| 1)
        .cancel_animation_frame(|_| {})
        .convert_to_image(|_| vec![1, 2, 3])
        .init_window(|_| {})
        .init_document(|_| {})
        .report_error(|_| {})
}

#[test]
fn registered_table_resolves_on_owning_thread() {
    let key = 301;
    host::register_host_table(key, full_builder().build());

    let table = host::host_table(key);
    assert_eq!(table.device_pixel_ratio(), 2.0);
    assert_eq!(table.platform_brightness(), PlatformBrightness::Dark);
    assert_eq!(table.convert_to_image(causeway::TargetId(1)), vec![1, 2, 3]);

    host::unregister_host_table(key);
    let table = host::host_table(key);
    assert_eq!(
        table.device_pixel_ratio(),
        1.0,
        "unregistered key degrades to the disconnected table"
    );
}

#[test]
fn resolution_from_foreign_thread_degrades_to_noop() {
    let key = 302;
    host::register_host_table(key, full_builder().build());
    assert_eq!(host::host_table(key).device_pixel_ratio(), 2.0);

    let handle = std::thread::spawn(move || {
        let table = host::host_table(key);
        // Disconnected entries: defaults and no-ops, never another
        // thread's callbacks.
        let ratio = table.device_pixel_ratio();
        table.flush_commands(&[]);
        table.init_window(key);
        ratio
    });
    let foreign_ratio = handle.join().expect("foreign thread");
    assert_eq!(foreign_ratio, 1.0);

    assert_eq!(
        host::host_table(key).device_pixel_ratio(),
        2.0,
        "owning thread still sees its table"
    );
}

#[test]
#[should_panic(expected = "host method count is not equal")]
fn missing_entry_fails_fast_at_build() {
    // Every entry except reportError.
    let _ = HostTable::builder()
        .flush_commands(|_| {})
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
        .build();
}

#[test]
#[should_panic(expected = "registered twice")]
fn duplicate_entry_fails_fast() {
    let _ = HostTable::builder().flush_commands(|_| {}).flush_commands(|_| {});
}

#[test]
#[should_panic(expected = "does not match bridge version")]
fn version_skew_fails_fast_at_registration() {
    let table = full_builder().version(HOST_TABLE_VERSION + 1).build();
    host::register_host_table(303, table);
}

#[test]
fn test_table_is_registered_separately() {
    assert!(host::test_host_table().is_none());

    let errors = Rc::new(Cell::new(0usize));
    let error_count = Rc::clone(&errors);
    let table = TestHostTable::builder()
        .report_error(move |_| error_count.set(error_count.get() + 1))
        .match_image_snapshot(|image, _| !image.is_empty())
        .environment(|| "{\"platform\":\"test\"}".to_string())
        .simulate_pointer(|_, _, _| {})
        .simulate_key_press(|_| {})
        .build();
    host::register_test_host_table(table);

    let table = host::test_host_table().expect("test table registered");
    table.report_error("boom");
    assert_eq!(errors.get(), 1);
    assert!(table.match_image_snapshot(&[1], "snapshot"));
    assert!(!table.match_image_snapshot(&[], "snapshot"));
    assert_eq!(table.environment(), "{\"platform\":\"test\"}");

    // The production slot for any key is untouched by test registration.
    assert_eq!(host::host_table(304).device_pixel_ratio(), 1.0);
}

#[test]
#[should_panic(expected = "test host method count is not equal")]
fn test_table_missing_entry_fails_fast() {
    let _ = TestHostTable::builder()
        .report_error(|_| {})
        .match_image_snapshot(|_, _| true)
        .environment(String::new)
        .simulate_pointer(|_, _, _| {})
        .build();
}
