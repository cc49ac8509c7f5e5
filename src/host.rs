//! Host capability tables.
//!
//! The native host supplies its entry points as a named, versioned table
//! registered under the per-context key. Registration fails fast when the
//! entry count or version does not match what this crate was built
//! against, so a host/bridge skew can never silently miscall an entry.
//!
//! Tables live in thread-local storage keyed by the registering thread:
//! resolving a key from any other thread finds nothing and yields the
//! disconnected table, whose entries are all inert. That is the fail-safe
//! for entry points reachable from foreign threads (debuggers, harnesses):
//! a degraded no-op, not a concurrency guarantee.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::warn;

use crate::commands::{Command, TargetId};

/// Bumped whenever the production table's entry set changes shape.
pub const HOST_TABLE_VERSION: u32 = 1;
/// Entry count of the production table.
pub const HOST_METHOD_COUNT: usize = 13;
/// Entry count of the test-environment table.
pub const TEST_HOST_METHOD_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenInfo {
    pub width: f64,
    pub height: f64,
    pub avail_width: f64,
    pub avail_height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformBrightness {
    Light,
    Dark,
}

type FlushFn = Box<dyn Fn(&[Command])>;
type ScreenFn = Box<dyn Fn() -> ScreenInfo>;
type RatioFn = Box<dyn Fn() -> f64>;
type BrightnessFn = Box<dyn Fn() -> PlatformBrightness>;
type TimerStartFn = Box<dyn Fn(u32, i32) -> i32>;
type TimerClearFn = Box<dyn Fn(i32)>;
type FrameRequestFn = Box<dyn Fn(u32) -> i32>;
type FrameCancelFn = Box<dyn Fn(i32)>;
type ImageFn = Box<dyn Fn(TargetId) -> Vec<u8>>;
type InitFn = Box<dyn Fn(i32)>;
type ErrorFn = Box<dyn Fn(&str)>;
type SnapshotFn = Box<dyn Fn(&[u8], &str) -> bool>;
type EnvironmentFn = Box<dyn Fn() -> String>;
type PointerFn = Box<dyn Fn(f64, f64, u32)>;
type KeyFn = Box<dyn Fn(&str)>;

/// Production host table. Construct through [`HostTable::builder`].
pub struct HostTable {
    version: u32,
    flush_commands: FlushFn,
    get_screen: ScreenFn,
    device_pixel_ratio: RatioFn,
    platform_brightness: BrightnessFn,
    set_timeout: TimerStartFn,
    set_interval: TimerStartFn,
    clear_timeout: TimerClearFn,
    request_animation_frame: FrameRequestFn,
    cancel_animation_frame: FrameCancelFn,
    convert_to_image: ImageFn,
    init_window: InitFn,
    init_document: InitFn,
    report_error: ErrorFn,
}

impl HostTable {
    pub fn builder() -> HostTableBuilder {
        HostTableBuilder::default()
    }

    /// Table with every entry inert. Returned for lookups that miss, so a
    /// caller on the wrong thread degrades to no-ops instead of touching
    /// another thread's state.
    pub fn disconnected() -> Rc<HostTable> {
        Rc::new(HostTable {
            version: HOST_TABLE_VERSION,
            flush_commands: Box::new(|_| {}),
            get_screen: Box::new(ScreenInfo::default),
            device_pixel_ratio: Box::new(|| 1.0),
            platform_brightness: Box::new(|| PlatformBrightness::Light),
            set_timeout: Box::new(|_, _| 0),
            set_interval: Box::new(|_, _| 0),
            clear_timeout: Box::new(|_| {}),
            request_animation_frame: Box::new(|_| 0),
            cancel_animation_frame: Box::new(|_| {}),
            convert_to_image: Box::new(|_| Vec::new()),
            init_window: Box::new(|_| {}),
            init_document: Box::new(|_| {}),
            report_error: Box::new(|_| {}),
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Hand an ordered batch to the host. Synchronous: the host has
    /// applied every command when this returns.
    pub fn flush_commands(&self, batch: &[Command]) {
        (self.flush_commands)(batch)
    }

    pub fn get_screen(&self) -> ScreenInfo {
        (self.get_screen)()
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        (self.device_pixel_ratio)()
    }

    pub fn platform_brightness(&self) -> PlatformBrightness {
        (self.platform_brightness)()
    }

    pub fn set_timeout(&self, callback: u32, delay_ms: i32) -> i32 {
        (self.set_timeout)(callback, delay_ms)
    }

    pub fn set_interval(&self, callback: u32, delay_ms: i32) -> i32 {
        (self.set_interval)(callback, delay_ms)
    }

    pub fn clear_timeout(&self, timer_id: i32) {
        (self.clear_timeout)(timer_id)
    }

    pub fn request_animation_frame(&self, callback: u32) -> i32 {
        (self.request_animation_frame)(callback)
    }

    pub fn cancel_animation_frame(&self, frame_id: i32) {
        (self.cancel_animation_frame)(frame_id)
    }

    pub fn convert_to_image(&self, target: TargetId) -> Vec<u8> {
        (self.convert_to_image)(target)
    }

    pub fn init_window(&self, context_key: i32) {
        (self.init_window)(context_key)
    }

    pub fn init_document(&self, context_key: i32) {
        (self.init_document)(context_key)
    }

    pub fn report_error(&self, message: &str) {
        (self.report_error)(message)
    }
}

fn take_entry<T>(entry: Option<T>, name: &str) -> T {
    entry.unwrap_or_else(|| panic!("host method table is missing entry '{name}'"))
}

/// Collects named entries for a [`HostTable`]. `build` asserts the entry
/// count against [`HOST_METHOD_COUNT`]; a host compiled against a
/// different table shape dies here instead of miscalling entries later.
#[derive(Default)]
pub struct HostTableBuilder {
    version: Option<u32>,
    provided: Vec<&'static str>,
    flush_commands: Option<FlushFn>,
    get_screen: Option<ScreenFn>,
    device_pixel_ratio: Option<RatioFn>,
    platform_brightness: Option<BrightnessFn>,
    set_timeout: Option<TimerStartFn>,
    set_interval: Option<TimerStartFn>,
    clear_timeout: Option<TimerClearFn>,
    request_animation_frame: Option<FrameRequestFn>,
    cancel_animation_frame: Option<FrameCancelFn>,
    convert_to_image: Option<ImageFn>,
    init_window: Option<InitFn>,
    init_document: Option<InitFn>,
    report_error: Option<ErrorFn>,
}

impl HostTableBuilder {
    fn provide(&mut self, name: &'static str) {
        assert!(
            !self.provided.contains(&name),
            "host method '{name}' registered twice"
        );
        self.provided.push(name);
    }

    /// Declare the table shape the host was compiled against. Defaults to
    /// [`HOST_TABLE_VERSION`] when not called.
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn flush_commands(mut self, f: impl Fn(&[Command]) + 'static) -> Self {
        self.provide("flushCommands");
        self.flush_commands = Some(Box::new(f));
        self
    }

    pub fn get_screen(mut self, f: impl Fn() -> ScreenInfo + 'static) -> Self {
        self.provide("getScreen");
        self.get_screen = Some(Box::new(f));
        self
    }

    pub fn device_pixel_ratio(mut self, f: impl Fn() -> f64 + 'static) -> Self {
        self.provide("devicePixelRatio");
        self.device_pixel_ratio = Some(Box::new(f));
        self
    }

    pub fn platform_brightness(mut self, f: impl Fn() -> PlatformBrightness + 'static) -> Self {
        self.provide("platformBrightness");
        self.platform_brightness = Some(Box::new(f));
        self
    }

    pub fn set_timeout(mut self, f: impl Fn(u32, i32) -> i32 + 'static) -> Self {
        self.provide("setTimeout");
        self.set_timeout = Some(Box::new(f));
        self
    }

    pub fn set_interval(mut self, f: impl Fn(u32, i32) -> i32 + 'static) -> Self {
        self.provide("setInterval");
        self.set_interval = Some(Box::new(f));
        self
    }

    pub fn clear_timeout(mut self, f: impl Fn(i32) + 'static) -> Self {
        self.provide("clearTimeout");
        self.clear_timeout = Some(Box::new(f));
        self
    }

    pub fn request_animation_frame(mut self, f: impl Fn(u32) -> i32 + 'static) -> Self {
        self.provide("requestAnimationFrame");
        self.request_animation_frame = Some(Box::new(f));
        self
    }

    pub fn cancel_animation_frame(mut self, f: impl Fn(i32) + 'static) -> Self {
        self.provide("cancelAnimationFrame");
        self.cancel_animation_frame = Some(Box::new(f));
        self
    }

    pub fn convert_to_image(mut self, f: impl Fn(TargetId) -> Vec<u8> + 'static) -> Self {
        self.provide("convertToImage");
        self.convert_to_image = Some(Box::new(f));
        self
    }

    pub fn init_window(mut self, f: impl Fn(i32) + 'static) -> Self {
        self.provide("initWindow");
        self.init_window = Some(Box::new(f));
        self
    }

    pub fn init_document(mut self, f: impl Fn(i32) + 'static) -> Self {
        self.provide("initDocument");
        self.init_document = Some(Box::new(f));
        self
    }

    pub fn report_error(mut self, f: impl Fn(&str) + 'static) -> Self {
        self.provide("reportError");
        self.report_error = Some(Box::new(f));
        self
    }

    pub fn build(self) -> HostTable {
        assert_eq!(
            self.provided.len(),
            HOST_METHOD_COUNT,
            "host method count is not equal with bridge side method registrations ({} provided, {} expected)",
            self.provided.len(),
            HOST_METHOD_COUNT,
        );
        HostTable {
            version: self.version.unwrap_or(HOST_TABLE_VERSION),
            flush_commands: take_entry(self.flush_commands, "flushCommands"),
            get_screen: take_entry(self.get_screen, "getScreen"),
            device_pixel_ratio: take_entry(self.device_pixel_ratio, "devicePixelRatio"),
            platform_brightness: take_entry(self.platform_brightness, "platformBrightness"),
            set_timeout: take_entry(self.set_timeout, "setTimeout"),
            set_interval: take_entry(self.set_interval, "setInterval"),
            clear_timeout: take_entry(self.clear_timeout, "clearTimeout"),
            request_animation_frame: take_entry(
                self.request_animation_frame,
                "requestAnimationFrame",
            ),
            cancel_animation_frame: take_entry(
                self.cancel_animation_frame,
                "cancelAnimationFrame",
            ),
            convert_to_image: take_entry(self.convert_to_image, "convertToImage"),
            init_window: take_entry(self.init_window, "initWindow"),
            init_document: take_entry(self.init_document, "initDocument"),
            report_error: take_entry(self.report_error, "reportError"),
        }
    }
}

/// Reduced table for test environments. Registered separately from the
/// production table and never mixed with it.
pub struct TestHostTable {
    report_error: ErrorFn,
    match_image_snapshot: SnapshotFn,
    environment: EnvironmentFn,
    simulate_pointer: PointerFn,
    simulate_key_press: KeyFn,
}

impl TestHostTable {
    pub fn builder() -> TestHostTableBuilder {
        TestHostTableBuilder::default()
    }

    pub fn report_error(&self, message: &str) {
        (self.report_error)(message)
    }

    pub fn match_image_snapshot(&self, image: &[u8], name: &str) -> bool {
        (self.match_image_snapshot)(image, name)
    }

    pub fn environment(&self) -> String {
        (self.environment)()
    }

    pub fn simulate_pointer(&self, x: f64, y: f64, change: u32) {
        (self.simulate_pointer)(x, y, change)
    }

    pub fn simulate_key_press(&self, key: &str) {
        (self.simulate_key_press)(key)
    }
}

#[derive(Default)]
pub struct TestHostTableBuilder {
    provided: Vec<&'static str>,
    report_error: Option<ErrorFn>,
    match_image_snapshot: Option<SnapshotFn>,
    environment: Option<EnvironmentFn>,
    simulate_pointer: Option<PointerFn>,
    simulate_key_press: Option<KeyFn>,
}

impl TestHostTableBuilder {
    fn provide(&mut self, name: &'static str) {
        assert!(
            !self.provided.contains(&name),
            "test host method '{name}' registered twice"
        );
        self.provided.push(name);
    }

    pub fn report_error(mut self, f: impl Fn(&str) + 'static) -> Self {
        self.provide("reportError");
        self.report_error = Some(Box::new(f));
        self
    }

    pub fn match_image_snapshot(mut self, f: impl Fn(&[u8], &str) -> bool + 'static) -> Self {
        self.provide("matchImageSnapshot");
        self.match_image_snapshot = Some(Box::new(f));
        self
    }

    pub fn environment(mut self, f: impl Fn() -> String + 'static) -> Self {
        self.provide("environment");
        self.environment = Some(Box::new(f));
        self
    }

    pub fn simulate_pointer(mut self, f: impl Fn(f64, f64, u32) + 'static) -> Self {
        self.provide("simulatePointer");
        self.simulate_pointer = Some(Box::new(f));
        self
    }

    pub fn simulate_key_press(mut self, f: impl Fn(&str) + 'static) -> Self {
        self.provide("simulateKeyPress");
        self.simulate_key_press = Some(Box::new(f));
        self
    }

    pub fn build(self) -> TestHostTable {
        assert_eq!(
            self.provided.len(),
            TEST_HOST_METHOD_COUNT,
            "test host method count is not equal with bridge side method registrations ({} provided, {} expected)",
            self.provided.len(),
            TEST_HOST_METHOD_COUNT,
        );
        TestHostTable {
            report_error: take_entry(self.report_error, "reportError"),
            match_image_snapshot: take_entry(self.match_image_snapshot, "matchImageSnapshot"),
            environment: take_entry(self.environment, "environment"),
            simulate_pointer: take_entry(self.simulate_pointer, "simulatePointer"),
            simulate_key_press: take_entry(self.simulate_key_press, "simulateKeyPress"),
        }
    }
}

thread_local! {
    static HOST_TABLES: RefCell<HashMap<i32, Rc<HostTable>>> = RefCell::new(HashMap::new());
    static TEST_HOST_TABLE: RefCell<Option<Rc<TestHostTable>>> = const { RefCell::new(None) };
}

/// Register the production table for a context key on the calling thread.
/// Panics on version skew; replaces any table previously registered under
/// the key.
pub fn register_host_table(context_key: i32, table: HostTable) {
    assert_eq!(
        table.version, HOST_TABLE_VERSION,
        "host table version {} does not match bridge version {}",
        table.version, HOST_TABLE_VERSION,
    );
    HOST_TABLES.with(|tables| {
        tables.borrow_mut().insert(context_key, Rc::new(table));
    });
}

/// Resolve the table registered under `context_key` on the calling thread.
/// A miss (unknown key, or a caller on a thread that never registered it)
/// yields the disconnected table.
pub fn host_table(context_key: i32) -> Rc<HostTable> {
    HOST_TABLES.with(|tables| {
        if let Some(table) = tables.borrow().get(&context_key) {
            return Rc::clone(table);
        }
        warn!(
            target = "bridge",
            context_key, "no host table reachable from this thread; entries degrade to no-ops"
        );
        HostTable::disconnected()
    })
}

/// Remove a context key's table (context teardown).
pub fn unregister_host_table(context_key: i32) {
    HOST_TABLES.with(|tables| {
        tables.borrow_mut().remove(&context_key);
    });
}

/// Register the test-environment table on the calling thread.
pub fn register_test_host_table(table: TestHostTable) {
    TEST_HOST_TABLE.with(|slot| {
        *slot.borrow_mut() = Some(Rc::new(table));
    });
}

/// The test-environment table, when one has been registered on the calling
/// thread.
pub fn test_host_table() -> Option<Rc<TestHostTable>> {
    TEST_HOST_TABLE.with(|slot| slot.borrow().clone())
}
