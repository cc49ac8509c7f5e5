//! Per-context bridge state: the ownership arena tying one script context
//! to its class singletons, command queue, and host table key.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::commands::{Command, CommandKind, CommandQueue, TargetId};
use crate::engine::ScriptEngine;
use crate::host;
use crate::native::NativeHandle;
use crate::registry::{ClassKind, ClassRegistry, ClassSingleton, ContextId};

/// One per script execution context.
///
/// Owns the class-singleton table, the outbound command queue, and the
/// target-id allocator. Everything here is single-thread state: a
/// `BridgeContext` and every instance created through it must only be
/// touched from the thread that owns the script context. That discipline
/// is a precondition of the whole object model, not something these types
/// enforce with locks.
///
/// Dropping the context tears down the singletons and discards any
/// queued-but-unflushed commands.
pub struct BridgeContext<E: ScriptEngine> {
    id: ContextId,
    host_key: i32,
    engine: E,
    registry: ClassRegistry,
    queue: RefCell<CommandQueue>,
    next_target: Cell<u64>,
}

impl<E: ScriptEngine> BridgeContext<E> {
    pub fn new(id: ContextId, host_key: i32, engine: E) -> Rc<Self> {
        Rc::new(Self {
            id,
            host_key,
            engine,
            registry: ClassRegistry::new(),
            queue: RefCell::new(CommandQueue::new()),
            next_target: Cell::new(1),
        })
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Key under which the host registered this context's capability table.
    pub fn host_key(&self) -> i32 {
        self.host_key
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The unique class singleton for `kind` in this context, created on
    /// first use.
    pub fn class_singleton(&self, kind: ClassKind) -> Rc<ClassSingleton> {
        self.registry.class_singleton(self.id, kind)
    }

    /// Allocate a fresh target identifier. Monotonic; never reused within
    /// this context.
    pub fn allocate_target_id(&self) -> TargetId {
        let id = self.next_target.get();
        self.next_target.set(id + 1);
        TargetId(id)
    }

    /// Append one command to the outbound queue in program order.
    pub fn register_command(
        &self,
        target: TargetId,
        kind: CommandKind,
        args: Vec<String>,
        native: Option<NativeHandle>,
    ) {
        self.queue
            .borrow_mut()
            .register_command(target, kind, args, native);
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Snapshot of the queued batch, in order. Test/diagnostic aid; the
    /// queue itself is untouched.
    pub fn queued_commands(&self) -> Vec<Command> {
        self.queue.borrow().commands().to_vec()
    }

    /// Hand the whole queued batch to the host and clear the queue.
    ///
    /// Synchronous and blocking: when this returns, the host has applied
    /// every command, so a native counterpart read issued afterwards
    /// observes all previously queued mutations. Called even when the
    /// queue is empty; the flush itself is the synchronization point.
    pub fn flush(&self) {
        let batch = self.queue.borrow_mut().take_batch();
        let table = host::host_table(self.host_key);
        debug!(
            target = "bridge",
            context = self.id,
            commands = batch.len(),
            "flushing command batch"
        );
        table.flush_commands(&batch);
    }

    /// Install the script-visible constructors into the engine's global
    /// object and let the host initialize its window/document state for
    /// this context. Called once after the context is created.
    pub fn install_globals(self: &Rc<Self>) {
        for kind in ClassKind::ALL {
            if let Some(name) = kind.global_binding() {
                self.class_singleton(kind);
                self.engine.bind_class(name, kind);
            }
        }
        let table = host::host_table(self.host_key);
        table.init_window(self.host_key);
        table.init_document(self.host_key);
    }
}

impl<E: ScriptEngine> Drop for BridgeContext<E> {
    fn drop(&mut self) {
        let unflushed = self.queue.borrow().len();
        if unflushed > 0 {
            debug!(
                target = "bridge",
                context = self.id,
                commands = unflushed,
                "discarding unflushed commands at context teardown"
            );
        }
    }
}
