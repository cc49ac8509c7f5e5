//! Outbound command queue: DOM mutations serialized into ordered,
//! host-consumable instructions.
//!
//! The queue is a context-scoped, single-thread structure (see the
//! threading contract on [`BridgeContext`](crate::context::BridgeContext)).
//! Appends are O(1) and never reorder or coalesce: the batch handed to the
//! host on flush is exactly the program-order sequence of
//! `register_command` calls, across all targets of the context.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::native::NativeHandle;

/// Stable identifier addressing one instance's native counterpart across
/// the command channel. Unique within a context for the instance lifetime.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    CreateElement,
    SetProperty,
    RemoveProperty,
    SetStyle,
    RemoveElement,
}

/// One serialized mutation instruction. Immutable once queued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub target: TargetId,
    pub kind: CommandKind,
    pub args: Vec<String>,
    /// Counterpart reference for the host to bind; process-local, not part
    /// of the serialized wire shape.
    #[serde(skip)]
    pub native: Option<NativeHandle>,
}

impl Command {
    /// Argument count as carried by the wire contract.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}

#[derive(Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one command in program order. Never fails; allocation
    /// failure aborts the process.
    pub fn register_command(
        &mut self,
        target: TargetId,
        kind: CommandKind,
        args: Vec<String>,
        native: Option<NativeHandle>,
    ) {
        self.pending.push(Command {
            target,
            kind,
            args,
            native,
        });
    }

    /// Take the whole ordered batch, leaving the queue empty.
    pub fn take_batch(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.pending
    }
}
