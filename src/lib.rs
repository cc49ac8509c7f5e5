//! causeway: a bridge between an embedded script engine's DOM-like object
//! model and the native host that owns rendering and layout.
//!
//! Script-side mutations are serialized into an ordered command queue and
//! delivered to the host in batches; reads whose value depends on
//! host-computed layout force a synchronous flush first. The object model
//! is written once against the [`engine::ScriptEngine`] seam so different
//! engine backends can plug in their own value representations.

pub mod commands;
pub mod context;
pub mod dom;
pub mod engine;
pub mod error;
pub mod host;
pub mod native;
pub mod registry;

pub use commands::{Command, CommandKind, CommandQueue, TargetId};
pub use context::BridgeContext;
pub use error::{BridgeError, Result};
pub use registry::{ClassKind, ClassSingleton, ContextId};
