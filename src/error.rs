use thiserror::Error;

/// Errors surfaced to script callers.
///
/// Structural faults (host table version skew, dangling class singletons)
/// are not represented here: they are programming errors and fail fast
/// with a panic instead of propagating.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Argument-contract violation, surfaced to script as a TypeError with
    /// a message naming the offending call and argument count.
    #[error("{0}")]
    Type(String),
}

impl BridgeError {
    pub fn type_error(message: impl Into<String>) -> Self {
        BridgeError::Type(message.into())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
