//! Error types for stagebox-core.

use crate::parameter::ParameterId;
use thiserror::Error;

/// Error type for node, bridge and graph operations.
///
/// Out-of-range parameter values are never an error: they are clamped.
/// Redundant `start()`/`stop()` calls are no-ops, not errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The backing unit has not attached yet, or has been torn down.
    ///
    /// Writes that fail with this error are queued and replayed once a unit attaches.
    #[error("Backing unit unavailable (not attached yet or torn down)")]
    UnitUnavailable,

    #[error("Backing unit already attached")]
    AlreadyAttached,

    #[error("Node has been detached from the graph")]
    NodeDetached,

    #[error("Unknown parameter: {0}")]
    UnknownParameter(ParameterId),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid parameter spec: {0}")]
    InvalidParameterSpec(String),

    #[error("Unit instantiation failed: {0}")]
    Instantiation(String),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Unit error: {0}")]
    Unit(String),

    #[error("Timed out waiting for the backing unit to attach")]
    AttachTimeout,
}

impl Error {
    /// Whether retrying after attachment completes can succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::UnitUnavailable | Error::AttachTimeout)
    }
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
