//! Control-plane kernel for nodes that wrap black-box audio units.
//!
//! # Primary API
//!
//! - [`ParameterSpec`] / [`clamp`]: declarative parameter ranges, clamped on every write
//! - [`ParameterBridge`]: get/set unit parameters; queues writes until the unit attaches
//! - [`BypassCrossfadeMixer`]: start/stop as a dry/wet gain change, never a topology change
//! - [`GraphService`] / [`BackingUnit`]: the two external collaborators
//! - [`AttachmentGate`]: pending state plus completion event for asynchronous attachment
//! - [`UnitBinding`]: values, bridge and gate shared by every node kind
//! - [`OfflineGraph`] / [`SoftUnit`]: in-process graph service for headless hosts
//!
//! # Example
//!
//! ```
//! use stagebox_core::{BypassCrossfadeMixer, Gains};
//!
//! let mut mixer = BypassCrossfadeMixer::default();
//! mixer.stop();
//! assert_eq!(mixer.gains(), Gains::BYPASS);
//! mixer.start();
//! assert_eq!(mixer.mix(), 100.0);
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod parameter;
pub use parameter::{
    clamp, validate_specs, ParameterId, ParameterScope, ParameterSpec, ParameterUnit,
    ParameterValues,
};

pub mod unit;
pub use unit::{BackingUnit, ComponentDescriptor, ComponentKind, FourCc, UnitHandle};

mod bridge;
pub use bridge::{ParameterBridge, PendingWrite};

mod crossfade;
pub use crossfade::{BypassCrossfadeMixer, CrossfadeStage, Gains};

pub mod graph;
pub use graph::{
    AudioNode, Endpoint, GraphService, InstantiateCallback, NodeEndpoints, NodeKey, NodeState,
    Stage,
};

mod lifecycle;
pub use lifecycle::{AttachmentGate, Lifecycle};

mod binding;
pub use binding::{detach_all, UnitBinding};

mod config;
pub use config::StreamFormat;

pub mod offline;
pub use offline::{Connection, OfflineGraph, SoftUnit};
