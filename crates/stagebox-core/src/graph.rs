//! Interfaces to the host audio graph.
//!
//! The graph itself (buffering, format negotiation, scheduling) is external.
//! Nodes only see [`GraphService`]: attach/detach stages, connect/disconnect
//! endpoints, and asynchronously instantiate backing units.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::StreamFormat;
use crate::crossfade::CrossfadeStage;
use crate::unit::{ComponentDescriptor, UnitHandle};
use crate::Result;

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a stage or unit in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey(u64);

impl NodeKey {
    /// Allocate a fresh key.
    pub fn next() -> Self {
        Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// One audio connection point: a bus on a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub node: NodeKey,
    pub bus: u32,
}

impl Endpoint {
    pub const fn new(node: NodeKey, bus: u32) -> Self {
        Self { node, bus }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.bus)
    }
}

/// The single input and single output a node exposes to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeEndpoints {
    pub input: Endpoint,
    pub output: Endpoint,
}

/// Host-provided stages a node asks the graph to attach.
#[derive(Debug, Clone)]
pub enum Stage {
    /// Unity-gain stage. Its output may be connected to any number of inputs.
    Passthrough,
    /// Summing stage: bus 0 is the dry path, bus 1 the wet path, each scaled
    /// by the gains the stage publishes.
    Crossfade(CrossfadeStage),
}

/// Completion callback for [`GraphService::instantiate`].
pub type InstantiateCallback = Box<dyn FnOnce(Result<UnitHandle>) + Send + 'static>;

/// Graph service consumed by nodes.
pub trait GraphService: Send + Sync {
    fn attach(&self, key: NodeKey, stage: Stage) -> Result<()>;

    /// Remove a stage or unit together with every connection touching it.
    fn detach(&self, key: NodeKey) -> Result<()>;

    fn connect(&self, from: Endpoint, to: Endpoint, format: StreamFormat) -> Result<()>;

    fn disconnect(&self, from: Endpoint, to: Endpoint) -> Result<()>;

    /// Instantiate a backing unit. Not guaranteed to complete synchronously:
    /// `on_ready` may run later, on another thread.
    fn instantiate(&self, descriptor: ComponentDescriptor, on_ready: InstantiateCallback);
}

/// Lifecycle of a node as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Waiting for the backing unit to attach.
    Constructing,
    Started,
    Stopped,
    /// Instantiation of the backing unit failed.
    Failed,
    /// Torn down; the backing unit is gone.
    Detached,
}

impl NodeState {
    pub fn is_attached(&self) -> bool {
        matches!(self, NodeState::Started | NodeState::Stopped)
    }
}

/// Behaviour shared by every node type.
pub trait AudioNode: Send + Sync {
    fn name(&self) -> &str;

    fn endpoints(&self) -> NodeEndpoints;

    /// Attach the node's stages, wire them, and request its backing unit.
    ///
    /// Returns once the request is issued; the unit attaches when the graph
    /// invokes the instantiate callback.
    fn install(&self, graph: &Arc<dyn GraphService>, format: StreamFormat) -> Result<()>;

    /// Tear down the backing unit and remove the node's stages.
    fn uninstall(&self, graph: &dyn GraphService) -> Result<()>;

    fn state(&self) -> NodeState;
}
