//! Pass-through analysis node with a side-tapped backing unit.
//!
//! The node's input and output are the same unity-gain stage, so the signal
//! is never altered. The analysis unit hangs off that stage as a tap and is
//! only ever read: every metric read is a live query, and readings are
//! scaled by a [`ChannelCorrection`] when the unit reports aggregated stereo.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use stagebox_core::{
    AudioNode, ComponentDescriptor, Endpoint, Error, GraphService, NodeEndpoints, NodeKey,
    NodeState, ParameterId, ParameterSpec, Result, Stage, StreamFormat, UnitBinding, UnitHandle,
};

/// Scale factors applied to raw readings of a unit that sums channels.
///
/// A stereo input summed by the unit reports twice the per-channel amplitude
/// and half the true frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelCorrection {
    pub amplitude: f32,
    pub frequency: f32,
}

impl ChannelCorrection {
    pub const NONE: ChannelCorrection = ChannelCorrection {
        amplitude: 1.0,
        frequency: 1.0,
    };

    pub const STEREO: ChannelCorrection = ChannelCorrection {
        amplitude: 0.5,
        frequency: 2.0,
    };

    #[inline]
    pub fn amplitude(&self, raw: f32) -> f32 {
        raw * self.amplitude
    }

    #[inline]
    pub fn frequency(&self, raw: f32) -> f32 {
        raw * self.frequency
    }
}

impl Default for ChannelCorrection {
    fn default() -> Self {
        Self::STEREO
    }
}

struct AnalysisShared {
    binding: UnitBinding,
    correction: ChannelCorrection,
    started: AtomicBool,
    tap_key: NodeKey,
}

/// Handle to an analysis node. Clones share the same node.
#[derive(Clone)]
pub struct AnalysisNode {
    shared: Arc<AnalysisShared>,
}

impl AnalysisNode {
    /// `specs` declares the unit's configuration parameters (not its outputs).
    pub fn new(
        name: impl Into<String>,
        descriptor: ComponentDescriptor,
        specs: &'static [ParameterSpec],
        initial: &[f32],
        correction: ChannelCorrection,
    ) -> Result<Self> {
        Ok(Self {
            shared: Arc::new(AnalysisShared {
                binding: UnitBinding::new(name, descriptor, specs, initial)?,
                correction,
                started: AtomicBool::new(true),
                tap_key: NodeKey::next(),
            }),
        })
    }

    pub fn descriptor(&self) -> ComponentDescriptor {
        self.shared.binding.descriptor()
    }

    pub fn correction(&self) -> ChannelCorrection {
        self.shared.correction
    }

    /// Raw unit output, queried live.
    pub fn read(&self, id: ParameterId) -> Result<f32> {
        self.shared.binding.read(id)
    }

    pub fn set_value(&self, id: ParameterId, value: f32) -> Result<()> {
        self.shared.binding.set_value(id, value)
    }

    pub fn value(&self, id: ParameterId) -> Option<f32> {
        self.shared.binding.value(id)
    }

    pub(crate) fn value_at(&self, index: usize) -> f32 {
        self.shared.binding.value_at(index)
    }

    pub(crate) fn set_value_at(&self, index: usize, value: f32) -> Result<()> {
        self.shared.binding.set_value_at(index, value)
    }

    /// Resume the unit's processing. No-op if already started.
    ///
    /// Before attachment the request is queued and [`Error::UnitUnavailable`]
    /// is returned.
    pub fn start(&self) -> Result<()> {
        self.set_started(true)
    }

    /// Suspend the unit's processing. The signal still passes through.
    pub fn stop(&self) -> Result<()> {
        self.set_started(false)
    }

    pub fn is_started(&self) -> bool {
        self.shared.started.load(Ordering::Acquire)
    }

    /// A unit that rejects the change leaves the flag as it was.
    fn set_started(&self, started: bool) -> Result<()> {
        if self.shared.started.swap(started, Ordering::AcqRel) == started {
            return Ok(());
        }
        match self.shared.binding.bridge().set_enabled(started) {
            // UnitUnavailable means queued for replay, so the new flag stands
            Err(e) if e != Error::UnitUnavailable => {
                self.shared.started.store(!started, Ordering::Release);
                tracing::warn!("{} rejected enable={}: {}", self.name(), started, e);
                Err(e)
            }
            result => {
                tracing::debug!("{} {}", self.name(), if started { "started" } else { "stopped" });
                result
            }
        }
    }

    pub fn attach_unit(&self, unit: UnitHandle) -> Result<usize> {
        self.shared.binding.attach_unit(unit)
    }

    pub fn detach_unit(&self) -> Option<UnitHandle> {
        self.shared.binding.detach_unit()
    }

    pub fn wait_until_attached(&self, timeout: Duration) -> Result<()> {
        self.shared.binding.wait_until_attached(timeout)
    }

    pub fn is_attached(&self) -> bool {
        self.shared.binding.is_attached()
    }

    pub fn unit_key(&self) -> Option<NodeKey> {
        self.shared.binding.unit_key()
    }

    fn tap(&self) -> Endpoint {
        Endpoint::new(self.shared.tap_key, 0)
    }

    fn on_instantiated(&self, graph: &dyn GraphService, format: StreamFormat, result: Result<UnitHandle>) {
        self.shared.binding.complete_instantiation(graph, result, |key| {
            graph.connect(self.tap(), Endpoint::new(key, 0), format)
        });
    }
}

impl AudioNode for AnalysisNode {
    fn name(&self) -> &str {
        self.shared.binding.name()
    }

    fn endpoints(&self) -> NodeEndpoints {
        NodeEndpoints {
            input: self.tap(),
            output: self.tap(),
        }
    }

    fn install(&self, graph: &Arc<dyn GraphService>, format: StreamFormat) -> Result<()> {
        format.validate()?;
        graph.attach(self.shared.tap_key, Stage::Passthrough)?;

        let node: Weak<AnalysisShared> = Arc::downgrade(&self.shared);
        let service: Weak<dyn GraphService> = Arc::downgrade(graph);
        graph.instantiate(
            self.descriptor(),
            Box::new(move |result: Result<UnitHandle>| {
                let (Some(shared), Some(graph)) = (node.upgrade(), service.upgrade()) else {
                    tracing::debug!("Instantiation completed after node was dropped");
                    return;
                };
                AnalysisNode { shared }.on_instantiated(graph.as_ref(), format, result);
            }),
        );

        tracing::debug!("Installed {} ({})", self.name(), self.descriptor());
        Ok(())
    }

    fn uninstall(&self, graph: &dyn GraphService) -> Result<()> {
        self.shared.binding.uninstall(graph, &[self.shared.tap_key])
    }

    fn state(&self) -> NodeState {
        self.shared.binding.node_state(self.is_started())
    }
}

impl core::fmt::Debug for AnalysisNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnalysisNode")
            .field("name", &self.name())
            .field("descriptor", &self.descriptor())
            .field("correction", &self.shared.correction)
            .field("state", &self.state())
            .finish()
    }
}
