//! Generic effect node: a backing unit wrapped in a bypass crossfade.
//!
//! Topology installed per node:
//!
//! ```text
//! input ──────────────────────► crossfade:0 (dry)
//!   └──► unit ────────────────► crossfade:1 (wet) ──► output
//! ```
//!
//! The unit leg is wired when the graph's instantiate callback fires. Until
//! then the node is fully usable: values are clamped and stored, writes are
//! queued for replay, and start/stop move the crossfade gains.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use stagebox_core::{
    detach_all, AudioNode, BypassCrossfadeMixer, ComponentDescriptor, CrossfadeStage, Endpoint,
    Gains, GraphService, NodeEndpoints, NodeKey, NodeState, ParameterId, ParameterSpec, Result,
    Stage, StreamFormat, UnitBinding, UnitHandle,
};

struct EffectShared {
    binding: UnitBinding,
    mixer: Mutex<BypassCrossfadeMixer>,
    input_key: NodeKey,
    crossfade_key: NodeKey,
}

/// Handle to an effect node. Clones share the same node.
#[derive(Clone)]
pub struct EffectNode {
    shared: Arc<EffectShared>,
}

impl EffectNode {
    /// Create a node for `descriptor` with one value per spec.
    ///
    /// `initial[i]` is clamped into `specs[i]`; missing entries take the
    /// spec default. Every value is staged for replay once the unit attaches.
    pub fn new(
        name: impl Into<String>,
        descriptor: ComponentDescriptor,
        specs: &'static [ParameterSpec],
        initial: &[f32],
        mix: f32,
    ) -> Result<Self> {
        Ok(Self {
            shared: Arc::new(EffectShared {
                binding: UnitBinding::new(name, descriptor, specs, initial)?,
                mixer: Mutex::new(BypassCrossfadeMixer::new(mix)),
                input_key: NodeKey::next(),
                crossfade_key: NodeKey::next(),
            }),
        })
    }

    pub fn descriptor(&self) -> ComponentDescriptor {
        self.shared.binding.descriptor()
    }

    pub fn specs(&self) -> &'static [ParameterSpec] {
        self.shared.binding.specs()
    }

    // ==================== Parameters ====================

    /// Clamp, store, and forward a parameter value.
    ///
    /// Before attachment the stored value is kept and queued, and
    /// [`Error::UnitUnavailable`](stagebox_core::Error::UnitUnavailable) is returned.
    pub fn set_value(&self, id: ParameterId, value: f32) -> Result<()> {
        self.shared.binding.set_value(id, value)
    }

    /// Stored (clamped) value, or `None` for an undeclared id.
    pub fn value(&self, id: ParameterId) -> Option<f32> {
        self.shared.binding.value(id)
    }

    /// `(spec, value)` pairs in declaration order.
    pub fn values(&self) -> Vec<(&'static ParameterSpec, f32)> {
        self.shared.binding.values()
    }

    /// Live read of a unit output such as a metering value. Never cached.
    pub fn read_metric(&self, id: ParameterId) -> Result<f32> {
        self.shared.binding.read(id)
    }

    pub(crate) fn value_at(&self, index: usize) -> f32 {
        self.shared.binding.value_at(index)
    }

    pub(crate) fn set_value_at(&self, index: usize, value: f32) -> Result<()> {
        self.shared.binding.set_value_at(index, value)
    }

    // ==================== Bypass ====================

    /// Restore the last-known mix. No-op if already started.
    pub fn start(&self) {
        if self.shared.mixer.lock().start() {
            tracing::debug!("{} started", self.name());
        }
    }

    /// Go fully dry, remembering the current mix. No-op if already stopped.
    pub fn stop(&self) {
        if self.shared.mixer.lock().stop() {
            tracing::debug!("{} stopped (bypassed)", self.name());
        }
    }

    pub fn is_started(&self) -> bool {
        self.shared.mixer.lock().is_started()
    }

    /// Set the dry/wet mix in percent. Returns the stored (clamped) mix.
    pub fn set_dry_wet_mix(&self, percent: f32) -> f32 {
        self.shared.mixer.lock().set_mix(percent)
    }

    pub fn dry_wet_mix(&self) -> f32 {
        self.shared.mixer.lock().mix()
    }

    pub fn last_known_mix(&self) -> f32 {
        self.shared.mixer.lock().last_known_mix()
    }

    pub fn gains(&self) -> Gains {
        self.shared.mixer.lock().gains()
    }

    pub fn crossfade_stage(&self) -> CrossfadeStage {
        self.shared.mixer.lock().stage()
    }

    // ==================== Attachment ====================

    /// Attach the backing unit and replay queued writes. Returns how many
    /// queued writes the unit accepted.
    pub fn attach_unit(&self, unit: UnitHandle) -> Result<usize> {
        self.shared.binding.attach_unit(unit)
    }

    /// Tear the unit handle down. Later bridge accesses fail.
    pub fn detach_unit(&self) -> Option<UnitHandle> {
        self.shared.binding.detach_unit()
    }

    /// Block until the unit attaches, instantiation fails, or `timeout` elapses.
    pub fn wait_until_attached(&self, timeout: Duration) -> Result<()> {
        self.shared.binding.wait_until_attached(timeout)
    }

    pub fn is_attached(&self) -> bool {
        self.shared.binding.is_attached()
    }

    pub fn unit_key(&self) -> Option<NodeKey> {
        self.shared.binding.unit_key()
    }

    fn input(&self) -> Endpoint {
        Endpoint::new(self.shared.input_key, 0)
    }

    fn on_instantiated(&self, graph: &dyn GraphService, format: StreamFormat, result: Result<UnitHandle>) {
        let wet = Endpoint::new(self.shared.crossfade_key, CrossfadeStage::WET_BUS);
        self.shared.binding.complete_instantiation(graph, result, |key| {
            let unit_port = Endpoint::new(key, 0);
            graph.connect(self.input(), unit_port, format)?;
            graph.connect(unit_port, wet, format)
        });
    }
}

impl AudioNode for EffectNode {
    fn name(&self) -> &str {
        self.shared.binding.name()
    }

    fn endpoints(&self) -> NodeEndpoints {
        NodeEndpoints {
            input: self.input(),
            output: Endpoint::new(self.shared.crossfade_key, 0),
        }
    }

    fn install(&self, graph: &Arc<dyn GraphService>, format: StreamFormat) -> Result<()> {
        format.validate()?;
        let shared = &self.shared;

        graph.attach(shared.input_key, Stage::Passthrough)?;
        if let Err(e) = graph.attach(shared.crossfade_key, Stage::Crossfade(self.crossfade_stage())) {
            let _ = detach_all(graph.as_ref(), &[shared.input_key]);
            return Err(e);
        }
        let dry = Endpoint::new(shared.crossfade_key, CrossfadeStage::DRY_BUS);
        if let Err(e) = graph.connect(self.input(), dry, format) {
            let _ = detach_all(graph.as_ref(), &[shared.crossfade_key, shared.input_key]);
            return Err(e);
        }

        let node: Weak<EffectShared> = Arc::downgrade(&self.shared);
        let service: Weak<dyn GraphService> = Arc::downgrade(graph);
        graph.instantiate(
            self.descriptor(),
            Box::new(move |result: Result<UnitHandle>| {
                let (Some(shared), Some(graph)) = (node.upgrade(), service.upgrade()) else {
                    tracing::debug!("Instantiation completed after node was dropped");
                    return;
                };
                EffectNode { shared }.on_instantiated(graph.as_ref(), format, result);
            }),
        );

        tracing::debug!("Installed {} ({})", self.name(), self.descriptor());
        Ok(())
    }

    /// Remove the unit and both stages, continuing past failures.
    fn uninstall(&self, graph: &dyn GraphService) -> Result<()> {
        let shared = &self.shared;
        shared
            .binding
            .uninstall(graph, &[shared.crossfade_key, shared.input_key])
    }

    fn state(&self) -> NodeState {
        self.shared.binding.node_state(self.is_started())
    }
}

impl core::fmt::Debug for EffectNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectNode")
            .field("name", &self.name())
            .field("descriptor", &self.descriptor())
            .field("mix", &self.dry_wet_mix())
            .field("state", &self.state())
            .finish()
    }
}

/// Implement [`AudioNode`] for a wrapper whose `node` field is an [`EffectNode`].
macro_rules! delegate_audio_node {
    ($ty:ty) => {
        impl stagebox_core::AudioNode for $ty {
            fn name(&self) -> &str {
                stagebox_core::AudioNode::name(&self.node)
            }

            fn endpoints(&self) -> stagebox_core::NodeEndpoints {
                stagebox_core::AudioNode::endpoints(&self.node)
            }

            fn install(
                &self,
                graph: &std::sync::Arc<dyn stagebox_core::GraphService>,
                format: stagebox_core::StreamFormat,
            ) -> stagebox_core::Result<()> {
                stagebox_core::AudioNode::install(&self.node, graph, format)
            }

            fn uninstall(&self, graph: &dyn stagebox_core::GraphService) -> stagebox_core::Result<()> {
                stagebox_core::AudioNode::uninstall(&self.node, graph)
            }

            fn state(&self) -> stagebox_core::NodeState {
                stagebox_core::AudioNode::state(&self.node)
            }
        }

        impl std::ops::Deref for $ty {
            type Target = $crate::EffectNode;

            fn deref(&self) -> &Self::Target {
                &self.node
            }
        }
    };
}

pub(crate) use delegate_audio_node;
