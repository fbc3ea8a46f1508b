//! The part of a node that talks to its backing unit.
//!
//! [`UnitBinding`] owns a node's clamped parameter values, its
//! [`ParameterBridge`] and its [`AttachmentGate`]. Effect and analysis nodes
//! wrap one and add their own signal routing on top.

use std::time::Duration;

use crate::bridge::ParameterBridge;
use crate::graph::{GraphService, NodeKey, NodeState};
use crate::lifecycle::{AttachmentGate, Lifecycle};
use crate::parameter::{validate_specs, ParameterId, ParameterScope, ParameterSpec, ParameterValues};
use crate::unit::{ComponentDescriptor, UnitHandle};
use crate::{Error, Result};

pub struct UnitBinding {
    name: String,
    descriptor: ComponentDescriptor,
    values: ParameterValues,
    bridge: ParameterBridge,
    gate: AttachmentGate,
}

impl UnitBinding {
    /// Validate `specs` and stage one value per spec for replay.
    ///
    /// `initial[i]` is clamped into `specs[i]`; missing entries take the
    /// spec default.
    pub fn new(
        name: impl Into<String>,
        descriptor: ComponentDescriptor,
        specs: &'static [ParameterSpec],
        initial: &[f32],
    ) -> Result<Self> {
        validate_specs(specs)?;

        let values = ParameterValues::with_values(specs, initial);
        let bridge = ParameterBridge::new();
        for (spec, value) in values.snapshot() {
            bridge.stage(spec.id, spec.scope, value);
        }

        Ok(Self {
            name: name.into(),
            descriptor,
            values,
            bridge,
            gate: AttachmentGate::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> ComponentDescriptor {
        self.descriptor
    }

    pub fn specs(&self) -> &'static [ParameterSpec] {
        self.values.specs()
    }

    pub fn bridge(&self) -> &ParameterBridge {
        &self.bridge
    }

    // ==================== Parameters ====================

    /// Clamp, store, and forward a parameter value.
    ///
    /// Before attachment the stored value is kept and queued, and
    /// [`Error::UnitUnavailable`] is returned.
    pub fn set_value(&self, id: ParameterId, value: f32) -> Result<()> {
        let index = self
            .values
            .index_of(id)
            .ok_or(Error::UnknownParameter(id))?;
        self.set_value_at(index, value)
    }

    /// Stored (clamped) value, or `None` for an undeclared id.
    pub fn value(&self, id: ParameterId) -> Option<f32> {
        self.values.index_of(id).map(|index| self.values.get(index))
    }

    /// `(spec, value)` pairs in declaration order.
    pub fn values(&self) -> Vec<(&'static ParameterSpec, f32)> {
        self.values.snapshot()
    }

    /// Stored value of the `index`-th spec.
    pub fn value_at(&self, index: usize) -> f32 {
        self.values.get(index)
    }

    pub fn set_value_at(&self, index: usize, value: f32) -> Result<()> {
        let stored = self.values.set(index, value);
        let spec = &self.values.specs()[index];
        self.bridge.set_parameter(spec.id, spec.scope, stored)
    }

    /// Live read of a unit output. Never cached.
    pub fn read(&self, id: ParameterId) -> Result<f32> {
        self.bridge.get_parameter(id, ParameterScope::Global)
    }

    // ==================== Attachment ====================

    /// Attach the backing unit and replay queued writes. Returns how many
    /// queued writes the unit accepted.
    pub fn attach_unit(&self, unit: UnitHandle) -> Result<usize> {
        self.gate.check_attachable()?;
        let replayed = self.bridge.attach(unit)?;
        self.gate.mark_attached()?;
        tracing::info!("{} attached ({} queued writes replayed)", self.name, replayed);
        Ok(replayed)
    }

    /// Tear the unit handle down. Later bridge accesses fail.
    pub fn detach_unit(&self) -> Option<UnitHandle> {
        self.gate.mark_detached();
        self.bridge.detach()
    }

    /// Block until the unit attaches, instantiation fails, or `timeout` elapses.
    pub fn wait_until_attached(&self, timeout: Duration) -> Result<()> {
        self.gate.wait(timeout)
    }

    pub fn is_attached(&self) -> bool {
        self.gate.is_attached()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.gate.lifecycle()
    }

    pub fn unit_key(&self) -> Option<NodeKey> {
        self.bridge.unit().map(|unit| unit.key())
    }

    /// Finish an instantiation request.
    ///
    /// On success `wire` connects the unit into the graph and the unit is
    /// attached. If instantiation, wiring or attachment fails the gate is
    /// marked failed and a wired-but-unattached unit is removed again.
    pub fn complete_instantiation(
        &self,
        graph: &dyn GraphService,
        result: Result<UnitHandle>,
        wire: impl FnOnce(NodeKey) -> Result<()>,
    ) {
        let unit = match result {
            Ok(unit) => unit,
            Err(e) => {
                tracing::error!("Failed to instantiate {} for {}: {}", self.descriptor, self.name, e);
                let reason = match e {
                    Error::Instantiation(reason) => reason,
                    other => other.to_string(),
                };
                self.gate.mark_failed(reason);
                return;
            }
        };

        let key = unit.key();
        if let Err(e) = wire(key).and_then(|()| self.attach_unit(unit)) {
            tracing::error!("Failed to attach {} to {}: {}", key, self.name, e);
            self.gate.mark_failed(e.to_string());
            if let Err(e) = graph.detach(key) {
                tracing::warn!("Failed to remove orphaned unit {}: {}", key, e);
            }
        }
    }

    /// Detach the unit, then remove the node's own `stages` from `graph`.
    pub fn uninstall(&self, graph: &dyn GraphService, stages: &[NodeKey]) -> Result<()> {
        let mut keys = Vec::with_capacity(stages.len() + 1);
        if let Some(unit) = self.detach_unit() {
            keys.push(unit.key());
        }
        keys.extend_from_slice(stages);
        detach_all(graph, &keys)?;
        tracing::debug!("Uninstalled {}", self.name);
        Ok(())
    }

    /// Map the attachment phase plus the node's own started flag to a [`NodeState`].
    pub fn node_state(&self, started: bool) -> NodeState {
        match self.gate.lifecycle() {
            Lifecycle::Constructing => NodeState::Constructing,
            Lifecycle::Failed(_) => NodeState::Failed,
            Lifecycle::Detached => NodeState::Detached,
            Lifecycle::Attached if started => NodeState::Started,
            Lifecycle::Attached => NodeState::Stopped,
        }
    }
}

/// Detach every key, continuing past failures. Returns the first failure.
pub fn detach_all(graph: &dyn GraphService, keys: &[NodeKey]) -> Result<()> {
    let mut first_error = None;
    for &key in keys {
        if let Err(e) = graph.detach(key) {
            tracing::warn!("Failed to remove stage {}: {}", key, e);
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

impl core::fmt::Debug for UnitBinding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UnitBinding")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .field("lifecycle", &self.gate.lifecycle())
            .field("bridge", &self.bridge)
            .finish()
    }
}
