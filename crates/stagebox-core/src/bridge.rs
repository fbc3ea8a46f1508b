//! Bridge between a node and its backing unit's parameter interface.
//!
//! The unit attaches asynchronously. Until it does, every read fails with
//! [`Error::UnitUnavailable`], and every write fails the same way but is also
//! queued: the last value per parameter is kept, in issue order, and replayed
//! when [`ParameterBridge::attach`] runs. Nothing is dropped silently.

use parking_lot::Mutex;

use crate::parameter::{ParameterId, ParameterScope};
use crate::unit::UnitHandle;
use crate::{Error, Result};

/// A write waiting for the backing unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingWrite {
    Parameter {
        id: ParameterId,
        scope: ParameterScope,
        value: f32,
    },
    Enabled(bool),
}

impl PendingWrite {
    fn supersedes(&self, other: &PendingWrite) -> bool {
        match (self, other) {
            (
                PendingWrite::Parameter { id, scope, .. },
                PendingWrite::Parameter {
                    id: other_id,
                    scope: other_scope,
                    ..
                },
            ) => id == other_id && scope == other_scope,
            (PendingWrite::Enabled(_), PendingWrite::Enabled(_)) => true,
            _ => false,
        }
    }

    fn apply(&self, unit: &UnitHandle) -> Result<()> {
        match *self {
            PendingWrite::Parameter { id, scope, value } => unit.set_parameter(id, scope, value),
            PendingWrite::Enabled(enabled) => unit.set_enabled(enabled),
        }
    }
}

#[derive(Default)]
struct Slot {
    unit: Option<UnitHandle>,
    pending: Vec<PendingWrite>,
}

fn enqueue(pending: &mut Vec<PendingWrite>, write: PendingWrite) {
    pending.retain(|queued| !write.supersedes(queued));
    pending.push(write);
}

/// Owns a node's backing-unit handle. The only component that mutates it.
#[derive(Default)]
pub struct ParameterBridge {
    slot: Mutex<Slot>,
}

impl ParameterBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.slot.lock().unit.is_some()
    }

    pub fn unit(&self) -> Option<UnitHandle> {
        self.slot.lock().unit.clone()
    }

    /// Install the unit and replay queued writes in issue order.
    ///
    /// Returns how many queued writes the unit accepted. A write the unit
    /// rejects is logged and skipped.
    pub fn attach(&self, unit: UnitHandle) -> Result<usize> {
        let mut guard = self.slot.lock();
        let slot = &mut *guard;

        if slot.unit.is_some() {
            return Err(Error::AlreadyAttached);
        }

        let mut replayed = 0;
        for write in slot.pending.drain(..) {
            match write.apply(&unit) {
                Ok(()) => replayed += 1,
                Err(e) => {
                    tracing::warn!("Unit {} rejected queued write {:?}: {}", unit.key(), write, e)
                }
            }
        }

        tracing::debug!(
            "Attached unit {} ({}), replayed {} queued writes",
            unit.key(),
            unit.descriptor(),
            replayed
        );

        slot.unit = Some(unit);
        Ok(replayed)
    }

    /// Tear the handle down. Later accesses fail with [`Error::UnitUnavailable`].
    pub fn detach(&self) -> Option<UnitHandle> {
        let mut slot = self.slot.lock();
        slot.pending.clear();
        slot.unit.take()
    }

    pub fn set_parameter(&self, id: ParameterId, scope: ParameterScope, value: f32) -> Result<()> {
        self.write(PendingWrite::Parameter { id, scope, value })
    }

    pub fn get_parameter(&self, id: ParameterId, scope: ParameterScope) -> Result<f32> {
        match &self.slot.lock().unit {
            Some(unit) => unit.get_parameter(id, scope),
            None => Err(Error::UnitUnavailable),
        }
    }

    /// Forward to the unit's own enable flag.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.write(PendingWrite::Enabled(enabled))
    }

    /// Queue a construction-time value without reporting the missing unit.
    ///
    /// If a unit is already attached the value is pushed immediately.
    pub fn stage(&self, id: ParameterId, scope: ParameterScope, value: f32) {
        if let Err(e) = self.set_parameter(id, scope, value) {
            if e != Error::UnitUnavailable {
                tracing::warn!("Failed to push staged parameter {}: {}", id, e);
            }
        }
    }

    /// Writes waiting for attachment, oldest first.
    pub fn pending_writes(&self) -> Vec<PendingWrite> {
        self.slot.lock().pending.clone()
    }

    fn write(&self, write: PendingWrite) -> Result<()> {
        let mut guard = self.slot.lock();
        let slot = &mut *guard;

        match &slot.unit {
            Some(unit) => write.apply(unit),
            None => {
                enqueue(&mut slot.pending, write);
                Err(Error::UnitUnavailable)
            }
        }
    }
}

impl core::fmt::Debug for ParameterBridge {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("ParameterBridge")
            .field("unit", &slot.unit.as_ref().map(|unit| unit.key()))
            .field("pending", &slot.pending.len())
            .finish()
    }
}
