//! Backing units: the native signal-processing components a node wraps.
//!
//! The DSP a unit performs is opaque. Stagebox only ever talks to it through
//! [`BackingUnit`], the audio-unit parameter interface.

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::graph::NodeKey;
use crate::parameter::{ParameterId, ParameterScope};
use crate::Result;

/// Four-character code as used by native component registries (`'aufx'`, `'dcmp'`, ...).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const fn new(code: [u8; 4]) -> Self {
        Self(code)
    }

    pub const fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self)
    }
}

/// What role a component plays in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Effect,
    Analyzer,
}

impl ComponentKind {
    pub const fn type_code(&self) -> FourCc {
        match self {
            ComponentKind::Effect => FourCc(*b"aufx"),
            ComponentKind::Analyzer => FourCc(*b"aufx"),
        }
    }
}

/// Identifies which component the graph service should instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub kind: ComponentKind,
    pub subtype: FourCc,
    pub manufacturer: FourCc,
}

impl ComponentDescriptor {
    /// Manufacturer code of the system-provided units.
    pub const SYSTEM: FourCc = FourCc(*b"appl");
    /// Manufacturer code of units that ship with stagebox.
    pub const STAGEBOX: FourCc = FourCc(*b"stgb");

    pub const fn new(kind: ComponentKind, subtype: FourCc, manufacturer: FourCc) -> Self {
        Self {
            kind,
            subtype,
            manufacturer,
        }
    }

    pub const fn effect(subtype: [u8; 4]) -> Self {
        Self::new(ComponentKind::Effect, FourCc(subtype), Self::SYSTEM)
    }

    pub const fn analyzer(subtype: [u8; 4]) -> Self {
        Self::new(ComponentKind::Analyzer, FourCc(subtype), Self::STAGEBOX)
    }
}

impl fmt::Display for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.kind.type_code(),
            self.subtype,
            self.manufacturer
        )
    }
}

/// Audio-unit parameter interface.
///
/// `set_parameter` takes effect at the unit's next processing boundary, not
/// synchronously; the unit is responsible for applying it without discontinuity.
/// Implementations must not block on the audio timeline.
pub trait BackingUnit: Send + Sync {
    /// Graph identity of the instantiated unit.
    fn key(&self) -> NodeKey;

    fn descriptor(&self) -> ComponentDescriptor;

    fn set_parameter(&self, id: ParameterId, scope: ParameterScope, value: f32) -> Result<()>;

    fn get_parameter(&self, id: ParameterId, scope: ParameterScope) -> Result<f32>;

    /// The unit's own enable flag. Disabling suspends its processing without
    /// changing signal routing.
    fn set_enabled(&self, enabled: bool) -> Result<()>;
}

/// Shared handle to an instantiated backing unit.
pub type UnitHandle = Arc<dyn BackingUnit>;
