//! Declarative parameter specs and the clamp routine every setter goes through.
//!
//! A [`ParameterSpec`] names a tunable value of a backing unit: the opaque
//! [`ParameterId`] the unit understands, an inclusive range and a default.
//! Specs live in `'static` tables, one per effect type.
//!
//! # Example
//!
//! ```
//! use stagebox_core::{clamp, ParameterId, ParameterSpec, ParameterUnit};
//!
//! const THRESHOLD: ParameterSpec =
//!     ParameterSpec::new(ParameterId(0), "Threshold", -40.0, 20.0, -20.0)
//!         .with_unit(ParameterUnit::Decibels);
//!
//! assert_eq!(THRESHOLD.clamp(100.0), 20.0);
//! assert_eq!(clamp(-100.0, -40.0, 20.0), -40.0);
//! ```

use core::fmt;
use core::sync::atomic::Ordering;

use atomic_float::AtomicF32;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Clamp `value` into the inclusive range `[lo, hi]`.
///
/// Computed as `max(lo, min(hi, value))`. Total: NaN resolves to `hi`, and the
/// call never panics (unlike `f32::clamp` with `lo > hi`).
#[inline]
pub fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    lo.max(hi.min(value))
}

/// Opaque parameter identifier understood by a backing unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParameterId(pub u32);

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unit-parameter scope, mirroring the global/input/output split of native units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParameterScope {
    #[default]
    Global,
    Input,
    Output,
}

/// Display hint for a parameter's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParameterUnit {
    #[default]
    Generic,
    Decibels,
    Seconds,
    Percent,
    Hertz,
    Ratio,
    /// Integral counts (hop sizes, peak counts)
    Count,
}

impl ParameterUnit {
    /// Short suffix for display ("dB", "s", ...). Empty for generic values.
    pub fn suffix(&self) -> &'static str {
        match self {
            ParameterUnit::Generic | ParameterUnit::Count => "",
            ParameterUnit::Decibels => "dB",
            ParameterUnit::Seconds => "s",
            ParameterUnit::Percent => "%",
            ParameterUnit::Hertz => "Hz",
            ParameterUnit::Ratio => ":1",
        }
    }
}

/// Description of one tunable value of a backing unit.
///
/// Invariant: `min <= max` and `default ∈ [min, max]`, checked by [`validate`](Self::validate).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub id: ParameterId,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: ParameterUnit,
    pub scope: ParameterScope,
}

impl ParameterSpec {
    pub const fn new(id: ParameterId, label: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            id,
            label,
            min,
            max,
            default,
            unit: ParameterUnit::Generic,
            scope: ParameterScope::Global,
        }
    }

    pub const fn with_unit(self, unit: ParameterUnit) -> Self {
        Self { unit, ..self }
    }

    pub const fn with_scope(self, scope: ParameterScope) -> Self {
        Self { scope, ..self }
    }

    /// Clamp a value into this parameter's range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        clamp(value, self.min, self.max)
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Map a real value onto 0.0-1.0 (linear). Out-of-range input is clamped first.
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.span();
        if span <= 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) / span
    }

    /// Map 0.0-1.0 back onto the real range (linear).
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.clamp(self.min + clamp(normalized, 0.0, 1.0) * self.span())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min <= self.max) {
            return Err(Error::InvalidParameterSpec(format!(
                "{} ({}): min {} exceeds max {}",
                self.label, self.id, self.min, self.max
            )));
        }
        if !self.contains(self.default) {
            return Err(Error::InvalidParameterSpec(format!(
                "{} ({}): default {} outside [{}, {}]",
                self.label, self.id, self.default, self.min, self.max
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} .. {}]{}",
            self.label,
            self.min,
            self.max,
            self.unit.suffix()
        )
    }
}

/// Validate a whole spec table: every spec, plus unique `(id, scope)` pairs.
pub fn validate_specs(specs: &[ParameterSpec]) -> Result<()> {
    for (i, spec) in specs.iter().enumerate() {
        spec.validate()?;
        if specs[..i]
            .iter()
            .any(|other| other.id == spec.id && other.scope == spec.scope)
        {
            return Err(Error::InvalidParameterSpec(format!(
                "duplicate parameter {} ({})",
                spec.id, spec.label
            )));
        }
    }
    Ok(())
}

/// Current values for a spec table. Every stored value is already clamped.
///
/// Reads are lock-free; writes assume a single control-timeline writer per node.
#[derive(Debug)]
pub struct ParameterValues {
    specs: &'static [ParameterSpec],
    values: Vec<AtomicF32>,
}

impl ParameterValues {
    /// All parameters at their defaults.
    pub fn new(specs: &'static [ParameterSpec]) -> Self {
        Self::with_values(specs, &[])
    }

    /// `initial[i]` (clamped) for each spec, falling back to the default when absent.
    pub fn with_values(specs: &'static [ParameterSpec], initial: &[f32]) -> Self {
        let values = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let value = initial.get(i).copied().unwrap_or(spec.default);
                AtomicF32::new(spec.clamp(value))
            })
            .collect();

        Self { specs, values }
    }

    pub fn specs(&self) -> &'static [ParameterSpec] {
        self.specs
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the first spec with this id.
    pub fn index_of(&self, id: ParameterId) -> Option<usize> {
        self.specs.iter().position(|spec| spec.id == id)
    }

    pub fn spec(&self, index: usize) -> Option<&'static ParameterSpec> {
        self.specs.get(index)
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.values[index].load(Ordering::Acquire)
    }

    /// Clamp and store; returns the stored value.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn set(&self, index: usize, value: f32) -> f32 {
        let clamped = self.specs[index].clamp(value);
        self.values[index].store(clamped, Ordering::Release);
        clamped
    }

    /// `(spec, value)` pairs in declaration order.
    pub fn snapshot(&self) -> Vec<(&'static ParameterSpec, f32)> {
        self.specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec, self.get(i)))
            .collect()
    }
}
