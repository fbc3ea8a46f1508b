//! Tolerance constants for control-plane tests.

/// Floating point rounding errors (exact gain arithmetic, clamping).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Frequency readings after channel correction (Hz).
pub const FREQUENCY_EPSILON: f32 = 1e-3;

/// How long tests wait for an asynchronous attachment before failing.
pub const ATTACH_TIMEOUT_MS: u64 = 500;
