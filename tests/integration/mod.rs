//! Integration test modules for Stagebox
//!
//! - effects: Effect nodes installed into an offline graph
//! - analysis: Analysis taps and corrected readings
//! - chain: Serial chains of nodes

pub mod analysis;
pub mod chain;
pub mod effects;
