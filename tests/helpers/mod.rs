//! Test helpers and fixtures for Stagebox integration tests
//!
//! Graphs are [`OfflineGraph`]s: deferred ones let a test observe a node
//! before and after its backing unit attaches, immediate ones attach inside
//! `install`.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Gains, clamped values
//! - `FREQUENCY_EPSILON` (1e-3): Corrected frequency readings

#![allow(dead_code)]

pub mod tolerances;

use std::sync::Arc;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use stagebox::prelude::*;
use stagebox::SoftUnit;

use tolerances::{ATTACH_TIMEOUT_MS, FLOAT_EPSILON};

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn test_format() -> StreamFormat {
    StreamFormat::stereo(TEST_SAMPLE_RATE)
}

/// Graph whose instantiations complete on `complete_pending()`.
///
/// Returns the concrete graph (for inspection) and the service handle nodes install into.
pub fn deferred_graph() -> (Arc<OfflineGraph>, Arc<dyn GraphService>) {
    init_tracing();
    let graph = Arc::new(OfflineGraph::new());
    let service: Arc<dyn GraphService> = graph.clone();
    (graph, service)
}

/// Graph whose instantiations complete inside `instantiate`.
pub fn immediate_graph() -> (Arc<OfflineGraph>, Arc<dyn GraphService>) {
    init_tracing();
    let graph = Arc::new(OfflineGraph::immediate());
    let service: Arc<dyn GraphService> = graph.clone();
    (graph, service)
}

/// Install `node` with the test format.
pub fn install<N: AudioNode>(node: &N, service: &Arc<dyn GraphService>) {
    node.install(service, test_format())
        .expect("Failed to install node");
}

/// Complete every pending instantiation and return the single new unit.
pub fn attach_one(graph: &OfflineGraph) -> Arc<SoftUnit> {
    let mut units = graph.complete_pending();
    assert_eq!(units.len(), 1, "Expected exactly one pending instantiation");
    units.remove(0)
}

pub fn wait_attached(node: &EffectNode) {
    node.wait_until_attached(Duration::from_millis(ATTACH_TIMEOUT_MS))
        .expect("Node did not attach");
}

/// Gains the graph's summing stage for `node` currently publishes.
pub fn stage_gains<N: AudioNode>(graph: &OfflineGraph, node: &N) -> Gains {
    graph
        .crossfade(node.endpoints().output.node)
        .expect("Node has no crossfade stage in the graph")
        .gains()
}

/// Assert that dry + wet == 1 and wet == mix / 100.
pub fn assert_gains_match_mix(gains: Gains, mix: f32) {
    assert_abs_diff_eq!(gains.sum(), 1.0, epsilon = FLOAT_EPSILON);
    assert_abs_diff_eq!(gains.wet, mix / 100.0, epsilon = FLOAT_EPSILON);
}
