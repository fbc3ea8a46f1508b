//! Chain integration tests

use std::sync::Arc;

use stagebox::prelude::*;
use stagebox::Stage;

use crate::helpers::*;

#[test]
fn test_chain_wires_in_order() {
    let (graph, service) = deferred_graph();
    let comp = Compressor::new(CompressorConfig::default()).unwrap();
    let delay = Delay::new(DelayConfig::default()).unwrap();
    let tracker = FrequencyTracker::new(FrequencyTrackerConfig::default()).unwrap();

    let chain = Chain::builder(Arc::clone(&service), test_format())
        .node(comp.clone())
        .node(delay.clone())
        .node(tracker.clone())
        .build()
        .unwrap();

    assert_eq!(chain.len(), 3);
    assert_eq!(chain.input(), comp.endpoints().input);
    assert_eq!(chain.output(), tracker.endpoints().output);
    assert!(graph.is_connected(comp.endpoints().output, delay.endpoints().input));
    assert!(graph.is_connected(delay.endpoints().output, tracker.endpoints().input));

    assert_eq!(graph.complete_pending().len(), 3);
    assert!(comp.is_attached());
    assert!(delay.is_attached());
    assert!(tracker.is_attached());
}

#[test]
fn test_chain_teardown_removes_everything() {
    let (graph, service) = immediate_graph();
    let chain = Chain::builder(service, test_format())
        .node(PeakLimiter::new(PeakLimiterConfig::default()).unwrap())
        .node(Delay::new(DelayConfig::default()).unwrap())
        .build()
        .unwrap();

    assert_eq!(graph.stage_count(), 6);
    chain.teardown().unwrap();
    assert_eq!(graph.stage_count(), 0);
    assert!(graph.connections().is_empty());
}

#[test]
fn test_empty_chain_is_rejected() {
    let (_graph, service) = immediate_graph();
    let result = Chain::builder(service, test_format()).build();
    assert!(matches!(result, Err(Error::EmptyChain)));
}

#[test]
fn test_invalid_format_is_rejected() {
    let (graph, service) = immediate_graph();
    let result = Chain::builder(service, StreamFormat::new(100.0, 2))
        .node(Delay::new(DelayConfig::default()).unwrap())
        .build();
    assert!(matches!(
        result.unwrap_err().core(),
        Some(stagebox::core::Error::InvalidConfig(_))
    ));
    assert_eq!(graph.stage_count(), 0);
}

#[test]
fn test_failed_install_rolls_back() {
    let (graph, service) = immediate_graph();
    let comp = Compressor::new(CompressorConfig::default()).unwrap();
    let delay = Delay::new(DelayConfig::default()).unwrap();

    // Occupy the delay's crossfade key so its install fails
    graph
        .attach(delay.endpoints().output.node, Stage::Passthrough)
        .unwrap();

    let result = Chain::builder(service, test_format())
        .node(comp.clone())
        .node(delay)
        .build();
    assert!(result.is_err());
    assert_eq!(comp.state(), NodeState::Detached);

    // Only the squatter remains
    assert_eq!(graph.stage_count(), 1);
    assert!(graph.connections().is_empty());
}
