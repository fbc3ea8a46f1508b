//! Analysis node integration tests

use stagebox::analysis::frequency_tracker::params;
use stagebox::prelude::*;

use crate::helpers::tolerances::FREQUENCY_EPSILON;
use crate::helpers::*;

/// Raw amplitude 0.8 and frequency 440 read back as 0.4 and 880.
#[test]
fn test_tracker_stereo_correction_through_graph() {
    let (graph, service) = deferred_graph();
    let tracker = FrequencyTracker::new(FrequencyTrackerConfig::default()).unwrap();
    install(&tracker, &service);

    assert!(tracker.amplitude().is_err());
    assert!(tracker.frequency().is_err());

    let unit = attach_one(&graph);
    unit.write_parameter(params::AMPLITUDE, 0.8);
    unit.write_parameter(params::FREQUENCY, 440.0);

    assert_eq!(tracker.amplitude(), Ok(0.4));
    assert!((tracker.frequency().unwrap() - 880.0).abs() <= FREQUENCY_EPSILON);
    assert_eq!(tracker.reading().unwrap().note_name().as_deref(), Some("A5"));
}

/// The tap never sits in the signal path.
#[test]
fn test_tracker_is_pass_through() {
    let (graph, service) = immediate_graph();
    let tracker = FrequencyTracker::new(FrequencyTrackerConfig::default()).unwrap();
    install(&tracker, &service);

    let endpoints = tracker.endpoints();
    assert_eq!(endpoints.input, endpoints.output);
    assert!(graph
        .connections()
        .iter()
        .all(|c| c.from == endpoints.output));
}

#[test]
fn test_tracker_stop_before_attach_replays() {
    let (graph, service) = deferred_graph();
    let tracker = FrequencyTracker::new(FrequencyTrackerConfig {
        hop_size: 1024,
        ..Default::default()
    })
    .unwrap();
    install(&tracker, &service);

    assert!(tracker.stop().is_err());
    assert!(tracker.stop().is_ok());

    let unit = attach_one(&graph);
    assert!(!unit.is_enabled());
    assert_eq!(unit.parameter(params::HOP_SIZE), Some(1024.0));
    assert_eq!(tracker.state(), NodeState::Stopped);

    tracker.start().unwrap();
    assert!(unit.is_enabled());
}
