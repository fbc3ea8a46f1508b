//! Effect node integration tests
//!
//! Each test installs a node into an offline graph and drives it through the
//! public API only, observing the unit and the summing stage from the graph side.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use stagebox::dsp::dynamics::params;
use stagebox::prelude::*;
use stagebox::{BackingUnit, CrossfadeStage, Endpoint, ParameterScope};

use crate::helpers::*;

/// Default compressor threshold and head room; clamping at both bounds.
#[test]
fn test_compressor_threshold_clamping() {
    let comp = Compressor::new(CompressorConfig::default()).unwrap();
    assert_eq!(comp.threshold(), -20.0);
    assert_eq!(comp.head_room(), 5.0);

    let _ = comp.set_threshold(100.0);
    assert_eq!(comp.threshold(), 20.0);

    let _ = comp.set_threshold(-100.0);
    assert_eq!(comp.threshold(), -40.0);

    let _ = comp.set_threshold(-40.0);
    assert_eq!(comp.threshold(), -40.0);
    let _ = comp.set_threshold(20.0);
    assert_eq!(comp.threshold(), 20.0);
}

/// Stop bypasses fully, start restores the previous mix, in the graph's stage too.
#[test]
fn test_bypass_crossfade_in_graph() {
    let (graph, service) = immediate_graph();
    let comp = Compressor::new(CompressorConfig::default()).unwrap();
    install(&comp, &service);

    assert!(comp.is_started());
    assert_eq!(comp.dry_wet_mix(), 100.0);
    assert_eq!(stage_gains(&graph, &comp), Gains::PROCESSED);

    comp.stop();
    assert_eq!(comp.dry_wet_mix(), 0.0);
    assert!(!comp.is_started());
    assert_eq!(comp.state(), NodeState::Stopped);
    assert_eq!(stage_gains(&graph, &comp), Gains::BYPASS);

    comp.start();
    assert_eq!(comp.dry_wet_mix(), 100.0);
    assert_eq!(comp.state(), NodeState::Started);
    assert_eq!(stage_gains(&graph, &comp), Gains::PROCESSED);
}

/// A mix set while stopped is overwritten by the remembered one on start.
#[test]
fn test_mix_set_while_stopped_is_overwritten() {
    let comp = Compressor::new(CompressorConfig::default()).unwrap();
    comp.stop();
    comp.set_dry_wet_mix(30.0);
    assert_gains_match_mix(comp.gains(), 30.0);

    comp.start();
    assert_eq!(comp.dry_wet_mix(), 100.0);
    assert_gains_match_mix(comp.gains(), 100.0);
}

/// Stopping never rewires the graph: only gains move.
#[test]
fn test_stop_does_not_change_topology() {
    let (graph, service) = immediate_graph();
    let delay = Delay::new(DelayConfig::default()).unwrap();
    install(&delay, &service);

    let before = graph.connections();
    delay.stop();
    delay.set_dry_wet_mix(80.0);
    delay.start();
    assert_eq!(graph.connections(), before);
    assert_gains_match_mix(stage_gains(&graph, &delay), 50.0);
}

/// Writes before attachment are reported, queued, and land on the unit afterwards.
#[test]
fn test_writes_before_attach_replay() {
    let (graph, service) = deferred_graph();
    let comp = Compressor::new(CompressorConfig::default()).unwrap();
    install(&comp, &service);

    assert_eq!(comp.state(), NodeState::Constructing);
    assert!(comp
        .set_master_gain(12.0)
        .is_err_and(|e| e.is_recoverable()));
    assert!(comp.compression_amount().is_err());

    let unit = attach_one(&graph);
    wait_attached(&comp);

    assert_eq!(unit.parameter(params::MASTER_GAIN), Some(12.0));
    assert_eq!(unit.parameter(params::THRESHOLD), Some(-20.0));
    assert_eq!(comp.state(), NodeState::Started);

    unit.write_parameter(params::COMPRESSION_AMOUNT, -4.5);
    assert_eq!(comp.compression_amount(), Ok(-4.5));
    assert_eq!(
        unit.get_parameter(params::MASTER_GAIN, ParameterScope::Global),
        Ok(12.0)
    );
}

/// The dry leg is wired at install, the unit leg once the unit attaches.
#[test]
fn test_effect_topology() {
    let (graph, service) = deferred_graph();
    let limiter = PeakLimiter::new(PeakLimiterConfig::default()).unwrap();
    install(&limiter, &service);

    let endpoints = limiter.endpoints();
    let dry = Endpoint::new(endpoints.output.node, CrossfadeStage::DRY_BUS);
    let wet = Endpoint::new(endpoints.output.node, CrossfadeStage::WET_BUS);
    assert!(graph.is_connected(endpoints.input, dry));
    assert_eq!(graph.connections().len(), 1);

    let unit = attach_one(&graph);
    let unit_port = Endpoint::new(unit.key(), 0);
    assert!(graph.is_connected(endpoints.input, unit_port));
    assert!(graph.is_connected(unit_port, wet));
    assert_eq!(limiter.unit_key(), Some(unit.key()));
}

/// Attachment completing on another thread wakes a waiting caller.
#[test]
fn test_attach_from_other_thread() {
    let (graph, service) = deferred_graph();
    let dp = DynamicsProcessor::new(DynamicsProcessorConfig::default()).unwrap();
    install(&dp, &service);

    let remote = Arc::clone(&graph);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        remote.complete_pending();
    });

    wait_attached(&dp);
    assert!(dp.is_attached());
    assert!(dp.input_amplitude().is_err_and(|e| !e.is_recoverable()));
    handle.join().unwrap();
}

#[test]
fn test_failed_instantiation_leaves_bypass_path() {
    let (graph, service) = deferred_graph();
    let comp = Compressor::new(CompressorConfig::default()).unwrap();
    install(&comp, &service);
    graph.fail_pending("component not registered");

    assert_eq!(comp.state(), NodeState::Failed);
    assert!(comp.compression_amount().is_err());
    // Dry leg still carries signal
    assert_eq!(graph.connections().len(), 1);
    assert_eq!(graph.stage_count(), 2);
}

#[test]
fn test_uninstall_tears_down_unit() {
    let (graph, service) = immediate_graph();
    let comp = Compressor::new(CompressorConfig::default()).unwrap();
    install(&comp, &service);
    assert!(comp.is_attached());

    comp.uninstall(graph.as_ref()).unwrap();
    assert_eq!(comp.state(), NodeState::Detached);
    assert_eq!(graph.stage_count(), 0);
    assert!(comp.compression_amount().is_err());
    assert!(comp.set_threshold(0.0).is_err());
    assert_eq!(comp.threshold(), 0.0);
}

proptest! {
    /// Any threshold write lands inside -40..=20 and reaches the unit as stored.
    #[test]
    fn threshold_writes_clamp_and_reach_unit(threshold in -1.0e4f32..1.0e4) {
        let (graph, service) = immediate_graph();
        let comp = Compressor::new(CompressorConfig::default()).unwrap();
        install(&comp, &service);
        let unit = graph.unit(comp.unit_key().unwrap()).unwrap();

        prop_assert!(comp.set_threshold(threshold).is_ok());
        let stored = comp.threshold();
        prop_assert!((-40.0..=20.0).contains(&stored));
        if (-40.0..=20.0).contains(&threshold) {
            prop_assert_eq!(stored, threshold);
        }
        prop_assert_eq!(unit.parameter(params::THRESHOLD), Some(stored));
    }

    /// Mix changes while started survive a stop/start cycle.
    #[test]
    fn started_mix_survives_bypass(mix in -50.0f32..150.0) {
        let comp = Compressor::new(CompressorConfig::default()).unwrap();
        let stored = comp.set_dry_wet_mix(mix);
        prop_assert_eq!(comp.last_known_mix(), stored);

        comp.stop();
        comp.start();
        prop_assert_eq!(comp.dry_wet_mix(), stored);
        assert_gains_match_mix(comp.gains(), stored);
    }
}
