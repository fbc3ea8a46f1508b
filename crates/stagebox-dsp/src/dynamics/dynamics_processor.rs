//! Compressor/expander on the system dynamics unit.

use serde::{Deserialize, Serialize};
use stagebox_core::{ParameterSpec, ParameterUnit, Result};

use super::{params, release_time, ATTACK_TIME, DYNAMICS_UNIT, HEAD_ROOM, MASTER_GAIN, THRESHOLD};
use crate::effect::{delegate_audio_node, EffectNode};

static SPECS: [ParameterSpec; 7] = [
    THRESHOLD,
    HEAD_ROOM,
    ParameterSpec::new(params::EXPANSION_RATIO, "Expansion Ratio", 1.0, 50.0, 2.0)
        .with_unit(ParameterUnit::Ratio),
    ParameterSpec::new(params::EXPANSION_THRESHOLD, "Expansion Threshold", 1.0, 50.0, 2.0),
    ATTACK_TIME,
    release_time(0.01),
    MASTER_GAIN,
];

const THRESHOLD_INDEX: usize = 0;
const HEAD_ROOM_INDEX: usize = 1;
const EXPANSION_RATIO_INDEX: usize = 2;
const EXPANSION_THRESHOLD_INDEX: usize = 3;
const ATTACK_INDEX: usize = 4;
const RELEASE_INDEX: usize = 5;
const MASTER_GAIN_INDEX: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsProcessorConfig {
    pub threshold: f32,
    pub head_room: f32,
    pub expansion_ratio: f32,
    pub expansion_threshold: f32,
    pub attack_time: f32,
    pub release_time: f32,
    pub master_gain: f32,
    pub dry_wet_mix: f32,
}

impl Default for DynamicsProcessorConfig {
    fn default() -> Self {
        Self {
            threshold: -20.0,
            head_room: 5.0,
            expansion_ratio: 2.0,
            expansion_threshold: 2.0,
            attack_time: 0.001,
            release_time: 0.01,
            master_gain: 0.0,
            dry_wet_mix: 100.0,
        }
    }
}

/// Compressor with downward expansion below the expansion threshold.
#[derive(Debug, Clone)]
pub struct DynamicsProcessor {
    node: EffectNode,
}

impl DynamicsProcessor {
    pub fn new(config: DynamicsProcessorConfig) -> Result<Self> {
        let initial = [
            config.threshold,
            config.head_room,
            config.expansion_ratio,
            config.expansion_threshold,
            config.attack_time,
            config.release_time,
            config.master_gain,
        ];
        Ok(Self {
            node: EffectNode::new(
                "Dynamics Processor",
                DYNAMICS_UNIT,
                &SPECS,
                &initial,
                config.dry_wet_mix,
            )?,
        })
    }

    pub fn specs() -> &'static [ParameterSpec] {
        &SPECS
    }

    pub fn node(&self) -> &EffectNode {
        &self.node
    }

    pub fn set_threshold(&self, db: f32) -> Result<()> {
        self.node.set_value_at(THRESHOLD_INDEX, db)
    }

    pub fn threshold(&self) -> f32 {
        self.node.value_at(THRESHOLD_INDEX)
    }

    pub fn set_head_room(&self, db: f32) -> Result<()> {
        self.node.set_value_at(HEAD_ROOM_INDEX, db)
    }

    pub fn head_room(&self) -> f32 {
        self.node.value_at(HEAD_ROOM_INDEX)
    }

    pub fn set_expansion_ratio(&self, ratio: f32) -> Result<()> {
        self.node.set_value_at(EXPANSION_RATIO_INDEX, ratio)
    }

    pub fn expansion_ratio(&self) -> f32 {
        self.node.value_at(EXPANSION_RATIO_INDEX)
    }

    pub fn set_expansion_threshold(&self, threshold: f32) -> Result<()> {
        self.node.set_value_at(EXPANSION_THRESHOLD_INDEX, threshold)
    }

    pub fn expansion_threshold(&self) -> f32 {
        self.node.value_at(EXPANSION_THRESHOLD_INDEX)
    }

    pub fn set_attack_time(&self, seconds: f32) -> Result<()> {
        self.node.set_value_at(ATTACK_INDEX, seconds)
    }

    pub fn attack_time(&self) -> f32 {
        self.node.value_at(ATTACK_INDEX)
    }

    pub fn set_release_time(&self, seconds: f32) -> Result<()> {
        self.node.set_value_at(RELEASE_INDEX, seconds)
    }

    pub fn release_time(&self) -> f32 {
        self.node.value_at(RELEASE_INDEX)
    }

    pub fn set_master_gain(&self, db: f32) -> Result<()> {
        self.node.set_value_at(MASTER_GAIN_INDEX, db)
    }

    pub fn master_gain(&self) -> f32 {
        self.node.value_at(MASTER_GAIN_INDEX)
    }

    pub fn compression_amount(&self) -> Result<f32> {
        self.node.read_metric(params::COMPRESSION_AMOUNT)
    }

    pub fn input_amplitude(&self) -> Result<f32> {
        self.node.read_metric(params::INPUT_AMPLITUDE)
    }

    pub fn output_amplitude(&self) -> Result<f32> {
        self.node.read_metric(params::OUTPUT_AMPLITUDE)
    }
}

delegate_audio_node!(DynamicsProcessor);
