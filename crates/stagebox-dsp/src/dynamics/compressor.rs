//! Compressor on the system dynamics unit.

use serde::{Deserialize, Serialize};
use stagebox_core::{ParameterSpec, Result};

use super::{params, release_time, ATTACK_TIME, DYNAMICS_UNIT, HEAD_ROOM, MASTER_GAIN, THRESHOLD};
use crate::effect::{delegate_audio_node, EffectNode};

static SPECS: [ParameterSpec; 5] = [
    THRESHOLD,
    HEAD_ROOM,
    ATTACK_TIME,
    release_time(0.05),
    MASTER_GAIN,
];

const THRESHOLD_INDEX: usize = 0;
const HEAD_ROOM_INDEX: usize = 1;
const ATTACK_INDEX: usize = 2;
const RELEASE_INDEX: usize = 3;
const MASTER_GAIN_INDEX: usize = 4;

/// Construction values. Out-of-range fields are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// dB, -40 to 20
    pub threshold: f32,
    /// dB, 0.1 to 40
    pub head_room: f32,
    /// Seconds, 0.0001 to 0.2
    pub attack_time: f32,
    /// Seconds, 0.01 to 3
    pub release_time: f32,
    /// dB, -40 to 40
    pub master_gain: f32,
    /// Percent, 0 to 100
    pub dry_wet_mix: f32,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            threshold: -20.0,
            head_room: 5.0,
            attack_time: 0.001,
            release_time: 0.05,
            master_gain: 0.0,
            dry_wet_mix: 100.0,
        }
    }
}

/// Dynamic range compressor.
///
/// Dereferences to [`EffectNode`] for bypass, mix and attachment control.
#[derive(Debug, Clone)]
pub struct Compressor {
    node: EffectNode,
}

impl Compressor {
    pub fn new(config: CompressorConfig) -> Result<Self> {
        let initial = [
            config.threshold,
            config.head_room,
            config.attack_time,
            config.release_time,
            config.master_gain,
        ];
        Ok(Self {
            node: EffectNode::new("Compressor", DYNAMICS_UNIT, &SPECS, &initial, config.dry_wet_mix)?,
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

    /// Current gain reduction in dB, read live from the unit.
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

delegate_audio_node!(Compressor);
