//! Look-ahead peak limiter on the system limiter unit.

use serde::{Deserialize, Serialize};
use stagebox_core::{ComponentDescriptor, ParameterId, ParameterSpec, ParameterUnit, Result};

use crate::effect::{delegate_audio_node, EffectNode};

const ATTACK_TIME: ParameterId = ParameterId(0);
const DECAY_TIME: ParameterId = ParameterId(1);
const PRE_GAIN: ParameterId = ParameterId(2);

static SPECS: [ParameterSpec; 3] = [
    ParameterSpec::new(ATTACK_TIME, "Attack Time", 0.001, 0.03, 0.012)
        .with_unit(ParameterUnit::Seconds),
    ParameterSpec::new(DECAY_TIME, "Decay Time", 0.001, 0.06, 0.024)
        .with_unit(ParameterUnit::Seconds),
    ParameterSpec::new(PRE_GAIN, "Pre Gain", -40.0, 40.0, 0.0).with_unit(ParameterUnit::Decibels),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakLimiterConfig {
    /// Seconds, 0.001 to 0.03
    pub attack_time: f32,
    /// Seconds, 0.001 to 0.06
    pub decay_time: f32,
    /// dB, -40 to 40
    pub pre_gain: f32,
    pub dry_wet_mix: f32,
}

impl Default for PeakLimiterConfig {
    fn default() -> Self {
        Self {
            attack_time: 0.012,
            decay_time: 0.024,
            pre_gain: 0.0,
            dry_wet_mix: 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PeakLimiter {
    node: EffectNode,
}

impl PeakLimiter {
    pub const DESCRIPTOR: ComponentDescriptor = ComponentDescriptor::effect(*b"lmtr");

    pub fn new(config: PeakLimiterConfig) -> Result<Self> {
        let initial = [config.attack_time, config.decay_time, config.pre_gain];
        Ok(Self {
            node: EffectNode::new("Peak Limiter", Self::DESCRIPTOR, &SPECS, &initial, config.dry_wet_mix)?,
        })
    }

    pub fn specs() -> &'static [ParameterSpec] {
        &SPECS
    }

    pub fn node(&self) -> &EffectNode {
        &self.node
    }

    pub fn set_attack_time(&self, seconds: f32) -> Result<()> {
        self.node.set_value_at(0, seconds)
    }

    pub fn attack_time(&self) -> f32 {
        self.node.value_at(0)
    }

    pub fn set_decay_time(&self, seconds: f32) -> Result<()> {
        self.node.set_value_at(1, seconds)
    }

    pub fn decay_time(&self) -> f32 {
        self.node.value_at(1)
    }

    pub fn set_pre_gain(&self, db: f32) -> Result<()> {
        self.node.set_value_at(2, db)
    }

    pub fn pre_gain(&self) -> f32 {
        self.node.value_at(2)
    }
}

delegate_audio_node!(PeakLimiter);

#[cfg(test)]
mod tests {
    use super::*;
    use stagebox_core::SoftUnit;
    use std::sync::Arc;

    #[test]
    fn test_limiter_ranges() {
        let limiter = PeakLimiter::new(PeakLimiterConfig::default()).unwrap();
        assert_eq!(limiter.attack_time(), 0.012);
        assert_eq!(limiter.decay_time(), 0.024);

        let _ = limiter.set_attack_time(1.0);
        assert_eq!(limiter.attack_time(), 0.03);
        let _ = limiter.set_decay_time(0.0);
        assert_eq!(limiter.decay_time(), 0.001);
        let _ = limiter.set_pre_gain(-60.0);
        assert_eq!(limiter.pre_gain(), -40.0);
    }

    #[test]
    fn test_limiter_pushes_by_unit_ids() {
        let limiter = PeakLimiter::new(PeakLimiterConfig {
            pre_gain: 6.0,
            ..Default::default()
        })
        .unwrap();
        let unit = Arc::new(SoftUnit::new(PeakLimiter::DESCRIPTOR));
        limiter.attach_unit(unit.clone()).unwrap();

        assert_eq!(unit.parameter(PRE_GAIN), Some(6.0));
        limiter.set_decay_time(0.05).unwrap();
        assert_eq!(unit.parameter(DECAY_TIME), Some(0.05));
    }
}
