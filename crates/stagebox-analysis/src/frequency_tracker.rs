//! Amplitude and pitch tracking.

use stagebox_core::{
    AudioNode, ComponentDescriptor, GraphService, NodeEndpoints, NodeState, ParameterId,
    ParameterSpec, ParameterUnit, Result, StreamFormat,
};
use std::sync::Arc;

use crate::node::{AnalysisNode, ChannelCorrection};

/// Parameter ids of the tracker unit.
pub mod params {
    use stagebox_core::ParameterId;

    /// Raw amplitude output (summed over channels).
    pub const AMPLITUDE: ParameterId = ParameterId(0);
    /// Raw frequency output in Hz.
    pub const FREQUENCY: ParameterId = ParameterId(1);

    pub const HOP_SIZE: ParameterId = ParameterId(10);
    pub const PEAK_COUNT: ParameterId = ParameterId(11);
}

static SPECS: [ParameterSpec; 2] = [
    ParameterSpec::new(params::HOP_SIZE, "Hop Size", 64.0, 8192.0, 512.0)
        .with_unit(ParameterUnit::Count),
    ParameterSpec::new(params::PEAK_COUNT, "Peak Count", 1.0, 100.0, 20.0)
        .with_unit(ParameterUnit::Count),
];

const HOP_SIZE_INDEX: usize = 0;
const PEAK_COUNT_INDEX: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct FrequencyTrackerConfig {
    /// Samples between analysis frames, 64 to 8192
    pub hop_size: u32,
    /// Spectral peaks considered per frame, 1 to 100
    pub peak_count: u32,
}

impl Default for FrequencyTrackerConfig {
    fn default() -> Self {
        Self {
            hop_size: 512,
            peak_count: 20,
        }
    }
}

/// One corrected reading from a [`FrequencyTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackerReading {
    /// Per-channel amplitude
    pub amplitude: f32,
    /// Detected frequency in Hz (0.0 if nothing detected)
    pub frequency: f32,
}

impl TrackerReading {
    /// Nearest MIDI note, if a frequency was detected.
    pub fn midi_note(&self) -> Option<u8> {
        if self.frequency <= 0.0 || !self.frequency.is_finite() {
            return None;
        }
        let note = 69.0 + 12.0 * (self.frequency / 440.0).log2();
        Some(note.round().clamp(0.0, 127.0) as u8)
    }

    /// Cents from the nearest note (-50 to +50), 0.0 if nothing detected.
    pub fn cents_offset(&self) -> f32 {
        match self.midi_note() {
            Some(note) => {
                let note_freq = 440.0 * 2.0f32.powf((note as f32 - 69.0) / 12.0);
                1200.0 * (self.frequency / note_freq).log2()
            }
            None => 0.0,
        }
    }

    /// Note name with sharp notation (e.g., "A4", "C#5")
    pub fn note_name(&self) -> Option<String> {
        self.midi_note().map(|note| {
            const NAMES: [&str; 12] = [
                "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
            ];
            let name = NAMES[(note % 12) as usize];
            let octave = (note / 12) as i32 - 1;
            format!("{}{}", name, octave)
        })
    }
}

/// Tracks amplitude and fundamental frequency of its input.
///
/// The tracker unit sums a stereo input, so readings are corrected with
/// [`ChannelCorrection::STEREO`].
///
/// ```
/// use stagebox_analysis::FrequencyTracker;
///
/// let tracker = FrequencyTracker::new(Default::default()).unwrap();
/// assert_eq!(tracker.hop_size(), 512);
/// assert!(tracker.frequency().is_err()); // no unit attached yet
/// ```
#[derive(Debug, Clone)]
pub struct FrequencyTracker {
    node: AnalysisNode,
}

impl FrequencyTracker {
    pub const DESCRIPTOR: ComponentDescriptor = ComponentDescriptor::analyzer(*b"ftrk");

    pub fn new(config: FrequencyTrackerConfig) -> Result<Self> {
        let initial = [config.hop_size as f32, config.peak_count as f32];
        Ok(Self {
            node: AnalysisNode::new(
                "Frequency Tracker",
                Self::DESCRIPTOR,
                &SPECS,
                &initial,
                ChannelCorrection::STEREO,
            )?,
        })
    }

    pub fn node(&self) -> &AnalysisNode {
        &self.node
    }

    /// Per-channel amplitude: raw reading × 0.5.
    pub fn amplitude(&self) -> Result<f32> {
        let raw = self.node.read(params::AMPLITUDE)?;
        Ok(self.node.correction().amplitude(raw))
    }

    /// Frequency in Hz: raw reading × 2.
    pub fn frequency(&self) -> Result<f32> {
        let raw = self.node.read(params::FREQUENCY)?;
        Ok(self.node.correction().frequency(raw))
    }

    pub fn reading(&self) -> Result<TrackerReading> {
        Ok(TrackerReading {
            amplitude: self.amplitude()?,
            frequency: self.frequency()?,
        })
    }

    pub fn set_hop_size(&self, samples: u32) -> Result<()> {
        self.node.set_value_at(HOP_SIZE_INDEX, samples as f32)
    }

    pub fn hop_size(&self) -> u32 {
        self.node.value_at(HOP_SIZE_INDEX) as u32
    }

    pub fn set_peak_count(&self, count: u32) -> Result<()> {
        self.node.set_value_at(PEAK_COUNT_INDEX, count as f32)
    }

    pub fn peak_count(&self) -> u32 {
        self.node.value_at(PEAK_COUNT_INDEX) as u32
    }

    /// Raw unit output for `id`, uncorrected.
    pub fn read_raw(&self, id: ParameterId) -> Result<f32> {
        self.node.read(id)
    }
}

impl AudioNode for FrequencyTracker {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn endpoints(&self) -> NodeEndpoints {
        self.node.endpoints()
    }

    fn install(&self, graph: &Arc<dyn GraphService>, format: StreamFormat) -> Result<()> {
        self.node.install(graph, format)
    }

    fn uninstall(&self, graph: &dyn GraphService) -> Result<()> {
        self.node.uninstall(graph)
    }

    fn state(&self) -> NodeState {
        self.node.state()
    }
}

impl std::ops::Deref for FrequencyTracker {
    type Target = AnalysisNode;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use stagebox_core::{Error, SoftUnit};

    fn attached() -> (FrequencyTracker, Arc<SoftUnit>) {
        let tracker = FrequencyTracker::new(FrequencyTrackerConfig::default()).unwrap();
        let unit = Arc::new(SoftUnit::new(FrequencyTracker::DESCRIPTOR));
        tracker.attach_unit(unit.clone()).unwrap();
        (tracker, unit)
    }

    #[test]
    fn test_stereo_correction() {
        let (tracker, unit) = attached();
        unit.write_parameter(params::AMPLITUDE, 0.8);
        unit.write_parameter(params::FREQUENCY, 440.0);

        assert_relative_eq!(tracker.amplitude().unwrap(), 0.4);
        assert_relative_eq!(tracker.frequency().unwrap(), 880.0);
        assert_eq!(tracker.read_raw(params::FREQUENCY), Ok(440.0));
    }

    #[test]
    fn test_zero_and_large_readings() {
        let (tracker, unit) = attached();
        unit.write_parameter(params::AMPLITUDE, 0.0);
        unit.write_parameter(params::FREQUENCY, 0.0);
        assert_eq!(tracker.amplitude(), Ok(0.0));
        assert_eq!(tracker.frequency(), Ok(0.0));

        unit.write_parameter(params::AMPLITUDE, 1.0e9);
        unit.write_parameter(params::FREQUENCY, 1.0e9);
        assert_eq!(tracker.amplitude(), Ok(5.0e8));
        assert_eq!(tracker.frequency(), Ok(2.0e9));
    }

    #[test]
    fn test_reads_are_live() {
        let (tracker, unit) = attached();
        unit.write_parameter(params::AMPLITUDE, 0.2);
        unit.write_parameter(params::FREQUENCY, 100.0);
        assert_eq!(tracker.frequency(), Ok(200.0));

        unit.write_parameter(params::FREQUENCY, 110.0);
        assert_eq!(tracker.frequency(), Ok(220.0));
    }

    #[test]
    fn test_unattached_reads_fail() {
        let tracker = FrequencyTracker::new(FrequencyTrackerConfig::default()).unwrap();
        assert_eq!(tracker.amplitude(), Err(Error::UnitUnavailable));
        assert_eq!(tracker.frequency(), Err(Error::UnitUnavailable));
        assert_eq!(tracker.reading(), Err(Error::UnitUnavailable));
    }

    #[test]
    fn test_config_is_clamped_and_replayed() {
        let tracker = FrequencyTracker::new(FrequencyTrackerConfig {
            hop_size: 16,
            peak_count: 500,
        })
        .unwrap();
        assert_eq!(tracker.hop_size(), 64);
        assert_eq!(tracker.peak_count(), 100);

        let unit = Arc::new(SoftUnit::new(FrequencyTracker::DESCRIPTOR));
        tracker.attach_unit(unit.clone()).unwrap();
        assert_eq!(unit.parameter(params::HOP_SIZE), Some(64.0));
        assert_eq!(unit.parameter(params::PEAK_COUNT), Some(100.0));

        tracker.set_hop_size(1024).unwrap();
        assert_eq!(unit.parameter(params::HOP_SIZE), Some(1024.0));
    }

    #[test]
    fn test_reading_note() {
        let (tracker, unit) = attached();
        unit.write_parameter(params::AMPLITUDE, 1.0);
        unit.write_parameter(params::FREQUENCY, 220.0);

        let reading = tracker.reading().unwrap();
        assert_eq!(reading.midi_note(), Some(69));
        assert_eq!(reading.note_name().as_deref(), Some("A4"));
        assert!(reading.cents_offset().abs() < 0.01);

        let silent = TrackerReading::default();
        assert_eq!(silent.midi_note(), None);
        assert_eq!(silent.cents_offset(), 0.0);
    }

    proptest! {
        #[test]
        fn correction_factors_hold(raw_amp in 0.0f32..1.0e6, raw_freq in 0.0f32..1.0e6) {
            let (tracker, unit) = attached();
            unit.write_parameter(params::AMPLITUDE, raw_amp);
            unit.write_parameter(params::FREQUENCY, raw_freq);
            prop_assert_eq!(tracker.amplitude().unwrap(), raw_amp * 0.5);
            prop_assert_eq!(tracker.frequency().unwrap(), raw_freq * 2.0);
        }
    }
}
