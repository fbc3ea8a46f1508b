//! Dry/wet bypass crossfade.
//!
//! Stopping an effect must not rewire the graph while audio streams, so every
//! effect node routes its input down two parallel paths, dry (bypassing the
//! unit) and wet (through the unit), summed by one [`Stage::Crossfade`].
//! Start/stop only moves the gains.
//!
//! Gains are `dry = 1 - mix/100`, `wet = mix/100`. Both are packed into one
//! atomic word so the audio timeline never observes a half-applied update
//! (a momentary double-gain or silence).
//!
//! [`Stage::Crossfade`]: crate::graph::Stage::Crossfade

use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::parameter::clamp;

/// Dry and wet path gains. Always sum to 1.0 when derived from a mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub dry: f32,
    pub wet: f32,
}

impl Gains {
    /// Output identical to input.
    pub const BYPASS: Gains = Gains { dry: 1.0, wet: 0.0 };
    /// Output fully processed.
    pub const PROCESSED: Gains = Gains { dry: 0.0, wet: 1.0 };

    /// Gains for a mix percentage (clamped to 0-100).
    pub fn from_mix(percent: f32) -> Self {
        let wet = clamp(percent, BypassCrossfadeMixer::MIN_MIX, BypassCrossfadeMixer::MAX_MIX) / 100.0;
        Self {
            dry: 1.0 - wet,
            wet,
        }
    }

    pub fn sum(&self) -> f32 {
        self.dry + self.wet
    }

    #[inline]
    fn pack(self) -> u64 {
        ((self.dry.to_bits() as u64) << 32) | self.wet.to_bits() as u64
    }

    #[inline]
    fn unpack(bits: u64) -> Self {
        Self {
            dry: f32::from_bits((bits >> 32) as u32),
            wet: f32::from_bits(bits as u32),
        }
    }
}

/// Both gains in one cache-line aligned word.
#[derive(Debug)]
#[repr(align(64))]
struct GainPair {
    bits: AtomicU64,
}

impl GainPair {
    fn new(gains: Gains) -> Self {
        Self {
            bits: AtomicU64::new(gains.pack()),
        }
    }

    #[inline]
    fn load(&self) -> Gains {
        Gains::unpack(self.bits.load(Ordering::Acquire))
    }

    #[inline]
    fn store(&self, gains: Gains) {
        self.bits.store(gains.pack(), Ordering::Release);
    }
}

/// Read side of a crossfade, handed to the graph's summing stage.
///
/// Cheap to clone; all clones observe the owning mixer's latest gains.
#[derive(Debug, Clone)]
pub struct CrossfadeStage {
    gains: Arc<GainPair>,
}

impl CrossfadeStage {
    pub const DRY_BUS: u32 = 0;
    pub const WET_BUS: u32 = 1;

    #[inline]
    pub fn gains(&self) -> Gains {
        self.gains.load()
    }
}

/// Dry/wet mixer implementing start/stop as a gain change.
///
/// Gains change only through [`set_mix`](Self::set_mix), [`start`](Self::start)
/// and [`stop`](Self::stop).
#[derive(Debug)]
pub struct BypassCrossfadeMixer {
    mix: f32,
    last_known_mix: f32,
    started: bool,
    published: Arc<GainPair>,
}

impl BypassCrossfadeMixer {
    pub const MIN_MIX: f32 = 0.0;
    pub const MAX_MIX: f32 = 100.0;

    /// A started mixer at `mix` percent.
    pub fn new(mix: f32) -> Self {
        let mix = clamp(mix, Self::MIN_MIX, Self::MAX_MIX);
        Self {
            mix,
            last_known_mix: mix,
            started: true,
            published: Arc::new(GainPair::new(Gains::from_mix(mix))),
        }
    }

    /// Clamp to 0-100 and publish both gains as one update. Returns the stored mix.
    ///
    /// While started the last-known mix follows; while stopped it is left
    /// alone, so [`start`](Self::start) restores the mix from before the stop.
    pub fn set_mix(&mut self, percent: f32) -> f32 {
        self.mix = clamp(percent, Self::MIN_MIX, Self::MAX_MIX);
        if self.started {
            self.last_known_mix = self.mix;
        }
        self.published.store(Gains::from_mix(self.mix));
        self.mix
    }

    /// Restore the last-known mix. Returns `false` (and does nothing) if already started.
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.set_mix(self.last_known_mix);
        self.started = true;
        true
    }

    /// Remember the current mix and go fully dry. Returns `false` (and does
    /// nothing) if already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.started {
            return false;
        }
        self.last_known_mix = self.mix;
        self.started = false;
        self.set_mix(Self::MIN_MIX);
        true
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }

    pub fn last_known_mix(&self) -> f32 {
        self.last_known_mix
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Gains as currently published to the audio timeline.
    pub fn gains(&self) -> Gains {
        self.published.load()
    }

    pub fn stage(&self) -> CrossfadeStage {
        CrossfadeStage {
            gains: Arc::clone(&self.published),
        }
    }
}

impl Default for BypassCrossfadeMixer {
    fn default() -> Self {
        Self::new(Self::MAX_MIX)
    }
}
