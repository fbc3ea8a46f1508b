//! # Stagebox Analysis
//!
//! Analysis nodes: pass-through taps whose backing units only report values.
//!
//! - **[`AnalysisNode`]**: generic tap with live reads, enable/disable and a
//!   [`ChannelCorrection`] for units that sum channels
//! - **[`FrequencyTracker`]**: amplitude and pitch, corrected for stereo input
//!
//! ## Example
//!
//! ```rust
//! use stagebox_analysis::{ChannelCorrection, TrackerReading};
//!
//! let raw = TrackerReading { amplitude: 0.8, frequency: 220.0 };
//! let stereo = ChannelCorrection::STEREO;
//! let reading = TrackerReading {
//!     amplitude: stereo.amplitude(raw.amplitude),
//!     frequency: stereo.frequency(raw.frequency),
//! };
//! assert_eq!(reading.note_name().as_deref(), Some("A4"));
//! ```

pub mod frequency_tracker;
pub mod node;

pub use frequency_tracker::{FrequencyTracker, FrequencyTrackerConfig, TrackerReading};
pub use node::{AnalysisNode, ChannelCorrection};
