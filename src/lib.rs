//! # Stagebox - Audio-Graph Effect Nodes
//!
//! Control plane for effect and analysis nodes that wrap black-box audio
//! units living in a host audio graph.
//!
//! ## Architecture
//!
//! Stagebox is an umbrella crate that coordinates:
//! - **stagebox-core** - Parameter specs and clamping, unit bridge, bypass crossfade, graph traits
//! - **stagebox-dsp** - Effect nodes (compressor, dynamics processor, peak limiter, delay)
//! - **stagebox-analysis** - Analysis nodes (frequency tracker)
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use stagebox::prelude::*;
//!
//! let offline = Arc::new(OfflineGraph::new());
//! let graph: Arc<dyn GraphService> = offline.clone();
//!
//! let comp = Compressor::new(CompressorConfig::default())?;
//! comp.install(&graph, StreamFormat::default())?;
//!
//! // Usable before the unit attaches: values clamp and queue
//! assert!(comp.set_threshold(100.0).is_err());
//! assert_eq!(comp.threshold(), 20.0);
//!
//! offline.complete_pending();
//! assert_eq!(comp.state(), NodeState::Started);
//!
//! comp.stop();
//! assert_eq!(comp.gains(), Gains::BYPASS);
//! # Ok::<(), stagebox::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Effect and analysis nodes
//! - `dsp` - Effect nodes
//! - `analysis` - Analysis nodes
//! - `serialization` - serde support for analysis types
//! - `full` - Everything enabled

/// Re-export of stagebox-core for direct access
pub use stagebox_core as core;

pub use stagebox_core::{
    clamp, AudioNode, BackingUnit, BypassCrossfadeMixer, ComponentDescriptor, ComponentKind,
    CrossfadeStage, Endpoint, FourCc, Gains, GraphService, NodeEndpoints, NodeKey, NodeState,
    OfflineGraph, ParameterId, ParameterScope, ParameterSpec, ParameterUnit, SoftUnit, Stage,
    StreamFormat, UnitHandle,
};

mod error;
pub use error::{Error, Result};

mod chain;
pub use chain::{Chain, ChainBuilder};

#[cfg(feature = "dsp")]
pub use stagebox_dsp as dsp;
#[cfg(feature = "dsp")]
pub use stagebox_dsp::{
    Compressor, CompressorConfig, Delay, DelayConfig, DynamicsProcessor, DynamicsProcessorConfig,
    EffectNode, PeakLimiter, PeakLimiterConfig,
};

#[cfg(feature = "analysis")]
pub use stagebox_analysis as analysis;
#[cfg(feature = "analysis")]
pub use stagebox_analysis::{
    AnalysisNode, ChannelCorrection, FrequencyTracker, FrequencyTrackerConfig, TrackerReading,
};

/// Everything needed to build and control nodes.
pub mod prelude {
    pub use crate::{Chain, Error};

    pub use stagebox_core::{
        AudioNode, Gains, GraphService, NodeState, OfflineGraph, ParameterId, StreamFormat,
    };

    #[cfg(feature = "dsp")]
    pub use stagebox_dsp::{
        Compressor, CompressorConfig, Delay, DelayConfig, DynamicsProcessor,
        DynamicsProcessorConfig, EffectNode, PeakLimiter, PeakLimiterConfig,
    };

    #[cfg(feature = "analysis")]
    pub use stagebox_analysis::{
        AnalysisNode, ChannelCorrection, FrequencyTracker, FrequencyTrackerConfig,
    };
}
