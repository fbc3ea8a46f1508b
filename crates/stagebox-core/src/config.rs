//! Stream format configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Format used when connecting node endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamFormat {
    pub sample_rate: f64,
    pub channels: u16,
}

impl Default for StreamFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            channels: 2,
        }
    }
}

impl StreamFormat {
    pub fn new(sample_rate: f64, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn stereo(sample_rate: f64) -> Self {
        Self::new(sample_rate, 2)
    }

    pub fn mono(sample_rate: f64) -> Self {
        Self::new(sample_rate, 1)
    }

    /// Nyquist frequency in Hz.
    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    pub fn validate(&self) -> Result<()> {
        if !(8000.0..=384000.0).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.channels == 0 || self.channels > 32 {
            return Err(Error::InvalidConfig(format!(
                "channels {} out of range (1-32)",
                self.channels
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        let format = StreamFormat::default();
        assert_eq!(format.sample_rate, 44100.0);
        assert_eq!(format.channels, 2);
        assert!(format.validate().is_ok());
        assert_eq!(format.nyquist(), 22050.0);
    }

    #[test]
    fn test_invalid_formats() {
        assert!(StreamFormat::stereo(1000.0).validate().is_err());
        assert!(StreamFormat::new(48000.0, 0).validate().is_err());
        assert!(StreamFormat::new(48000.0, 64).validate().is_err());
        assert!(StreamFormat::mono(f64::NAN).validate().is_err());
    }
}
