//! Sampling configuration — how many discrete time points a render evaluates.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default sample rate in samples per second.
pub const DEFAULT_SAMPLE_RATE: u32 = 1000;
/// Default render length in seconds.
pub const DEFAULT_DURATION: f64 = 1.0;
/// Largest sample count a single render may produce.
pub const MAX_SAMPLE_COUNT: usize = 10_000_000;

/// Sample rate and duration of one render.
///
/// The time axis is `t_i = i / sample_rate` for `i` in `0..sample_count()`,
/// i.e. the half-open interval `[0, duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    sample_rate: u32,
    duration: f64,
}

impl SamplingConfig {
    /// Build a validated config. Rejects a zero rate, a non-positive or
    /// non-finite duration, and sample counts outside `1..=MAX_SAMPLE_COUNT`.
    pub fn new(sample_rate: u32, duration: f64) -> Result<Self, ConfigError> {
        let config = SamplingConfig {
            sample_rate,
            duration,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants. Deserialized configs bypass `new`, so callers
    /// loading from a file must run this themselves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::SampleRate);
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ConfigError::Duration(self.duration));
        }
        let count = self.sample_count();
        if count == 0 || count > MAX_SAMPLE_COUNT {
            return Err(ConfigError::SampleCount {
                count,
                max: MAX_SAMPLE_COUNT,
            });
        }
        Ok(())
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// `floor(sample_rate * duration)`.
    pub fn sample_count(&self) -> usize {
        (self.sample_rate as f64 * self.duration).floor() as usize
    }

    /// Time in seconds of sample `index`.
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate as f64
    }

    /// Iterate the time axis.
    pub fn time_axis(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.sample_count()).map(|i| self.time_at(i))
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration: DEFAULT_DURATION,
        }
    }
}
