//! Stateless oscillators evaluated directly at a point in time.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported waveform shapes.
///
/// Anything that is not one of the three known names is kept verbatim as
/// `Unknown` so it can be echoed back; it renders as silence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WaveShape {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Unknown(String),
}

impl WaveShape {
    /// Wire name of the shape. Matching is case-sensitive.
    pub fn as_str(&self) -> &str {
        match self {
            WaveShape::Sine => "sine",
            WaveShape::Square => "square",
            WaveShape::Sawtooth => "sawtooth",
            WaveShape::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, WaveShape::Unknown(_))
    }

    /// Unit-amplitude value of this shape at time `t` seconds.
    pub fn value_at(&self, frequency: f64, t: f64) -> f64 {
        match self {
            WaveShape::Sine => sine(frequency, t),
            WaveShape::Square => square(frequency, t),
            WaveShape::Sawtooth => sawtooth(frequency, t),
            WaveShape::Unknown(_) => 0.0,
        }
    }
}

impl From<&str> for WaveShape {
    fn from(name: &str) -> Self {
        match name {
            "sine" => WaveShape::Sine,
            "square" => WaveShape::Square,
            "sawtooth" => WaveShape::Sawtooth,
            other => WaveShape::Unknown(other.to_string()),
        }
    }
}

impl From<String> for WaveShape {
    fn from(name: String) -> Self {
        match name.as_str() {
            "sine" => WaveShape::Sine,
            "square" => WaveShape::Square,
            "sawtooth" => WaveShape::Sawtooth,
            _ => WaveShape::Unknown(name),
        }
    }
}

impl From<WaveShape> for String {
    fn from(shape: WaveShape) -> Self {
        match shape {
            WaveShape::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WaveShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn sine(frequency: f64, t: f64) -> f64 {
    (2.0 * PI * frequency * t).sin()
}

/// Sign of the sine: exact zero crossings yield 0.
fn square(frequency: f64, t: f64) -> f64 {
    sign(sine(frequency, t))
}

/// Rises from -1 towards +1 once per cycle.
fn sawtooth(frequency: f64, t: f64) -> f64 {
    2.0 * frac(frequency * t) - 1.0
}

/// `f64::signum` maps +0.0 to 1.0; a square wave needs sign(0) = 0.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Fractional part normalized into `[0, 1)`, also for negative inputs.
fn frac(x: f64) -> f64 {
    let r = x.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative x
    if r >= 1.0 { 0.0 } else { r }
}
