//! Waveform parameters: loosely typed client payloads in, clamped typed
//! parameters out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dsp::oscillator::WaveShape;
use crate::error::ParamError;

pub const MIN_FREQUENCY: f64 = 0.1;
pub const MAX_FREQUENCY: f64 = 20.0;
pub const MIN_AMPLITUDE: f64 = 0.0;
pub const MAX_AMPLITUDE: f64 = 1.0;

/// Defaults for fields missing from an `update_params` payload.
pub const DEFAULT_FREQUENCY: f64 = 1.0;
pub const DEFAULT_AMPLITUDE: f64 = 0.5;

/// Shape, frequency and amplitude of one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformParams {
    #[serde(rename = "type")]
    pub shape: WaveShape,
    /// Hz, within `[MIN_FREQUENCY, MAX_FREQUENCY]` once clamped.
    pub frequency: f64,
    /// Unitless gain, within `[MIN_AMPLITUDE, MAX_AMPLITUDE]` once clamped.
    pub amplitude: f64,
}

impl WaveformParams {
    /// The waveform pushed to every new connection.
    pub fn initial() -> Self {
        WaveformParams {
            shape: WaveShape::Sine,
            frequency: 2.0,
            amplitude: 0.7,
        }
    }

    /// Clamp frequency and amplitude into range. Values on a bound are kept.
    pub fn clamped(self) -> Self {
        WaveformParams {
            frequency: clamp_frequency(self.frequency),
            amplitude: clamp_amplitude(self.amplitude),
            ..self
        }
    }
}

pub fn clamp_frequency(frequency: f64) -> f64 {
    frequency.min(MAX_FREQUENCY).max(MIN_FREQUENCY)
}

pub fn clamp_amplitude(amplitude: f64) -> f64 {
    amplitude.min(MAX_AMPLITUDE).max(MIN_AMPLITUDE)
}

/// An `update_params` payload as received: every field optional and of
/// any JSON type. A field present as `null` is kept as `Some(Value::Null)`
/// so it is distinguishable from an absent one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParams {
    pub shape: Option<Value>,
    pub frequency: Option<Value>,
    pub amplitude: Option<Value>,
}

impl RawParams {
    /// Pick the known fields out of a payload. Extra fields are ignored.
    pub fn from_value(payload: &Value) -> Result<Self, ParamError> {
        let map = payload
            .as_object()
            .ok_or_else(|| ParamError::NotAnObject(json_kind(payload).to_string()))?;
        Ok(RawParams {
            shape: map.get("type").cloned(),
            frequency: map.get("frequency").cloned(),
            amplitude: map.get("amplitude").cloned(),
        })
    }

    /// Coerce every field to its typed form, substituting defaults for
    /// absent fields. The result is not yet clamped.
    pub fn coerce(&self) -> Result<WaveformParams, ParamError> {
        let shape = match &self.shape {
            None => WaveShape::Sine,
            Some(Value::String(name)) => WaveShape::from(name.clone()),
            Some(other) => return Err(ParamError::InvalidShape(other.to_string())),
        };
        let frequency = coerce_number("frequency", self.frequency.as_ref(), DEFAULT_FREQUENCY)?;
        let amplitude = coerce_number("amplitude", self.amplitude.as_ref(), DEFAULT_AMPLITUDE)?;
        Ok(WaveformParams {
            shape,
            frequency,
            amplitude,
        })
    }

    /// Coerce, then clamp.
    pub fn resolve(&self) -> Result<WaveformParams, ParamError> {
        Ok(self.coerce()?.clamped())
    }
}

/// Numbers pass through, numeric strings are parsed after trimming,
/// everything else is rejected. NaN is rejected; infinities are left for
/// clamping.
pub fn coerce_number(
    field: &'static str,
    value: Option<&Value>,
    default: f64,
) -> Result<f64, ParamError> {
    let number = match value {
        None => return Ok(default),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    let describe = || value.map(Value::to_string).unwrap_or_default();
    match number {
        Some(n) if n.is_nan() => Err(ParamError::NotANumber {
            field,
            value: describe(),
        }),
        Some(n) => Ok(n),
        None => Err(ParamError::NotNumeric {
            field,
            value: describe(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
