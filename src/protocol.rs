//! Wire protocol — named events carried as JSON text frames.
//!
//! Every frame is an envelope `{"event": <name>, "data": <payload>}`.
//! Clients send `update_params`; the server answers with `waveform_data`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::params::WaveformParams;

pub const UPDATE_PARAMS: &str = "update_params";
pub const WAVEFORM_DATA: &str = "waveform_data";

/// Rendered samples paired with the post-clamp parameters that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformResult {
    pub data: Vec<f64>,
    pub params: WaveformParams,
}

/// Events pushed from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    WaveformData(WaveformResult),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::WaveformData(_) => WAVEFORM_DATA,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Events received from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Raw payload; coercion happens in the session handler so a bad
    /// payload only costs that one message.
    UpdateParams(Value),
    /// An event name this server does not handle.
    Unknown(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default = "empty_object")]
    data: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl ClientEvent {
    /// Decode one text frame. Fails only when the frame is not an
    /// envelope at all.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Ok(match envelope.event.as_str() {
            UPDATE_PARAMS => ClientEvent::UpdateParams(envelope.data),
            _ => ClientEvent::Unknown(envelope.event),
        })
    }
}
