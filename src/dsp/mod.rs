//! Waveform synthesis — pure functions from shape and sampling to samples.
//!
//! Nothing here holds state or does I/O; every render is recomputed from
//! its inputs.

pub mod oscillator;
pub mod renderer;
pub mod sampling;
