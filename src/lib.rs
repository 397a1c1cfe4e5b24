pub mod config;
pub mod dsp;
pub mod error;
pub mod params;
pub mod protocol;
pub mod server;
pub mod session;

pub use config::ServerConfig;
pub use dsp::oscillator::WaveShape;
pub use dsp::renderer::synthesize;
pub use dsp::sampling::SamplingConfig;
pub use error::{ConfigError, ParamError, Result, WaveplotError};
pub use params::WaveformParams;
pub use protocol::{ClientEvent, ServerEvent, WaveformResult};
pub use session::{Connection, ConnectionId, SessionHandler};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
