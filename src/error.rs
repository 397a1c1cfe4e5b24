use thiserror::Error;

/// Top-level error for startup and serving.
#[derive(Error, Debug)]
pub enum WaveplotError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Invalid server or sampling configuration. Fatal at startup.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive")]
    SampleRate,

    #[error("duration must be a positive finite number of seconds, got {0}")]
    Duration(f64),

    #[error("sample count {count} outside 1..={max}")]
    SampleCount { count: usize, max: usize },

    #[error("host must not be empty")]
    EmptyHost,

    #[error("invalid CORS origin '{0}'")]
    CorsOrigin(String),
}

/// A single `update_params` payload could not be coerced. Contained to
/// that message; the connection stays open.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(String),

    #[error("field '{field}' is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },

    #[error("field '{field}' is NaN: {value}")]
    NotANumber { field: &'static str, value: String },

    #[error("field 'type' must be a string, got {0}")]
    InvalidShape(String),
}

pub type Result<T> = std::result::Result<T, WaveplotError>;
