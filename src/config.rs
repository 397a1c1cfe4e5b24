//! Server configuration.
//!
//! Resolution order, lowest to highest precedence: built-in defaults, a TOML
//! file (explicit `--config` path, else `waveplot.toml` in the platform
//! config directory if present), then `HOST` / `PORT` and CLI flags.

use std::path::{Path, PathBuf};

use axum::http::HeaderValue;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::dsp::sampling::SamplingConfig;
use crate::error::{ConfigError, Result};

pub const CONFIG_FILE_NAME: &str = "waveplot.toml";

/// Renders longer than this many samples run on the blocking pool.
pub const DEFAULT_OFFLOAD_THRESHOLD: usize = 100_000;

/// Immutable server settings, handed to the router and session handler
/// at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed origins for cross-origin requests. `"*"` allows any.
    pub cors_origins: Vec<String>,
    /// Sampling used for every render. Not client-controllable.
    pub sampling: SamplingConfig,
    pub offload_threshold: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["*".to_string()],
            sampling: SamplingConfig::default(),
            offload_threshold: DEFAULT_OFFLOAD_THRESHOLD,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ServerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load from `explicit` if given, else from the default location if a
    /// file exists there, else fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::info!("Loading config from {}", path.display());
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::info!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Apply host/port overrides from the environment or command line.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Result<Self> {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        self.sampling.validate()?;
        for origin in &self.cors_origins {
            if origin != "*" && HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::CorsOrigin(origin.clone()));
            }
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

/// `<platform config dir>/waveplot/waveplot.toml`, if a home directory can
/// be determined.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "waveplot").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
