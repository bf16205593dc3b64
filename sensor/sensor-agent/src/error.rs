//! Error types for the sensorimotor agent.

use surface_features::{Location, SurfaceError};
use thiserror::Error;

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors raised while configuring or running the agent.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AgentError {
    /// Surface feature extraction rejected a call.
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// Reading a configuration file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is malformed or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// A patch does not fit inside the environment at the requested centre.
    #[error("{side_len}x{side_len} patch centred at {centre} leaves a {rows}x{cols} environment")]
    PatchOutOfBounds {
        /// Requested patch centre.
        centre: Location,
        /// Patch side length.
        side_len: usize,
        /// Environment rows.
        rows: usize,
        /// Environment columns.
        cols: usize,
    },

    /// A location lies outside the valid agent bounds.
    #[error("location {location} is outside bounds {min}..={max}")]
    OutsideBounds {
        /// Offending location.
        location: Location,
        /// Inclusive lower corner.
        min: Location,
        /// Inclusive upper corner.
        max: Location,
    },

    /// Encoder parameters are invalid.
    #[error("invalid encoder: {0}")]
    Encoder(String),

    /// Encoder input is outside the configured range.
    #[error("value {input} outside encoder range {min}..={max}")]
    ValueOutOfRange {
        /// Input value.
        input: u32,
        /// Range minimum.
        min: u32,
        /// Range maximum.
        max: u32,
    },
}

impl AgentError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(details: impl Into<String>) -> Self {
        Self::Config(details.into())
    }

    /// Creates an encoder error.
    #[must_use]
    pub fn encoder(details: impl Into<String>) -> Self {
        Self::Encoder(details.into())
    }
}

impl From<toml::de::Error> for AgentError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}
