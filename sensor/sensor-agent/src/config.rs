//! Configuration loading for the sensorimotor agent.
//!
//! Every section and field is optional in the TOML file; missing values take
//! the defaults below.
//!
//! ```toml
//! [environment]
//! rows = 10
//! cols = 10
//! seed = 7
//! max_value = 255
//!
//! [patch]
//! side_len = 3
//!
//! [run]
//! num_steps = 10
//! start_x = 5
//! start_y = 1
//!
//! [encoder]
//! num_bits = 64
//! num_active_bits = 8
//!
//! [model]
//! rows = 5
//! cols = 5
//! ```

use std::path::Path;

use serde::Deserialize;
use surface_features::Location;

use crate::environment::patch_bounds;
use crate::error::{AgentError, AgentResult};

/// Top-level agent configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Environment grid settings.
    pub environment: EnvironmentConfig,
    /// Sensor patch settings.
    pub patch: PatchConfig,
    /// Episode settings.
    pub run: RunConfig,
    /// Sparse encoder settings.
    pub encoder: EncoderConfig,
    /// Learning module grid settings.
    pub model: ModelConfig,
}

/// Environment grid settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Grid rows (default: 10)
    pub rows: usize,
    /// Grid columns (default: 10)
    pub cols: usize,
    /// Seed for environment generation and the motor policy (default: 0)
    pub seed: u64,
    /// Largest value sample (default: 255)
    pub max_value: u32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            seed: 0,
            max_value: 255,
        }
    }
}

/// Sensor patch settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Side length of the square patch (default: 3)
    pub side_len: usize,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self { side_len: 3 }
    }
}

/// Episode settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of sense/move steps (default: 10)
    pub num_steps: u32,
    /// Starting patch centre column (default: 5)
    pub start_x: i32,
    /// Starting patch centre row (default: 1)
    pub start_y: i32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_steps: 10,
            start_x: 5,
            start_y: 1,
        }
    }
}

impl RunConfig {
    /// Starting location of the agent.
    #[must_use]
    pub const fn start(&self) -> Location {
        Location::new(self.start_x, self.start_y)
    }
}

/// Sparse encoder settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Total bits in a code (default: 64)
    pub num_bits: u16,
    /// Active bits per code (default: 8)
    pub num_active_bits: u16,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            num_bits: 64,
            num_active_bits: 8,
        }
    }
}

/// Learning module grid settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model rows; must divide the environment rows (default: 5)
    pub rows: usize,
    /// Model columns; must divide the environment columns (default: 5)
    pub cols: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { rows: 5, cols: 5 }
    }
}

impl AgentConfig {
    /// Loads and validates a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or fails
    /// [`AgentConfig::validate`].
    pub fn load(path: &Path) -> AgentResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or fails validation.
    pub fn from_toml(content: &str) -> AgentResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the settings are mutually consistent.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] describing the first problem found.
    pub fn validate(&self) -> AgentResult<()> {
        let env = &self.environment;
        if env.rows == 0 || env.cols == 0 {
            return Err(AgentError::config(format!(
                "environment must be at least 1x1, got {}x{}",
                env.rows, env.cols
            )));
        }
        if self.patch.side_len == 0 || self.patch.side_len == 2 {
            return Err(AgentError::config(format!(
                "patch side_len must be 1 or at least 3, got {}",
                self.patch.side_len
            )));
        }

        let bounds = patch_bounds(env.rows, env.cols, self.patch.side_len)?;
        let start = self.run.start();
        if !bounds.contains(start) {
            return Err(AgentError::config(format!(
                "start {start} is outside the valid patch centres {}..={}",
                bounds.min, bounds.max
            )));
        }

        let enc = &self.encoder;
        if enc.num_active_bits == 0 || enc.num_active_bits > enc.num_bits {
            return Err(AgentError::config(format!(
                "encoder needs 0 < num_active_bits <= num_bits, got {} of {}",
                enc.num_active_bits, enc.num_bits
            )));
        }

        let model = &self.model;
        if model.rows == 0
            || model.cols == 0
            || env.rows % model.rows != 0
            || env.cols % model.cols != 0
            || env.rows / model.rows != env.cols / model.cols
        {
            return Err(AgentError::config(format!(
                "model {}x{} must tile the {}x{} environment at one uniform scale",
                model.rows, model.cols, env.rows, env.cols
            )));
        }

        Ok(())
    }

    /// Set the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.environment.seed = seed;
        self
    }

    /// Set the number of steps.
    #[must_use]
    pub const fn with_num_steps(mut self, num_steps: u32) -> Self {
        self.run.num_steps = num_steps;
        self
    }

    /// Set the starting location.
    #[must_use]
    pub const fn with_start(mut self, start: Location) -> Self {
        self.run.start_x = start.x;
        self.run.start_y = start.y;
        self
    }
}
