//! Grid-world sensorimotor agent built on [`surface_features`].
//!
//! The agent repeatedly:
//!
//! 1. Cuts a square patch out of a [`GridEnvironment`] at its current location
//! 2. Senses [`Features`](surface_features::Features) and
//!    [`Pose`](surface_features::Pose) at the patch centre
//! 3. Encodes the mean depth with an [`IntegerEncoder`]
//! 4. Folds the observation into a [`GridLearningModule`]
//! 5. Moves according to a [`MotorPolicy`]
//!
//! At the end of a run the buffered model is committed and the last
//! observation is matched against everything learnt so far.
//!
//! # Configuration
//!
//! Runs are described by an [`AgentConfig`], loadable from TOML. Every field
//! has a default, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```
//! use sensor_agent::{Agent, AgentConfig};
//!
//! let config = AgentConfig::default().with_seed(7).with_num_steps(5);
//! let summary = Agent::new(config)?.run()?;
//!
//! assert_eq!(summary.steps, 5);
//! assert_eq!(summary.committed_model, Some(0));
//! # Ok::<(), sensor_agent::AgentError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod agent;
mod config;
mod encoder;
mod environment;
mod error;
mod learning;
mod motor;

pub use agent::{Agent, Observation, SessionSummary};
pub use config::{AgentConfig, EncoderConfig, EnvironmentConfig, ModelConfig, PatchConfig, RunConfig};
pub use encoder::{IntegerEncoder, SparseCode, encode_integer};
pub use environment::{GridEnvironment, PatchBounds, patch_bounds};
pub use error::{AgentError, AgentResult};
pub use learning::{CellModel, GridLearningModule, ModelMatch, ObjectModel};
pub use motor::{MotorPolicy, Movement, RandomMotorPolicy};
