//! The sense–learn–move loop.

use rand::SeedableRng;
use rand::rngs::StdRng;
use surface_features::{Features, Location, Pose};
use tracing::{debug, info};

use crate::config::AgentConfig;
use crate::encoder::{IntegerEncoder, SparseCode};
use crate::environment::{GridEnvironment, patch_bounds};
use crate::error::AgentResult;
use crate::learning::{GridLearningModule, ModelMatch};
use crate::motor::{MotorPolicy, Movement, RandomMotorPolicy};

/// Separates the motor policy's random stream from the environment's.
const POLICY_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// Everything the agent perceived and did in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Step index, starting at zero.
    pub step: u32,
    /// Patch centre in world coordinates.
    pub location: Location,
    /// Sensed features.
    pub features: Features,
    /// Sensed pose.
    pub pose: Pose,
    /// Sparse code of the patch mean depth.
    pub depth_code: SparseCode,
    /// Movement taken after sensing.
    pub movement: Movement,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Steps executed in this run.
    pub steps: u32,
    /// Steps whose pose was fully defined.
    pub fully_defined_steps: u32,
    /// Agent location after the last movement.
    pub final_location: Location,
    /// Index of the model committed at the end of the run.
    pub committed_model: Option<usize>,
    /// Best match for the last observation against the learnt models.
    pub last_match: Option<ModelMatch>,
}

/// A sensorimotor agent exploring a [`GridEnvironment`].
#[derive(Debug)]
pub struct Agent {
    config: AgentConfig,
    environment: GridEnvironment,
    policy: RandomMotorPolicy,
    learning: GridLearningModule,
    encoder: IntegerEncoder,
    steps_taken: u32,
}

impl Agent {
    /// Builds an agent in a randomly populated environment.
    ///
    /// The environment and the motor policy are both derived from
    /// `config.environment.seed`, so runs are reproducible.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: AgentConfig) -> AgentResult<Self> {
        config.validate()?;
        let env_cfg = &config.environment;
        let mut environment = GridEnvironment::new(env_cfg.rows, env_cfg.cols)?;
        environment.populate_random(&mut StdRng::seed_from_u64(env_cfg.seed), env_cfg.max_value);
        Self::with_environment(config, environment)
    }

    /// Builds an agent in a given environment.
    ///
    /// The environment dimensions replace those in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid for this environment.
    pub fn with_environment(mut config: AgentConfig, environment: GridEnvironment) -> AgentResult<Self> {
        config.environment.rows = environment.rows();
        config.environment.cols = environment.cols();
        config.validate()?;

        let bounds = patch_bounds(environment.rows(), environment.cols(), config.patch.side_len)?;
        let policy = RandomMotorPolicy::seeded(
            config.run.start(),
            bounds,
            config.environment.seed ^ POLICY_SEED_OFFSET,
        )?;
        let learning = GridLearningModule::new(
            config.model.rows,
            config.model.cols,
            environment.rows(),
            environment.cols(),
        )?;
        let encoder = IntegerEncoder::new(
            u32::from(u8::MIN)..=u32::from(u8::MAX),
            config.encoder.num_bits,
            config.encoder.num_active_bits,
        )?;

        Ok(Self {
            config,
            environment,
            policy,
            learning,
            encoder,
            steps_taken: 0,
        })
    }

    /// The environment being explored.
    #[must_use]
    pub const fn environment(&self) -> &GridEnvironment {
        &self.environment
    }

    /// The learning module.
    #[must_use]
    pub const fn learning(&self) -> &GridLearningModule {
        &self.learning
    }

    /// Current agent location.
    #[must_use]
    pub fn location(&self) -> Location {
        self.policy.location()
    }

    /// Senses at the current location, learns, then moves.
    ///
    /// # Errors
    ///
    /// Returns an error if sensing or learning rejects the location.
    pub fn step(&mut self) -> AgentResult<Observation> {
        let location = self.policy.location();
        let patch = self
            .environment
            .extract_patch(location, self.config.patch.side_len)?;
        debug!(step = self.steps_taken, %location, "patch:\n{}", patch.depths());

        let (features, pose) = patch.sense(patch.centre())?;
        let depth_code = self.encoder.encode(u32::from(features.mean_depth))?;
        self.learning.explore(&features, &pose, location)?;
        let movement = self.policy.next_movement(&features, &pose);

        let observation = Observation {
            step: self.steps_taken,
            location,
            features,
            pose,
            depth_code,
            movement,
        };
        self.steps_taken += 1;
        Ok(observation)
    }

    /// Runs the configured number of steps, commits the learnt model, and
    /// matches the last observation against memory.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Agent::step`].
    pub fn run(&mut self) -> AgentResult<SessionSummary> {
        let first_step = self.steps_taken;
        let mut fully_defined_steps = 0;
        let mut last: Option<Observation> = None;

        for _ in 0..self.config.run.num_steps {
            let obs = self.step()?;
            info!(step = obs.step, location = %obs.location, "{}", obs.features);
            info!(step = obs.step, "{}", obs.pose);
            debug!(step = obs.step, code = %obs.depth_code, "mean depth code");
            if obs.pose.fully_defined {
                fully_defined_steps += 1;
            }
            last = Some(obs);
        }

        let committed_model = self.learning.commit();
        let last_match = match &last {
            Some(obs) => self
                .learning
                .match_observation(&obs.features, obs.location)?,
            None => None,
        };
        if let Some(m) = last_match {
            info!(model = m.model, distance = m.distance, "matched last observation");
        }

        Ok(SessionSummary {
            steps: self.steps_taken - first_step,
            fully_defined_steps,
            final_location: self.policy.location(),
            committed_model,
            last_match,
        })
    }
}
