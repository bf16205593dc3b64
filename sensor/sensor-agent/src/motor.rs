//! Motor policies that move the agent between sensing steps.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use surface_features::{Features, Location, Pose};
use tracing::trace;

use crate::environment::PatchBounds;
use crate::error::{AgentError, AgentResult};

/// A displacement on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Movement {
    /// Column displacement.
    pub dx: i32,
    /// Row displacement.
    pub dy: i32,
}

impl Movement {
    /// Creates a movement.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Applies the movement to a location.
    #[must_use]
    pub const fn apply(self, location: Location) -> Location {
        location.offset(self.dx, self.dy)
    }
}

/// Chooses the next movement from the latest observation.
pub trait MotorPolicy {
    /// Current agent location.
    fn location(&self) -> Location;

    /// Picks and applies the next movement.
    fn next_movement(&mut self, features: &Features, pose: &Pose) -> Movement;
}

/// The eight unit steps to neighbouring cells.
const NEIGHBOUR_STEPS: [Movement; 8] = [
    Movement::new(-1, -1),
    Movement::new(0, -1),
    Movement::new(1, -1),
    Movement::new(-1, 0),
    Movement::new(1, 0),
    Movement::new(-1, 1),
    Movement::new(0, 1),
    Movement::new(1, 1),
];

/// Random walk over neighbouring cells that never leaves its bounds.
///
/// # Example
///
/// ```
/// use sensor_agent::{patch_bounds, MotorPolicy, RandomMotorPolicy};
/// use surface_features::Location;
///
/// let bounds = patch_bounds(10, 10, 3)?;
/// let policy = RandomMotorPolicy::seeded(Location::new(5, 1), bounds, 42)?;
/// assert_eq!(policy.location(), Location::new(5, 1));
/// # Ok::<(), sensor_agent::AgentError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RandomMotorPolicy<R = StdRng> {
    location: Location,
    bounds: PatchBounds,
    rng: R,
}

impl RandomMotorPolicy<StdRng> {
    /// Creates a policy driven by a seeded [`StdRng`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::OutsideBounds`] if `start` is outside `bounds`.
    pub fn seeded(start: Location, bounds: PatchBounds, seed: u64) -> AgentResult<Self> {
        Self::with_rng(start, bounds, StdRng::seed_from_u64(seed))
    }
}

impl<R: rand::Rng> RandomMotorPolicy<R> {
    /// Creates a policy driven by `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::OutsideBounds`] if `start` is outside `bounds`.
    pub fn with_rng(start: Location, bounds: PatchBounds, rng: R) -> AgentResult<Self> {
        if !bounds.contains(start) {
            return Err(AgentError::OutsideBounds {
                location: start,
                min: bounds.min,
                max: bounds.max,
            });
        }
        Ok(Self {
            location: start,
            bounds,
            rng,
        })
    }

    /// Bounds the walk is confined to.
    #[must_use]
    pub const fn bounds(&self) -> PatchBounds {
        self.bounds
    }
}

impl<R: rand::Rng> MotorPolicy for RandomMotorPolicy<R> {
    fn location(&self) -> Location {
        self.location
    }

    fn next_movement(&mut self, _features: &Features, _pose: &Pose) -> Movement {
        let candidates: Vec<Movement> = NEIGHBOUR_STEPS
            .iter()
            .copied()
            .filter(|m| self.bounds.contains(m.apply(self.location)))
            .collect();

        // Single-cell bounds leave nowhere to go
        let movement = candidates
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default();
        self.location = movement.apply(self.location);
        trace!(dx = movement.dx, dy = movement.dy, location = %self.location, "moved");
        movement
    }
}
