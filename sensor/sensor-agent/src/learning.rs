//! Coarse spatial-averaging learning module.
//!
//! The world is tiled into a coarse grid of cells. While exploring, every
//! observation is folded into the running mean of the cell it falls in,
//! building a low-resolution model of the object being sensed. Finished models
//! are committed to long-term memory and later matched against new
//! observations by comparing cell statistics.

use surface_features::{Features, FixedPoint, Grid, Location, Pose};
use tracing::{debug, info};

use crate::error::{AgentError, AgentResult};

/// Running statistics of the observations that fell into one model cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellModel {
    /// Observations folded in so far.
    pub count: u32,
    /// Mean world location.
    pub mean_location: Location,
    /// Mean of the patch mean depths.
    pub mean_depth: u8,
    /// Mean value sample.
    pub mean_value: u32,
    /// Mean larger principal curvature.
    pub mean_curvature_1: FixedPoint,
    /// Mean smaller principal curvature.
    pub mean_curvature_2: FixedPoint,
    /// Most recent pose seen in this cell.
    pub last_pose: Option<Pose>,
}

/// Integer running mean: folds `next` into `mean` over `count` prior samples.
fn running_mean(mean: i64, next: i64, count: u32) -> i64 {
    let count = i64::from(count);
    (mean * count + next) / (count + 1)
}

impl CellModel {
    fn observe(&mut self, features: &Features, pose: &Pose, location: Location) {
        let n = self.count;
        let fold_i32 = |mean: i32, next: i32| {
            i32::try_from(running_mean(i64::from(mean), i64::from(next), n)).unwrap_or(next)
        };

        self.mean_location = Location::new(
            fold_i32(self.mean_location.x, location.x),
            fold_i32(self.mean_location.y, location.y),
        );
        self.mean_depth = u8::try_from(running_mean(
            i64::from(self.mean_depth),
            i64::from(features.mean_depth),
            n,
        ))
        .unwrap_or(features.mean_depth);
        self.mean_value = u32::try_from(running_mean(
            i64::from(self.mean_value),
            i64::from(features.value),
            n,
        ))
        .unwrap_or(features.value);
        self.mean_curvature_1 = FixedPoint::from_bits(fold_i32(
            self.mean_curvature_1.to_bits(),
            features.principal_curvature_1.to_bits(),
        ));
        self.mean_curvature_2 = FixedPoint::from_bits(fold_i32(
            self.mean_curvature_2.to_bits(),
            features.principal_curvature_2.to_bits(),
        ));
        self.last_pose = Some(*pose);
        self.count = n.saturating_add(1);
    }

    /// Distance between this cell and an observation.
    ///
    /// Sum of absolute differences of mean depth and the integer parts of both
    /// principal curvatures.
    #[must_use]
    pub fn distance(&self, features: &Features) -> u32 {
        u32::from(self.mean_depth.abs_diff(features.mean_depth))
            + self
                .mean_curvature_1
                .integer_part()
                .abs_diff(features.principal_curvature_1.integer_part())
            + self
                .mean_curvature_2
                .integer_part()
                .abs_diff(features.principal_curvature_2.integer_part())
    }
}

/// A coarse grid of [`CellModel`]s describing one object.
pub type ObjectModel = Grid<CellModel>;

/// Result of matching an observation against learnt models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelMatch {
    /// Index of the best learnt model.
    pub model: usize,
    /// Distance to that model's cell; lower is better.
    pub distance: u32,
}

/// Learning module with a short-term buffer and long-term model memory.
#[derive(Debug, Clone)]
pub struct GridLearningModule {
    buffer: ObjectModel,
    num_buffered: usize,
    learnt: Vec<ObjectModel>,
    scale: usize,
}

impl GridLearningModule {
    /// Creates a module whose `model_rows × model_cols` grid tiles a
    /// `world_rows × world_cols` world.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] unless the model tiles the world at one
    /// uniform integer scale.
    pub fn new(
        model_rows: usize,
        model_cols: usize,
        world_rows: usize,
        world_cols: usize,
    ) -> AgentResult<Self> {
        if model_rows == 0
            || model_cols == 0
            || world_rows % model_rows != 0
            || world_cols % model_cols != 0
            || world_rows / model_rows != world_cols / model_cols
        {
            return Err(AgentError::config(format!(
                "model {model_rows}x{model_cols} does not tile world {world_rows}x{world_cols} uniformly"
            )));
        }
        Ok(Self {
            buffer: ObjectModel::filled(model_rows, model_cols, CellModel::default())?,
            num_buffered: 0,
            learnt: Vec::new(),
            scale: world_rows / model_rows,
        })
    }

    /// World cells per model cell along each axis.
    #[must_use]
    pub const fn scale(&self) -> usize {
        self.scale
    }

    /// Observations in the short-term buffer.
    #[must_use]
    pub const fn num_buffered(&self) -> usize {
        self.num_buffered
    }

    /// Models in long-term memory.
    #[must_use]
    pub fn num_learnt_models(&self) -> usize {
        self.learnt.len()
    }

    /// The model being built.
    #[must_use]
    pub const fn buffer(&self) -> &ObjectModel {
        &self.buffer
    }

    /// A learnt model by index.
    #[must_use]
    pub fn learnt_model(&self, index: usize) -> Option<&ObjectModel> {
        self.learnt.get(index)
    }

    /// Model cell `(row, col)` containing a world location.
    fn cell_of(&self, world_location: Location) -> AgentResult<(usize, usize)> {
        let (col, row) = world_location.to_indices()?;
        let (row, col) = (row / self.scale, col / self.scale);
        if row >= self.buffer.rows() || col >= self.buffer.cols() {
            return Err(AgentError::OutsideBounds {
                location: world_location,
                min: Location::new(0, 0),
                max: Location::new(
                    i32::try_from(self.buffer.cols() * self.scale - 1).unwrap_or(i32::MAX),
                    i32::try_from(self.buffer.rows() * self.scale - 1).unwrap_or(i32::MAX),
                ),
            });
        }
        Ok((row, col))
    }

    /// Folds an observation into the buffered model.
    ///
    /// # Errors
    ///
    /// Returns an error if `world_location` is outside the modelled world.
    pub fn explore(
        &mut self,
        features: &Features,
        pose: &Pose,
        world_location: Location,
    ) -> AgentResult<()> {
        let (row, col) = self.cell_of(world_location)?;
        if let Some(cell) = self.buffer.get_mut(row, col) {
            cell.observe(features, pose, world_location);
            self.num_buffered += 1;
            debug!(%world_location, row, col, count = cell.count, "explored cell");
        }
        Ok(())
    }

    /// Moves the buffered model into long-term memory.
    ///
    /// Returns the new model's index, or `None` if nothing was buffered.
    pub fn commit(&mut self) -> Option<usize> {
        if self.num_buffered == 0 {
            return None;
        }
        let fresh = ObjectModel::filled(self.buffer.rows(), self.buffer.cols(), CellModel::default())
            .ok()?;
        let model = std::mem::replace(&mut self.buffer, fresh);
        self.learnt.push(model);
        info!(
            observations = self.num_buffered,
            models = self.learnt.len(),
            "committed object model"
        );
        self.num_buffered = 0;
        Some(self.learnt.len() - 1)
    }

    /// Finds the learnt model closest to an observation at `world_location`.
    ///
    /// Models with no data in that cell are skipped. Ties go to the earlier
    /// model. Returns `None` when no model has data there.
    ///
    /// # Errors
    ///
    /// Returns an error if `world_location` is outside the modelled world.
    pub fn match_observation(
        &self,
        features: &Features,
        world_location: Location,
    ) -> AgentResult<Option<ModelMatch>> {
        if self.learnt.is_empty() {
            return Ok(None);
        }
        let (row, col) = self.cell_of(world_location)?;

        let best = self
            .learnt
            .iter()
            .enumerate()
            .filter_map(|(model, grid)| {
                let cell = grid.get(row, col).filter(|c| c.count > 0)?;
                Some(ModelMatch {
                    model,
                    distance: cell.distance(features),
                })
            })
            .min_by_key(|m| (m.distance, m.model));

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use surface_features::Vector3;

    use super::*;

    fn features(mean_depth: u8, k1: i32, k2: i32, value: u32) -> Features {
        Features {
            value,
            min_depth: 0,
            max_depth: 255,
            mean_depth,
            principal_curvature_1: FixedPoint::from_int(k1),
            principal_curvature_2: FixedPoint::from_int(k2),
            fully_defined: k1 != k2,
        }
    }

    fn pose() -> Pose {
        Pose {
            point_normal: Vector3::new(0, 0, 2),
            curvature_direction_1: Vector3::new(1, 0, 0),
            curvature_direction_2: Vector3::new(0, 1, 0),
            fully_defined: false,
        }
    }

    #[test]
    fn test_rejects_uneven_scale() {
        assert!(GridLearningModule::new(5, 2, 10, 10).is_err());
        assert!(GridLearningModule::new(3, 3, 10, 10).is_err());
        assert!(GridLearningModule::new(0, 5, 10, 10).is_err());
        assert_eq!(GridLearningModule::new(5, 5, 10, 10).unwrap().scale(), 2);
    }

    #[test]
    fn test_explore_averages_cell() {
        let mut lm = GridLearningModule::new(5, 5, 10, 10).unwrap();
        lm.explore(&features(10, 2, -2, 100), &pose(), Location::new(2, 3))
            .unwrap();
        lm.explore(&features(20, 4, 0, 200), &pose(), Location::new(3, 2))
            .unwrap();

        // (2,3) and (3,2) both fall in model cell row 1, col 1
        let cell = lm.buffer().get(1, 1).unwrap();
        assert_eq!(cell.count, 2);
        assert_eq!(cell.mean_depth, 15);
        assert_eq!(cell.mean_value, 150);
        assert_eq!(cell.mean_curvature_1, FixedPoint::from_int(3));
        assert_eq!(cell.mean_curvature_2, FixedPoint::from_int(-1));
        // (2 + 3) / 2 and (3 + 2) / 2, truncated
        assert_eq!(cell.mean_location, Location::new(2, 2));
        assert!(cell.last_pose.is_some());
        assert_eq!(lm.num_buffered(), 2);
    }

    #[test]
    fn test_explore_outside_world() {
        let mut lm = GridLearningModule::new(5, 5, 10, 10).unwrap();
        let err = lm
            .explore(&features(0, 0, 0, 0), &pose(), Location::new(10, 0))
            .unwrap_err();
        assert!(matches!(err, AgentError::OutsideBounds { .. }));
        assert!(
            lm.explore(&features(0, 0, 0, 0), &pose(), Location::new(-1, 0))
                .is_err()
        );
    }

    #[test]
    fn test_commit_clears_buffer() {
        let mut lm = GridLearningModule::new(2, 2, 4, 4).unwrap();
        assert_eq!(lm.commit(), None);

        lm.explore(&features(50, 1, 1, 5), &pose(), Location::new(0, 0))
            .unwrap();
        assert_eq!(lm.commit(), Some(0));
        assert_eq!(lm.num_learnt_models(), 1);
        assert_eq!(lm.num_buffered(), 0);
        assert_eq!(lm.buffer().get(0, 0).unwrap().count, 0);
        assert_eq!(lm.learnt_model(0).unwrap().get(0, 0).unwrap().count, 1);
    }

    #[test]
    fn test_match_picks_closest_model() {
        let mut lm = GridLearningModule::new(2, 2, 4, 4).unwrap();
        assert_eq!(
            lm.match_observation(&features(0, 0, 0, 0), Location::new(0, 0))
                .unwrap(),
            None
        );

        lm.explore(&features(10, 0, 0, 0), &pose(), Location::new(1, 1))
            .unwrap();
        lm.commit();
        lm.explore(&features(200, 3, -3, 0), &pose(), Location::new(1, 1))
            .unwrap();
        lm.commit();

        let m = lm
            .match_observation(&features(190, 3, -2, 0), Location::new(0, 0))
            .unwrap()
            .unwrap();
        assert_eq!(m.model, 1);
        assert_eq!(m.distance, 11);

        // No model has data in the far cell
        assert_eq!(
            lm.match_observation(&features(190, 3, -2, 0), Location::new(3, 3))
                .unwrap(),
            None
        );
    }
}
