//! Grid world the agent senses, and patch extraction from it.

use rand::Rng;
use surface_features::{
    DepthPatch, Features, Location, Pose, SurfaceError, ValueGrid, assemble_features,
};
use tracing::debug;

use crate::error::{AgentError, AgentResult};

/// Inclusive range of valid patch-centre locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchBounds {
    /// Lowest valid centre.
    pub min: Location,
    /// Highest valid centre.
    pub max: Location,
}

impl PatchBounds {
    /// Whether `location` is a valid patch centre.
    #[must_use]
    pub const fn contains(&self, location: Location) -> bool {
        location.x >= self.min.x
            && location.x <= self.max.x
            && location.y >= self.min.y
            && location.y <= self.max.y
    }
}

/// Valid centres for a `side_len × side_len` patch on a `rows × cols` grid.
///
/// A patch centred at `c` spans `c - side_len/2 .. c - side_len/2 + side_len`.
///
/// # Errors
///
/// Returns [`AgentError::Config`] if the patch is larger than the grid or has
/// no sensable centre. A 2×2 patch has no strictly interior cell, so valid
/// sides are 1 and 3 upwards.
///
/// # Example
///
/// ```
/// use sensor_agent::patch_bounds;
/// use surface_features::Location;
///
/// let bounds = patch_bounds(10, 10, 3)?;
/// assert_eq!(bounds.min, Location::new(1, 1));
/// assert_eq!(bounds.max, Location::new(8, 8));
/// # Ok::<(), sensor_agent::AgentError>(())
/// ```
pub fn patch_bounds(rows: usize, cols: usize, side_len: usize) -> AgentResult<PatchBounds> {
    if side_len == 0 || side_len == 2 {
        return Err(AgentError::config(format!(
            "{side_len}x{side_len} patch has no interior centre to sense"
        )));
    }
    if side_len > rows || side_len > cols {
        return Err(AgentError::config(format!(
            "{side_len}x{side_len} patch does not fit a {rows}x{cols} grid"
        )));
    }
    let half = side_len / 2;
    let to_i32 = |v: usize| i32::try_from(v).map_err(|_| AgentError::config("grid too large"));

    Ok(PatchBounds {
        min: Location::new(to_i32(half)?, to_i32(half)?),
        max: Location::new(
            to_i32(cols - side_len + half)?,
            to_i32(rows - side_len + half)?,
        ),
    })
}

/// Co-registered value and depth grids.
///
/// Used both for the full environment and for patches cut from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridEnvironment {
    values: ValueGrid,
    depths: DepthPatch,
}

impl GridEnvironment {
    /// Creates a zero-filled environment.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> AgentResult<Self> {
        Ok(Self {
            values: ValueGrid::filled(rows, cols, 0)?,
            depths: DepthPatch::filled(rows, cols, 0)?,
        })
    }

    /// Wraps existing grids.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::ShapeMismatch`] if the grids differ in size.
    pub fn from_grids(values: ValueGrid, depths: DepthPatch) -> AgentResult<Self> {
        if !values.same_shape(&depths) {
            return Err(SurfaceError::ShapeMismatch {
                value_rows: values.rows(),
                value_cols: values.cols(),
                depth_rows: depths.rows(),
                depth_cols: depths.cols(),
            }
            .into());
        }
        Ok(Self { values, depths })
    }

    /// Fills depths with uniform `u8` samples and values with `0..=max_value`.
    pub fn populate_random<R: Rng + ?Sized>(&mut self, rng: &mut R, max_value: u32) {
        for depth in self.depths.iter_mut() {
            *depth = rng.r#gen();
        }
        for value in self.values.iter_mut() {
            *value = rng.gen_range(0..=max_value);
        }
        debug!(
            rows = self.rows(),
            cols = self.cols(),
            max_value,
            "populated environment"
        );
    }

    /// Grid rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.depths.rows()
    }

    /// Grid columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.depths.cols()
    }

    /// Value samples.
    #[must_use]
    pub const fn values(&self) -> &ValueGrid {
        &self.values
    }

    /// Depth samples.
    #[must_use]
    pub const fn depths(&self) -> &DepthPatch {
        &self.depths
    }

    /// Centre location, `(cols / 2, rows / 2)`.
    #[must_use]
    pub fn centre(&self) -> Location {
        let half = |v: usize| i32::try_from(v / 2).unwrap_or(i32::MAX);
        Location::new(half(self.cols()), half(self.rows()))
    }

    /// Copies the `side_len × side_len` patch centred on `centre`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::PatchOutOfBounds`] if the patch would leave the grid.
    pub fn extract_patch(&self, centre: Location, side_len: usize) -> AgentResult<Self> {
        let out_of_bounds = || AgentError::PatchOutOfBounds {
            centre,
            side_len,
            rows: self.rows(),
            cols: self.cols(),
        };
        let half = side_len / 2;
        let (col, row) = centre.to_indices().map_err(|_| out_of_bounds())?;
        let top = row.checked_sub(half).ok_or_else(out_of_bounds)?;
        let left = col.checked_sub(half).ok_or_else(out_of_bounds)?;

        let values = self
            .values
            .window(top, left, side_len, side_len)
            .ok_or_else(out_of_bounds)?;
        let depths = self
            .depths
            .window(top, left, side_len, side_len)
            .ok_or_else(out_of_bounds)?;
        Ok(Self { values, depths })
    }

    /// Senses features and pose at `location`.
    ///
    /// # Errors
    ///
    /// Propagates caller contract violations from [`assemble_features`].
    pub fn sense(&self, location: Location) -> AgentResult<(Features, Pose)> {
        Ok(assemble_features(&self.values, &self.depths, location)?)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn numbered_env(rows: usize, cols: usize) -> GridEnvironment {
        let n = rows * cols;
        let values = ValueGrid::new(rows, cols, (0..n as u32).collect()).unwrap();
        let depths = DepthPatch::new(rows, cols, (0..n).map(|i| (i % 256) as u8).collect()).unwrap();
        GridEnvironment::from_grids(values, depths).unwrap()
    }

    #[test]
    fn test_patch_bounds() {
        let b = patch_bounds(10, 10, 3).unwrap();
        assert_eq!(b.min, Location::new(1, 1));
        assert_eq!(b.max, Location::new(8, 8));
        assert!(b.contains(Location::new(5, 1)));
        assert!(!b.contains(Location::new(0, 5)));
        assert!(!b.contains(Location::new(9, 5)));

        let b = patch_bounds(4, 6, 4).unwrap();
        assert_eq!(b.min, Location::new(2, 2));
        assert_eq!(b.max, Location::new(4, 2));

        assert!(patch_bounds(3, 3, 4).is_err());
        assert!(patch_bounds(3, 3, 0).is_err());
        assert!(matches!(patch_bounds(5, 5, 2), Err(AgentError::Config(_))));
        assert!(patch_bounds(5, 5, 1).is_ok());
    }

    #[test]
    fn test_extract_patch() {
        let env = numbered_env(5, 5);
        let patch = env.extract_patch(Location::new(2, 1), 3).unwrap();
        assert_eq!(patch.rows(), 3);
        assert_eq!(patch.values().as_slice(), &[1, 2, 3, 6, 7, 8, 11, 12, 13]);
        assert_eq!(patch.depths().as_slice(), &[1, 2, 3, 6, 7, 8, 11, 12, 13]);
        assert_eq!(patch.centre(), Location::new(1, 1));
    }

    #[test]
    fn test_extract_patch_out_of_bounds() {
        let env = numbered_env(5, 5);
        for centre in [
            Location::new(0, 2),
            Location::new(2, 4),
            Location::new(-1, 2),
        ] {
            let err = env.extract_patch(centre, 3).unwrap_err();
            assert!(matches!(err, AgentError::PatchOutOfBounds { .. }));
        }
    }

    #[test]
    fn test_every_bound_centre_extracts() {
        let env = numbered_env(7, 6);
        let b = patch_bounds(7, 6, 3).unwrap();
        for y in b.min.y..=b.max.y {
            for x in b.min.x..=b.max.x {
                assert!(env.extract_patch(Location::new(x, y), 3).is_ok());
            }
        }
    }

    #[test]
    fn test_populate_random_is_seeded() {
        let mut a = GridEnvironment::new(6, 6).unwrap();
        let mut b = GridEnvironment::new(6, 6).unwrap();
        a.populate_random(&mut StdRng::seed_from_u64(3), 50);
        b.populate_random(&mut StdRng::seed_from_u64(3), 50);
        assert_eq!(a, b);
        assert!(a.values().iter().all(|&v| v <= 50));
    }

    #[test]
    fn test_from_grids_rejects_mismatch() {
        let values = ValueGrid::filled(2, 3, 0).unwrap();
        let depths = DepthPatch::filled(3, 2, 0).unwrap();
        let err = GridEnvironment::from_grids(values, depths).unwrap_err();
        assert!(matches!(
            err,
            AgentError::Surface(SurfaceError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_sense_patch_centre() {
        let env = numbered_env(5, 5);
        let patch = env.extract_patch(Location::new(2, 2), 3).unwrap();
        let (features, pose) = patch.sense(patch.centre()).unwrap();
        // Linear ramp: depth = 5y + x
        assert_eq!(features.value, 12);
        assert_eq!(pose.point_normal.x, -2);
        assert_eq!(pose.point_normal.y, -10);
        assert!(!pose.fully_defined);
    }
}
