//! Point normal estimation via central finite differences.

use tracing::trace;

use crate::Vector3;
use crate::error::{SurfaceError, SurfaceResult};
use crate::grid::{DepthPatch, Location};

/// Z component of every point normal.
///
/// The x/y components are un-halved central differences, so "up" is scaled by
/// two to stay on the same implicit scale.
const NORMAL_Z: i32 = 2;

/// Un-halved central differences `(delta_x, delta_y)` of depth at `location`.
///
/// `delta_x = depth(y, x+1) - depth(y, x-1)` and
/// `delta_y = depth(y+1, x) - depth(y-1, x)`.
///
/// # Errors
///
/// Returns [`SurfaceError::NegativeLocation`] for a negative coordinate and
/// [`SurfaceError::NotInterior`] if the location is on the patch edge.
///
/// # Example
///
/// ```
/// use surface_features::{central_differences, DepthPatch, Location};
///
/// let patch = DepthPatch::from_rows(&[[0, 1, 0], [2, 5, 8], [0, 3, 0]])?;
/// assert_eq!(central_differences(&patch, Location::new(1, 1))?, (6, 2));
/// # Ok::<(), surface_features::SurfaceError>(())
/// ```
pub fn central_differences(patch: &DepthPatch, location: Location) -> SurfaceResult<(i32, i32)> {
    let (x, y) = location.to_indices()?;
    if !location.is_interior_of(patch.rows(), patch.cols()) {
        return Err(SurfaceError::NotInterior {
            x: location.x,
            y: location.y,
            rows: patch.rows(),
            cols: patch.cols(),
        });
    }

    let delta_x = patch.depth(y, x + 1) - patch.depth(y, x - 1);
    let delta_y = patch.depth(y + 1, x) - patch.depth(y - 1, x);
    Ok((delta_x, delta_y))
}

/// Estimates the unnormalized surface normal at `location`.
///
/// The normal is `(-delta_x, -delta_y, 2)`, i.e. twice `(-dz/dx, -dz/dy, 1)`.
/// A one-row patch has no y-derivative and always yields `(0, 0, 2)`.
///
/// # Errors
///
/// Returns [`SurfaceError::NegativeLocation`] if either coordinate is
/// negative. On a patch with more than one row, the location must also be
/// strictly interior; see [`central_differences`].
///
/// # Example
///
/// ```
/// use surface_features::{estimate_point_normal, DepthPatch, Location, Vector3};
///
/// let patch = DepthPatch::from_rows(&[[10, 11, 14], [9, 10, 13], [6, 7, 10]])?;
/// let normal = estimate_point_normal(&patch, Location::new(1, 1))?;
/// assert_eq!(normal, Vector3::new(-4, 4, 2));
/// # Ok::<(), surface_features::SurfaceError>(())
/// ```
pub fn estimate_point_normal(patch: &DepthPatch, location: Location) -> SurfaceResult<Vector3> {
    location.to_indices()?;
    if patch.rows() <= 1 {
        trace!(%location, "one-row patch, using default up normal");
        return Ok(Vector3::new(0, 0, NORMAL_Z));
    }

    let (delta_x, delta_y) = central_differences(patch, location)?;
    Ok(Vector3::new(-delta_x, -delta_y, NORMAL_Z))
}
