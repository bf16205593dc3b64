//! Feature and pose assembly for a sensed patch.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Vector3;
use crate::curvature::{PrincipalCurvatures, estimate_principal_curvatures};
use crate::error::{SurfaceError, SurfaceResult};
use crate::fixed::{FixedPoint, PRINCIPAL_CURVATURE_THRESHOLD_FP};
use crate::grid::{DepthPatch, Location, ValueGrid};
use crate::normal::estimate_point_normal;

/// Local surface pose at the sensed location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Unnormalized surface normal.
    pub point_normal: Vector3,
    /// Direction of the larger principal curvature.
    pub curvature_direction_1: Vector3,
    /// Direction of the smaller principal curvature.
    pub curvature_direction_2: Vector3,
    /// Whether the principal directions are distinguishable.
    pub fully_defined: bool,
}

/// Scalar features sensed at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Features {
    /// Raw value sample at the location.
    pub value: u32,
    /// Smallest depth in the patch.
    pub min_depth: u8,
    /// Largest depth in the patch.
    pub max_depth: u8,
    /// Truncated mean depth over the patch.
    pub mean_depth: u8,
    /// Larger principal curvature.
    pub principal_curvature_1: FixedPoint,
    /// Smaller principal curvature.
    pub principal_curvature_2: FixedPoint,
    /// Same flag as [`Pose::fully_defined`].
    pub fully_defined: bool,
}

/// Whether two principal curvatures differ by more than
/// [`PRINCIPAL_CURVATURE_THRESHOLD_FP`].
///
/// # Example
///
/// ```
/// use surface_features::{is_pose_fully_defined, FixedPoint};
///
/// assert!(!is_pose_fully_defined(FixedPoint::from_bits(255), FixedPoint::ZERO));
/// assert!(is_pose_fully_defined(FixedPoint::from_bits(256), FixedPoint::ZERO));
/// ```
#[must_use]
pub const fn is_pose_fully_defined(k1: FixedPoint, k2: FixedPoint) -> bool {
    k1.abs_diff(k2) > PRINCIPAL_CURVATURE_THRESHOLD_FP.to_bits().unsigned_abs()
}

/// Senses a patch at `location`, producing its [`Features`] and [`Pose`].
///
/// `values` must be co-registered with `depths` (same dimensions). Depth
/// statistics cover the whole patch, not just the neighbourhood.
///
/// # Errors
///
/// - [`SurfaceError::ShapeMismatch`] if the grids differ in size
/// - [`SurfaceError::NegativeLocation`] or [`SurfaceError::OutOfBounds`] for a
///   location outside the grid
/// - [`SurfaceError::NotInterior`] for an edge location on a multi-row patch
///
/// # Example
///
/// ```
/// use surface_features::{assemble_features, DepthPatch, Location, ValueGrid, Vector3};
///
/// let depths = DepthPatch::filled(3, 3, 40)?;
/// let values = ValueGrid::new(3, 3, (0..9).collect())?;
///
/// let (features, pose) = assemble_features(&values, &depths, Location::new(1, 1))?;
/// assert_eq!(features.value, 4);
/// assert_eq!(features.mean_depth, 40);
/// assert_eq!(pose.point_normal, Vector3::new(0, 0, 2));
/// assert!(!pose.fully_defined);
/// # Ok::<(), surface_features::SurfaceError>(())
/// ```
pub fn assemble_features(
    values: &ValueGrid,
    depths: &DepthPatch,
    location: Location,
) -> SurfaceResult<(Features, Pose)> {
    if !values.same_shape(depths) {
        return Err(SurfaceError::ShapeMismatch {
            value_rows: values.rows(),
            value_cols: values.cols(),
            depth_rows: depths.rows(),
            depth_cols: depths.cols(),
        });
    }
    let value = *values.try_at(location)?;

    let point_normal = estimate_point_normal(depths, location)?;
    let PrincipalCurvatures { k1, k2, dir1, dir2 } =
        estimate_principal_curvatures(depths, location)?;
    let fully_defined = is_pose_fully_defined(k1, k2);
    let stats = depths.depth_stats();

    debug!(
        %location,
        k1 = k1.to_bits(),
        k2 = k2.to_bits(),
        fully_defined,
        "assembled surface features"
    );

    let pose = Pose {
        point_normal,
        curvature_direction_1: dir1,
        curvature_direction_2: dir2,
        fully_defined,
    };
    let features = Features {
        value,
        min_depth: stats.min,
        max_depth: stats.max,
        mean_depth: stats.mean,
        principal_curvature_1: k1,
        principal_curvature_2: k2,
        fully_defined,
    };

    Ok((features, pose))
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "features: value={} min_depth={} max_depth={} mean_depth={} \
             principal_curvature_1={} principal_curvature_2={} fully_defined={}",
            self.value,
            self.min_depth,
            self.max_depth,
            self.mean_depth,
            self.principal_curvature_1,
            self.principal_curvature_2,
            self.fully_defined
        )
    }
}

fn write_vector(f: &mut fmt::Formatter<'_>, label: &str, v: &Vector3) -> fmt::Result {
    writeln!(f, "  {label}: x={} y={} z={}", v.x, v.y, v.z)
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pose:")?;
        write_vector(f, "point_normal", &self.point_normal)?;
        write_vector(f, "curvature_direction_1", &self.curvature_direction_1)?;
        write_vector(f, "curvature_direction_2", &self.curvature_direction_2)?;
        write!(f, "  fully_defined: {}", self.fully_defined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saddle() -> DepthPatch {
        DepthPatch::from_rows(&[[10, 11, 14], [9, 10, 13], [6, 7, 10]]).unwrap()
    }

    fn values() -> ValueGrid {
        ValueGrid::new(3, 3, vec![100, 101, 102, 103, 104, 105, 106, 107, 108]).unwrap()
    }

    #[test]
    fn saddle_features_and_pose() {
        let (features, pose) = assemble_features(&values(), &saddle(), Location::new(1, 1)).unwrap();

        assert_eq!(features.value, 104);
        assert_eq!(features.min_depth, 6);
        assert_eq!(features.max_depth, 14);
        assert_eq!(features.mean_depth, 10);
        assert_eq!(features.principal_curvature_1.to_bits(), 512);
        assert_eq!(features.principal_curvature_2.to_bits(), -512);
        assert!(features.fully_defined);

        assert_eq!(pose.point_normal, Vector3::new(-4, 4, 2));
        assert_eq!(pose.curvature_direction_1, Vector3::new(-8, 0, -16));
        assert_eq!(pose.curvature_direction_2, Vector3::new(0, -8, 16));
        assert!(pose.fully_defined);
    }

    #[test]
    fn threshold_boundary() {
        let zero = FixedPoint::ZERO;
        assert!(!is_pose_fully_defined(FixedPoint::from_bits(255), zero));
        assert!(!is_pose_fully_defined(zero, FixedPoint::from_bits(-255)));
        assert!(is_pose_fully_defined(FixedPoint::from_bits(256), zero));
        assert!(is_pose_fully_defined(zero, FixedPoint::from_bits(-256)));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let values = ValueGrid::filled(3, 4, 0).unwrap();
        let err = assemble_features(&values, &saddle(), Location::new(1, 1)).unwrap_err();
        assert!(matches!(err, SurfaceError::ShapeMismatch { .. }));
    }

    #[test]
    fn edge_location_is_rejected() {
        let err = assemble_features(&values(), &saddle(), Location::new(0, 0)).unwrap_err();
        assert!(matches!(err, SurfaceError::NotInterior { .. }));

        let err = assemble_features(&values(), &saddle(), Location::new(3, 1)).unwrap_err();
        assert!(matches!(err, SurfaceError::OutOfBounds { .. }));
    }

    #[test]
    fn one_row_patch_senses_anywhere() {
        let depths = DepthPatch::from_rows(&[[5, 9, 1]]).unwrap();
        let values = ValueGrid::from_rows(&[[7, 8, 9]]).unwrap();
        let (features, pose) = assemble_features(&values, &depths, Location::new(0, 0)).unwrap();

        assert_eq!(features.value, 7);
        assert_eq!((features.min_depth, features.max_depth, features.mean_depth), (1, 9, 5));
        assert_eq!(pose.point_normal, Vector3::new(0, 0, 2));
        assert_eq!(pose.curvature_direction_1, Vector3::new(1, 0, 0));
        assert!(!pose.fully_defined);
    }

    #[test]
    fn display_formats() {
        let (features, pose) = assemble_features(&values(), &saddle(), Location::new(1, 1)).unwrap();
        let text = features.to_string();
        assert!(text.contains("principal_curvature_1=2(512)"));
        assert!(text.contains("principal_curvature_2=-2(-512)"));

        let text = pose.to_string();
        assert!(text.contains("point_normal: x=-4 y=4 z=2"));
        assert!(text.ends_with("fully_defined: true"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn features_serialization() {
        let (features, _) = assemble_features(&values(), &saddle(), Location::new(1, 1)).unwrap();
        let json = serde_json::to_string(&features).unwrap();
        assert!(json.contains("\"principal_curvature_1\":512"));
        let back: Features = serde_json::from_str(&json).unwrap();
        assert_eq!(back, features);
    }
}
