//! Principal curvature estimation from a discrete Hessian.
//!
//! The depth surface is treated as a height field `z(x, y)`. Its Hessian is
//! approximated by second-order finite differences on the 3×3 neighbourhood of
//! the query location:
//!
//! ```text
//!   H = | H_xx  H_xy |      H_xx = z(x+1,y) - 2 z(x,y) + z(x-1,y)
//!       | H_xy  H_yy |      H_yy = z(x,y+1) - 2 z(x,y) + z(x,y-1)
//!                           H_xy = (z(x+1,y+1) - z(x-1,y+1)
//!                                   - z(x+1,y-1) + z(x-1,y-1)) / 4
//! ```
//!
//! The eigenvalues of the symmetric 2×2 matrix are the principal curvatures,
//! solved in closed form:
//!
//! ```text
//!   k1,k2 = (tr ± sqrt((H_yy - H_xx)² + (2 H_xy)²)) / 2
//! ```
//!
//! The in-plane eigenvectors are then lifted onto the tangent plane using the
//! same central differences as the point normal.
//!
//! # Rounding
//!
//! `H_xy` and the lifted z components use Rust's `/`, which truncates toward
//! zero, not floor division. Recorded descriptors depend on this bit-for-bit.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::SurfaceResult;
use crate::fixed::{CURVATURE_FRACTIONAL_BITS, FixedPoint};
use crate::grid::{DepthPatch, Location};
use crate::isqrt::integer_sqrt;
use crate::normal::central_differences;
use crate::{Vector2, Vector3};

/// Discrete Hessian of depth at a patch location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hessian {
    /// Second derivative along x.
    pub xx: i32,
    /// Second derivative along y.
    pub yy: i32,
    /// Mixed derivative, truncated toward zero.
    pub xy: i32,
}

impl Hessian {
    /// Creates a Hessian from its components.
    #[must_use]
    pub const fn new(xx: i32, yy: i32, xy: i32) -> Self {
        Self { xx, yy, xy }
    }

    /// Trace `H_xx + H_yy`.
    #[must_use]
    pub const fn trace(&self) -> i32 {
        self.xx + self.yy
    }

    /// Whether every direction has the same curvature (flat or umbilic point).
    #[must_use]
    pub const fn is_umbilic(&self) -> bool {
        self.yy == self.xx && self.xy == 0
    }

    /// Eigen-decomposition of the Hessian.
    ///
    /// Returns `(k1, k2, dir1)` where `k1 >= k2` and `dir1` is an unnormalized
    /// eigenvector for `k1`. At an umbilic point both eigenvalues equal `H_xx`
    /// and `dir1` is the x axis.
    ///
    /// # Example
    ///
    /// ```
    /// use surface_features::{Hessian, Vector2};
    ///
    /// let (k1, k2, dir1) = Hessian::new(2, -2, 0).principal_frame();
    /// assert_eq!(k1.to_bits(), 512);
    /// assert_eq!(k2.to_bits(), -512);
    /// assert_eq!(dir1, Vector2::new(-8, 0));
    /// ```
    #[must_use]
    pub fn principal_frame(&self) -> (FixedPoint, FixedPoint, Vector2) {
        let trace = self.trace();
        let diff = self.yy - self.xx;
        let two_xy = 2 * self.xy;

        if diff == 0 && two_xy == 0 {
            let k = FixedPoint::from_int(self.xx);
            return (k, k, Vector2::new(1, 0));
        }

        // Squares are taken as u32: |diff| <= 1020 and |two_xy| <= 254 for u8 depths
        let discriminant = diff.unsigned_abs().pow(2) + two_xy.unsigned_abs().pow(2);
        let sqrt_disc = i32::try_from(integer_sqrt(discriminant)).unwrap_or(i32::MAX);

        let k1 = FixedPoint::from_bits(((trace + sqrt_disc) << CURVATURE_FRACTIONAL_BITS) / 2);
        let k2 = FixedPoint::from_bits(((trace - sqrt_disc) << CURVATURE_FRACTIONAL_BITS) / 2);

        let mut dir1 = Vector2::new(two_xy, diff + sqrt_disc);
        if dir1 == Vector2::zeros() {
            dir1 = Vector2::new(diff - sqrt_disc, -two_xy);
        }

        (k1, k2, dir1)
    }
}

/// Discrete Hessian at `location`, or `None` if the location is not strictly
/// interior (including negative coordinates).
///
/// # Example
///
/// ```
/// use surface_features::{discrete_hessian, DepthPatch, Hessian, Location};
///
/// let patch = DepthPatch::from_rows(&[[10, 11, 14], [9, 10, 13], [6, 7, 10]])?;
/// assert_eq!(discrete_hessian(&patch, Location::new(1, 1)), Some(Hessian::new(2, -2, 0)));
/// assert_eq!(discrete_hessian(&patch, Location::new(0, 1)), None);
/// # Ok::<(), surface_features::SurfaceError>(())
/// ```
#[must_use]
pub fn discrete_hessian(patch: &DepthPatch, location: Location) -> Option<Hessian> {
    if !location.is_interior_of(patch.rows(), patch.cols()) {
        return None;
    }
    let (x, y) = location.to_indices().ok()?;

    let z_c = patch.depth(y, x);
    let xx = patch.depth(y, x + 1) - 2 * z_c + patch.depth(y, x - 1);
    let yy = patch.depth(y + 1, x) - 2 * z_c + patch.depth(y - 1, x);
    let xy = (patch.depth(y + 1, x + 1) - patch.depth(y + 1, x - 1) - patch.depth(y - 1, x + 1)
        + patch.depth(y - 1, x - 1))
        / 4;

    Some(Hessian { xx, yy, xy })
}

/// Principal curvatures and their tangent-plane directions.
///
/// `k1 >= k2` always holds; `dir1` pairs with `k1` and `dir2` with `k2`.
/// Curvatures carry [`CURVATURE_FRACTIONAL_BITS`] fractional bits. Directions
/// are unnormalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrincipalCurvatures {
    /// Larger principal curvature.
    pub k1: FixedPoint,
    /// Smaller principal curvature.
    pub k2: FixedPoint,
    /// Direction of `k1` lifted into 3D.
    pub dir1: Vector3,
    /// Direction of `k2` lifted into 3D.
    pub dir2: Vector3,
}

impl PrincipalCurvatures {
    /// Zero curvature with the x and y axes as directions.
    ///
    /// Returned for locations without a full neighbourhood.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            k1: FixedPoint::ZERO,
            k2: FixedPoint::ZERO,
            dir1: Vector3::new(1, 0, 0),
            dir2: Vector3::new(0, 1, 0),
        }
    }

    /// `|k1 - k2|` in raw fixed-point units.
    #[must_use]
    pub const fn gap(&self) -> u32 {
        self.k1.abs_diff(self.k2)
    }
}

/// Lifts an in-plane direction onto the tangent plane.
///
/// The z component approximates the directional derivative of depth along
/// `dir`, on the same doubled scale as the point normal.
fn lift(dir: Vector2, delta_x: i32, delta_y: i32) -> Vector3 {
    Vector3::new(dir.x, dir.y, (dir.x * delta_x + dir.y * delta_y) / 2)
}

/// Estimates principal curvatures and directions at `location`.
///
/// Locations without a full 3×3 neighbourhood yield
/// [`PrincipalCurvatures::neutral`] rather than an error.
///
/// # Errors
///
/// Returns [`SurfaceError::NegativeLocation`](crate::SurfaceError::NegativeLocation)
/// if either coordinate is negative.
///
/// # Example
///
/// ```
/// use surface_features::{estimate_principal_curvatures, DepthPatch, Location, Vector3};
///
/// let patch = DepthPatch::from_rows(&[[10, 11, 14], [9, 10, 13], [6, 7, 10]])?;
/// let pc = estimate_principal_curvatures(&patch, Location::new(1, 1))?;
///
/// assert_eq!(pc.k1.integer_part(), 2);
/// assert_eq!(pc.k2.integer_part(), -2);
/// assert_eq!(pc.dir1, Vector3::new(-8, 0, -16));
/// assert_eq!(pc.dir2, Vector3::new(0, -8, 16));
/// # Ok::<(), surface_features::SurfaceError>(())
/// ```
pub fn estimate_principal_curvatures(
    patch: &DepthPatch,
    location: Location,
) -> SurfaceResult<PrincipalCurvatures> {
    location.to_indices()?;

    let Some(hessian) = discrete_hessian(patch, location) else {
        trace!(%location, "no full neighbourhood, using neutral curvature frame");
        return Ok(PrincipalCurvatures::neutral());
    };

    if hessian.is_umbilic() {
        trace!(%location, h_xx = hessian.xx, "umbilic point, using default directions");
    }

    let (k1, k2, dir1_xy) = hessian.principal_frame();
    let dir2_xy = Vector2::new(-dir1_xy.y, dir1_xy.x);

    let (delta_x, delta_y) = central_differences(patch, location)?;

    Ok(PrincipalCurvatures {
        k1,
        k2,
        dir1: lift(dir1_xy, delta_x, delta_y),
        dir2: lift(dir2_xy, delta_x, delta_y),
    })
}
