//! Fixed-point surface feature extraction from depth patches.
//!
//! This crate turns a small rectangular patch of 8-bit depth samples into the
//! compact pose and feature descriptors a sensorimotor agent consumes:
//!
//! - [`estimate_point_normal`] - Unnormalized surface normal via central differences
//! - [`estimate_principal_curvatures`] - Principal curvatures and directions from
//!   a discrete Hessian with a closed-form 2×2 eigen-decomposition
//! - [`assemble_features`] - Combines both with patch-wide depth statistics into
//!   [`Features`] and [`Pose`] records
//! - [`integer_sqrt`] - Bit-exact floor square root used by the eigen solver
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Embedded sensor front ends
//! - Simulation environments
//!
//! # Integer-Only Arithmetic
//!
//! Every computation is carried out on `i32`/`u32` integers. Curvatures are
//! returned as [`FixedPoint`] values with [`CURVATURE_FRACTIONAL_BITS`]
//! fractional bits, so results are bit-identical on every platform.
//!
//! # Degenerate Geometry
//!
//! Flat or umbilic surfaces, one-row patches, and boundary locations are
//! ordinary inputs with deterministic fallback outputs. Only caller contract
//! violations (negative coordinates, an edge location for the point normal)
//! produce a [`SurfaceError`].
//!
//! # Example
//!
//! ```
//! use surface_features::{assemble_features, DepthPatch, Location, ValueGrid};
//!
//! let depths = DepthPatch::from_rows(&[
//!     [10, 11, 14],
//!     [9, 10, 13],
//!     [6, 7, 10],
//! ])?;
//! let values = ValueGrid::filled(3, 3, 7)?;
//!
//! let (features, pose) = assemble_features(&values, &depths, Location::new(1, 1))?;
//!
//! assert_eq!(features.principal_curvature_1.integer_part(), 2);
//! assert_eq!(features.principal_curvature_2.integer_part(), -2);
//! assert!(pose.fully_defined);
//! # Ok::<(), surface_features::SurfaceError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod curvature;
mod error;
mod features;
mod fixed;
mod grid;
mod isqrt;
mod normal;

// Re-export core types
pub use curvature::{Hessian, PrincipalCurvatures, discrete_hessian, estimate_principal_curvatures};
pub use error::{SurfaceError, SurfaceResult};
pub use features::{Features, Pose, assemble_features, is_pose_fully_defined};
pub use fixed::{CURVATURE_FRACTIONAL_BITS, FixedPoint, PRINCIPAL_CURVATURE_THRESHOLD_FP};
pub use grid::{DepthPatch, DepthStats, Grid, Location, ValueGrid};
pub use isqrt::integer_sqrt;
pub use normal::{central_differences, estimate_point_normal};

/// Integer 3D vector used for normals and lifted curvature directions.
pub type Vector3 = nalgebra::Vector3<i32>;

/// Integer 2D vector used for in-plane curvature directions.
pub type Vector2 = nalgebra::Vector2<i32>;
