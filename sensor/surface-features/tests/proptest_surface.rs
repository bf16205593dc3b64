//! Property-based tests for the surface feature extractor.
//!
//! Run with: cargo test -p surface-features -- proptest

use proptest::prelude::*;
use surface_features::{
    DepthPatch, Location, PrincipalCurvatures, ValueGrid, Vector3, assemble_features,
    estimate_point_normal, estimate_principal_curvatures, integer_sqrt,
};

// =============================================================================
// Strategies
// =============================================================================

/// A random depth patch between 1x1 and 8x8.
fn arb_patch() -> impl Strategy<Value = DepthPatch> {
    (1usize..=8, 1usize..=8).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(any::<u8>(), rows * cols)
            .prop_map(move |data| DepthPatch::new(rows, cols, data).unwrap())
    })
}

/// A random patch together with a strictly interior location.
fn arb_patch_with_interior() -> impl Strategy<Value = (DepthPatch, Location)> {
    (3usize..=8, 3usize..=8).prop_flat_map(|(rows, cols)| {
        (
            prop::collection::vec(any::<u8>(), rows * cols),
            1..cols - 1,
            1..rows - 1,
        )
            .prop_map(move |(data, x, y)| {
                (
                    DepthPatch::new(rows, cols, data).unwrap(),
                    Location::new(x as i32, y as i32),
                )
            })
    })
}

// =============================================================================
// Integer square root
// =============================================================================

proptest! {
    /// The result is the floor square root for every input.
    #[test]
    fn proptest_isqrt_is_floor(n in any::<u32>()) {
        let r = u64::from(integer_sqrt(n));
        prop_assert!(r * r <= u64::from(n));
        prop_assert!((r + 1) * (r + 1) > u64::from(n));
    }
}

// =============================================================================
// Curvature invariants
// =============================================================================

proptest! {
    /// k1 is never smaller than k2, anywhere on any patch.
    #[test]
    fn proptest_k1_not_below_k2(patch in arb_patch(), x in 0i32..10, y in 0i32..10) {
        let pc = estimate_principal_curvatures(&patch, Location::new(x, y)).unwrap();
        prop_assert!(pc.k1 >= pc.k2);
    }

    /// In-plane directions are orthogonal before the lift.
    #[test]
    fn proptest_directions_orthogonal((patch, loc) in arb_patch_with_interior()) {
        let pc = estimate_principal_curvatures(&patch, loc).unwrap();
        prop_assert_eq!(pc.dir1.x * pc.dir2.x + pc.dir1.y * pc.dir2.y, 0);
        prop_assert!(pc.dir1.x != 0 || pc.dir1.y != 0);
    }

    /// Locations without a full neighbourhood get the neutral frame.
    #[test]
    fn proptest_boundary_is_neutral(patch in arb_patch(), x in 0i32..10, y in 0i32..10) {
        let loc = Location::new(x, y);
        prop_assume!(!loc.is_interior_of(patch.rows(), patch.cols()));
        let pc = estimate_principal_curvatures(&patch, loc).unwrap();
        prop_assert_eq!(pc, PrincipalCurvatures::neutral());
    }

    /// A constant patch is flat everywhere.
    #[test]
    fn proptest_constant_patch_is_flat(depth in any::<u8>(), (patch, loc) in arb_patch_with_interior()) {
        let flat = DepthPatch::filled(patch.rows(), patch.cols(), depth).unwrap();
        let pc = estimate_principal_curvatures(&flat, loc).unwrap();
        prop_assert_eq!(pc, PrincipalCurvatures::neutral());
        prop_assert_eq!(estimate_point_normal(&flat, loc).unwrap(), Vector3::new(0, 0, 2));
    }

    /// Negative coordinates are always a caller error.
    #[test]
    fn proptest_negative_rejected(patch in arb_patch(), x in -5i32..0, y in 0i32..5) {
        prop_assert!(estimate_principal_curvatures(&patch, Location::new(x, y)).is_err());
        prop_assert!(estimate_principal_curvatures(&patch, Location::new(y, x)).is_err());
    }
}

// =============================================================================
// Point normal and assembly
// =============================================================================

proptest! {
    /// A one-row patch always reports straight up.
    #[test]
    fn proptest_one_row_normal(row in prop::collection::vec(any::<u8>(), 1..16), x in 0i32..20) {
        let patch = DepthPatch::new(1, row.len(), row).unwrap();
        prop_assert_eq!(
            estimate_point_normal(&patch, Location::new(x, 0)).unwrap(),
            Vector3::new(0, 0, 2)
        );
    }

    /// The fully-defined flag is exactly the curvature gap test.
    #[test]
    fn proptest_fully_defined_iff_gap((patch, loc) in arb_patch_with_interior()) {
        let values = ValueGrid::filled(patch.rows(), patch.cols(), 0).unwrap();
        let (features, pose) = assemble_features(&values, &patch, loc).unwrap();
        let gap = features
            .principal_curvature_1
            .abs_diff(features.principal_curvature_2);
        prop_assert_eq!(pose.fully_defined, gap > 255);
        prop_assert_eq!(features.fully_defined, pose.fully_defined);
        prop_assert!(features.min_depth <= features.mean_depth);
        prop_assert!(features.mean_depth <= features.max_depth);
    }

    /// Identical inputs give bit-identical outputs.
    #[test]
    fn proptest_idempotent((patch, loc) in arb_patch_with_interior()) {
        let values = ValueGrid::filled(patch.rows(), patch.cols(), 9).unwrap();
        let a = assemble_features(&values, &patch, loc).unwrap();
        let b = assemble_features(&values, &patch, loc).unwrap();
        prop_assert_eq!(a, b);
    }
}
