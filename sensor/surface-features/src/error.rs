//! Error types for surface feature extraction.

use thiserror::Error;

/// Result type alias for surface feature operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Caller contract violations.
///
/// Degenerate geometry (flat surfaces, boundary locations, one-row patches)
/// is never reported here; it has deterministic fallback outputs instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SurfaceError {
    /// A location had a negative coordinate.
    #[error("location ({x}, {y}) has a negative coordinate")]
    NegativeLocation {
        /// X coordinate (column).
        x: i32,
        /// Y coordinate (row).
        y: i32,
    },

    /// The point normal was requested on the edge of a multi-row patch.
    #[error("location ({x}, {y}) is on the edge of a {rows}x{cols} patch")]
    NotInterior {
        /// X coordinate (column).
        x: i32,
        /// Y coordinate (row).
        y: i32,
        /// Patch rows.
        rows: usize,
        /// Patch columns.
        cols: usize,
    },

    /// A location lies outside the grid.
    #[error("location ({x}, {y}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        /// X coordinate (column).
        x: i32,
        /// Y coordinate (row).
        y: i32,
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },

    /// A grid was constructed with a zero dimension.
    #[error("invalid grid dimensions: {rows}x{cols}")]
    InvalidDimensions {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },

    /// Backing buffer length does not match `rows * cols`.
    #[error("buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch {
        /// Expected buffer length.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },

    /// Value and depth grids are not co-registered.
    #[error("value grid is {value_rows}x{value_cols} but depth patch is {depth_rows}x{depth_cols}")]
    ShapeMismatch {
        /// Value grid rows.
        value_rows: usize,
        /// Value grid columns.
        value_cols: usize,
        /// Depth patch rows.
        depth_rows: usize,
        /// Depth patch columns.
        depth_cols: usize,
    },
}

impl SurfaceError {
    /// Creates a buffer size mismatch error.
    #[must_use]
    pub const fn buffer_mismatch(expected: usize, actual: usize) -> Self {
        Self::BufferSizeMismatch { expected, actual }
    }

    /// Returns `true` for errors raised by a bad query location.
    #[must_use]
    pub const fn is_location_error(&self) -> bool {
        matches!(
            self,
            Self::NegativeLocation { .. } | Self::NotInterior { .. } | Self::OutOfBounds { .. }
        )
    }
}
