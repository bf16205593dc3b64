//! Row-major sample grids and query locations.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SurfaceError, SurfaceResult};

/// A grid of 8-bit depth samples.
pub type DepthPatch = Grid<u8>;

/// A grid of value samples co-registered with a [`DepthPatch`].
pub type ValueGrid = Grid<u32>;

/// An integer `(x, y)` location on a grid.
///
/// `x` selects the column and `y` the row. Coordinates are signed so that a
/// negative location can be reported as a caller error instead of wrapping.
///
/// # Example
///
/// ```
/// use surface_features::Location;
///
/// let loc = Location::new(2, 1);
/// assert!(loc.is_interior_of(3, 4));
/// assert!(!loc.is_interior_of(3, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns `(column, row)` as unsigned indices.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::NegativeLocation`] if either coordinate is negative.
    pub fn to_indices(self) -> SurfaceResult<(usize, usize)> {
        match (usize::try_from(self.x), usize::try_from(self.y)) {
            (Ok(col), Ok(row)) => Ok((col, row)),
            _ => Err(SurfaceError::NegativeLocation {
                x: self.x,
                y: self.y,
            }),
        }
    }

    /// Whether the location has a full 3×3 neighbourhood on a `rows × cols` grid.
    #[must_use]
    pub fn is_interior_of(self, rows: usize, cols: usize) -> bool {
        self.to_indices()
            .is_ok_and(|(col, row)| col >= 1 && col + 1 < cols && row >= 1 && row + 1 < rows)
    }

    /// Returns the location displaced by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A dense, row-major, fixed-size 2D grid.
///
/// Dimensions are fixed at construction and are always at least 1×1.
/// Element access is bounds-checked and returns `Option`.
///
/// # Example
///
/// ```
/// use surface_features::{Grid, Location};
///
/// let grid = Grid::from_rows(&[[1u8, 2, 3], [4, 5, 6]])?;
/// assert_eq!(grid.rows(), 2);
/// assert_eq!(grid.cols(), 3);
/// assert_eq!(grid.get(1, 2), Some(&6));
/// assert_eq!(grid.at(Location::new(0, 1)), Some(&4));
/// assert_eq!(grid.get(2, 0), None);
/// # Ok::<(), surface_features::SurfaceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a grid from a row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidDimensions`] if either dimension is zero,
    /// or [`SurfaceError::BufferSizeMismatch`] if `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> SurfaceResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(SurfaceError::InvalidDimensions { rows, cols });
        }
        let expected = rows
            .checked_mul(cols)
            .ok_or(SurfaceError::InvalidDimensions { rows, cols })?;
        if data.len() != expected {
            return Err(SurfaceError::buffer_mismatch(expected, data.len()));
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.data.len()
    }

    /// Element at `(row, col)`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col)
    }

    /// Mutable element at `(row, col)`, or `None` if out of bounds.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get_mut(row * self.cols + col)
    }

    /// Element at a [`Location`], or `None` if negative or out of bounds.
    #[must_use]
    pub fn at(&self, location: Location) -> Option<&T> {
        let (col, row) = location.to_indices().ok()?;
        self.get(row, col)
    }

    /// Element at a [`Location`], with the reason for failure.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::NegativeLocation`] or [`SurfaceError::OutOfBounds`].
    pub fn try_at(&self, location: Location) -> SurfaceResult<&T> {
        let (col, row) = location.to_indices()?;
        self.get(row, col).ok_or(SurfaceError::OutOfBounds {
            x: location.x,
            y: location.y,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Row-major view of the samples.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterates the samples in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Mutably iterates the samples in row-major order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Iterates over rows as slices.
    pub fn iter_rows(&self) -> std::slice::Chunks<'_, T> {
        self.data.chunks(self.cols)
    }

    /// Whether `other` has the same dimensions.
    #[must_use]
    pub const fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }
}

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidDimensions`] if either dimension is zero.
    pub fn filled(rows: usize, cols: usize, value: T) -> SurfaceResult<Self> {
        let len = rows
            .checked_mul(cols)
            .ok_or(SurfaceError::InvalidDimensions { rows, cols })?;
        Self::new(rows, cols, vec![value; len])
    }

    /// Creates a grid from fixed-width rows.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidDimensions`] if there are no rows or the
    /// rows are empty.
    pub fn from_rows<const C: usize>(rows: &[[T; C]]) -> SurfaceResult<Self> {
        let data = rows.iter().flat_map(|row| row.iter().cloned()).collect();
        Self::new(rows.len(), C, data)
    }

    /// Copies the `rows × cols` window whose top-left cell is `(top, left)`.
    ///
    /// Returns `None` if the window does not fit inside the grid.
    #[must_use]
    pub fn window(&self, top: usize, left: usize, rows: usize, cols: usize) -> Option<Self> {
        let bottom = top.checked_add(rows)?;
        let right = left.checked_add(cols)?;
        if rows == 0 || cols == 0 || bottom > self.rows || right > self.cols {
            return None;
        }
        let data = self
            .iter_rows()
            .skip(top)
            .take(rows)
            .flat_map(|row| row[left..left + cols].iter().cloned())
            .collect();
        Some(Self { rows, cols, data })
    }
}

impl Grid<u8> {
    /// Depth sample at `(row, col)` widened to `i32`.
    ///
    /// Callers guarantee the index is in bounds.
    pub(crate) fn depth(&self, row: usize, col: usize) -> i32 {
        debug_assert!(row < self.rows && col < self.cols);
        i32::from(self.data[row * self.cols + col])
    }

    /// Minimum, maximum, and truncated mean over every sample in the patch.
    ///
    /// # Example
    ///
    /// ```
    /// use surface_features::DepthPatch;
    ///
    /// let patch = DepthPatch::from_rows(&[[1, 2], [3, 5]])?;
    /// let stats = patch.depth_stats();
    /// assert_eq!((stats.min, stats.max, stats.mean), (1, 5, 2));
    /// # Ok::<(), surface_features::SurfaceError>(())
    /// ```
    #[must_use]
    pub fn depth_stats(&self) -> DepthStats {
        let (min, max, sum) = self
            .data
            .iter()
            .fold((u8::MAX, u8::MIN, 0u64), |(min, max, sum), &d| {
                (min.min(d), max.max(d), sum + u64::from(d))
            });
        let mean = sum / self.data.len() as u64;

        DepthStats {
            min,
            max,
            mean: u8::try_from(mean).unwrap_or(max),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{cell:>3}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Patch-wide depth statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DepthStats {
    /// Smallest sample.
    pub min: u8,
    /// Largest sample.
    pub max: u8,
    /// Mean sample, truncated.
    pub mean: u8,
}
