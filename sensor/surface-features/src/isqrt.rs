//! Bit-exact integer square root.

/// Floor square root of a 32-bit unsigned integer.
///
/// Returns the unique `r` with `r * r <= n < (r + 1) * (r + 1)`. Uses the
/// digit-by-digit shift-subtract method, so it runs at most 16 iterations and
/// never touches floating point.
///
/// # Example
///
/// ```
/// use surface_features::integer_sqrt;
///
/// assert_eq!(integer_sqrt(0), 0);
/// assert_eq!(integer_sqrt(16), 4);
/// assert_eq!(integer_sqrt(17), 4);
/// assert_eq!(integer_sqrt(u32::MAX), 65_535);
/// ```
#[must_use]
pub const fn integer_sqrt(n: u32) -> u32 {
    let mut rem = n;
    let mut root: u32 = 0;
    // Highest power of four representable in a u32
    let mut bit: u32 = 1 << 30;

    while bit > rem {
        bit >>= 2;
    }

    while bit != 0 {
        if rem >= root + bit {
            rem -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }

    root
}
