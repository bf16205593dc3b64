//! Scalar to sparse distributed representation encoding.
//!
//! A scalar in `min..=max` is mapped to one of
//! `num_buckets = num_bits - num_active_bits + 1` buckets, and the code has
//! bits `bucket .. bucket + num_active_bits` set. Nearby inputs share active
//! bits, so overlap approximates similarity.

use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{AgentError, AgentResult};

/// Sparse binary code stored as the sorted indices of its set bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SparseCode {
    length: u16,
    indices: Vec<u16>,
}

impl SparseCode {
    /// Total number of bits, set or not.
    #[must_use]
    pub const fn length(&self) -> u16 {
        self.length
    }

    /// Indices of the set bits, ascending.
    #[must_use]
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Number of set bits.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.indices.len()
    }

    /// Whether `bit` is set.
    #[must_use]
    pub fn contains(&self, bit: u16) -> bool {
        self.indices.binary_search(&bit).is_ok()
    }

    /// Number of bits set in both codes.
    #[must_use]
    pub fn overlap(&self, other: &Self) -> usize {
        self.indices.iter().filter(|&&i| other.contains(i)).count()
    }

    /// Expands to one `bool` per bit.
    #[must_use]
    pub fn to_dense(&self) -> Vec<bool> {
        let mut dense = vec![false; usize::from(self.length)];
        for &i in &self.indices {
            dense[usize::from(i)] = true;
        }
        dense
    }
}

impl fmt::Display for SparseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.to_dense() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Bucket encoder for unsigned integers.
///
/// # Example
///
/// ```
/// use sensor_agent::IntegerEncoder;
///
/// let encoder = IntegerEncoder::new(0..=100, 20, 4)?;
/// let code = encoder.encode(50)?;
/// assert_eq!(code.indices(), &[8, 9, 10, 11]);
///
/// let near = encoder.encode(55)?;
/// assert!(code.overlap(&near) > 0);
/// # Ok::<(), sensor_agent::AgentError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerEncoder {
    range: RangeInclusive<u32>,
    num_bits: u16,
    num_active_bits: u16,
}

impl IntegerEncoder {
    /// Creates an encoder over `range`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Encoder`] if the range is empty or a single value,
    /// or if `num_active_bits` is zero or exceeds `num_bits`.
    pub fn new(range: RangeInclusive<u32>, num_bits: u16, num_active_bits: u16) -> AgentResult<Self> {
        if range.start() >= range.end() {
            return Err(AgentError::encoder(format!(
                "range {}..={} must span more than one value",
                range.start(),
                range.end()
            )));
        }
        if num_active_bits == 0 || num_active_bits > num_bits {
            return Err(AgentError::encoder(format!(
                "need 0 < num_active_bits <= num_bits, got {num_active_bits} of {num_bits}"
            )));
        }
        Ok(Self {
            range,
            num_bits,
            num_active_bits,
        })
    }

    /// Number of distinct codes this encoder can produce.
    #[must_use]
    pub const fn num_buckets(&self) -> u16 {
        self.num_bits - self.num_active_bits + 1
    }

    /// Bucket index of `input`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ValueOutOfRange`] if `input` is outside the range.
    pub fn bucket(&self, input: u32) -> AgentResult<u16> {
        let (min, max) = (*self.range.start(), *self.range.end());
        if !self.range.contains(&input) {
            return Err(AgentError::ValueOutOfRange { input, min, max });
        }
        let buckets = u64::from(self.num_buckets());
        let i = buckets * u64::from(input - min) / u64::from(max - min);
        // The range maximum lands one past the last bucket
        let i = i.min(buckets - 1);
        Ok(u16::try_from(i).unwrap_or(u16::MAX))
    }

    /// Encodes `input` as a sparse code.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ValueOutOfRange`] if `input` is outside the range.
    pub fn encode(&self, input: u32) -> AgentResult<SparseCode> {
        let start = self.bucket(input)?;
        Ok(SparseCode {
            length: self.num_bits,
            indices: (start..start + self.num_active_bits).collect(),
        })
    }
}

/// Encodes `input` with a one-off [`IntegerEncoder`].
///
/// # Errors
///
/// See [`IntegerEncoder::new`] and [`IntegerEncoder::encode`].
pub fn encode_integer(
    input: u32,
    range: RangeInclusive<u32>,
    num_bits: u16,
    num_active_bits: u16,
) -> AgentResult<SparseCode> {
    IntegerEncoder::new(range, num_bits, num_active_bits)?.encode(input)
}
