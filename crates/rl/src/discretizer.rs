//! Continuous observation to bucket mapping.
//!
//! Each dimension is handled independently. Values at or beyond a bound are
//! clamped into the first or last bucket, values strictly inside are mapped
//! linearly onto `[0, count - 1]` and rounded to the nearest index with ties
//! going away from zero (`f64::round`). Inside the bounds the scaled value is
//! always non-negative, so a tie always resolves to the upper bucket.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::observation::{Observation, OBS_DIM};

/// Discrete cell of the state space, one index per observation dimension.
pub type Bucket = [usize; OBS_DIM];

/// Closed interval covered by the buckets of one dimension.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub lower: f64,
    pub upper: f64,
}

impl Bound {
    #[must_use]
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    #[must_use]
    pub const fn symmetric(limit: f64) -> Self {
        Self::new(-limit, limit)
    }

    fn is_valid(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper
    }
}

#[derive(Clone, Debug)]
pub struct Discretizer {
    bounds: [Bound; OBS_DIM],
    counts: [usize; OBS_DIM],
}

impl Discretizer {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBound`] when a dimension has `lower >= upper`
    /// or a non-finite end, and [`ConfigError::ZeroBuckets`] for a zero count.
    pub fn new(bounds: [Bound; OBS_DIM], counts: [usize; OBS_DIM]) -> Result<Self, ConfigError> {
        for (dim, bound) in bounds.iter().enumerate() {
            if !bound.is_valid() {
                return Err(ConfigError::InvalidBound {
                    dim,
                    lower: bound.lower,
                    upper: bound.upper,
                });
            }
        }
        if let Some(dim) = counts.iter().position(|&c| c == 0) {
            return Err(ConfigError::ZeroBuckets { dim });
        }
        Ok(Self { bounds, counts })
    }

    #[must_use]
    pub const fn bucket_counts(&self) -> [usize; OBS_DIM] {
        self.counts
    }

    #[must_use]
    pub fn discretize(&self, observation: &Observation) -> Bucket {
        let values = observation.as_array();
        let mut bucket = [0; OBS_DIM];
        for (dim, slot) in bucket.iter_mut().enumerate() {
            *slot = bucket_index(values[dim], self.bounds[dim], self.counts[dim]);
        }
        bucket
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn bucket_index(value: f64, bound: Bound, count: usize) -> usize {
    let last = count - 1;
    if value <= bound.lower {
        return 0;
    }
    if value >= bound.upper {
        return last;
    }
    let width = bound.upper - bound.lower;
    let scaled = (value - bound.lower) / width * last as f64;
    (scaled.round() as usize).min(last)
}
