use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::discretizer::Bucket;
use crate::error::PersistError;
use crate::observation::OBS_DIM;

/// Largest table accepted from a configuration or a saved file.
pub const MAX_CELLS: usize = 1 << 24;

/// `product(bucket_counts) * num_actions`, or `None` when it overflows or
/// exceeds [`MAX_CELLS`].
#[must_use]
pub fn cell_count(bucket_counts: [usize; OBS_DIM], num_actions: usize) -> Option<usize> {
    bucket_counts
        .iter()
        .try_fold(num_actions, |acc, &count| acc.checked_mul(count))
        .filter(|&cells| cells <= MAX_CELLS)
}

/// Dense table of action values, one row of `num_actions` per bucket.
///
/// Rows are stored row-major over the bucket dimensions, so the row for
/// `[i0, i1, i2, i3]` starts at `((i0 * c1 + i1) * c2 + i2) * c3 + i3`
/// times the number of actions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    bucket_counts: [usize; OBS_DIM],
    num_actions: usize,
    values: Vec<f64>,
}

impl QTable {
    /// Zero-initialised table.
    ///
    /// # Panics
    ///
    /// When the layout is larger than [`MAX_CELLS`]. Layouts coming from an
    /// [`AgentConfig`](crate::AgentConfig) are checked by its `validate`.
    #[must_use]
    pub fn new(bucket_counts: [usize; OBS_DIM], num_actions: usize) -> Self {
        let cells = cell_count(bucket_counts, num_actions).unwrap_or(usize::MAX);
        assert!(
            cells <= MAX_CELLS,
            "q-table layout {bucket_counts:?} x {num_actions} is too large"
        );
        Self {
            bucket_counts,
            num_actions,
            values: vec![0.0; cells],
        }
    }

    #[must_use]
    pub const fn bucket_counts(&self) -> [usize; OBS_DIM] {
        self.bucket_counts
    }

    #[must_use]
    pub const fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// Number of cells, `product(bucket_counts) * num_actions`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn row_start(&self, bucket: &Bucket) -> usize {
        let mut flat = 0;
        for (index, count) in bucket.iter().zip(self.bucket_counts) {
            debug_assert!(*index < count, "bucket index {index} out of {count}");
            flat = flat * count + index;
        }
        flat * self.num_actions
    }

    /// All action values of one bucket.
    #[must_use]
    pub fn row(&self, bucket: &Bucket) -> &[f64] {
        let start = self.row_start(bucket);
        &self.values[start..start + self.num_actions]
    }

    #[must_use]
    pub fn get(&self, bucket: &Bucket, action: usize) -> f64 {
        self.row(bucket)[action]
    }

    pub fn set(&mut self, bucket: &Bucket, action: usize, value: f64) {
        let start = self.row_start(bucket);
        self.values[start + action] = value;
    }

    #[must_use]
    pub fn max_q(&self, bucket: &Bucket) -> f64 {
        self.row(bucket)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Index of the best action in a bucket. Ties go to the lowest index.
    #[must_use]
    pub fn greedy_action(&self, bucket: &Bucket) -> usize {
        let mut best = 0;
        let row = self.row(bucket);
        for (index, value) in row.iter().enumerate().skip(1) {
            if *value > row[best] {
                best = index;
            }
        }
        best
    }

    /// One-step Q-learning backup.
    ///
    /// `Q(s0, a) += alpha * (reward + gamma * max_a' Q(s1, a') - Q(s0, a))`.
    /// Only the `(s0, a)` cell is written. Returns the temporal-difference error.
    pub fn update(
        &mut self,
        s0: &Bucket,
        action: usize,
        reward: f64,
        s1: &Bucket,
        learning_rate: f64,
        discount: f64,
    ) -> f64 {
        let target = reward + discount * self.max_q(s1);
        let current = self.get(s0, action);
        let td_error = target - current;
        self.set(s0, action, current + learning_rate * td_error);
        td_error
    }

    /// # Errors
    ///
    /// Returns [`PersistError::Shape`] when the table does not match the given
    /// layout.
    pub fn ensure_shape(
        &self,
        bucket_counts: [usize; OBS_DIM],
        num_actions: usize,
    ) -> Result<(), PersistError> {
        if self.bucket_counts != bucket_counts || self.num_actions != num_actions {
            return Err(PersistError::Shape(format!(
                "table is {:?} x {}, expected {:?} x {}",
                self.bucket_counts, self.num_actions, bucket_counts, num_actions
            )));
        }
        let Some(cells) = cell_count(bucket_counts, num_actions) else {
            return Err(PersistError::Shape(format!(
                "layout {bucket_counts:?} x {num_actions} exceeds {MAX_CELLS} cells"
            )));
        };
        if self.values.len() != cells {
            return Err(PersistError::Shape(format!(
                "table holds {} values, layout needs {}",
                self.values.len(),
                cells
            )));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Fails on I/O or encoding errors.
    pub fn save_json(&self, path: &Path) -> Result<(), PersistError> {
        let encoded = serde_json::to_string(self)?;
        fs::write(path, encoded).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a table written by [`QTable::save_json`]. The stored layout is
    /// checked for internal consistency only; use [`QTable::ensure_shape`] to
    /// compare it with a configuration.
    ///
    /// # Errors
    ///
    /// Fails on I/O, decoding, or an inconsistent stored layout.
    pub fn load_json(path: &Path) -> Result<Self, PersistError> {
        let raw = fs::read_to_string(path).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table: Self = serde_json::from_str(&raw)?;
        table.ensure_shape(table.bucket_counts, table.num_actions)?;
        Ok(table)
    }
}
