use crate::discretizer::Bucket;
use crate::error::ConfigError;
use crate::qtable::QTable;

/// Ordered set of velocity commands, addressed by index in the Q-table.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionSet {
    values: Vec<f64>,
}

impl ActionSet {
    /// # Errors
    ///
    /// Rejects an empty set and non-finite commands.
    pub fn new(values: Vec<f64>) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::EmptyActions);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteAction {
                index,
                value: values[index],
            });
        }
        Ok(Self { values })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn value(&self, index: usize) -> f64 {
        self.values[index]
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Epsilon-greedy selection over an [`ActionSet`].
#[derive(Clone, Debug)]
pub struct EpsilonGreedy {
    actions: ActionSet,
}

impl EpsilonGreedy {
    #[must_use]
    pub fn new(actions: ActionSet) -> Self {
        Self { actions }
    }

    #[must_use]
    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    /// Picks `(index, velocity)` for `bucket`.
    ///
    /// With probability `explore_rate` the index is drawn uniformly from the
    /// action set, otherwise it is the greedy action of the bucket's row, ties
    /// broken towards the lowest index. An exploration draw is consumed from
    /// `rng` on every call, so a seeded generator gives a reproducible sequence.
    pub fn select_action(
        &self,
        bucket: &Bucket,
        q_table: &QTable,
        explore_rate: f64,
        rng: &mut fastrand::Rng,
    ) -> (usize, f64) {
        let index = if rng.f64() < explore_rate {
            rng.usize(..self.actions.len())
        } else {
            q_table.greedy_action(bucket)
        };
        (index, self.actions.value(index))
    }
}
