use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Per-episode annealing of the learning and exploration rates.
///
/// Both rates follow `1 - log10((episode + 1) / decay_horizon)`, clamped into
/// their own `[floor, ceiling]`. They stay at the ceiling for the first few
/// episodes, then fall logarithmically until they reach the floor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateSchedule {
    pub min_learning_rate: f64,
    pub max_learning_rate: f64,
    pub min_explore_rate: f64,
    pub max_explore_rate: f64,
    pub decay_horizon: f64,
}

impl Default for RateSchedule {
    fn default() -> Self {
        Self {
            min_learning_rate: 0.1,
            max_learning_rate: 0.5,
            min_explore_rate: 0.01,
            max_explore_rate: 1.0,
            decay_horizon: 25.0,
        }
    }
}

impl RateSchedule {
    #[must_use]
    pub fn learning_rate(&self, episode: usize) -> f64 {
        self.decay(episode)
            .min(self.max_learning_rate)
            .max(self.min_learning_rate)
    }

    #[must_use]
    pub fn explore_rate(&self, episode: usize) -> f64 {
        self.decay(episode)
            .min(self.max_explore_rate)
            .max(self.min_explore_rate)
    }

    #[allow(clippy::cast_precision_loss)]
    fn decay(&self, episode: usize) -> f64 {
        1.0 - ((episode as f64 + 1.0) / self.decay_horizon).log10()
    }

    /// # Errors
    ///
    /// Rejects ranges that are not `0 <= floor <= ceiling <= 1` and a
    /// non-positive horizon.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("learning rate", self.min_learning_rate, self.max_learning_rate)?;
        check_range("explore rate", self.min_explore_rate, self.max_explore_rate)?;
        if !(self.decay_horizon.is_finite() && self.decay_horizon > 0.0) {
            return Err(ConfigError::InvalidHorizon(self.decay_horizon));
        }
        Ok(())
    }
}

fn check_range(name: &'static str, floor: f64, ceiling: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&floor) && (0.0..=1.0).contains(&ceiling) && floor <= ceiling {
        Ok(())
    } else {
        Err(ConfigError::InvalidRate {
            name,
            floor,
            ceiling,
        })
    }
}
