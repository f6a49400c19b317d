use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::discretizer::{Bound, Discretizer};
use crate::error::ConfigError;
use crate::observation::{SafetyLimits, OBS_DIM};
use crate::policy::ActionSet;
use crate::qtable::{cell_count, MAX_CELLS};
use crate::schedule::RateSchedule;

/// Reward handed to the update rule for each tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Tick that ends inside the safe envelope.
    pub survive: f64,
    /// Tick that ends outside the safe envelope.
    pub failure: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            survive: 1.0,
            failure: 0.0,
        }
    }
}

impl RewardConfig {
    #[must_use]
    pub fn reward(&self, out_of_range: bool) -> f64 {
        if out_of_range {
            self.failure
        } else {
            self.survive
        }
    }
}

/// Everything the training loop needs besides the environment itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Discretizer range for cart position, cart velocity, pole angle and pole
    /// angular velocity, in that order.
    pub bounds: [Bound; OBS_DIM],
    pub bucket_counts: [usize; OBS_DIM],
    /// Cart velocity commands in m/s.
    pub actions: Vec<f64>,
    /// Command issued on termination and shutdown.
    pub neutral_action: f64,
    pub discount: f64,
    /// Tick budget of one episode.
    pub max_step: usize,
    /// Consecutive full-budget episodes that count as solved.
    pub streak_to_end: usize,
    pub max_episodes: usize,
    pub schedule: RateSchedule,
    pub limits: SafetyLimits,
    pub reward: RewardConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            bounds: [
                Bound::symmetric(2.4),
                Bound::symmetric(1.0),
                Bound::symmetric(std::f64::consts::PI / 12.0),
                Bound::symmetric(50f64.to_radians()),
            ],
            bucket_counts: [3, 3, 6, 3],
            actions: vec![-1.0, 0.0, 1.0],
            neutral_action: 0.0,
            discount: 0.99,
            max_step: 250,
            streak_to_end: 120,
            max_episodes: 1000,
            schedule: RateSchedule::default(),
            limits: SafetyLimits::default(),
            reward: RewardConfig::default(),
        }
    }
}

impl AgentConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`] on unreadable
    /// input, and any error of [`AgentConfig::validate`].
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parses and validates a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Parse and validation errors.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// The first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.discretizer()?;
        self.action_set()?;
        if cell_count(self.bucket_counts, self.actions.len()).is_none() {
            return Err(ConfigError::TableTooLarge {
                bucket_counts: self.bucket_counts,
                actions: self.actions.len(),
                max: MAX_CELLS,
            });
        }
        if !self.neutral_action.is_finite() {
            return Err(ConfigError::NonFiniteAction {
                index: self.actions.len(),
                value: self.neutral_action,
            });
        }
        if !(0.0..=1.0).contains(&self.discount) {
            return Err(ConfigError::InvalidDiscount(self.discount));
        }
        if self.max_step == 0 {
            return Err(ConfigError::ZeroLimit { name: "max_step" });
        }
        if self.streak_to_end == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "streak_to_end",
            });
        }
        self.schedule.validate()?;
        for (name, value) in [
            ("cart_position", self.limits.cart_position),
            ("pole_angle", self.limits.pole_angle),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidSafetyLimit { name, value });
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Invalid bounds or bucket counts.
    pub fn discretizer(&self) -> Result<Discretizer, ConfigError> {
        Discretizer::new(self.bounds, self.bucket_counts)
    }

    /// # Errors
    ///
    /// Empty or non-finite action set.
    pub fn action_set(&self) -> Result<ActionSet, ConfigError> {
        ActionSet::new(self.actions.clone())
    }
}
