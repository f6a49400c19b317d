#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Inverted pendulum Q-learning
//!
//! Tabular reinforcement learning for balancing a pole on a velocity-commanded
//! cart. The crate contains the whole learning core and nothing else: the
//! physical or simulated system is reached only through the [`Environment`]
//! trait.
//!
//! ## Key Components
//!
//! -   [`Discretizer`] maps a continuous [`Observation`] onto a [`Bucket`].
//! -   [`RateSchedule`] anneals the learning and exploration rates per episode.
//! -   [`EpsilonGreedy`] picks a velocity command from the [`QTable`].
//! -   [`Agent`] runs the control loop and the episode/streak state machine.
//!
//! ```rust,ignore
//! use rl::{Agent, AgentConfig};
//!
//! let mut agent = Agent::with_seed(my_env, AgentConfig::default(), 7)?;
//! let summary = agent.run(|| false)?;
//! agent.q_table().save_json("q_table.json".as_ref())?;
//! ```

pub mod agent;
pub mod config;
pub mod discretizer;
pub mod env;
pub mod error;
pub mod observation;
pub mod policy;
pub mod qtable;
pub mod schedule;

pub use agent::{Agent, EpisodeState, EpisodeSummary, Phase, RunSummary, TickOutcome};
pub use config::{AgentConfig, RewardConfig};
pub use discretizer::{Bound, Bucket, Discretizer};
pub use env::Environment;
pub use error::{AgentError, ConfigError, EnvError, PersistError};
pub use observation::{Observation, SafetyLimits, OBS_DIM};
pub use policy::{ActionSet, EpsilonGreedy};
pub use qtable::{cell_count, QTable, MAX_CELLS};
pub use schedule::RateSchedule;
