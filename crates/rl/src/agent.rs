//! Episode and streak state machine driving the control loop.
//!
//! One [`Agent::tick`] in [`Phase::RunningEpisode`] selects an action for the
//! current bucket, commands it, waits one control tick, re-observes, and
//! applies the Q-learning backup. When the tick ends the episode the agent
//! passes through [`Phase::Resetting`] in the same call: it either re-poses the
//! environment and starts the next episode, or enters [`Phase::Terminated`]
//! once the episode budget is spent or the solved streak is reached.
//!
//! Episode lengths count ticks that ended inside the safe envelope. An
//! episode ends when a tick leaves the envelope or when `max_step` ticks have
//! survived; only the latter extends the streak.

use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::discretizer::{Bucket, Discretizer};
use crate::env::Environment;
use crate::error::{AgentError, EnvError};
use crate::observation::Observation;
use crate::policy::EpsilonGreedy;
use crate::qtable::QTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    RunningEpisode,
    Resetting,
    Terminated,
}

/// Scalar bookkeeping of the current episode and of the run so far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeState {
    /// Bucket the next action is selected from.
    pub bucket: Bucket,
    /// Ticks survived in the current episode.
    pub step: usize,
    pub episode: usize,
    pub streak: usize,
    pub explore_rate: f64,
    pub learning_rate: f64,
    pub episode_reward: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    /// Ended by leaving the safe envelope rather than by the step budget.
    pub out_of_range: bool,
    pub streak: usize,
    pub total_reward: f64,
    pub explore_rate: f64,
    pub learning_rate: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    Advanced {
        step: usize,
        action: usize,
        reward: f64,
    },
    EpisodeEnded(EpisodeSummary),
    /// A reset that failed earlier succeeded on retry.
    Restarted { episode: usize },
    Terminated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Episodes started, including an unfinished one.
    pub episodes: usize,
    pub longest_episode: usize,
    pub streak: usize,
    pub solved: bool,
    /// Training was interrupted by a stop request.
    pub stopped: bool,
    pub ticks: u64,
}

/// Tabular Q-learning agent bound to one environment.
///
/// The agent owns its Q-table, episode state and random generator; nothing
/// is shared between instances.
pub struct Agent<E: Environment> {
    env: E,
    config: AgentConfig,
    discretizer: Discretizer,
    policy: EpsilonGreedy,
    q_table: QTable,
    state: EpisodeState,
    phase: Phase,
    rng: fastrand::Rng,
    longest_episode: usize,
    ticks: u64,
}

impl<E: Environment> Agent<E> {
    /// Validates `config`, resets the environment and observes the first state.
    ///
    /// # Errors
    ///
    /// Configuration errors before the environment is touched, then any
    /// environment contract violation during the initial reset.
    pub fn new(env: E, config: AgentConfig, rng: fastrand::Rng) -> Result<Self, AgentError> {
        Self::start(env, config, None, rng)
    }

    /// # Errors
    ///
    /// See [`Agent::new`].
    pub fn with_seed(env: E, config: AgentConfig, seed: u64) -> Result<Self, AgentError> {
        Self::new(env, config, fastrand::Rng::with_seed(seed))
    }

    /// Resumes training from a previously learned table.
    ///
    /// # Errors
    ///
    /// As [`Agent::new`], plus a shape mismatch between `q_table` and `config`.
    pub fn with_q_table(
        env: E,
        config: AgentConfig,
        q_table: QTable,
        rng: fastrand::Rng,
    ) -> Result<Self, AgentError> {
        Self::start(env, config, Some(q_table), rng)
    }

    /// Validates once, then builds or shape-checks the table before the first reset.
    fn start(
        mut env: E,
        config: AgentConfig,
        q_table: Option<QTable>,
        rng: fastrand::Rng,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        let discretizer = config.discretizer()?;
        let policy = EpsilonGreedy::new(config.action_set()?);
        let num_actions = policy.actions().len();
        let q_table = match q_table {
            Some(table) => {
                table.ensure_shape(config.bucket_counts, num_actions)?;
                table
            }
            None => QTable::new(config.bucket_counts, num_actions),
        };

        let observation = read_observation(&env.reset()?)?;
        let bucket = discretizer.discretize(&observation);
        let state = EpisodeState {
            bucket,
            step: 0,
            episode: 0,
            streak: 0,
            explore_rate: config.schedule.explore_rate(0),
            learning_rate: config.schedule.learning_rate(0),
            episode_reward: 0.0,
        };
        info!(
            "Agent ready: {} cells, {} actions, first bucket {:?}",
            q_table.len(),
            policy.actions().len(),
            bucket
        );
        Ok(Self {
            env,
            config,
            discretizer,
            policy,
            q_table,
            state,
            phase: Phase::RunningEpisode,
            rng,
            longest_episode: 0,
            ticks: 0,
        })
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn state(&self) -> &EpisodeState {
        &self.state
    }

    #[must_use]
    pub const fn q_table(&self) -> &QTable {
        &self.q_table
    }

    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    #[must_use]
    pub const fn environment(&self) -> &E {
        &self.env
    }

    #[must_use]
    pub fn into_parts(self) -> (E, QTable) {
        (self.env, self.q_table)
    }

    /// Runs one iteration of the control loop.
    ///
    /// Once terminated, every call re-issues the neutral action and leaves the
    /// Q-table untouched.
    ///
    /// # Errors
    ///
    /// Environment contract violations. Leaving the safe envelope is not an
    /// error.
    pub fn tick(&mut self) -> Result<TickOutcome, AgentError> {
        match self.phase {
            Phase::RunningEpisode => self.step(),
            Phase::Resetting => {
                self.finish_episode()?;
                Ok(TickOutcome::Restarted {
                    episode: self.state.episode,
                })
            }
            Phase::Terminated => {
                self.env.act(self.config.neutral_action);
                Ok(TickOutcome::Terminated)
            }
        }
    }

    /// Ticks until terminated or until `should_stop` returns `true`.
    ///
    /// The predicate is polled between ticks only. On a stop request the
    /// neutral action is commanded before returning.
    ///
    /// # Errors
    ///
    /// The first error returned by [`Agent::tick`]; training halts there.
    pub fn run(&mut self, mut should_stop: impl FnMut() -> bool) -> Result<RunSummary, AgentError> {
        while self.phase != Phase::Terminated {
            if should_stop() {
                warn!(
                    "Stop requested during episode {} at step {}",
                    self.state.episode, self.state.step
                );
                self.shutdown();
                return Ok(self.summary(true));
            }
            self.tick()?;
        }
        Ok(self.summary(false))
    }

    /// Commands the neutral action.
    pub fn shutdown(&mut self) {
        info!("Shutting down, commanding {}", self.config.neutral_action);
        self.env.act(self.config.neutral_action);
    }

    fn step(&mut self) -> Result<TickOutcome, AgentError> {
        let s0 = self.state.bucket;
        let (action, velocity) = self.policy.select_action(
            &s0,
            &self.q_table,
            self.state.explore_rate,
            &mut self.rng,
        );
        self.env.act(velocity);
        self.env.wait_tick();

        let observation = read_observation(&self.env.observe()?)?;
        let out_of_range = observation.out_of_range(&self.config.limits);
        let reward = self.config.reward.reward(out_of_range);
        let s1 = self.discretizer.discretize(&observation);
        let td_error = self.q_table.update(
            &s0,
            action,
            reward,
            &s1,
            self.state.learning_rate,
            self.config.discount,
        );
        self.ticks += 1;
        self.state.episode_reward += reward;
        debug!(
            "episode {} step {}: {:?} -> action {} ({}) -> {:?}, reward {}, td {:.4}",
            self.state.episode, self.state.step, s0, action, velocity, s1, reward, td_error
        );

        if !out_of_range {
            self.state.step += 1;
            if self.state.step < self.config.max_step {
                self.state.bucket = s1;
                return Ok(TickOutcome::Advanced {
                    step: self.state.step,
                    action,
                    reward,
                });
            }
        }

        if out_of_range {
            self.state.streak = 0;
        } else {
            self.state.streak += 1;
        }
        self.longest_episode = self.longest_episode.max(self.state.step);
        let summary = EpisodeSummary {
            episode: self.state.episode,
            steps: self.state.step,
            out_of_range,
            streak: self.state.streak,
            total_reward: self.state.episode_reward,
            explore_rate: self.state.explore_rate,
            learning_rate: self.state.learning_rate,
        };
        info!(
            episode = summary.episode,
            steps = summary.steps,
            streak = summary.streak,
            reward = summary.total_reward,
            explore_rate = summary.explore_rate,
            learning_rate = summary.learning_rate,
            "Episode finished{}",
            if out_of_range { " out of range" } else { "" }
        );

        self.phase = Phase::Resetting;
        self.finish_episode()?;
        Ok(TickOutcome::EpisodeEnded(summary))
    }

    /// Episode boundary: terminate, or reset and start the next episode.
    /// Counters are committed only after the reset succeeded, so a failed
    /// reset can be retried from [`Phase::Resetting`].
    fn finish_episode(&mut self) -> Result<(), AgentError> {
        let next = self.state.episode + 1;
        let solved = self.state.streak >= self.config.streak_to_end;
        if solved || next > self.config.max_episodes {
            self.state.episode = next;
            self.phase = Phase::Terminated;
            info!(
                "Training finished after {} episodes (streak {}, solved: {})",
                next, self.state.streak, solved
            );
            self.env.act(self.config.neutral_action);
            return Ok(());
        }

        let observation = read_observation(&self.env.reset()?)?;
        self.state = EpisodeState {
            bucket: self.discretizer.discretize(&observation),
            step: 0,
            episode: next,
            streak: self.state.streak,
            explore_rate: self.config.schedule.explore_rate(next),
            learning_rate: self.config.schedule.learning_rate(next),
            episode_reward: 0.0,
        };
        self.phase = Phase::RunningEpisode;
        Ok(())
    }

    fn summary(&self, stopped: bool) -> RunSummary {
        let episodes = match self.phase {
            Phase::Terminated => self.state.episode,
            _ => self.state.episode + 1,
        };
        RunSummary {
            episodes,
            longest_episode: self.longest_episode,
            streak: self.state.streak,
            solved: self.state.streak >= self.config.streak_to_end,
            stopped,
            ticks: self.ticks,
        }
    }
}

fn read_observation(raw: &[f64]) -> Result<Observation, EnvError> {
    Observation::try_from(raw)
}
