#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use rl::{AgentConfig, EnvError, Environment};

pub fn upright() -> Vec<f64> {
    vec![0.0, 0.0, 0.0, 0.0]
}

/// Pole well past the default 15 degree limit.
pub fn fallen() -> Vec<f64> {
    vec![0.0, 0.0, 1.0, 0.0]
}

/// Environment that replays scripted observations and records every command.
///
/// Empty scripts fall back to an upright observation.
#[derive(Default)]
pub struct ScriptedEnv {
    pub resets: VecDeque<Result<Vec<f64>, EnvError>>,
    pub observations: VecDeque<Vec<f64>>,
    pub commands: Vec<f64>,
    pub reset_count: usize,
    pub waits: usize,
}

impl ScriptedEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observations(observations: impl IntoIterator<Item = Vec<f64>>) -> Self {
        Self {
            observations: observations.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl Environment for ScriptedEnv {
    fn reset(&mut self) -> Result<Vec<f64>, EnvError> {
        self.reset_count += 1;
        self.resets.pop_front().unwrap_or_else(|| Ok(upright()))
    }

    fn observe(&mut self) -> Result<Vec<f64>, EnvError> {
        Ok(self.observations.pop_front().unwrap_or_else(upright))
    }

    fn act(&mut self, velocity: f64) {
        self.commands.push(velocity);
    }

    fn tick_period(&self) -> Duration {
        Duration::from_millis(20)
    }

    fn wait_tick(&mut self) {
        self.waits += 1;
    }
}

pub fn small_config(max_step: usize, streak_to_end: usize, max_episodes: usize) -> AgentConfig {
    AgentConfig {
        max_step,
        streak_to_end,
        max_episodes,
        ..AgentConfig::default()
    }
}
