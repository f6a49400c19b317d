use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Rejected configuration. Raised before the first episode starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("bound {dim} is invalid: lower {lower} must be finite and below upper {upper}")]
    InvalidBound { dim: usize, lower: f64, upper: f64 },
    #[error("bucket count for dimension {dim} must be at least 1")]
    ZeroBuckets { dim: usize },
    #[error("q-table of {bucket_counts:?} buckets x {actions} actions exceeds {max} cells")]
    TableTooLarge {
        bucket_counts: [usize; 4],
        actions: usize,
        max: usize,
    },
    #[error("action set is empty")]
    EmptyActions,
    #[error("action {index} is not a finite velocity: {value}")]
    NonFiniteAction { index: usize, value: f64 },
    #[error("discount factor {0} is outside [0, 1]")]
    InvalidDiscount(f64),
    #[error("{name} must be at least 1")]
    ZeroLimit { name: &'static str },
    #[error("{name} range is invalid: floor {floor}, ceiling {ceiling}")]
    InvalidRate {
        name: &'static str,
        floor: f64,
        ceiling: f64,
    },
    #[error("decay horizon {0} must be positive")]
    InvalidHorizon(f64),
    #[error("safety limit {name} must be positive, got {value}")]
    InvalidSafetyLimit { name: &'static str, value: f64 },
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Violation of the environment contract.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("observation has {actual} values, expected {expected}")]
    Dimension { expected: usize, actual: usize },
    #[error("observation value {index} is not finite")]
    NonFinite { index: usize },
    #[error("environment did not settle after reset within {waited:?}")]
    ResetTimeout { waited: Duration },
    #[error("environment unavailable: {0}")]
    Unavailable(String),
}

/// Failure to save or restore a Q-table.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("q-table i/o on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("q-table encoding: {0}")]
    Json(#[from] serde_json::Error),
    #[error("q-table shape mismatch: {0}")]
    Shape(String),
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}
