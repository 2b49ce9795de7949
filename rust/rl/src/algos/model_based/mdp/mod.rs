pub mod common;
pub mod qi;
pub mod vi;

pub use common::{argmax, tied_maxima};
pub use qi::{q_value_iteration, q_value_sweep};
pub use vi::{state_backup, value_iteration, value_sweep};

use crate::mdps::mdp::State;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DpError {
    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),
    #[error("discount factor gamma must be in (0, 1], got {0}")]
    InvalidGamma(f64),
    #[error("convergence threshold theta must be strictly positive, got {0}")]
    InvalidTheta(f64),
    #[error("no convergence after {sweeps} sweeps (last delta {delta})")]
    NotConverged { sweeps: usize, delta: f64 },
    #[error("value of state {state} is no longer finite")]
    Diverged { state: State },
}

/// Where a sweep reads its lookups from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Every write is visible to the entries updated after it in the same sweep.
    #[default]
    InPlace,
    /// Lookups read the table as it was at the start of the sweep.
    Synchronous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IterationParams {
    /// Discount factor, in (0, 1].
    pub gamma: f64,
    /// Stop once a sweep changes no entry by `theta` or more.
    pub theta: f64,
    /// Give up after this many sweeps. Unbounded when `None`.
    pub max_sweeps: Option<usize>,
    pub update: UpdateMode,
}

impl Default for IterationParams {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            theta: 0.001,
            max_sweeps: None,
            update: UpdateMode::InPlace,
        }
    }
}

impl IterationParams {
    pub fn new(gamma: f64, theta: f64) -> Self {
        Self {
            gamma,
            theta,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), DpError> {
        if !(self.gamma > 0. && self.gamma <= 1.) {
            return Err(DpError::InvalidGamma(self.gamma));
        }
        if !(self.theta > 0.) {
            return Err(DpError::InvalidTheta(self.theta));
        }
        Ok(())
    }
}

/// Per-sweep delta history of one iteration run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Convergence {
    pub sweeps: usize,
    pub deltas: Vec<f64>,
}

impl Convergence {
    fn record(&mut self, delta: f64) {
        self.sweeps += 1;
        self.deltas.push(delta);
    }

    pub fn final_delta(&self) -> Option<f64> {
        self.deltas.last().copied()
    }
}

/// A converged table together with how it got there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solved<T> {
    pub table: T,
    pub convergence: Convergence,
}
