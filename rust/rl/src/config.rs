//! Run configuration: iteration and execution parameters.
//!
//! Every field has a default, so a config file only needs to list what it
//! changes:
//!
//! ```json
//! { "iteration": { "gamma": 0.9 }, "execution": { "tie_break": { "kind": "random", "seed": 7 } } }
//! ```

use crate::algos::model_based::mdp::IterationParams;
use crate::mdps::executor::ExecutionParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpConfig {
    pub iteration: IterationParams,
    pub execution: ExecutionParams,
}

impl DpConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.iteration
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let e = &self.execution;
        if !(e.tie_epsilon >= 0.) {
            return Err(ConfigError::Invalid(format!(
                "tie_epsilon must be non-negative, got {}",
                e.tie_epsilon
            )));
        }
        if !e.lookahead_discount.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "lookahead_discount must be finite, got {}",
                e.lookahead_discount
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algos::model_based::mdp::UpdateMode;
    use crate::mdps::mdp_solver_policy::TieBreak;
    use rstest::rstest;

    #[test]
    fn empty_object_gives_defaults() {
        let config: DpConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DpConfig::default());
        assert_eq!(config.execution.lookahead_discount, 1.0);
        assert_eq!(config.execution.tie_break, TieBreak::First);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: DpConfig = serde_json::from_str(
            r#"{
                "iteration": {"gamma": 0.9, "max_sweeps": 100, "update": "synchronous"},
                "execution": {"tie_break": {"kind": "random", "seed": 7}, "max_steps": 50}
            }"#,
        )
        .unwrap();

        assert_eq!(config.iteration.gamma, 0.9);
        assert_eq!(config.iteration.theta, 0.001);
        assert_eq!(config.iteration.max_sweeps, Some(100));
        assert_eq!(config.iteration.update, UpdateMode::Synchronous);
        assert_eq!(config.execution.tie_break, TieBreak::Random { seed: 7 });
        assert_eq!(config.execution.max_steps, Some(50));
        assert_eq!(config.execution.tie_epsilon, 1e-9);
    }

    #[rstest]
    #[case(r#"{"iteration": {"gamma": 1.5}}"#)]
    #[case(r#"{"iteration": {"theta": 0}}"#)]
    #[case(r#"{"execution": {"tie_epsilon": -1}}"#)]
    fn validation_rejects(#[case] json: &str) {
        let config: DpConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = DpConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
