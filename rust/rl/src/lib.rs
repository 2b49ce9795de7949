extern crate gridworld;
extern crate ndarray;
extern crate serde;
extern crate serde_json;

pub mod algos;
pub mod config;
pub mod environments;
pub mod envs;
pub mod mdps;

pub use algos::model_based::mdp::{
    q_value_iteration, value_iteration, DpError, IterationParams, Solved, UpdateMode,
};
pub use config::{ConfigError, DpConfig};
pub use envs::tabular::TabularMdp;
pub use mdps::action_source::{ActionSource, Choice, GreedySource, LineSource, Prompt, ScriptedSource};
pub use mdps::executor::{execute_policy, Episode, ExecError, ExecutionParams, Rejection, StepRecord};
pub use mdps::mdp::{ActError, Episodic, Mdp, Reward, State};
pub use mdps::mdp_solver_policy::{GreedySelector, PolicyTable, Solutions, TableKind, TieBreak};
pub use mdps::tables::{ActionValueTable, ValueTable};
