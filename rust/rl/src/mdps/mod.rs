pub mod action_source;
pub mod executor;
pub mod mdp;
pub mod mdp_solver_policy;
pub mod tables;
