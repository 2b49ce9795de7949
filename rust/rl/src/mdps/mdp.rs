use std::fmt::{Debug, Display};
use thiserror::Error;

pub type State = usize;
pub type Reward = f64;

/// Finite, deterministic Markov Decision Process - Sutton & Barto 2018.
///
/// States are dense indices `0..n_s()`. Actions have a fixed order, the
/// position of an action in `actions()` is its table column.
pub trait Mdp {
    type Action: Clone + PartialEq + Debug + Display;

    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize {
        self.actions().len()
    }

    /// Sweep order, stable for the lifetime of the MDP.
    fn states(&self) -> &[State];

    fn actions(&self) -> &[Self::Action];

    /// `None` when the pair has no defined outcome.
    fn transition(&self, s: State, a: &Self::Action) -> Option<(State, Reward)>;
}

/// An MDP with an agent that can be placed and moved around.
pub trait Episodic: Mdp {
    fn reset_agent(&mut self);

    fn current_state(&self) -> State;

    fn is_terminal(&self) -> bool;

    fn act(&mut self, a: &Self::Action) -> Result<(State, Reward), ActError>;

    fn render(&self) -> String;

    /// Looks an action up by its display name. An exact match wins over one
    /// that only ignores case.
    fn parse_action(&self, input: &str) -> Option<Self::Action> {
        let input = input.trim();
        let actions = self.actions();
        actions
            .iter()
            .find(|a| a.to_string() == input)
            .or_else(|| {
                actions
                    .iter()
                    .find(|a| a.to_string().eq_ignore_ascii_case(input))
            })
            .cloned()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActError {
    #[error("'{0}' is not a valid action")]
    UnknownAction(String),
    #[error("the episode is over")]
    EpisodeOver,
    #[error("action '{action}' has no outcome in state {state}")]
    Undefined { state: State, action: String },
}
