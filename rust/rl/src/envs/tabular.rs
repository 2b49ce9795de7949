use crate::mdps::mdp::{ActError, Episodic, Mdp, Reward, State};
use itertools::Itertools;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabularError {
    #[error("failed to read MDP file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse MDP file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("state {state} lists {got} outcomes for {expected} actions")]
    Ragged {
        state: State,
        expected: usize,
        got: usize,
    },
    #[error("({state}, {action}) leads to unknown state {next_state}")]
    UnknownNextState {
        state: State,
        action: String,
        next_state: State,
    },
    #[error("actions '{first}' and '{second}' have the same name")]
    DuplicateAction { first: String, second: String },
    #[error("{what} state {state} does not exist")]
    UnknownState { what: &'static str, state: State },
}

/// On-disk form of a [`TabularMdp`].
///
/// ```json
/// {
///   "actions": ["stay", "go"],
///   "transitions": [[[0, 0.0], [0, 0.0]], [[1, -1.0], [0, 5.0]]],
///   "start": 1,
///   "terminals": [0]
/// }
/// ```
///
/// `transitions[s][a]` is `[next_state, reward]`, or `null` for a pair with
/// no outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct TabularDef {
    pub actions: Vec<String>,
    pub transitions: Vec<Vec<Option<(State, Reward)>>>,
    #[serde(default)]
    pub start: State,
    #[serde(default)]
    pub terminals: Vec<State>,
}

/// Deterministic MDP given as an explicit outcome table.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "TabularDef")]
pub struct TabularMdp {
    actions: Vec<String>,
    outcomes: Vec<Vec<Option<(State, Reward)>>>,
    states: Vec<State>,
    terminal: Vec<bool>,
    start: State,
    agent: State,
}

impl TabularMdp {
    pub fn new<I, A>(
        actions: I,
        transitions: Vec<Vec<Option<(State, Reward)>>>,
        start: State,
        terminals: &[State],
    ) -> Result<Self, TabularError>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self::try_from(TabularDef {
            actions: actions.into_iter().map(Into::into).collect(),
            transitions,
            start,
            terminals: terminals.to_vec(),
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TabularError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn is_terminal_state(&self, s: State) -> bool {
        self.terminal.get(s).copied().unwrap_or(false)
    }

    fn action_index(&self, a: &str) -> Option<usize> {
        self.actions.iter().position(|x| x == a)
    }
}

impl TryFrom<TabularDef> for TabularMdp {
    type Error = TabularError;

    fn try_from(def: TabularDef) -> Result<Self, Self::Error> {
        // Names are typed in ignoring case, so they must stay apart that way.
        if let Some((first, second)) = def
            .actions
            .iter()
            .tuple_combinations()
            .find(|(a, b)| a.eq_ignore_ascii_case(b))
        {
            return Err(TabularError::DuplicateAction {
                first: first.clone(),
                second: second.clone(),
            });
        }

        let n_s = def.transitions.len();
        for (s, row) in def.transitions.iter().enumerate() {
            if row.len() != def.actions.len() {
                return Err(TabularError::Ragged {
                    state: s,
                    expected: def.actions.len(),
                    got: row.len(),
                });
            }
            for (a, o) in def.actions.iter().zip(row) {
                if let Some((next_state, _)) = *o {
                    if next_state >= n_s {
                        return Err(TabularError::UnknownNextState {
                            state: s,
                            action: a.clone(),
                            next_state,
                        });
                    }
                }
            }
        }

        if def.start >= n_s {
            return Err(TabularError::UnknownState {
                what: "start",
                state: def.start,
            });
        }

        let mut terminal = vec![false; n_s];
        for &t in &def.terminals {
            *terminal.get_mut(t).ok_or(TabularError::UnknownState {
                what: "terminal",
                state: t,
            })? = true;
        }

        Ok(Self {
            actions: def.actions,
            outcomes: def.transitions,
            states: (0..n_s).collect(),
            terminal,
            start: def.start,
            agent: def.start,
        })
    }
}

impl Mdp for TabularMdp {
    type Action = String;

    fn n_s(&self) -> usize {
        self.outcomes.len()
    }

    fn states(&self) -> &[State] {
        &self.states
    }

    fn actions(&self) -> &[String] {
        &self.actions
    }

    fn transition(&self, s: State, a: &String) -> Option<(State, Reward)> {
        let a = self.action_index(a)?;
        self.outcomes.get(s)?.get(a).copied().flatten()
    }
}

impl Episodic for TabularMdp {
    fn reset_agent(&mut self) {
        self.agent = self.start;
    }

    fn current_state(&self) -> State {
        self.agent
    }

    fn is_terminal(&self) -> bool {
        self.is_terminal_state(self.agent)
    }

    fn act(&mut self, a: &String) -> Result<(State, Reward), ActError> {
        if self.is_terminal() {
            return Err(ActError::EpisodeOver);
        }
        if self.action_index(a).is_none() {
            return Err(ActError::UnknownAction(a.clone()));
        }

        let (next, r) = self.transition(self.agent, a).ok_or(ActError::Undefined {
            state: self.agent,
            action: a.clone(),
        })?;
        self.agent = next;

        Ok((next, r))
    }

    fn render(&self) -> String {
        let marker = if self.is_terminal() { " (terminal)" } else { "" };
        format!("state {} of {}{marker}", self.agent, self.n_s())
    }
}
