use super::mdp::{Mdp, State};
use super::tables::{ActionValueTable, ValueTable};
use crate::algos::model_based::mdp::common::outcome;
use crate::algos::model_based::mdp::{
    argmax, q_value_iteration, tied_maxima, value_iteration, DpError, IterationParams, Solved,
};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Which table a policy reads its greedy actions from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
    #[serde(rename = "v")]
    V,
    #[serde(rename = "q")]
    Q,
}

/// Read-only view of a converged table.
#[derive(Debug, Clone, Copy)]
pub enum PolicyTable<'a> {
    Value(&'a ValueTable),
    ActionValue(&'a ActionValueTable),
}

impl<'a> PolicyTable<'a> {
    pub fn kind(&self) -> TableKind {
        match self {
            PolicyTable::Value(_) => TableKind::V,
            PolicyTable::ActionValue(_) => TableKind::Q,
        }
    }

    pub fn n_s(&self) -> usize {
        match self {
            PolicyTable::Value(v) => v.n_s(),
            PolicyTable::ActionValue(q) => q.n_s(),
        }
    }

    /// One-step lookahead value of every action in `s`.
    ///
    /// V tables use `r + lookahead_discount * V(s')`, Q tables return `Q(s, .)`.
    pub fn action_values<M: Mdp>(
        &self,
        mdp: &M,
        s: State,
        lookahead_discount: f64,
    ) -> Result<Vec<f64>, DpError> {
        if s >= self.n_s() {
            return Err(DpError::InvalidEnvironment(format!(
                "state {s} is outside the {}-state table",
                self.n_s()
            )));
        }

        match self {
            PolicyTable::Value(v) => mdp
                .actions()
                .iter()
                .map(|a| {
                    let (s_prime, r) = outcome(mdp, s, a)?;
                    if s_prime >= v.n_s() {
                        return Err(DpError::InvalidEnvironment(format!(
                            "({s}, {a}) leads to state {s_prime}, outside the value table"
                        )));
                    }
                    Ok(r + lookahead_discount * v.v(s_prime))
                })
                .collect(),
            PolicyTable::ActionValue(q) => Ok(q.row(s).to_vec()),
        }
    }

    /// Greedy action index for every state, ties going to the first action.
    pub fn pi_star<M: Mdp>(
        &self,
        mdp: &M,
        lookahead_discount: f64,
        epsilon: f64,
    ) -> Result<Vec<Option<usize>>, DpError> {
        mdp.states()
            .iter()
            .map(|&s| {
                self.action_values(mdp, s, lookahead_discount)
                    .map(|values| argmax(&values, epsilon))
            })
            .collect()
    }
}

/// Tables computed for one environment. Either may be missing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Solutions {
    pub value: Option<Solved<ValueTable>>,
    pub action_value: Option<Solved<ActionValueTable>>,
}

impl Solutions {
    /// Runs the engine for `kind` and replaces that table.
    pub fn solve<M: Mdp>(
        &mut self,
        mdp: &M,
        kind: TableKind,
        params: &IterationParams,
    ) -> Result<(), DpError> {
        match kind {
            TableKind::V => self.value = Some(value_iteration(mdp, params)?),
            TableKind::Q => self.action_value = Some(q_value_iteration(mdp, params)?),
        }
        Ok(())
    }

    /// `None` means no table of that kind was computed.
    pub fn table(&self, kind: TableKind) -> Option<PolicyTable<'_>> {
        match kind {
            TableKind::V => self.value.as_ref().map(|s| PolicyTable::Value(&s.table)),
            TableKind::Q => self
                .action_value
                .as_ref()
                .map(|s| PolicyTable::ActionValue(&s.table)),
        }
    }
}

/// How to pick among actions whose values tie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TieBreak {
    /// First tied action in enumeration order.
    #[default]
    First,
    /// Uniformly among the tied actions, from a seeded generator.
    Random { seed: u64 },
}

/// Picks the greedy action from a list of action values.
pub struct GreedySelector {
    epsilon: f64,
    rng: Option<StdRng>,
}

impl GreedySelector {
    pub fn new(epsilon: f64, tie_break: TieBreak) -> Self {
        let rng = match tie_break {
            TieBreak::First => None,
            TieBreak::Random { seed } => Some(StdRng::seed_from_u64(seed)),
        };

        Self { epsilon, rng }
    }

    pub fn select(&mut self, values: &[f64]) -> Option<usize> {
        match self.rng.as_mut() {
            None => argmax(values, self.epsilon),
            Some(rng) => tied_maxima(values, self.epsilon).choose(rng).copied(),
        }
    }
}
