use super::mdp::State;
use ndarray::{Array1, Array2, ArrayView1};
use serde::Serialize;

/// V(s) for every state, zero until an engine fills it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueTable {
    v: Array1<f64>,
}

impl ValueTable {
    pub fn zeros(n_s: usize) -> Self {
        Self {
            v: Array1::zeros(n_s),
        }
    }

    pub fn from_vec(v: Vec<f64>) -> Self {
        Self { v: Array1::from(v) }
    }

    pub fn n_s(&self) -> usize {
        self.v.len()
    }

    pub fn v(&self, s: State) -> f64 {
        self.v[s]
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.v.view()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.v.to_vec()
    }

    pub(crate) fn set(&mut self, s: State, value: f64) {
        self.v[s] = value;
    }
}

/// Q(s, a) for every state/action pair, zero until an engine fills it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionValueTable {
    q: Array2<f64>,
}

impl ActionValueTable {
    pub fn zeros(n_s: usize, n_a: usize) -> Self {
        Self {
            q: Array2::zeros((n_s, n_a)),
        }
    }

    pub fn n_s(&self) -> usize {
        self.q.nrows()
    }

    pub fn n_a(&self) -> usize {
        self.q.ncols()
    }

    pub fn q(&self, s: State, a: usize) -> f64 {
        self.q[[s, a]]
    }

    pub fn row(&self, s: State) -> ArrayView1<'_, f64> {
        self.q.row(s)
    }

    /// max_a Q(s, a).
    pub fn max_q(&self, s: State) -> f64 {
        self.q
            .row(s)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// V(s) = max_a Q(s, a) for every state.
    pub fn state_values(&self) -> ValueTable {
        ValueTable::from_vec((0..self.n_s()).map(|s| self.max_q(s)).collect())
    }

    pub(crate) fn set(&mut self, s: State, a: usize, value: f64) {
        self.q[[s, a]] = value;
    }
}
