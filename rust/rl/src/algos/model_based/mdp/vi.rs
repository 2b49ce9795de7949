use super::common::{check_environment, outcome};
use super::{Convergence, DpError, IterationParams, Solved, UpdateMode};
use crate::mdps::mdp::{Mdp, State};
use crate::mdps::tables::ValueTable;
use tracing::{debug, info};

/// Value iteration: repeated Bellman optimality sweeps over V until no state
/// moves by `theta` or more within one sweep.
///
/// There is no sweep cap unless `params.max_sweeps` sets one; the caller is
/// responsible for handing in an MDP that converges under `params.gamma`.
pub fn value_iteration<M: Mdp>(
    mdp: &M,
    params: &IterationParams,
) -> Result<Solved<ValueTable>, DpError> {
    params.validate()?;
    check_environment(mdp)?;

    info!(
        n_s = mdp.n_s(),
        n_a = mdp.n_a(),
        gamma = params.gamma,
        theta = params.theta,
        "Starting Value Iteration (VI)"
    );

    let mut v = ValueTable::zeros(mdp.n_s());
    let mut convergence = Convergence::default();
    loop {
        let delta = value_sweep(mdp, &mut v, params.gamma, params.update)?;
        convergence.record(delta);
        debug!(iteration = convergence.sweeps, delta, "VI sweep");

        if delta < params.theta {
            info!(
                iterations = convergence.sweeps,
                "Value Iteration converged"
            );
            return Ok(Solved {
                table: v,
                convergence,
            });
        }

        if let Some(max_sweeps) = params.max_sweeps {
            if convergence.sweeps >= max_sweeps {
                return Err(DpError::NotConverged {
                    sweeps: convergence.sweeps,
                    delta,
                });
            }
        }
    }
}

/// One sweep over every state in enumeration order. Returns the largest
/// absolute change of any entry.
pub fn value_sweep<M: Mdp>(
    mdp: &M,
    v: &mut ValueTable,
    gamma: f64,
    update: UpdateMode,
) -> Result<f64, DpError> {
    let snapshot = (update == UpdateMode::Synchronous).then(|| v.clone());

    let mut delta: f64 = 0.;
    for &s in mdp.states() {
        let old = v.v(s);
        let new = state_backup(mdp, snapshot.as_ref().unwrap_or(&*v), s, gamma)?;
        if !new.is_finite() {
            return Err(DpError::Diverged { state: s });
        }

        v.set(s, new);
        delta = delta.max((old - new).abs());
    }

    Ok(delta)
}

/// max_a [r(s, a) + gamma * V(s')].
pub fn state_backup<M: Mdp>(
    mdp: &M,
    v: &ValueTable,
    s: State,
    gamma: f64,
) -> Result<f64, DpError> {
    mdp.actions()
        .iter()
        .map(|a| outcome(mdp, s, a).map(|(s_prime, r)| r + gamma * v.v(s_prime)))
        .try_fold(f64::NEG_INFINITY, |best, x| Ok(best.max(x?)))
}
