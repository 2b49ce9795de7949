use super::common::{check_environment, outcome};
use super::{Convergence, DpError, IterationParams, Solved, UpdateMode};
use crate::mdps::mdp::Mdp;
use crate::mdps::tables::ActionValueTable;
use itertools::iproduct;
use tracing::{debug, info};

/// Q-value iteration: Bellman optimality sweeps over every (state, action)
/// pair, states outer and actions inner, until no entry moves by `theta` or
/// more within one sweep.
pub fn q_value_iteration<M: Mdp>(
    mdp: &M,
    params: &IterationParams,
) -> Result<Solved<ActionValueTable>, DpError> {
    params.validate()?;
    check_environment(mdp)?;

    info!(
        n_s = mdp.n_s(),
        n_a = mdp.n_a(),
        gamma = params.gamma,
        theta = params.theta,
        "Starting Q-value Iteration (QI)"
    );

    let mut q = ActionValueTable::zeros(mdp.n_s(), mdp.n_a());
    let mut convergence = Convergence::default();
    loop {
        let delta = q_value_sweep(mdp, &mut q, params.gamma, params.update)?;
        convergence.record(delta);
        debug!(iteration = convergence.sweeps, delta, "QI sweep");

        if delta < params.theta {
            info!(
                iterations = convergence.sweeps,
                "Q-value Iteration converged"
            );
            return Ok(Solved {
                table: q,
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

/// One sweep of Q(s, a) <- r + gamma * max_a' Q(s', a').
pub fn q_value_sweep<M: Mdp>(
    mdp: &M,
    q: &mut ActionValueTable,
    gamma: f64,
    update: UpdateMode,
) -> Result<f64, DpError> {
    let snapshot = (update == UpdateMode::Synchronous).then(|| q.clone());

    let mut delta: f64 = 0.;
    for (&s, (a_idx, a)) in iproduct!(mdp.states(), mdp.actions().iter().enumerate()) {
        let old = q.q(s, a_idx);
        let (s_prime, r) = outcome(mdp, s, a)?;
        let new = r + gamma * snapshot.as_ref().unwrap_or(&*q).max_q(s_prime);
        if !new.is_finite() {
            return Err(DpError::Diverged { state: s });
        }

        q.set(s, a_idx, new);
        delta = delta.max((old - new).abs());
    }

    Ok(delta)
}
