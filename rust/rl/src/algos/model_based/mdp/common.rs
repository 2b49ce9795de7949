use super::DpError;
use crate::mdps::mdp::{Mdp, Reward, State};

/// Index of the first value within `epsilon` of the maximum. `None` for an
/// empty slice or when no value is comparable.
pub fn argmax(values: &[f64], epsilon: f64) -> Option<usize> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values.iter().position(|&x| x >= max - epsilon)
}

/// Every index within `epsilon` of the maximum, in order.
pub fn tied_maxima(values: &[f64], epsilon: f64) -> Vec<usize> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .enumerate()
        .filter(|&(_, &x)| x >= max - epsilon)
        .map(|(i, _)| i)
        .collect()
}

pub(crate) fn check_environment<M: Mdp>(mdp: &M) -> Result<(), DpError> {
    if mdp.n_a() == 0 || mdp.actions().is_empty() {
        return Err(DpError::InvalidEnvironment(
            "the environment defines no actions".to_string(),
        ));
    }
    if mdp.actions().len() != mdp.n_a() {
        return Err(DpError::InvalidEnvironment(format!(
            "n_a is {} but {} actions are enumerated",
            mdp.n_a(),
            mdp.actions().len()
        )));
    }
    if let Some(s) = mdp.states().iter().find(|&&s| s >= mdp.n_s()) {
        return Err(DpError::InvalidEnvironment(format!(
            "state {s} is outside 0..{}",
            mdp.n_s()
        )));
    }
    Ok(())
}

/// Transition lookup that turns every gap in the model into an error.
pub(crate) fn outcome<M: Mdp>(
    mdp: &M,
    s: State,
    a: &M::Action,
) -> Result<(State, Reward), DpError> {
    let (s_prime, r) = mdp.transition(s, a).ok_or_else(|| {
        DpError::InvalidEnvironment(format!("no transition defined for ({s}, {a})"))
    })?;
    if s_prime >= mdp.n_s() {
        return Err(DpError::InvalidEnvironment(format!(
            "({s}, {a}) leads to state {s_prime}, outside 0..{}",
            mdp.n_s()
        )));
    }
    Ok((s_prime, r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![1., 3., 2.], 0., Some(1))]
    #[case(vec![3., 1., 3.], 0., Some(0))]
    #[case(vec![-5., -4.], 0., Some(1))]
    #[case(vec![2.9999999999, 3.], 1e-9, Some(0))]
    #[case(vec![2.99, 3.], 1e-9, Some(1))]
    #[case(vec![], 0., None)]
    fn argmax_picks_first_maximum(
        #[case] values: Vec<f64>,
        #[case] epsilon: f64,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(argmax(&values, epsilon), expected);
    }

    #[test]
    fn argmax_ignores_nan() {
        assert_eq!(argmax(&[f64::NAN, 1., 0.], 0.), Some(1));
    }

    #[rstest]
    #[case(vec![3., 1., 3.], 0., vec![0, 2])]
    #[case(vec![1., 2., 3.], 0., vec![2])]
    #[case(vec![1., 1. + 1e-12, 0.], 1e-9, vec![0, 1])]
    #[case(vec![], 0., vec![])]
    fn tied_maxima_returns_all(
        #[case] values: Vec<f64>,
        #[case] epsilon: f64,
        #[case] expected: Vec<usize>,
    ) {
        assert_eq!(tied_maxima(&values, epsilon), expected);
    }
}
