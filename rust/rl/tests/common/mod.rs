use tabular_dp::*;

/// One state, one action, reward 1 forever.
#[allow(dead_code)]
pub fn self_loop() -> TabularMdp {
    TabularMdp::new(["stay"], vec![vec![Some((0, 1.))]], 0, &[]).unwrap()
}

/// State 0 is terminal and loops with reward 0, state 1 moves to 0 for 5.
#[allow(dead_code)]
pub fn two_state_chain() -> TabularMdp {
    TabularMdp::new(
        ["go"],
        vec![vec![Some((0, 0.))], vec![Some((0, 5.))]],
        1,
        &[0],
    )
    .unwrap()
}

/// 4x1 corridor with a costly shortcut and a slow safe path.
///
/// ```text
/// 0 --a(-1)--> 1 --a(-1)--> 2 --a(+10)--> 3 (terminal)
/// 0 --b(-4)--> 2
/// ```
/// Action `c` always stays put for -1.
#[allow(dead_code)]
pub fn shortcut() -> TabularMdp {
    TabularMdp::new(
        ["a", "b", "c"],
        vec![
            vec![Some((1, -1.)), Some((2, -4.)), Some((0, -1.))],
            vec![Some((2, -1.)), Some((1, -1.)), Some((1, -1.))],
            vec![Some((3, 10.)), Some((2, -1.)), Some((2, -1.))],
            vec![Some((3, 0.)), Some((3, 0.)), Some((3, 0.))],
        ],
        0,
        &[3],
    )
    .unwrap()
}

/// Max over a slice, NEG_INFINITY when empty.
#[allow(dead_code)]
pub fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
