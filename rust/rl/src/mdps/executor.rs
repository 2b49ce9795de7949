use super::action_source::{ActionSource, Choice, Prompt};
use super::mdp::{ActError, Episodic, Reward, State};
use super::mdp_solver_policy::{GreedySelector, PolicyTable, TableKind, TieBreak};
use crate::algos::model_based::mdp::DpError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("the action source ran out of actions in state {state}")]
    SourceExhausted { state: State },
    #[error("table does not fit the environment: {0}")]
    TableMismatch(String),
    #[error("no terminal state reached within {0} steps")]
    StepBudgetExhausted(usize),
    #[error(transparent)]
    Model(#[from] DpError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionParams {
    /// Discount on V(s') when looking one step ahead from a V table.
    pub lookahead_discount: f64,
    /// Values this close to the maximum count as tied.
    pub tie_epsilon: f64,
    pub tie_break: TieBreak,
    /// Abort after this many executed actions. Unbounded when `None`.
    pub max_steps: Option<usize>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            lookahead_discount: 1.0,
            tie_epsilon: 1e-9,
            tie_break: TieBreak::First,
            max_steps: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord<A> {
    pub from: State,
    pub action: A,
    /// What the table suggested in `from`.
    pub greedy: Option<A>,
    pub reward: Reward,
    pub to: State,
}

impl<A: PartialEq> StepRecord<A> {
    pub fn overridden(&self) -> bool {
        self.greedy.as_ref() != Some(&self.action)
    }
}

/// An input the environment did not accept.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub state: State,
    pub input: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Episode<A> {
    pub table: Option<TableKind>,
    pub steps: Vec<StepRecord<A>>,
    pub rejections: Vec<Rejection>,
}

impl<A> Episode<A> {
    fn new(table: Option<TableKind>) -> Self {
        Self {
            table,
            steps: Vec::new(),
            rejections: Vec::new(),
        }
    }

    pub fn total_reward(&self) -> Reward {
        self.steps.iter().map(|s| s.reward).sum()
    }

    /// States in visiting order, starting state included.
    pub fn trajectory(&self) -> Vec<State> {
        self.steps
            .first()
            .map(|s| s.from)
            .into_iter()
            .chain(self.steps.iter().map(|s| s.to))
            .collect()
    }
}

/// Resets `env` and walks it to a terminal state.
///
/// Each step the greedy action under `table` is offered to `source`, which
/// may accept it or name another action. Inputs the environment rejects are
/// reported and the same state is prompted again. Without a table only named
/// actions can be executed.
pub fn execute_policy<E, S>(
    env: &mut E,
    table: Option<PolicyTable<'_>>,
    source: &mut S,
    params: &ExecutionParams,
) -> Result<Episode<E::Action>, ExecError>
where
    E: Episodic,
    S: ActionSource<E::Action> + ?Sized,
{
    if let Some(table) = table {
        check_fit(&*env, table)?;
    }

    env.reset_agent();
    info!(table = ?table.map(|t| t.kind()), "Start executing");
    source.on_start(&env.render());
    if table.is_none() {
        warn!("No optimal value table was detected. Only manual execution possible.");
    }

    let mut selector = GreedySelector::new(params.tie_epsilon, params.tie_break);
    let mut episode = Episode::new(table.map(|t| t.kind()));
    while !env.is_terminal() {
        if let Some(max_steps) = params.max_steps {
            if episode.steps.len() >= max_steps {
                return Err(ExecError::StepBudgetExhausted(max_steps));
            }
        }

        let state = env.current_state();
        let greedy = match table {
            Some(table) => {
                let values = table.action_values(&*env, state, params.lookahead_discount)?;
                selector.select(&values).map(|i| env.actions()[i].clone())
            }
            None => None,
        };

        let step = loop {
            let prompt = Prompt {
                state,
                greedy: greedy.as_ref(),
                actions: env.actions(),
            };
            let choice = source
                .choose(&prompt)
                .ok_or(ExecError::SourceExhausted { state })?;

            let (input, action) = match choice {
                Choice::Greedy => (String::new(), greedy.clone()),
                Choice::Named(name) => {
                    let action = env.parse_action(&name);
                    (name, action)
                }
            };
            let acted = match action {
                Some(action) => env.act(&action).map(|(to, reward)| (action, to, reward)),
                None => Err(ActError::UnknownAction(input.clone())),
            };

            match acted {
                Ok((action, to, reward)) => {
                    break StepRecord {
                        from: state,
                        action,
                        greedy: greedy.clone(),
                        reward,
                        to,
                    }
                }
                Err(err) => {
                    let rejection = Rejection {
                        state,
                        input,
                        reason: err.to_string(),
                    };
                    warn!(state, input = %rejection.input, reason = %rejection.reason, "Rejected action");
                    source.on_rejected(&rejection, env.actions());
                    episode.rejections.push(rejection);
                }
            }
        };

        info!(
            from = step.from,
            action = %step.action,
            to = step.to,
            reward = step.reward,
            "Executed action"
        );
        source.on_step(&step, &env.render());
        episode.steps.push(step);
    }

    info!(
        steps = episode.steps.len(),
        total_reward = episode.total_reward(),
        "Reached a terminal state"
    );
    source.on_finish(&episode);
    Ok(episode)
}

fn check_fit<E: Episodic>(env: &E, table: PolicyTable<'_>) -> Result<(), ExecError> {
    if table.n_s() != env.n_s() {
        return Err(ExecError::TableMismatch(format!(
            "{:?} table has {} states, the environment has {}",
            table.kind(),
            table.n_s(),
            env.n_s()
        )));
    }
    if let PolicyTable::ActionValue(q) = table {
        if q.n_a() != env.n_a() {
            return Err(ExecError::TableMismatch(format!(
                "Q table has {} actions, the environment has {}",
                q.n_a(),
                env.n_a()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algos::model_based::mdp::{value_iteration, IterationParams};
    use crate::envs::tabular::TabularMdp;
    use crate::mdps::action_source::{GreedySource, ScriptedSource};
    use crate::mdps::tables::{ActionValueTable, ValueTable};

    fn corridor() -> TabularMdp {
        // 0 - 1 - 2, start in 0, 2 is terminal.
        TabularMdp::new(
            ["left", "right"],
            vec![
                vec![Some((0, -1.)), Some((1, -1.))],
                vec![Some((0, -1.)), Some((2, -1.))],
                vec![Some((2, 0.)), Some((2, 0.))],
            ],
            0,
            &[2],
        )
        .unwrap()
    }

    #[test]
    fn greedy_walk_reaches_terminal() {
        let mut env = corridor();
        let v = value_iteration(&env, &IterationParams::default()).unwrap().table;

        let episode = execute_policy(
            &mut env,
            Some(PolicyTable::Value(&v)),
            &mut GreedySource,
            &ExecutionParams::default(),
        )
        .unwrap();

        assert_eq!(episode.trajectory(), vec![0, 1, 2]);
        assert_eq!(episode.total_reward(), -2.);
        assert!(episode.steps.iter().all(|s| !s.overridden()));
        assert_eq!(episode.table, Some(TableKind::V));
    }

    #[test]
    fn override_is_recorded() {
        let mut env = corridor();
        let v = value_iteration(&env, &IterationParams::default()).unwrap().table;
        let mut source = ScriptedSource::new(["left", "", ""]);

        let episode = execute_policy(
            &mut env,
            Some(PolicyTable::Value(&v)),
            &mut source,
            &ExecutionParams::default(),
        )
        .unwrap();

        assert_eq!(episode.trajectory(), vec![0, 0, 1, 2]);
        assert!(episode.steps[0].overridden());
        assert_eq!(episode.steps[0].greedy.as_deref(), Some("right"));
    }

    #[test]
    fn missing_table_needs_named_actions() {
        let mut env = corridor();
        let mut source = ScriptedSource::new(["", "right", "right"]);

        let episode =
            execute_policy(&mut env, None, &mut source, &ExecutionParams::default()).unwrap();

        assert_eq!(episode.table, None);
        assert_eq!(episode.trajectory(), vec![0, 1, 2]);
        assert_eq!(episode.rejections.len(), 1);
        assert_eq!(episode.rejections[0].state, 0);
        assert!(source.prompts().iter().all(|(_, greedy)| greedy.is_none()));
    }

    #[test]
    fn greedy_source_gives_up_without_table() {
        let mut env = corridor();
        let err = execute_policy(&mut env, None, &mut GreedySource, &ExecutionParams::default())
            .unwrap_err();
        assert!(matches!(err, ExecError::SourceExhausted { state: 0 }));
    }

    #[test]
    fn step_budget_stops_endless_walks() {
        let mut env = corridor();
        let mut source = ScriptedSource::new(["left"; 10]);
        let params = ExecutionParams {
            max_steps: Some(3),
            ..Default::default()
        };

        let err = execute_policy(&mut env, None, &mut source, &params).unwrap_err();
        assert!(matches!(err, ExecError::StepBudgetExhausted(3)));
    }

    #[test]
    fn mismatched_tables_are_rejected() {
        let mut env = corridor();

        let v = ValueTable::zeros(5);
        let err = execute_policy(
            &mut env,
            Some(PolicyTable::Value(&v)),
            &mut GreedySource,
            &ExecutionParams::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "table does not fit the environment: V table has 5 states, the environment has 3"
        );

        let q = ActionValueTable::zeros(3, 4);
        let err = execute_policy(
            &mut env,
            Some(PolicyTable::ActionValue(&q)),
            &mut GreedySource,
            &ExecutionParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExecError::TableMismatch(_)));
    }

    #[test]
    fn lookahead_discount_changes_the_suggestion() {
        // From 0: "near" pays 1 and ends in 1 (V = 0), "far" pays 0 and
        // moves to 2 (V = 2). Undiscounted lookahead prefers "far".
        let mut env = TabularMdp::new(
            ["near", "far"],
            vec![
                vec![Some((1, 1.)), Some((2, 0.))],
                vec![Some((1, 0.)), Some((1, 0.))],
                vec![Some((1, 2.)), Some((1, 2.))],
            ],
            0,
            &[1],
        )
        .unwrap();
        let v = ValueTable::from_vec(vec![2., 0., 2.]);

        let mut source = ScriptedSource::new(["", ""]);
        execute_policy(
            &mut env,
            Some(PolicyTable::Value(&v)),
            &mut source,
            &ExecutionParams::default(),
        )
        .unwrap();
        assert_eq!(source.prompts()[0], (0, Some("far".to_string())));

        let mut source = ScriptedSource::new([""]);
        let params = ExecutionParams {
            lookahead_discount: 0.1,
            ..Default::default()
        };
        execute_policy(&mut env, Some(PolicyTable::Value(&v)), &mut source, &params).unwrap();
        assert_eq!(source.prompts()[0], (0, Some("near".to_string())));
    }
}
