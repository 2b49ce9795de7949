use super::executor::{Episode, Rejection, StepRecord};
use super::mdp::State;
use itertools::Itertools;
use std::collections::VecDeque;
use std::fmt::Display;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use tracing::warn;

/// What the executor shows before asking for the next action.
#[derive(Debug)]
pub struct Prompt<'a, A> {
    pub state: State,
    /// `None` when no table is available.
    pub greedy: Option<&'a A>,
    pub actions: &'a [A],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Execute the suggested action.
    Greedy,
    /// Execute the action with this name.
    Named(String),
}

impl Choice {
    /// Empty input accepts the suggestion, anything else names an action.
    pub fn from_input(input: &str) -> Self {
        match input.trim() {
            "" => Choice::Greedy,
            name => Choice::Named(name.to_string()),
        }
    }
}

/// Supplies actions to the policy executor and hears back what happened.
pub trait ActionSource<A> {
    /// `None` when the source has nothing more to give.
    fn choose(&mut self, prompt: &Prompt<'_, A>) -> Option<Choice>;

    fn on_start(&mut self, _map: &str) {}

    fn on_rejected(&mut self, _rejection: &Rejection, _actions: &[A]) {}

    fn on_step(&mut self, _step: &StepRecord<A>, _map: &str) {}

    fn on_finish(&mut self, _episode: &Episode<A>) {}
}

/// Interactive source reading one line per action.
pub struct LineSource<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Output failures do not stop the episode, the input side decides that.
    fn report(&self, what: &str, written: io::Result<()>) {
        if let Err(err) = written {
            warn!(error = %err, what, "Could not write to the action source output");
        }
    }
}

impl LineSource<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<A: Display, R: BufRead, W: Write> ActionSource<A> for LineSource<R, W> {
    fn choose(&mut self, prompt: &Prompt<'_, A>) -> Option<Choice> {
        let written = match prompt.greedy {
            Some(greedy) => write!(
                self.output,
                "Greedy action= {greedy}\nChoose an action by typing it in full, then hit enter. \
                 Just hit enter to execute the greedy action: "
            ),
            None => write!(
                self.output,
                "Choose an action by typing it in full, then hit enter. Available are [{}]: ",
                prompt.actions.iter().join(", ")
            ),
        }
        .and_then(|_| self.output.flush());
        self.report("prompt", written);

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(Choice::from_input(&line)),
        }
    }

    fn on_start(&mut self, map: &str) {
        let written = writeln!(self.output, "Start executing. Current map:\n{map}");
        self.report("start", written);
    }

    fn on_rejected(&mut self, rejection: &Rejection, actions: &[A]) {
        let written = writeln!(
            self.output,
            "{} is not a valid action. Available actions are [{}]. Try again",
            rejection.input,
            actions.iter().join(", ")
        );
        self.report("rejection", written);
    }

    fn on_step(&mut self, step: &StepRecord<A>, map: &str) {
        let written = writeln!(
            self.output,
            "Executed action: {}\n--------------------------------------\nNew map:\n{map}",
            step.action
        );
        self.report("step", written);
    }

    fn on_finish(&mut self, episode: &Episode<A>) {
        let written = writeln!(
            self.output,
            "Found the goal after {} steps (return {}). Exiting",
            episode.steps.len(),
            episode.total_reward()
        );
        self.report("finish", written);
    }
}

/// Replays a fixed list of inputs, recording every prompt it was shown.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    choices: VecDeque<Choice>,
    prompts: Vec<(State, Option<String>)>,
}

impl ScriptedSource {
    /// Empty strings accept the greedy action.
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            choices: inputs
                .into_iter()
                .map(|s| Choice::from_input(s.as_ref()))
                .collect(),
            prompts: Vec::new(),
        }
    }

    /// State and greedy suggestion of every prompt, in order.
    pub fn prompts(&self) -> &[(State, Option<String>)] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.choices.len()
    }
}

impl<A: Display> ActionSource<A> for ScriptedSource {
    fn choose(&mut self, prompt: &Prompt<'_, A>) -> Option<Choice> {
        self.prompts
            .push((prompt.state, prompt.greedy.map(|g| g.to_string())));
        self.choices.pop_front()
    }
}

/// Accepts every greedy suggestion. Gives up when there is none.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedySource;

impl<A> ActionSource<A> for GreedySource {
    fn choose(&mut self, prompt: &Prompt<'_, A>) -> Option<Choice> {
        prompt.greedy.map(|_| Choice::Greedy)
    }
}
