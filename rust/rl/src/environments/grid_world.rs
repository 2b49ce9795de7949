use crate::mdps::mdp::{ActError, Episodic, Mdp, Reward, State};
use gridworld::{GridWorld, Move, WorldError};

impl Mdp for GridWorld {
    type Action = Move;

    fn n_s(&self) -> usize {
        self.n_states()
    }

    fn states(&self) -> &[State] {
        GridWorld::states(self)
    }

    fn actions(&self) -> &[Move] {
        GridWorld::actions(self)
    }

    fn transition(&self, s: State, a: &Move) -> Option<(State, Reward)> {
        GridWorld::transition(self, s, *a)
    }
}

impl Episodic for GridWorld {
    fn reset_agent(&mut self) {
        GridWorld::reset_agent(self)
    }

    fn current_state(&self) -> State {
        self.agent_state()
    }

    fn is_terminal(&self) -> bool {
        GridWorld::is_terminal(self)
    }

    fn act(&mut self, a: &Move) -> Result<(State, Reward), ActError> {
        GridWorld::act(self, *a).map_err(|e| match e {
            WorldError::EpisodeOver => ActError::EpisodeOver,
            e => ActError::UnknownAction(e.to_string()),
        })
    }

    fn render(&self) -> String {
        GridWorld::render(self)
    }

    fn parse_action(&self, input: &str) -> Option<Move> {
        input.parse().ok()
    }
}
