extern crate thiserror;

mod moves;
mod tile;

pub use moves::Move;
pub use tile::Tile;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Map the agent is placed in when no map file is given.
pub const PRISON_MAP: &str = include_str!("../maps/prison.txt");

pub type Position = (usize, usize);

#[derive(Error, Debug)]
pub enum WorldError {
    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("map has no walkable cells")]
    EmptyMap,
    #[error("unknown tile '{c}' at row {row}, column {col}")]
    UnknownTile { c: char, row: usize, col: usize },
    #[error("map has no start cell 'S'")]
    MissingStart,
    #[error("map has more than one start cell 'S'")]
    MultipleStarts,
    #[error("'{0}' is not a valid move")]
    UnknownMove(String),
    #[error("the episode is over, reset the agent first")]
    EpisodeOver,
}

/// Rewards handed out on every transition.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rewards {
    step: f64,
    goal: f64,
    trap: f64,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            step: -1.,
            goal: 10.,
            trap: -10.,
        }
    }
}

/// Deterministic grid world parsed from a text map.
///
/// Every non-wall cell is a state, numbered in row-major order. Moving into a
/// wall or off the grid keeps the agent in place. Goal and trap cells are
/// terminal and loop onto themselves with zero reward.
#[derive(Debug, Clone)]
pub struct GridWorld {
    tiles: Vec<Vec<Tile>>,
    cells: Vec<Position>,
    index: HashMap<Position, usize>,
    states: Vec<usize>,
    start: usize,
    agent: usize,
    rewards: Rewards,
}

impl GridWorld {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WorldError> {
        fs::read_to_string(path)?.parse()
    }

    pub fn n_states(&self) -> usize {
        self.cells.len()
    }

    pub fn states(&self) -> &[usize] {
        &self.states
    }

    pub fn actions(&self) -> &[Move] {
        &Move::ALL
    }

    pub fn position(&self, state: usize) -> Option<Position> {
        self.cells.get(state).copied()
    }

    pub fn state_at(&self, pos: Position) -> Option<usize> {
        self.index.get(&pos).copied()
    }

    pub fn tile(&self, state: usize) -> Option<Tile> {
        let (r, c) = self.position(state)?;
        Some(self.tiles[r][c])
    }

    pub fn is_terminal_state(&self, state: usize) -> bool {
        self.tile(state).map_or(false, |t| t.is_terminal())
    }

    /// Outcome of taking `mv` in `state`. `None` if `state` is not a cell of this map.
    pub fn transition(&self, state: usize, mv: Move) -> Option<(usize, f64)> {
        let (r, c) = self.position(state)?;
        if self.tiles[r][c].is_terminal() {
            return Some((state, 0.));
        }

        let next = self
            .neighbour((r, c), mv)
            .and_then(|pos| self.state_at(pos))
            .unwrap_or(state);
        let reward = match self.tile(next) {
            Some(Tile::Goal) if next != state => self.rewards.goal,
            Some(Tile::Trap) if next != state => self.rewards.trap,
            _ => self.rewards.step,
        };

        Some((next, reward))
    }

    pub fn reset_agent(&mut self) {
        self.agent = self.start;
    }

    pub fn agent_state(&self) -> usize {
        self.agent
    }

    pub fn is_terminal(&self) -> bool {
        self.is_terminal_state(self.agent)
    }

    pub fn act(&mut self, mv: Move) -> Result<(usize, f64), WorldError> {
        if self.is_terminal() {
            return Err(WorldError::EpisodeOver);
        }

        let (next, reward) = self
            .transition(self.agent, mv)
            .unwrap_or((self.agent, self.rewards.step));
        self.agent = next;

        Ok((next, reward))
    }

    /// Text rendering of the map with the agent drawn as `A`.
    pub fn render(&self) -> String {
        let agent = self.position(self.agent);
        self.tiles
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, t)| {
                        if agent == Some((r, c)) {
                            'A'
                        } else {
                            t.as_char()
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn neighbour(&self, (r, c): Position, mv: Move) -> Option<Position> {
        let (dr, dc) = mv.offset();
        let r = r.checked_add_signed(dr)?;
        let c = c.checked_add_signed(dc)?;
        self.tiles
            .get(r)
            .and_then(|row| row.get(c))
            .filter(|t| t.is_walkable())
            .map(|_| (r, c))
    }
}

impl FromStr for GridWorld {
    type Err = WorldError;

    fn from_str(map: &str) -> Result<Self, Self::Err> {
        let tiles = map
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty())
            .enumerate()
            .map(|(r, l)| {
                l.chars()
                    .enumerate()
                    .map(|(c, ch)| Tile::from_char(ch, r, c))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cells = tiles
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, t)| t.is_walkable())
                    .map(move |(c, _)| (r, c))
            })
            .collect::<Vec<_>>();
        if cells.is_empty() {
            return Err(WorldError::EmptyMap);
        }

        let mut starts = cells
            .iter()
            .enumerate()
            .filter(|&(_, &(r, c))| tiles[r][c] == Tile::Start)
            .map(|(s, _)| s);
        let start = starts.next().ok_or(WorldError::MissingStart)?;
        if starts.next().is_some() {
            return Err(WorldError::MultipleStarts);
        }

        let index = cells.iter().enumerate().map(|(s, &p)| (p, s)).collect();
        let states = (0..cells.len()).collect();

        Ok(Self {
            tiles,
            cells,
            index,
            states,
            start,
            agent: start,
            rewards: Rewards::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;
    use rstest::*;

    #[fixture]
    fn corridor() -> GridWorld {
        "#####\n#S.G#\n#####".parse().unwrap()
    }

    #[rstest]
    fn numbers_walkable_cells_row_major(corridor: GridWorld) {
        assert_eq!(corridor.n_states(), 3);
        assert_eq!(corridor.states(), &[0, 1, 2]);
        assert_eq!(corridor.position(2), Some((1, 3)));
        assert_eq!(corridor.state_at((1, 2)), Some(1));
        assert_eq!(corridor.state_at((0, 0)), None);
    }

    #[rstest]
    #[case(0, Move::Right, 1, -1.)]
    #[case(0, Move::Left, 0, -1.)]
    #[case(0, Move::Up, 0, -1.)]
    #[case(1, Move::Right, 2, 10.)]
    #[case(2, Move::Left, 2, 0.)]
    fn transitions(
        corridor: GridWorld,
        #[case] s: usize,
        #[case] mv: Move,
        #[case] next: usize,
        #[case] reward: f64,
    ) {
        let (s_prime, r) = corridor.transition(s, mv).unwrap();
        assert_eq!(s_prime, next);
        assert_float_eq!(r, reward, abs <= 1e-12);
    }

    #[rstest]
    fn transition_outside_map_is_undefined(corridor: GridWorld) {
        assert!(corridor.transition(3, Move::Up).is_none());
    }

    #[rstest]
    fn trap_entry_uses_trap_reward() {
        let w: GridWorld = "SX".parse().unwrap();
        assert_eq!(w.transition(0, Move::Right), Some((1, -10.)));
        assert!(w.is_terminal_state(1));
    }

    #[rstest]
    fn act_moves_agent_until_goal(mut corridor: GridWorld) {
        assert_eq!(corridor.act(Move::Right).unwrap(), (1, -1.));
        assert!(!corridor.is_terminal());
        assert_eq!(corridor.act(Move::Right).unwrap(), (2, 10.));
        assert!(corridor.is_terminal());
        assert!(matches!(
            corridor.act(Move::Left),
            Err(WorldError::EpisodeOver)
        ));

        corridor.reset_agent();
        assert_eq!(corridor.agent_state(), 0);
    }

    #[rstest]
    fn render_draws_agent(mut corridor: GridWorld) {
        insta::assert_snapshot!(corridor.render(), @r###"
        #####
        #A.G#
        #####
        "###);

        corridor.act(Move::Right).unwrap();
        insta::assert_snapshot!(corridor.render(), @r###"
        #####
        #SAG#
        #####
        "###);
    }

    #[rstest]
    #[case("", "map has no walkable cells")]
    #[case("###\n#.#\n###", "map has no start cell 'S'")]
    #[case("S.S", "map has more than one start cell 'S'")]
    #[case("S.\n.?", "unknown tile '?' at row 1, column 1")]
    fn rejects_bad_maps(#[case] map: &str, #[case] message: &str) {
        let err = map.parse::<GridWorld>().unwrap_err();
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn prison_map_parses() {
        let w: GridWorld = PRISON_MAP.parse().unwrap();
        assert_eq!(w.tile(w.agent_state()), Some(Tile::Start));
        assert_eq!(w.render().lines().count(), 9);
    }
}
