use crate::WorldError;

/// One cell of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
    Start,
    Goal,
    Trap,
}

impl Tile {
    pub fn from_char(c: char, row: usize, col: usize) -> Result<Self, WorldError> {
        match c {
            '#' => Ok(Tile::Wall),
            '.' | ' ' => Ok(Tile::Floor),
            'S' => Ok(Tile::Start),
            'G' => Ok(Tile::Goal),
            'X' => Ok(Tile::Trap),
            c => Err(WorldError::UnknownTile { c, row, col }),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Tile::Wall => '#',
            Tile::Floor => '.',
            Tile::Start => 'S',
            Tile::Goal => 'G',
            Tile::Trap => 'X',
        }
    }

    /// Goals and traps end the episode.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Tile::Goal | Tile::Trap)
    }

    pub fn is_walkable(&self) -> bool {
        !matches!(self, Tile::Wall)
    }
}
