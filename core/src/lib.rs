#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use crossword::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use snapshot::*;
pub use types::*;

mod board;
mod cell;
mod crossword;
mod engine;
mod error;
mod generator;
mod snapshot;
mod types;

/// Board dimension and requested mine count for a minesweeper game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub size: Coord,
    pub mines: CellCount,
}

impl BoardConfig {
    pub const DEFAULT_SIZE: Coord = 15;
    pub const DEFAULT_MINES: CellCount = 30;

    pub const fn new_unchecked(size: Coord, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// At least one safe cell has to remain, otherwise placement can never finish.
    pub fn new(size: Coord, mines: CellCount) -> Result<Self> {
        if size == 0 {
            return Err(GameError::InvalidBoardShape);
        }
        if mines >= mult(size, size) {
            return Err(GameError::TooManyMines);
        }
        Ok(Self::new_unchecked(size, mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size, self.size)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new_unchecked(Self::DEFAULT_SIZE, Self::DEFAULT_MINES)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_fifteen_by_fifteen_with_thirty_mines() {
        let config = BoardConfig::default();

        assert_eq!(config.size, 15);
        assert_eq!(config.mines, 30);
        assert_eq!(config.total_cells(), 225);
    }

    #[test]
    fn config_rejects_mine_count_filling_the_board() {
        assert_eq!(BoardConfig::new(3, 9), Err(GameError::TooManyMines));
        assert_eq!(BoardConfig::new(3, 10), Err(GameError::TooManyMines));
        assert_eq!(BoardConfig::new(1, 1), Err(GameError::TooManyMines));
        assert_eq!(BoardConfig::new(3, 8), Ok(BoardConfig::new_unchecked(3, 8)));
        assert_eq!(BoardConfig::new(1, 0), Ok(BoardConfig::new_unchecked(1, 0)));
    }

    #[test]
    fn config_rejects_zero_size() {
        assert_eq!(BoardConfig::new(0, 0), Err(GameError::InvalidBoardShape));
    }
}
