use alloc::string::{String, ToString};
use serde::{Deserialize, Serialize};

pub const MINE_GLYPH: &str = "💣";

/// One square of the minesweeper board; its position is implied by its grid index.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    /// Meaningless while `is_mine` is set.
    pub adjacent_mines: u8,
    pub revealed: bool,
    pub flagged: bool,
}

impl Cell {
    pub const fn is_hidden(self) -> bool {
        !self.revealed
    }

    /// Text shown once the cell is revealed.
    pub fn display_value(self) -> String {
        if self.is_mine {
            MINE_GLYPH.to_string()
        } else if self.adjacent_mines == 0 {
            " ".to_string()
        } else {
            self.adjacent_mines.to_string()
        }
    }

    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
        self.flagged = false;
    }
}
