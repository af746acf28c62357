use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Square minesweeper grid together with the bookkeeping the reveal engine relies on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    config: BoardConfig,
    mine_count: CellCount,
    revealed_count: CellCount,
    flagged_count: CellCount,
    populated: bool,
}

impl Board {
    /// Hidden grid without mines; a [`BoardGenerator`] places them afterwards.
    pub fn empty(config: BoardConfig) -> Self {
        let side = config.size;
        Self {
            cells: Array2::default((side, side).to_nd_index()),
            config,
            mine_count: 0,
            revealed_count: 0,
            flagged_count: 0,
            populated: false,
        }
    }

    pub fn from_mine_coords(size: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        let mut cells: Array2<Cell> = Array2::default((size, size).to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size || coords.1 >= size {
                return Err(GameError::InvalidCoords);
            }
            cells[coords.to_nd_index()].is_mine = true;
        }

        Self::from_cells(cells)
    }

    /// Adopts an existing grid, e.g. from a snapshot. Adjacent counts are recomputed from the
    /// mine flags and flags on revealed cells are dropped.
    pub fn from_cells(mut cells: Array2<Cell>) -> Result<Self> {
        let side = square_side(&cells).ok_or(GameError::InvalidBoardShape)?;
        if side == 0 {
            return Err(GameError::InvalidBoardShape);
        }

        for cell in cells.iter_mut().filter(|cell| cell.revealed) {
            cell.flagged = false;
        }

        let count = |pred: fn(&Cell) -> bool| -> CellCount {
            cells
                .iter()
                .filter(|cell| pred(cell))
                .count()
                .try_into()
                .unwrap_or(CellCount::MAX)
        };
        let mine_count = count(|cell| cell.is_mine);
        let revealed_count = count(|cell| cell.revealed);
        let flagged_count = count(|cell| cell.flagged);

        let mut board = Self {
            cells,
            config: BoardConfig::new_unchecked(side, mine_count),
            mine_count,
            revealed_count,
            flagged_count,
            populated: true,
        };
        board.refresh_adjacent_counts();
        Ok(board)
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn size(&self) -> Coord {
        self.config.size
    }

    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Mines currently on the board; lower than the configured count after a first-click exemption.
    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.config.total_cells()
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn hidden_count(&self) -> CellCount {
        self.total_cells() - self.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        let side = self.size();
        coords.0 < side && coords.1 < side
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<&Cell> {
        self.contains(coords)
            .then(|| &self.cells[coords.to_nd_index()])
    }

    pub fn count_adjacent_mines(&self, coords: Coord2) -> u8 {
        self.cells
            .iter_neighbor_cells(coords)
            .filter(|cell| cell.is_mine)
            .count()
            .try_into()
            .unwrap_or(u8::MAX)
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    /// Returns `false` when the cell already holds a mine.
    pub(crate) fn place_mine(&mut self, coords: Coord2) -> bool {
        let cell = &mut self.cells[coords.to_nd_index()];
        if cell.is_mine {
            return false;
        }
        cell.is_mine = true;
        self.mine_count += 1;
        true
    }

    pub(crate) fn finish_population(&mut self) {
        self.refresh_adjacent_counts();
        self.populated = true;
    }

    /// Turns a mine into a safe cell and refreshes the counts around it.
    pub(crate) fn clear_mine(&mut self, coords: Coord2) {
        let cell = &mut self.cells[coords.to_nd_index()];
        if !cell.is_mine {
            return;
        }
        cell.is_mine = false;
        self.mine_count -= 1;

        self.cells[coords.to_nd_index()].adjacent_mines = self.count_adjacent_mines(coords);
        for pos in self.iter_neighbors(coords) {
            if !self[pos].is_mine {
                self.cells[pos.to_nd_index()].adjacent_mines = self.count_adjacent_mines(pos);
            }
        }
    }

    /// Returns `false` when the cell was already revealed.
    pub(crate) fn reveal_cell(&mut self, coords: Coord2) -> bool {
        let cell = &mut self.cells[coords.to_nd_index()];
        if cell.revealed {
            return false;
        }
        if cell.flagged {
            self.flagged_count -= 1;
        }
        cell.reveal();
        self.revealed_count += 1;
        true
    }

    pub(crate) fn reveal_all(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.reveal();
        }
        self.revealed_count = self.total_cells();
        self.flagged_count = 0;
    }

    /// Returns `false` for revealed cells, which cannot carry a flag.
    pub(crate) fn toggle_flag(&mut self, coords: Coord2) -> bool {
        let cell = &mut self.cells[coords.to_nd_index()];
        if cell.revealed {
            return false;
        }
        cell.flagged = !cell.flagged;
        if cell.flagged {
            self.flagged_count += 1;
        } else {
            self.flagged_count -= 1;
        }
        true
    }

    fn refresh_adjacent_counts(&mut self) {
        let side = self.size();
        for row in 0..side {
            for col in 0..side {
                let coords = (row, col);
                let count = if self[coords].is_mine {
                    0
                } else {
                    self.count_adjacent_mines(coords)
                };
                self.cells[coords.to_nd_index()].adjacent_mines = count;
            }
        }
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_is_hidden_and_unpopulated() {
        let board = Board::empty(BoardConfig::new_unchecked(4, 3));

        assert!(!board.is_populated());
        assert_eq!(board.mine_count(), 0);
        assert_eq!(board.hidden_count(), 16);
        assert!(board.cells().iter().all(|cell| *cell == Cell::default()));
    }

    #[test]
    fn adjacent_counts_match_moore_neighborhood() {
        let board = Board::from_mine_coords(3, &[(0, 0), (2, 2)]).unwrap();

        assert_eq!(board[(1, 1)].adjacent_mines, 2);
        assert_eq!(board[(0, 1)].adjacent_mines, 1);
        assert_eq!(board[(0, 2)].adjacent_mines, 0);
        assert_eq!(board[(2, 1)].adjacent_mines, 1);
        assert_eq!(board.mine_count(), 2);
    }

    #[test]
    fn from_mine_coords_rejects_out_of_bounds() {
        assert_eq!(
            Board::from_mine_coords(2, &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn from_cells_rejects_non_square_grid() {
        let cells: Array2<Cell> = Array2::default([2, 3]);

        assert_eq!(Board::from_cells(cells), Err(GameError::InvalidBoardShape));
    }

    #[test]
    fn get_absorbs_out_of_bounds() {
        let board = Board::from_mine_coords(2, &[]).unwrap();

        assert!(board.get((0, 1)).is_some());
        assert!(board.get((2, 0)).is_none());
        assert!(board.get((0, 200)).is_none());
    }

    #[test]
    fn clear_mine_updates_neighbor_counts() {
        let mut board = Board::from_mine_coords(3, &[(1, 1), (0, 0)]).unwrap();

        board.clear_mine((1, 1));

        assert!(!board[(1, 1)].is_mine);
        assert_eq!(board[(1, 1)].adjacent_mines, 1);
        assert_eq!(board[(2, 2)].adjacent_mines, 0);
        assert_eq!(board[(0, 1)].adjacent_mines, 1);
        assert_eq!(board.mine_count(), 1);
    }

    #[test]
    fn flag_counts_follow_reveal() {
        let mut board = Board::from_mine_coords(2, &[(0, 0)]).unwrap();

        assert!(board.toggle_flag((1, 1)));
        assert_eq!(board.flagged_count(), 1);
        assert!(board.reveal_cell((1, 1)));
        assert_eq!(board.flagged_count(), 0);
        assert!(!board.toggle_flag((1, 1)));
        assert!(!board[(1, 1)].flagged);
    }
}
