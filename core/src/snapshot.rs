use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::marker::PhantomData;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Something that can be exported to, and re-imported from, a snapshot string.
pub trait Snapshot: Sized {
    fn export(&self) -> core::result::Result<String, SnapshotError>;
    fn import(data: &str) -> core::result::Result<Self, SnapshotError>;
}

/// Where a tool keeps its last snapshot between page loads.
pub trait SnapshotStore {
    type Item;

    fn load(&self) -> Option<Self::Item>;
    fn save(&mut self, item: &Self::Item);
    fn clear(&mut self);
}

/// Keeps the exported string in memory, going through the same import path as persistent stores.
#[derive(Clone, Debug)]
pub struct MemorySnapshotStore<T> {
    data: Option<String>,
    _item: PhantomData<T>,
}

impl<T> MemorySnapshotStore<T> {
    pub fn new() -> Self {
        Self {
            data: None,
            _item: PhantomData,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl<T> Default for MemorySnapshotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Snapshot> SnapshotStore for MemorySnapshotStore<T> {
    type Item = T;

    fn load(&self) -> Option<T> {
        let data = self.data.as_deref()?;
        T::import(data)
            .inspect_err(|err| log::warn!("Discarding stored snapshot: {}", err))
            .ok()
    }

    fn save(&mut self, item: &T) {
        match item.export() {
            Ok(data) => self.data = Some(data),
            Err(err) => log::warn!("Could not export snapshot: {}", err),
        }
    }

    fn clear(&mut self) {
        self.data = None;
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> core::result::Result<String, SnapshotError> {
    serde_json::to_string(value).map_err(|err| SnapshotError::Malformed(err.to_string()))
}

pub(crate) fn from_json<'a, T: Deserialize<'a>>(
    data: &'a str,
) -> core::result::Result<T, SnapshotError> {
    serde_json::from_str(data).map_err(|err| SnapshotError::Malformed(err.to_string()))
}

/// Flattens nested rows into a square grid.
pub(crate) fn rows_to_grid<T>(rows: Vec<Vec<T>>) -> Result<Array2<T>> {
    let side = rows.len();
    if side == 0 || side > usize::from(Coord::MAX) || rows.iter().any(|row| row.len() != side) {
        return Err(GameError::InvalidBoardShape);
    }

    let flat: Vec<T> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((side, side), flat).map_err(|_| GameError::InvalidBoardShape)
}

pub(crate) fn grid_to_rows<T: Clone>(grid: &Array2<T>) -> Vec<Vec<T>> {
    grid.rows().into_iter().map(|row| row.to_vec()).collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCell {
    pub mine: bool,
    pub revealed: bool,
    #[serde(default)]
    pub flagged: bool,
    /// Display value; informational only, counts are recomputed on import.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clue: Option<Clue>,
}

impl From<Cell> for SnapshotCell {
    fn from(cell: Cell) -> Self {
        Self {
            mine: cell.is_mine,
            revealed: cell.revealed,
            flagged: cell.flagged,
            value: Some(cell.display_value()),
            clue: None,
        }
    }
}

impl From<SnapshotCell> for Cell {
    fn from(cell: SnapshotCell) -> Self {
        Self {
            is_mine: cell.mine,
            adjacent_mines: 0,
            revealed: cell.revealed,
            flagged: cell.flagged && !cell.revealed,
        }
    }
}

/// Minesweeper snapshot: `{"board": [[cell, ...], ...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Vec<Vec<SnapshotCell>>,
}

impl BoardSnapshot {
    pub fn capture(board: &Board) -> Self {
        let rows = grid_to_rows(board.cells());
        Self {
            board: rows
                .into_iter()
                .map(|row| row.into_iter().map(SnapshotCell::from).collect())
                .collect(),
        }
    }

    pub fn into_board(self) -> core::result::Result<Board, SnapshotError> {
        let rows: Vec<Vec<Cell>> = self
            .board
            .into_iter()
            .map(|row| row.into_iter().map(Cell::from).collect())
            .collect();
        let cells = rows_to_grid(rows)?;
        Ok(Board::from_cells(cells)?)
    }
}

impl Snapshot for Board {
    fn export(&self) -> core::result::Result<String, SnapshotError> {
        to_json(&BoardSnapshot::capture(self))
    }

    fn import(data: &str) -> core::result::Result<Self, SnapshotError> {
        from_json::<BoardSnapshot>(data)?.into_board()
    }
}
