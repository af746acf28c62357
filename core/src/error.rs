use alloc::string::String;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Mines have not been placed on this board yet")]
    MinesNotPlaced,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure to turn an exported snapshot string back into a grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Malformed(String),
    #[error("Snapshot grid rejected: {0}")]
    Shape(#[from] GameError),
}
