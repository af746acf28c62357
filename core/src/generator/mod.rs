use crate::*;
pub use random::*;

mod random;

/// Places mines on an empty [`Board`] and finalizes its adjacent-mine counts.
pub trait BoardGenerator {
    fn populate(self, board: &mut Board);

    fn generate(self, config: BoardConfig) -> Board
    where
        Self: Sized,
    {
        let mut board = Board::empty(config);
        self.populate(&mut board);
        board
    }
}
