use super::*;

/// Rejection sampling: draw a uniformly random row and column and keep it only when the cell is
/// not a mine yet, until the requested count is reached. The layout does not depend on where the
/// player clicks first.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectionSampler {
    seed: u64,
}

impl RejectionSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RejectionSampler {
    fn populate(self, board: &mut Board) {
        use rand::{Rng, SeedableRng, rngs::SmallRng};

        if board.is_populated() {
            log::warn!("Board already has its mines, leaving layout untouched");
            return;
        }

        let config = board.config();
        let side = config.size;
        let total_cells = config.total_cells();
        if total_cells == 0 {
            board.finish_population();
            return;
        }

        let mut mines_left = config.mines;
        if mines_left >= total_cells {
            log::warn!(
                "Requested {} mines but the board only fits {} with a safe cell left, clamping",
                config.mines,
                total_cells - 1
            );
            mines_left = total_cells - 1;
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut draws: u32 = 0;
        while mines_left > 0 {
            let coords = (rng.random_range(0..side), rng.random_range(0..side));
            draws += 1;
            if board.place_mine(coords) {
                mines_left -= 1;
            }
        }
        board.finish_population();

        log::debug!(
            "Placed {} mines on a {}x{} board in {} draws",
            board.mine_count(),
            side,
            side,
            draws
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mine_total(board: &Board) -> usize {
        board.cells().iter().filter(|cell| cell.is_mine).count()
    }

    #[test]
    fn places_exactly_the_requested_mines() {
        for (size, mines) in [(1, 0), (2, 3), (3, 8), (5, 12), (15, 30), (9, 80)] {
            for seed in 0..8 {
                let config = BoardConfig::new(size, mines).unwrap();
                let board = RejectionSampler::new(seed).generate(config);

                assert_eq!(mine_total(&board), usize::from(mines));
                assert_eq!(board.mine_count(), mines);
                assert!(board.is_populated());
            }
        }
    }

    #[test]
    fn adjacent_counts_are_consistent_with_layout() {
        let board = RejectionSampler::new(42).generate(BoardConfig::default());

        for row in 0..board.size() {
            for col in 0..board.size() {
                let coords = (row, col);
                if board[coords].is_mine {
                    continue;
                }
                let expected = board
                    .iter_neighbors(coords)
                    .filter(|&pos| board[pos].is_mine)
                    .count();
                assert_eq!(usize::from(board[coords].adjacent_mines), expected);
            }
        }
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let config = BoardConfig::new(10, 20).unwrap();

        let a = RejectionSampler::new(7).generate(config);
        let b = RejectionSampler::new(7).generate(config);

        assert_eq!(a, b);
    }

    #[test]
    fn unchecked_full_board_is_clamped_instead_of_hanging() {
        let board = RejectionSampler::new(1).generate(BoardConfig::new_unchecked(2, 9));

        assert_eq!(board.mine_count(), 3);
    }

    #[test]
    fn populated_board_is_left_alone() {
        let mut board = Board::from_mine_coords(3, &[(1, 1)]).unwrap();
        let before = board.clone();

        RejectionSampler::new(3).populate(&mut board);

        assert_eq!(board, before);
    }
}
