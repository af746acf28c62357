use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Whether a won board keeps accepting reveals and flags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostWinPolicy {
    #[default]
    Explore,
    Lock,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEngine {
    board: Board,
    state: EngineState,
    has_revealed_any_cell: bool,
    post_win: PostWinPolicy,
    triggered_mine: Option<Coord2>,
}

impl PlayEngine {
    /// Wraps a board, deriving the game state from what is already disclosed on it.
    pub fn new(board: Board) -> Self {
        let has_revealed_any_cell = board.revealed_count() > 0;
        let hit_mine = board
            .cells()
            .iter()
            .any(|cell| cell.is_mine && cell.revealed);

        let state = if hit_mine {
            EngineState::Lost
        } else if has_revealed_any_cell && board.hidden_count() == board.mine_count() {
            EngineState::Won
        } else {
            EngineState::Active
        };

        Self {
            board,
            state,
            has_revealed_any_cell,
            post_win: Default::default(),
            triggered_mine: None,
        }
    }

    pub fn with_post_win_policy(mut self, post_win: PostWinPolicy) -> Self {
        self.post_win = post_win;
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn size(&self) -> Coord {
        self.board.size()
    }

    pub fn post_win_policy(&self) -> PostWinPolicy {
        self.post_win
    }

    pub fn total_mines(&self) -> CellCount {
        self.board.mine_count()
    }

    pub fn flagged_count(&self) -> CellCount {
        self.board.flagged_count()
    }

    pub fn mines_left(&self) -> isize {
        (self.board.mine_count() as isize) - (self.board.flagged_count() as isize)
    }

    pub fn hidden_count(&self) -> CellCount {
        self.board.hidden_count()
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<Cell> {
        self.board.get(coords).copied()
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn has_revealed_any_cell(&self) -> bool {
        self.has_revealed_any_cell
    }

    /// Runs `generator` over a board that has no mines yet.
    pub fn place_mines(&mut self, generator: impl BoardGenerator) {
        generator.populate(&mut self.board);
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use MarkOutcome::*;

        let Ok(coords) = self.board.validate_coords(coords) else {
            log::trace!("Ignoring flag outside the board at {:?}", coords);
            return Ok(NoChange);
        };
        self.check_accepts_moves()?;

        let outcome = if self.board.toggle_flag(coords) {
            log::debug!("Flag at {:?}: {}", coords, self.board[coords].flagged);
            Changed
        } else {
            NoChange
        };
        self.evaluate();
        Ok(outcome)
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let Ok(coords) = self.board.validate_coords(coords) else {
            log::trace!("Ignoring reveal outside the board at {:?}", coords);
            return Ok(NoChange);
        };
        self.check_accepts_moves()?;
        self.check_populated()?;

        let cell = self.board[coords];
        if cell.revealed {
            return Ok(NoChange);
        }

        if cell.is_mine {
            if !self.has_revealed_any_cell {
                log::debug!("First reveal at {:?} hit a mine, converting it", coords);
                self.board.clear_mine(coords);
                self.board.reveal_cell(coords);
                self.has_revealed_any_cell = true;
                return Ok(if self.evaluate() { Won } else { Revealed });
            }

            log::debug!("Hit mine at {:?}, disclosing the board", coords);
            self.triggered_mine = Some(coords);
            self.board.reveal_all();
            self.state = EngineState::Lost;
            return Ok(HitMine);
        }

        self.has_revealed_any_cell = true;
        self.flood_reveal(coords);

        Ok(if self.evaluate() { Won } else { Revealed })
    }

    /// Reveals `origin` and, while zero cells keep turning up, every hidden safe cell around them.
    /// Visits happen in neighbor order, depth first.
    fn flood_reveal(&mut self, origin: Coord2) {
        self.board.reveal_cell(origin);
        if self.board[origin].adjacent_mines != 0 {
            return;
        }

        let mut to_visit: Vec<Coord2> = self.hidden_safe_neighbors(origin).collect();
        to_visit.reverse();
        log::trace!(
            "Starting flood-fill from {:?}, initial neighbors: {:?}",
            origin,
            to_visit
        );

        while let Some(visit_coords) = to_visit.pop() {
            if !self.board.reveal_cell(visit_coords) {
                continue;
            }

            let adjacent_mines = self.board[visit_coords].adjacent_mines;
            log::trace!(
                "Flood revealed {:?}, adjacent mines: {}",
                visit_coords,
                adjacent_mines
            );

            if adjacent_mines == 0 {
                let start = to_visit.len();
                to_visit.extend(self.hidden_safe_neighbors(visit_coords));
                to_visit[start..].reverse();
            }
        }
    }

    fn hidden_safe_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + '_ {
        self.board.iter_neighbors(coords).filter(|&pos| {
            let cell = self.board[pos];
            cell.is_hidden() && !cell.is_mine
        })
    }

    /// Returns `true` only on the transition into [`EngineState::Won`].
    fn evaluate(&mut self) -> bool {
        if self.state != EngineState::Active || !self.has_revealed_any_cell {
            return false;
        }

        if self.board.hidden_count() == self.board.mine_count() {
            log::debug!("All safe cells revealed, game won");
            self.state = EngineState::Won;
            true
        } else {
            false
        }
    }

    fn check_accepts_moves(&self) -> Result<()> {
        match (self.state, self.post_win) {
            (EngineState::Lost, _) | (EngineState::Won, PostWinPolicy::Lock) => {
                Err(GameError::AlreadyEnded)
            }
            _ => Ok(()),
        }
    }

    fn check_populated(&self) -> Result<()> {
        if self.board.is_populated() {
            Ok(())
        } else {
            Err(GameError::MinesNotPlaced)
        }
    }
}
