use alloc::string::String;
use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Row,
    Column,
}

impl Direction {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Row => Self::Column,
            Self::Column => Self::Row,
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::Row
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SquareKind {
    Black,
    White,
}

impl Default for SquareKind {
    fn default() -> Self {
        Self::White
    }
}

/// Clue text for the across (`row`) and down (`column`) words passing through a square.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    #[serde(default)]
    pub row: String,
    #[serde(default)]
    pub column: String,
}

impl Clue {
    pub fn get(&self, direction: Direction) -> &str {
        match direction {
            Direction::Row => &self.row,
            Direction::Column => &self.column,
        }
    }

    fn set(&mut self, direction: Direction, text: &str) {
        let slot = match direction {
            Direction::Row => &mut self.row,
            Direction::Column => &mut self.column,
        };
        slot.clear();
        slot.push_str(text);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Square {
    pub kind: SquareKind,
    #[serde(default)]
    pub value: Option<char>,
    #[serde(default)]
    pub cell_number: Option<u16>,
    #[serde(default)]
    pub clue: Clue,
}

impl Square {
    pub const fn is_black(&self) -> bool {
        matches!(self.kind, SquareKind::Black)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedWord {
    pub direction: Direction,
    pub cell_number: u16,
    pub cells: Vec<Coord2>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClueEntry {
    pub cell_number: u16,
    pub clue: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub coords: Coord2,
    pub direction: Direction,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Highlight {
    None,
    Cursor,
    Word,
}

/// Crossword builder/player grid with a typing cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct CrosswordGrid {
    squares: Array2<Square>,
    connected_words: Vec<ConnectedWord>,
    cursor: Option<Cursor>,
}

impl CrosswordGrid {
    pub const DEFAULT_SIZE: Coord = 15;

    pub fn new(size: Coord) -> Self {
        Self {
            squares: Array2::default((size, size).to_nd_index()),
            connected_words: Vec::new(),
            cursor: None,
        }
    }

    pub fn size(&self) -> Coord {
        square_side(&self.squares).unwrap_or(0)
    }

    pub fn square(&self, coords: Coord2) -> Option<&Square> {
        self.contains(coords)
            .then(|| &self.squares[coords.to_nd_index()])
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    pub fn connected_words(&self) -> &[ConnectedWord] {
        &self.connected_words
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.size());
    }

    /// Flips a square between black and white; with `mirror` the point-symmetric square follows.
    pub fn toggle_black(&mut self, coords: Coord2, mirror: bool) -> bool {
        if !self.contains(coords) {
            return false;
        }

        let kind = match self.squares[coords.to_nd_index()].kind {
            SquareKind::White => SquareKind::Black,
            SquareKind::Black => SquareKind::White,
        };
        self.squares[coords.to_nd_index()].kind = kind;
        if mirror {
            let last = self.size() - 1;
            let mirrored = (last - coords.0, last - coords.1);
            self.squares[mirrored.to_nd_index()].kind = kind;
        }

        if let Some(cursor) = self.cursor {
            if self.squares[cursor.coords.to_nd_index()].is_black() {
                self.cursor = None;
            }
        }
        log::debug!("Square {:?} is now {:?}", coords, kind);
        true
    }

    /// Selects a white square for typing across; selecting the current square again flips the
    /// typing direction.
    pub fn select(&mut self, coords: Coord2) -> Option<Cursor> {
        if !self.is_white(coords) {
            return None;
        }

        let cursor = match self.cursor {
            Some(cursor) if cursor.coords == coords => Cursor {
                coords,
                direction: cursor.direction.flipped(),
            },
            _ => Cursor {
                coords,
                direction: Direction::Row,
            },
        };
        self.cursor = Some(cursor);
        Some(cursor)
    }

    /// Writes a letter under the cursor and moves to the next white square.
    pub fn enter_letter(&mut self, letter: char) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        if !letter.is_ascii_alphabetic() {
            log::trace!("Ignoring non-letter input {:?}", letter);
            return false;
        }

        self.squares[cursor.coords.to_nd_index()].value = Some(letter.to_ascii_uppercase());
        if let Some(next) = self.step(cursor, true) {
            self.cursor = Some(Cursor {
                coords: next,
                ..cursor
            });
        }
        true
    }

    /// Clears the letter under the cursor and moves back to the previous white square.
    pub fn backspace(&mut self) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };

        self.squares[cursor.coords.to_nd_index()].value = None;
        if let Some(prev) = self.step(cursor, false) {
            self.cursor = Some(Cursor {
                coords: prev,
                ..cursor
            });
        }
        true
    }

    pub fn set_cell_number(&mut self, cell_number: Option<u16>) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        self.squares[cursor.coords.to_nd_index()].cell_number = cell_number;
        true
    }

    /// Assigns `text` to the word starting at the cursor, up to the next black square or edge.
    pub fn set_clue(&mut self, text: &str) -> bool {
        let Some(Cursor { coords, direction }) = self.cursor else {
            return false;
        };

        for pos in self.word_from(coords, direction) {
            self.squares[pos.to_nd_index()].clue.set(direction, text);
        }
        true
    }

    /// Distinct clues on numbered squares, in reading order.
    pub fn clues(&self, direction: Direction) -> Vec<ClueEntry> {
        let mut entries: Vec<ClueEntry> = Vec::new();
        for square in self.squares.iter() {
            let clue = square.clue.get(direction);
            let Some(cell_number) = square.cell_number else {
                continue;
            };
            if clue.is_empty() || entries.iter().any(|entry| entry.clue == clue) {
                continue;
            }
            entries.push(ClueEntry {
                cell_number,
                clue: clue.into(),
            });
        }
        entries
    }

    /// Records every square carrying the clue numbered `cell_number` as one connected word.
    pub fn connect_word(&mut self, cell_number: u16, direction: Direction) -> bool {
        let Some(entry) = self
            .clues(direction)
            .into_iter()
            .find(|entry| entry.cell_number == cell_number)
        else {
            return false;
        };

        let cells: Vec<Coord2> = self
            .squares
            .indexed_iter()
            .filter(|(_, square)| square.clue.get(direction) == entry.clue)
            .filter_map(|((row, col), _)| Some((row.try_into().ok()?, col.try_into().ok()?)))
            .collect();

        self.disconnect_word(cell_number, direction);
        self.connected_words.push(ConnectedWord {
            direction,
            cell_number,
            cells,
        });
        true
    }

    pub fn disconnect_word(&mut self, cell_number: u16, direction: Direction) {
        self.connected_words
            .retain(|word| !(word.cell_number == cell_number && word.direction == direction));
    }

    pub fn highlight(&self, coords: Coord2) -> Highlight {
        let Some(cursor) = self.cursor else {
            return Highlight::None;
        };
        if cursor.coords == coords {
            return Highlight::Cursor;
        }
        if !self.is_white(coords) {
            return Highlight::None;
        }

        let cursor_number = self.squares[cursor.coords.to_nd_index()].cell_number;
        let in_connected_word = self.connected_words.iter().any(|word| {
            Some(word.cell_number) == cursor_number
                && word.direction == cursor.direction
                && word.cells.contains(&coords)
        });
        if in_connected_word {
            return Highlight::Word;
        }

        let (anchor, target, fixed_matches) = match cursor.direction {
            Direction::Row => (cursor.coords.1, coords.1, cursor.coords.0 == coords.0),
            Direction::Column => (cursor.coords.0, coords.0, cursor.coords.1 == coords.1),
        };
        if !fixed_matches {
            return Highlight::None;
        }

        let blocked = (anchor.min(target)..=anchor.max(target)).any(|i| {
            let pos = match cursor.direction {
                Direction::Row => (coords.0, i),
                Direction::Column => (i, coords.1),
            };
            self.squares[pos.to_nd_index()].is_black()
        });
        if blocked {
            Highlight::None
        } else {
            Highlight::Word
        }
    }

    fn contains(&self, coords: Coord2) -> bool {
        let side = self.size();
        coords.0 < side && coords.1 < side
    }

    fn is_white(&self, coords: Coord2) -> bool {
        self.square(coords).is_some_and(|square| !square.is_black())
    }

    fn word_from(&self, start: Coord2, direction: Direction) -> Vec<Coord2> {
        let side = self.size();
        let mut cells = Vec::new();
        let mut pos = start;
        while self.is_white(pos) {
            cells.push(pos);
            let next = match direction {
                Direction::Row => (pos.0, pos.1 + 1),
                Direction::Column => (pos.0 + 1, pos.1),
            };
            if next.0 >= side || next.1 >= side {
                break;
            }
            pos = next;
        }
        cells
    }

    /// Next (or previous) white square from the cursor. Across walks in reading order and stops
    /// at the grid ends; down walks the column and wraps around.
    fn step(&self, cursor: Cursor, forward: bool) -> Option<Coord2> {
        let side = usize::from(self.size());
        let (row, col) = (usize::from(cursor.coords.0), usize::from(cursor.coords.1));
        let to_coords = |r: usize, c: usize| -> Option<Coord2> {
            let coords = (r.try_into().ok()?, c.try_into().ok()?);
            self.is_white(coords).then_some(coords)
        };

        match (cursor.direction, forward) {
            (Direction::Row, true) => (row * side + col + 1..side * side)
                .find_map(|i| to_coords(i / side, i % side)),
            (Direction::Row, false) => (0..row * side + col)
                .rev()
                .find_map(|i| to_coords(i / side, i % side)),
            (Direction::Column, true) => {
                (1..side).find_map(|k| to_coords((row + k) % side, col))
            }
            (Direction::Column, false) => {
                (1..side).find_map(|k| to_coords((row + side - k) % side, col))
            }
        }
    }
}

impl Default for CrosswordGrid {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

/// Crossword snapshot: `{"board": [[square, ...], ...], "connectedWords": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordSnapshot {
    pub board: Vec<Vec<Square>>,
    #[serde(default)]
    pub connected_words: Vec<ConnectedWord>,
}

impl Snapshot for CrosswordGrid {
    fn export(&self) -> core::result::Result<String, SnapshotError> {
        to_json(&CrosswordSnapshot {
            board: grid_to_rows(&self.squares),
            connected_words: self.connected_words.clone(),
        })
    }

    fn import(data: &str) -> core::result::Result<Self, SnapshotError> {
        let snapshot: CrosswordSnapshot = from_json(data)?;
        let squares = rows_to_grid(snapshot.board)?;
        let side = square_side(&squares).ok_or(GameError::InvalidBoardShape)?;

        let in_bounds = snapshot
            .connected_words
            .iter()
            .flat_map(|word| word.cells.iter())
            .all(|&(row, col)| row < side && col < side);
        if !in_bounds {
            return Err(GameError::InvalidCoords.into());
        }

        Ok(Self {
            squares,
            connected_words: snapshot.connected_words,
            cursor: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_black(size: Coord, black: &[Coord2]) -> CrosswordGrid {
        let mut grid = CrosswordGrid::new(size);
        for &coords in black {
            grid.toggle_black(coords, false);
        }
        grid
    }

    fn letters_in_row(grid: &CrosswordGrid, row: Coord) -> String {
        (0..grid.size())
            .map(|col| grid.square((row, col)).and_then(|sq| sq.value).unwrap_or('.'))
            .collect()
    }

    #[test]
    fn toggle_black_mirrors_point_symmetric_square() {
        let mut grid = CrosswordGrid::new(5);

        assert!(grid.toggle_black((0, 1), true));
        assert!(grid.square((0, 1)).unwrap().is_black());
        assert!(grid.square((4, 3)).unwrap().is_black());

        assert!(grid.toggle_black((4, 3), true));
        assert!(!grid.square((0, 1)).unwrap().is_black());
        assert!(!grid.square((4, 3)).unwrap().is_black());

        grid.toggle_black((2, 2), false);
        assert!(grid.square((2, 2)).unwrap().is_black());
        assert!(!grid.toggle_black((5, 0), true));
    }

    #[test]
    fn select_starts_across_and_flips_on_reselect() {
        let mut grid = grid_with_black(3, &[(1, 1)]);

        assert_eq!(grid.select((1, 1)), None);
        assert_eq!(grid.select((0, 0)).unwrap().direction, Direction::Row);
        assert_eq!(grid.select((0, 0)).unwrap().direction, Direction::Column);
        assert_eq!(grid.select((0, 0)).unwrap().direction, Direction::Row);
        assert_eq!(grid.select((0, 1)).unwrap().direction, Direction::Row);
    }

    #[test]
    fn typing_across_skips_black_and_wraps_to_next_row() {
        let mut grid = grid_with_black(3, &[(0, 1)]);
        grid.select((0, 0));

        for letter in ['c', 'a', 't', '1', 'd'] {
            grid.enter_letter(letter);
        }

        assert_eq!(letters_in_row(&grid, 0), "C.A");
        assert_eq!(letters_in_row(&grid, 1), "TD.");
        assert_eq!(grid.cursor().unwrap().coords, (1, 2));
    }

    #[test]
    fn typing_down_wraps_to_top_of_column() {
        let mut grid = grid_with_black(3, &[(1, 0)]);
        grid.select((0, 0));
        grid.select((0, 0));

        grid.enter_letter('x');
        assert_eq!(grid.cursor().unwrap().coords, (2, 0));
        grid.enter_letter('y');
        assert_eq!(grid.cursor().unwrap().coords, (0, 0));
        assert_eq!(grid.square((2, 0)).unwrap().value, Some('Y'));
    }

    #[test]
    fn backspace_clears_and_moves_back_over_black() {
        let mut grid = grid_with_black(3, &[(0, 1)]);
        grid.select((0, 0));
        grid.enter_letter('a');
        grid.enter_letter('b');

        assert_eq!(grid.cursor().unwrap().coords, (1, 0));
        assert!(grid.backspace());
        assert_eq!(grid.cursor().unwrap().coords, (0, 2));
        assert!(grid.backspace());
        assert_eq!(grid.cursor().unwrap().coords, (0, 0));
        assert_eq!(grid.square((0, 2)).unwrap().value, None);
        assert_eq!(grid.square((0, 0)).unwrap().value, Some('A'));
    }

    #[test]
    fn clue_runs_until_black_square() {
        let mut grid = grid_with_black(4, &[(0, 3), (2, 1)]);
        grid.select((0, 1));
        grid.set_clue("Feline");
        grid.select((0, 1));
        grid.set_clue("Sum");

        assert_eq!(grid.square((0, 1)).unwrap().clue.row, "Feline");
        assert_eq!(grid.square((0, 2)).unwrap().clue.row, "Feline");
        assert_eq!(grid.square((0, 3)).unwrap().clue.row, "");
        assert_eq!(grid.square((0, 0)).unwrap().clue.row, "");
        assert_eq!(grid.square((1, 1)).unwrap().clue.column, "Sum");
        assert_eq!(grid.square((2, 1)).unwrap().clue.column, "");
    }

    #[test]
    fn clues_list_numbered_squares_once() {
        let mut grid = CrosswordGrid::new(3);
        grid.select((1, 0));
        grid.set_clue("Second");
        grid.set_cell_number(Some(4));
        grid.select((0, 0));
        grid.set_clue("First");
        grid.set_cell_number(Some(1));
        grid.select((2, 0));
        grid.set_clue("Unnumbered");

        let clues = grid.clues(Direction::Row);

        assert_eq!(
            clues,
            [
                ClueEntry {
                    cell_number: 1,
                    clue: "First".into()
                },
                ClueEntry {
                    cell_number: 4,
                    clue: "Second".into()
                },
            ]
        );
        assert!(grid.clues(Direction::Column).is_empty());
    }

    #[test]
    fn highlight_follows_cursor_word() {
        let mut grid = grid_with_black(4, &[(1, 2)]);

        assert_eq!(grid.highlight((0, 0)), Highlight::None);

        grid.select((1, 0));
        assert_eq!(grid.highlight((1, 0)), Highlight::Cursor);
        assert_eq!(grid.highlight((1, 1)), Highlight::Word);
        assert_eq!(grid.highlight((1, 2)), Highlight::None);
        assert_eq!(grid.highlight((1, 3)), Highlight::None);
        assert_eq!(grid.highlight((0, 0)), Highlight::None);

        grid.select((1, 0));
        assert_eq!(grid.highlight((3, 0)), Highlight::Word);
        assert_eq!(grid.highlight((1, 1)), Highlight::None);
    }

    #[test]
    fn connected_word_highlights_its_cells() {
        let mut grid = CrosswordGrid::new(3);
        grid.select((0, 0));
        grid.set_clue("Top");
        grid.set_cell_number(Some(1));

        assert!(grid.connect_word(1, Direction::Row));
        assert!(!grid.connect_word(9, Direction::Row));
        assert_eq!(grid.connected_words()[0].cells, [(0, 0), (0, 1), (0, 2)]);

        grid.select((0, 1));
        grid.select((0, 0));
        assert_eq!(grid.highlight((0, 2)), Highlight::Word);

        grid.disconnect_word(1, Direction::Row);
        assert!(grid.connected_words().is_empty());
    }

    #[test]
    fn clear_resets_everything() {
        let mut grid = grid_with_black(3, &[(0, 0)]);
        grid.select((1, 1));
        grid.enter_letter('q');

        grid.clear();

        assert_eq!(grid, CrosswordGrid::new(3));
    }

    #[test]
    fn snapshot_keeps_squares_and_connected_words() {
        let mut grid = grid_with_black(3, &[(2, 2)]);
        grid.select((0, 0));
        grid.enter_letter('h');
        grid.set_clue("Greeting");
        grid.set_cell_number(Some(1));
        grid.connect_word(1, Direction::Row);

        let data = grid.export().unwrap();
        let imported = CrosswordGrid::import(&data).unwrap();

        assert_eq!(imported.square((0, 0)), grid.square((0, 0)));
        assert!(imported.square((2, 2)).unwrap().is_black());
        assert_eq!(imported.connected_words(), grid.connected_words());
        assert_eq!(imported.cursor(), None);
    }

    #[test]
    fn snapshot_rejects_words_outside_grid() {
        let data = r#"{"board":[[{"kind":"white"}]],"connectedWords":[{"direction":"row","cellNumber":1,"cells":[[0,3]]}]}"#;

        assert_eq!(
            CrosswordGrid::import(data),
            Err(SnapshotError::Shape(GameError::InvalidCoords))
        );
    }
}
