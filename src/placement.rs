use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use crate::word::{Orientation, Position, WordId};

/// Represents where a [word](crate::word::Word) starts on the grid, the direction it is written in and which other words it crosses
///
/// The overlap set is kept symmetric by the board: if word A lists word B, word B lists word A.
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord, Default, Debug, Serialize, Deserialize)]
pub struct WordPlacement
{
    pub position: Position,
    pub orientation: Orientation,
    pub overlaps: BTreeSet<WordId>,
}

impl WordPlacement
{
    pub fn new(position: Position, orientation: Orientation) -> WordPlacement
    {
        WordPlacement { position, orientation, overlaps: BTreeSet::new() }
    }

    pub fn with_overlaps(position: Position, orientation: Orientation, overlaps: BTreeSet<WordId>) -> WordPlacement
    {
        WordPlacement { position, orientation, overlaps }
    }

    /// Returns the cell of the letter at `index`
    pub fn cell(&self, index: usize) -> Position
    {
        self.position.step(&self.orientation, index as i32)
    }

    /// Returns all cells a word of length `len` occupies with this placement, first letter first
    ///
    /// ```
    /// # use crossword_layout::placement::WordPlacement;
    /// # use crossword_layout::word::{Orientation, Position};
    /// let placement = WordPlacement::new(Position::new(2, 5), Orientation::Vertical);
    /// assert_eq!(placement.cells(3).collect::<Vec<_>>(), vec![Position::new(2, 5), Position::new(2, 6), Position::new(2, 7)]);
    /// ```
    pub fn cells(&self, len: usize) -> impl Iterator<Item = Position> + '_
    {
        (0..len).map(move |i| self.cell(i))
    }

    /// The cell right before the first letter, it has to stay empty
    pub fn cell_before(&self) -> Position
    {
        self.position.step(&self.orientation, -1)
    }

    /// The cell right after the last letter of a word of length `len`, it has to stay empty
    pub fn cell_after(&self, len: usize) -> Position
    {
        self.cell(len)
    }

    /// Shifts the placement by the given offset
    pub fn translate(&mut self, dx: i32, dy: i32)
    {
        self.position = Position { x: self.position.x + dx, y: self.position.y + dy };
    }
}
