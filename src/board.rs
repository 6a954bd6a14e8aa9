use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::trace;
use crate::{placement::WordPlacement, traits::{CrosswordChar, CrosswordString}, word::{Orientation, Position, WordId}, word_bank::WordBank};

/// One square of the grid
///
/// The character is set if and only if at least one word references the cell.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Cell<CharT: CrosswordChar>
{
    pub character: Option<CharT>,
    pub references: BTreeSet<WordId>,
}

impl<CharT: CrosswordChar> Default for Cell<CharT>
{
    fn default() -> Self
    {
        Cell { character: None, references: BTreeSet::new() }
    }
}

/// Min and max column and row over all occupied cells
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct BoundingBox
{
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl BoundingBox
{
    fn around(position: Position) -> BoundingBox
    {
        BoundingBox { min_x: position.x, max_x: position.x, min_y: position.y, max_y: position.y }
    }

    fn extend(mut self, position: Position) -> BoundingBox
    {
        self.min_x = self.min_x.min(position.x);
        self.max_x = self.max_x.max(position.x);
        self.min_y = self.min_y.min(position.y);
        self.max_y = self.max_y.max(position.y);
        self
    }
}

/// The working matrix words are written to while a puzzle is being built
///
/// Only occupied cells are stored, `width` and `height` are the logical bounds a placement has to fit in.
/// Words written on the board are kept in `on_grid` in the order they were committed.
#[derive(Clone, Debug)]
pub struct Board<CharT: CrosswordChar>
{
    width: i32,
    height: i32,
    cells: HashMap<Position, Cell<CharT>>,
    on_grid: Vec<WordId>,
}

impl<CharT: CrosswordChar> Board<CharT>
{
    pub fn new(width: u16, height: u16) -> Board<CharT>
    {
        Board { width: width as i32, height: height as i32, cells: HashMap::new(), on_grid: Vec::new() }
    }

    pub fn width(&self) -> i32
    {
        self.width
    }

    pub fn height(&self) -> i32
    {
        self.height
    }

    /// Words on the board, oldest first
    pub fn words_on_grid(&self) -> &[WordId]
    {
        &self.on_grid
    }

    pub fn cell(&self, position: &Position) -> Option<&Cell<CharT>>
    {
        self.cells.get(position)
    }

    pub fn char_at(&self, position: &Position) -> Option<&CharT>
    {
        self.cells.get(position).and_then(|c| c.character.as_ref())
    }

    pub fn is_occupied(&self, position: &Position) -> bool
    {
        self.cells.get(position).is_some_and(|c| !c.references.is_empty())
    }

    /// Checks if a word of length `len` starting at `start` fits inside the board, the cell after the word included
    pub fn is_within_bounds(&self, orientation: &Orientation, start: &Position, len: usize) -> bool
    {
        let len = len as i32;
        match orientation
        {
            Orientation::Horizontal => start.x >= 0 && start.x + len < self.width && start.y >= 0 && start.y < self.height,
            Orientation::Vertical => start.x >= 0 && start.x < self.width && start.y >= 0 && start.y + len < self.height,
            Orientation::Undefined => false,
        }
    }

    /// Checks that the cells right before and right after a word are empty
    pub fn gaps_clear(&self, placement: &WordPlacement, len: usize) -> bool
    {
        !self.is_occupied(&placement.cell_before()) && !self.is_occupied(&placement.cell_after(len))
    }

    /// Writes the word to the board with the given placement
    ///
    /// Fills the empty cells along the word, adds the word to the references of every cell it covers and records
    /// the placement's overlaps on the crossed words so the overlap relation stays symmetric.
    pub fn commit<StrT: CrosswordString<CharT>>(&mut self, bank: &mut WordBank<CharT, StrT>, id: WordId, placement: WordPlacement)
    {
        let word = bank.get(id);
        for (position, letter) in placement.cells(word.len()).zip(word.letters())
        {
            let cell = self.cells.entry(position).or_default();
            match &cell.character
            {
                Some(existing) => debug_assert_eq!(existing, letter, "letter conflict at {:?}", position),
                None => cell.character = Some(letter.clone()),
            }
            cell.references.insert(id);
        }

        for &other in placement.overlaps.iter()
        {
            if let Some(other_placement) = bank.get_mut(other).placement_mut()
            {
                other_placement.overlaps.insert(id);
            }
        }

        trace!(id, position = ?placement.position, orientation = ?placement.orientation, overlaps = placement.overlaps.len(), "committed word");
        bank.get_mut(id).place(placement);
        self.on_grid.push(id);
    }

    /// Removes the most recently committed word from the board and returns its id
    ///
    /// Cells that are left without references become empty again, and the word is taken out of the overlap sets
    /// of every word it crossed. The word itself keeps its placement, it's up to the caller to reset it.
    pub fn rollback_newest<StrT: CrosswordString<CharT>>(&mut self, bank: &mut WordBank<CharT, StrT>) -> Option<WordId>
    {
        let id = self.on_grid.pop()?;
        let word = bank.get(id);
        let placement = word.placement()?.clone();

        for position in placement.cells(word.len())
        {
            if let Some(cell) = self.cells.get_mut(&position)
            {
                cell.references.remove(&id);
                if cell.references.is_empty() { self.cells.remove(&position); }
            }
        }

        for &other in placement.overlaps.iter()
        {
            if let Some(other_placement) = bank.get_mut(other).placement_mut()
            {
                other_placement.overlaps.remove(&id);
            }
        }

        trace!(id, "rolled back word");
        Some(id)
    }

    /// Looks for a word on the board whose leading or trailing cell got occupied, returns the first one found
    ///
    /// A crossing that was legal when a word was placed can be broken by a word placed later next to its end.
    pub fn find_spacing_violation<StrT: CrosswordString<CharT>>(&self, bank: &WordBank<CharT, StrT>) -> Option<WordId>
    {
        self.on_grid.iter().copied().find(|&id|
        {
            let word = bank.get(id);
            word.placement().is_some_and(|p| !self.gaps_clear(p, word.len()))
        })
    }

    /// Empties every cell and forgets the words on the board, keeps the bounds
    pub fn clear(&mut self)
    {
        self.cells.clear();
        self.on_grid.clear();
    }

    /// Returns the smallest box containing all occupied cells, None for an empty board
    pub fn bounding_box(&self) -> Option<BoundingBox>
    {
        let mut positions = self.cells.iter().filter(|(_, c)| !c.references.is_empty()).map(|(p, _)| *p);
        let first = positions.next()?;
        Some(positions.fold(BoundingBox::around(first), BoundingBox::extend))
    }
}
