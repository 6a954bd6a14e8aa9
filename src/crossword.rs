use std::{collections::BTreeSet, marker::PhantomData};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::{board::Board, traits::{CrosswordChar, CrosswordString}, word::{Orientation, Position, WordId}, word_bank::WordBank};

/// Error type for possible errors when building crosswords
#[derive(Error, Debug)]
pub enum CrosswordError
{
    #[error("There are no words to place.")]
    EmptyWordList,
    #[error("The entry at index {index} is malformed: a word has to be a non empty run of letters with a non empty definition.")]
    MalformedEntry { index: usize },
    #[error("The word at index {index} is too long for the working grid.")]
    WordDoesNotFit { index: usize },
    #[error("The word at index {index} shares no usable letter with the other words.")]
    Disconnected { index: usize },
    #[error("Could not place all the words after {attempts} attempts.")]
    PlacementFailed { attempts: u32 },
    #[error("The working grid of {width}x{height} is larger than {max}x{max}.", max = MAX_WORKING_SIZE)]
    WorkingGridTooLarge { width: u16, height: u16 },
    #[error("Invalid generator settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),
}

/// Largest working grid side, the trimmed grid adds a blank margin on both sides and has to fit in u16
pub const MAX_WORKING_SIZE: u16 = u16::MAX - 2;

/// A word written on a finished [crossword](Crossword)
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord, Default, Debug, Serialize, Deserialize)]
pub struct PlacedWord<CharT: CrosswordChar, StrT: CrosswordString<CharT>>
{
    /// Index of the word in the list the crossword was generated from
    pub id: WordId,
    pub value: StrT,
    pub definition: String,
    pub position: Position,
    pub orientation: Orientation,
    /// Ids of the words crossing this one
    pub overlaps: BTreeSet<WordId>,
    #[serde(skip)]
    character_type: PhantomData<CharT>
}

impl<CharT: CrosswordChar, StrT: CrosswordString<CharT>> PlacedWord<CharT, StrT>
{
    pub fn new(id: WordId, value: StrT, definition: String, position: Position, orientation: Orientation, overlaps: BTreeSet<WordId>) -> PlacedWord<CharT, StrT>
    {
        PlacedWord { id, value, definition, position, orientation, overlaps, character_type: PhantomData }
    }

    pub fn letters(&self) -> &[CharT]
    {
        self.value.as_ref()
    }

    /// Cells the word covers, first letter first
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_
    {
        (0..self.letters().len() as i32).map(|i| self.position.step(&self.orientation, i))
    }
}

/// # Represents a finished crossword
///
/// The grid is trimmed to the smallest rectangle holding every letter plus a one cell margin on each side,
/// so every word starts at a position with coordinates of at least 1.
/// Words are kept in the order they were placed.
///
/// # Example
///
/// ```
/// # use crossword_layout::generator::{CrosswordGenerator, CrosswordGeneratorSettings};
/// # use crossword_layout::word::Word;
/// let generator = CrosswordGenerator::<u8, &str>
/// {
///     words: vec![Word::new("cat", "feline"), Word::new("car", "vehicle")],
///     settings: CrosswordGeneratorSettings { seed: Some(1), ..Default::default() },
/// };
/// let cw = generator.generate().unwrap();
///
/// //  -------        -------
/// // |       |      |       |
/// // |   c   |      |   c   |
/// // | c a t |  or  | c a r |
/// // |   r   |      |   t   |
/// // |       |      |       |
/// //  -------        -------
/// assert_eq!(cw.get_size(), (5, 5));
/// assert_eq!(cw.words().len(), 2);
/// ```
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Crossword<CharT: CrosswordChar, StrT: CrosswordString<CharT>>
{
    width: u16,
    height: u16,
    cells: Vec<Vec<Option<CharT>>>,
    words: Vec<PlacedWord<CharT, StrT>>,
}

impl<CharT: CrosswordChar, StrT: CrosswordString<CharT>> Crossword<CharT, StrT>
{
    /// Copies the occupied part of the board into a minimal grid and moves every placed word along with it
    ///
    /// Returns an empty crossword if the board is empty.
    pub fn compact(board: &Board<CharT>, bank: &WordBank<CharT, StrT>) -> Crossword<CharT, StrT>
    {
        let Some(bbox) = board.bounding_box() else { return Crossword::default() };

        let (dx, dy) = (1 - bbox.min_x, 1 - bbox.min_y);
        let width = u16::try_from(bbox.max_x - bbox.min_x + 3).unwrap_or(u16::MAX);
        let height = u16::try_from(bbox.max_y - bbox.min_y + 3).unwrap_or(u16::MAX);
        debug_assert!(board.width() <= MAX_WORKING_SIZE as i32 && board.height() <= MAX_WORKING_SIZE as i32);

        let cells = (0..height as i32)
            .map(|y| (0..width as i32)
                .map(|x| board.char_at(&Position::new(x - dx, y - dy)).cloned())
                .collect())
            .collect();

        let words = board.words_on_grid().iter()
            .filter_map(|&id|
            {
                let word = bank.get(id);
                word.placement().map(|p|
                {
                    let mut placement = p.clone();
                    placement.translate(dx, dy);
                    PlacedWord::new(id, word.value.clone(), word.definition.clone(), placement.position, placement.orientation, placement.overlaps)
                })
            })
            .collect();

        Crossword { width, height, cells, words }
    }

    /// Returns the size of the grid as (width, height), margins included
    pub fn get_size(&self) -> (u16, u16)
    {
        (self.width, self.height)
    }

    /// Returns the character at the given cell, None for a blank cell or a cell outside of the grid
    pub fn char_at(&self, position: &Position) -> Option<&CharT>
    {
        if position.x < 0 || position.y < 0 { return None; }
        self.cells.get(position.y as usize)?.get(position.x as usize)?.as_ref()
    }

    /// Returns a matrix of characters that represent the [crossword](Crossword), rows first, blank cells are None
    pub fn generate_char_table(&self) -> &Vec<Vec<Option<CharT>>>
    {
        &self.cells
    }

    /// Words of the crossword in the order they were placed
    pub fn words(&self) -> &[PlacedWord<CharT, StrT>]
    {
        &self.words
    }

    /// Finds the [word](PlacedWord) given its string value.
    pub fn find_word(&self, word: &StrT) -> Option<&PlacedWord<CharT, StrT>>
    {
        self.words.iter().find(|w| w.value == *word)
    }
}

impl<CharT: CrosswordChar, StrT: CrosswordString<CharT>> Default for Crossword<CharT, StrT>
{
    fn default() -> Self
    {
        Crossword { width: 0, height: 0, cells: vec![], words: vec![] }
    }
}

impl<CharT: CrosswordChar, StrT: CrosswordString<CharT>> IntoIterator for Crossword<CharT, StrT>
{
    type Item = PlacedWord<CharT, StrT>;
    type IntoIter = <Vec<PlacedWord<CharT, StrT>> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.words.into_iter()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{placement::WordPlacement, word::Word};

    #[test]
    fn test_crossword_compact() {
        let mut bank = WordBank::new([Word::<u8, &str>::new("cat", "feline"), Word::new("car", "vehicle")]).unwrap();
        let mut board = Board::new(100, 100);
        board.commit(&mut bank, 0, WordPlacement::new(Position::new(40, 50), Orientation::Horizontal));
        board.commit(&mut bank, 1, WordPlacement::with_overlaps(Position::new(41, 49), Orientation::Vertical, BTreeSet::from([0])));

        let cw = Crossword::compact(&board, &bank);

        assert_eq!(cw.get_size(), (5, 5));
        assert_eq!(cw.generate_char_table(), &vec!
        [
            vec![None, None,       None,       None,       None],
            vec![None, None,       Some(b'c'), None,       None],
            vec![None, Some(b'c'), Some(b'a'), Some(b't'), None],
            vec![None, None,       Some(b'r'), None,       None],
            vec![None, None,       None,       None,       None],
        ]);

        let cat = cw.find_word(&"cat").unwrap();
        assert_eq!((cat.id, cat.position, cat.orientation), (0, Position::new(1, 2), Orientation::Horizontal));
        assert_eq!(cat.overlaps, BTreeSet::from([1]));

        let car = cw.find_word(&"car").unwrap();
        assert_eq!((car.id, car.position, car.orientation), (1, Position::new(2, 1), Orientation::Vertical));
        assert_eq!(car.definition, "vehicle");
        assert_eq!(car.cells().collect::<Vec<_>>(), vec![Position::new(2, 1), Position::new(2, 2), Position::new(2, 3)]);

        assert_eq!(cw.char_at(&Position::new(2, 3)), Some(&b'r'));
        assert_eq!(cw.char_at(&Position::new(0, 0)), None);
        assert_eq!(cw.char_at(&Position::new(7, 1)), None);
        assert_eq!(cw.into_iter().map(|w| w.id).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_crossword_compact_empty_board() {
        let bank = WordBank::new([Word::<u8, &str>::new("cat", "feline")]).unwrap();
        let cw = Crossword::compact(&Board::new(10, 10), &bank);
        assert_eq!(cw.get_size(), (0, 0));
        assert!(cw.words().is_empty());
    }

    #[test]
    fn test_crossword_serializes_for_rendering() {
        let mut bank = WordBank::new([Word::<u8, String>::new("solo".to_owned(), "alone")]).unwrap();
        let mut board = Board::new(20, 20);
        board.commit(&mut bank, 0, WordPlacement::new(Position::new(3, 9), Orientation::Vertical));

        let json = serde_json::to_value(Crossword::compact(&board, &bank)).unwrap();
        assert_eq!(json["width"], 3);
        assert_eq!(json["height"], 6);
        assert_eq!(json["words"][0]["definition"], "alone");
        assert_eq!(json["words"][0]["position"]["x"], 1);
        assert_eq!(json["words"][0]["orientation"], "Vertical");
    }
}
