use std::marker::PhantomData;
use serde::{Deserialize, Serialize};
use crate::{placement::WordPlacement, traits::{CrosswordChar, CrosswordString}};

/// Stable identifier of a [word](Word), equal to its index in the list the puzzle was generated from.
pub type WordId = usize;

/// Represents a cell coordinate in the grid, `x` is the column and `y` is the row
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash, Default, Debug, Serialize, Deserialize)]
pub struct Position
{
    pub x: i32,
    pub y: i32,
}

impl Position
{
    pub fn new(x: i32, y: i32) -> Position
    {
        Position { x, y }
    }

    /// Returns the position `steps` cells away from this one along the orientation
    ///
    /// ```
    /// # use crossword_layout::word::{Orientation, Position};
    /// let p = Position::new(3, 4);
    /// assert_eq!(p.step(&Orientation::Horizontal, 2), Position::new(5, 4));
    /// assert_eq!(p.step(&Orientation::Vertical, -1), Position::new(3, 3));
    /// ```
    pub fn step(&self, orientation: &Orientation, steps: i32) -> Position
    {
        let (dx, dy) = orientation.delta();
        Position { x: self.x + dx * steps, y: self.y + dy * steps }
    }
}

/// Represents the direction a [word](Word) is written in
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash, Default, Debug, Serialize, Deserialize)]
pub enum Orientation
{
    Horizontal,
    Vertical,
    #[default]
    Undefined,
}

impl Orientation
{
    pub fn opposite(&self) -> Orientation
    {
        match *self
        {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Undefined => Orientation::Undefined,
        }
    }

    /// Unit step between two consecutive letters
    fn delta(&self) -> (i32, i32)
    {
        match *self
        {
            Orientation::Horizontal => (1, 0),
            Orientation::Vertical => (0, 1),
            Orientation::Undefined => (0, 0),
        }
    }
}

/// Represents a word together with its definition and, once it is written on the grid, its [placement](WordPlacement)
///
/// Accepts two template parameters, that specify the type of individual characters in the word and the type of the word itself (for example u8 and &str, or char and Vec\<char\>)
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord, Default, Debug, Serialize, Deserialize)]
pub struct Word<CharT: CrosswordChar, StrT: CrosswordString<CharT>>
{
    pub value: StrT,
    pub definition: String,
    placement: Option<WordPlacement>,
    written: bool,
    #[serde(skip)]
    character_type: PhantomData<CharT>
}

impl<CharT: CrosswordChar, StrT: CrosswordString<CharT>> Word<CharT, StrT>
{
    pub fn new(value: StrT, definition: impl Into<String>) -> Word<CharT, StrT>
    {
        Word { value, definition: definition.into(), placement: None, written: false, character_type: PhantomData }
    }

    pub fn letters(&self) -> &[CharT]
    {
        self.value.as_ref()
    }

    pub fn len(&self) -> usize
    {
        self.letters().len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.letters().is_empty()
    }

    /// A word is well formed if it is a non empty run of letters and has a non empty definition
    pub fn is_well_formed(&self) -> bool
    {
        !self.is_empty() && self.letters().iter().all(|c| c.is_letter()) && !self.definition.trim().is_empty()
    }

    pub fn placement(&self) -> Option<&WordPlacement>
    {
        self.placement.as_ref()
    }

    pub(crate) fn placement_mut(&mut self) -> Option<&mut WordPlacement>
    {
        self.placement.as_mut()
    }

    pub fn is_written(&self) -> bool
    {
        self.written
    }

    pub(crate) fn place(&mut self, placement: WordPlacement)
    {
        self.placement = Some(placement);
        self.written = true;
    }

    /// Forgets the placement and clears the written flag
    pub fn reset(&mut self)
    {
        self.placement = None;
        self.written = false;
    }
}
