use std::collections::BTreeSet;

use itertools::Itertools;
use rand::Rng;
use crate::{board::Board, placement::WordPlacement, traits::{CrosswordChar, CrosswordString}, word::{Orientation, Position}, word_bank::WordBank};

/// Looks for the best way to add a word to a [board](Board)
///
/// # Example
///
/// ```
/// # use crossword_layout::board::Board;
/// # use crossword_layout::search::PlacementSearch;
/// # use crossword_layout::word::{Orientation, Position, Word};
/// # use crossword_layout::word_bank::WordBank;
/// # use crossword_layout::placement::WordPlacement;
/// let mut bank = WordBank::new([Word::<u8, &str>::new("cat", "feline"), Word::new("car", "vehicle")]).unwrap();
/// let mut board = Board::new(20, 20);
/// board.commit(&mut bank, 0, WordPlacement::new(Position::new(5, 5), Orientation::Horizontal));
///
/// //    c
/// //  c a t
/// //    r
///
/// let best = PlacementSearch::new(&board, &bank).best_placement(b"car").unwrap();
/// assert_eq!(best.position, Position::new(6, 4));
/// assert_eq!(best.orientation, Orientation::Vertical);
/// assert!(best.overlaps.contains(&0));
/// ```
pub struct PlacementSearch<'a, CharT: CrosswordChar, StrT: CrosswordString<CharT>>
{
    board: &'a Board<CharT>,
    bank: &'a WordBank<CharT, StrT>,
}

impl<'a, CharT: CrosswordChar, StrT: CrosswordString<CharT>> PlacementSearch<'a, CharT, StrT>
{
    pub fn new(board: &'a Board<CharT>, bank: &'a WordBank<CharT, StrT>) -> PlacementSearch<'a, CharT, StrT>
    {
        PlacementSearch { board, bank }
    }

    /// Returns the legal placement with the most overlaps, the first one found wins a tie
    ///
    /// Returns None if the word can't cross any word on the board this time.
    pub fn best_placement(&self, candidate: &[CharT]) -> Option<WordPlacement>
    {
        let anchors = self.find_letter_matches(candidate);
        let placements = self.generate_placements(&anchors, candidate);
        find_best_placement(placements)
    }

    /// Returns every cell of a word on the board holding a letter of the candidate
    ///
    /// The first letter of a word on the board is never used as an anchor.
    pub fn find_letter_matches(&self, candidate: &[CharT]) -> Vec<Position>
    {
        candidate.iter()
            .flat_map(|c| self.board.words_on_grid().iter().map(move |&id| (c, id)))
            .flat_map(|(c, id)|
            {
                let word = self.bank.get(id);
                let placement = word.placement();
                word.letters().iter()
                    .enumerate()
                    .skip(1)
                    .filter(move |(_, letter)| *letter == c)
                    .filter_map(move |(i, _)| placement.map(|p| p.cell(i)))
            })
            .unique()
            .collect()
    }

    /// Tries both orientations through every anchor, once for each occurrence of the anchor's letter in the candidate
    pub fn generate_placements(&self, anchors: &[Position], candidate: &[CharT]) -> Vec<WordPlacement>
    {
        let mut placements = vec![];

        for anchor in anchors
        {
            let Some(letter) = self.board.char_at(anchor) else { continue };

            for index in candidate.iter().positions(|c| c == letter)
            {
                for orientation in [Orientation::Horizontal, Orientation::Vertical]
                {
                    let start = anchor.step(&orientation, -(index as i32));
                    if let Some(placement) = self.test_placement(candidate, orientation, start)
                    {
                        placements.push(placement);
                    }
                }
            }
        }

        placements
    }

    /// Checks if the candidate can be written starting at `start`
    ///
    /// The word has to fit the board, every letter has to land on an empty cell or on the same letter, and the
    /// cells right before and after the word have to be empty. Words owning the shared cells become the overlaps.
    /// A word can't be laid exactly over an equal word already on the board.
    pub fn test_placement(&self, candidate: &[CharT], orientation: Orientation, start: Position) -> Option<WordPlacement>
    {
        if !self.board.is_within_bounds(&orientation, &start, candidate.len()) { return None; }

        let mut placement = WordPlacement::new(start, orientation);
        let mut overlaps = BTreeSet::new();

        for (position, letter) in placement.cells(candidate.len()).zip(candidate)
        {
            if let Some(cell) = self.board.cell(&position)
            {
                match &cell.character
                {
                    Some(existing) if existing == letter => overlaps.extend(cell.references.iter().copied()),
                    Some(_) => return None,
                    None => {}
                }
            }
        }

        if !self.board.gaps_clear(&placement, candidate.len()) { return None; }

        let stacked = overlaps.iter().any(|&id|
        {
            let word = self.bank.get(id);
            word.len() == candidate.len() && word.placement().is_some_and(|p| p.position == start && p.orientation == orientation)
        });
        if stacked { return None; }

        placement.overlaps = overlaps;
        Some(placement)
    }
}

/// Picks the placement with the largest overlap set, the earliest one on a tie
pub fn find_best_placement(placements: impl IntoIterator<Item = WordPlacement>) -> Option<WordPlacement>
{
    placements.into_iter().reduce(|best, current| if current.overlaps.len() > best.overlaps.len() { current } else { best })
}

/// Placement of the very first word: centered on the board, in a random orientation
pub fn first_placement<CharT: CrosswordChar, R: Rng + ?Sized>(board: &Board<CharT>, len: usize, rng: &mut R) -> WordPlacement
{
    let len = len as i32;
    let (width, height) = (board.width(), board.height());

    if rng.gen_bool(0.5)
    {
        WordPlacement::new(Position::new((width - len) / 2, height / 2), Orientation::Horizontal)
    }
    else
    {
        WordPlacement::new(Position::new(width / 2, (height - len) / 2), Orientation::Vertical)
    }
}
