use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use crate::{crossword::CrosswordError, traits::{CrosswordChar, CrosswordString}, word::{Word, WordId}};

/// Holds every [word](Word) of a puzzle and the order in which they are offered to the placer
///
/// Words live in an arena indexed by [WordId] and never move, only the order changes.
#[derive(Clone, Eq, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct WordBank<CharT: CrosswordChar, StrT: CrosswordString<CharT>>
{
    words: Vec<Word<CharT, StrT>>,
    order: Vec<WordId>,
}

impl<CharT: CrosswordChar, StrT: CrosswordString<CharT>> WordBank<CharT, StrT>
{
    /// Creates a bank from the words in their given order, the words are reset
    ///
    /// # Errors
    ///
    /// [CrosswordError::EmptyWordList] - there are no words
    /// [CrosswordError::MalformedEntry] - a word is empty, contains a non letter or has no definition
    pub fn new(words: impl IntoIterator<Item = Word<CharT, StrT>>) -> Result<WordBank<CharT, StrT>, CrosswordError>
    {
        let mut words: Vec<Word<CharT, StrT>> = words.into_iter().collect();
        if words.is_empty() { return Err(CrosswordError::EmptyWordList); }

        if let Some(index) = words.iter().position(|w| !w.is_well_formed())
        {
            return Err(CrosswordError::MalformedEntry { index });
        }

        words.iter_mut().for_each(|w| w.reset());
        let order = (0..words.len()).collect();

        Ok(WordBank { words, order })
    }

    pub fn len(&self) -> usize
    {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.words.is_empty()
    }

    pub fn get(&self, id: WordId) -> &Word<CharT, StrT>
    {
        &self.words[id]
    }

    pub(crate) fn get_mut(&mut self, id: WordId) -> &mut Word<CharT, StrT>
    {
        &mut self.words[id]
    }

    /// Ids of the words in the current order
    pub fn order(&self) -> &[WordId]
    {
        &self.order
    }

    /// Returns the first word in the current order that is not written on the grid
    pub fn next_unplaced(&self) -> Option<WordId>
    {
        self.order.iter().copied().find(|&id| !self.words[id].is_written())
    }

    pub fn all_written(&self) -> bool
    {
        self.words.iter().all(|w| w.is_written())
    }

    /// Resets the word and moves it to the end of the order, so other words are tried before it
    pub fn push_to_back(&mut self, id: WordId)
    {
        self.words[id].reset();
        self.order.retain(|&other| other != id);
        self.order.push(id);
    }

    /// Resets every word
    pub fn reset(&mut self)
    {
        self.words.iter_mut().for_each(|w| w.reset());
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R)
    {
        self.order.shuffle(rng);
    }

    /// Returns the first word that can never be connected to the rest of the puzzle, if there is one
    ///
    /// A word can only join the grid by sharing a letter with another word, and the first letter of an already
    /// placed word is never used as a crossing point, so two words are linked when one of them contains a letter
    /// found past the first position of the other. A puzzle of more than one word is only possible when every word
    /// is reachable from every other through such links.
    pub fn find_unreachable(&self) -> Option<WordId>
    {
        let linked = |a: &Word<CharT, StrT>, b: &Word<CharT, StrT>|
            a.letters().iter().any(|c| b.letters()[1..].contains(c)) ||
            b.letters().iter().any(|c| a.letters()[1..].contains(c));

        let mut reached = vec![false; self.words.len()];
        let mut stack = vec![0];
        reached[0] = true;

        while let Some(current) = stack.pop()
        {
            for (id, word) in self.words.iter().enumerate()
            {
                if !reached[id] && linked(&self.words[current], word)
                {
                    reached[id] = true;
                    stack.push(id);
                }
            }
        }

        reached.iter().position(|r| !r)
    }
}
