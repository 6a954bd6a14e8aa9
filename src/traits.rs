use std::fmt::Debug;
use trait_set::trait_set;

/// A single grid character that knows whether it is a letter.
///
/// Words handed to the [generator](crate::generator::CrosswordGenerator) must consist of letters only.
pub trait Letter
{
    fn is_letter(&self) -> bool;
}

impl Letter for u8
{
    fn is_letter(&self) -> bool
    {
        self.is_ascii_alphabetic()
    }
}

impl Letter for char
{
    fn is_letter(&self) -> bool
    {
        self.is_alphabetic()
    }
}

trait_set!
{
    /// Trait for any type that can represent individual character in a [crossword](crate::crossword::Crossword).
    pub trait CrosswordChar = Letter + Eq + PartialEq + Ord + PartialOrd + Clone + Debug + Send + Sync;

    /// Trait for any type that can represent individual word value in a [crossword](crate::crossword::Crossword).
    pub trait CrosswordString<CharT: CrosswordChar> = AsRef<[CharT]> + Eq + PartialEq + Ord + PartialOrd + Clone + Default + Debug + Send + Sync;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters() {
        assert!(b'q'.is_letter());
        assert!(!b'-'.is_letter());
        assert!('é'.is_letter());
        assert!(!' '.is_letter());
    }
}
