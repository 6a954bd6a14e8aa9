pub mod traits;
pub mod word;
pub mod placement;
pub mod word_bank;
pub mod board;
pub mod search;
pub mod crossword;
pub mod generator;
