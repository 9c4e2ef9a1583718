pub mod puzzle;

pub use puzzle::{CreatePuzzleInput, NewPuzzle, Puzzle, PuzzleCount, UpdatePuzzleInput};
