//! A Minesweeper player that deduces instead of guessing.
//!
//! The [`Agent`] is told, one revealed cell at a time, how many mines touch
//! that cell. Each clue becomes a [`Sentence`] ("exactly n of these cells are
//! mines") in its knowledge base, and the knowledge base is closed under two
//! rules after every clue:
//!
//! 1. a sentence whose count is zero makes all its cells safe, and one whose
//!    count equals its size makes all its cells mines;
//! 2. when one sentence's cells are a subset of another's, the larger sentence
//!    is replaced by the difference of the two.
//!
//! Only when nothing is known to be safe does the agent fall back to a uniform
//! random guess. The [`Board`] is a reference environment for playing whole
//! games against it.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub mod agent;
pub mod board;
pub mod error;
mod inference;
pub mod knowledge;
pub mod sentence;

pub use agent::{Agent, Move};
pub use board::{Board, Reveal};
pub use error::{Contradiction, Error, Result};
pub use inference::Closure;
pub use knowledge::KnowledgeBase;
pub use sentence::Sentence;

// --- Cell ---

/// A board coordinate. Cells order row-major.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }

    pub fn in_bounds(self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }

    /// The up to eight cells touching this one, clipped to the board.
    pub fn neighbors(self, height: usize, width: usize) -> impl Iterator<Item = Cell> {
        (-1isize..=1)
            .cartesian_product(-1isize..=1)
            .filter(|&offset| offset != (0, 0))
            .filter_map(move |(dr, dc)| {
                let row = self.row.checked_add_signed(dr)?;
                let col = self.col.checked_add_signed(dc)?;
                let neighbor = Cell::new(row, col);
                neighbor.in_bounds(height, width).then_some(neighbor)
            })
    }

    /// Every cell of a `height` x `width` board, row by row.
    pub fn all(height: usize, width: usize) -> impl Iterator<Item = Cell> {
        (0..height)
            .cartesian_product(0..width)
            .map(|(row, col)| Cell::new(row, col))
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell::new(row, col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors() {
        // Corner, edge and centre of a 3x3 board.
        assert_eq!(Cell::new(0, 0).neighbors(3, 3).count(), 3);
        assert_eq!(Cell::new(0, 1).neighbors(3, 3).count(), 5);
        assert_eq!(Cell::new(1, 1).neighbors(3, 3).count(), 8);

        let around_corner: Vec<Cell> = Cell::new(2, 2).neighbors(3, 3).collect();
        assert_eq!(
            around_corner,
            vec![Cell::new(1, 1), Cell::new(1, 2), Cell::new(2, 1)]
        );
    }

    #[test]
    fn test_neighbors_exclude_self() {
        let centre = Cell::new(4, 4);
        assert!(centre.neighbors(8, 8).all(|n| n != centre));
    }

    #[test]
    fn test_all_is_row_major() {
        let cells: Vec<Cell> = Cell::all(2, 3).collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[3], Cell::new(1, 0));
        assert!(cells.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::from((3, 7)).to_string(), "(3, 7)");
    }
}
