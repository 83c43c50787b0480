use thiserror::Error;

use crate::Cell;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything the agent and the board can reject.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cell {cell} lies outside the {height}x{width} board")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },

    #[error("cell {0} has already been observed")]
    AlreadyObserved(Cell),

    #[error("cell {0} is a known mine and cannot be observed")]
    ObservedMine(Cell),

    #[error("count {count} at {cell} exceeds its {neighbors} neighbours")]
    CountOutOfRange {
        cell: Cell,
        count: usize,
        neighbors: usize,
    },

    #[error("inconsistent knowledge: {0}")]
    Contradiction(#[from] Contradiction),

    #[error("a {height}x{width} board has more cells than can be counted")]
    BoardTooLarge { height: usize, width: usize },

    #[error("{mines} mines do not fit on a board of {cells} cells")]
    TooManyMines { mines: usize, cells: usize },

    #[error("board snapshot: {0}")]
    Snapshot(#[from] bcs::Error),
}

/// A state that no mine layout can satisfy.
///
/// These only arise from observations that disagree with each other, e.g. a
/// wrong count fed to [`crate::Agent::observe`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Contradiction {
    /// A cell was proven both safe and a mine.
    #[error("{0} is known to be both safe and a mine")]
    Conflict(Cell),

    /// More mines were claimed than there are cells left to hold them.
    #[error("{count} mines cannot fit among {cells} cells")]
    Overfull { cells: usize, count: usize },

    /// A sentence lost more mines than it held.
    #[error("removing {removed} mines from a sentence holding {count}")]
    Underflow { count: usize, removed: usize },

    /// Two sentences name the same cells but disagree on the count.
    #[error("the same {cells} cells hold both {first} and {second} mines")]
    Mismatch {
        cells: usize,
        first: usize,
        second: usize,
    },
}
