//! The hidden board the agent plays against.
//!
//! The agent never looks at this directly. A driver reveals cells here and
//! hands the resulting counts to [`crate::Agent::observe`].

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Cell;
use crate::error::{Error, Result};

/// Outcome of revealing a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    /// The cell was safe; this many of its neighbours are mines.
    Count(u8),
    Detonated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    height: usize,
    width: usize,
    /// `height * width`, checked once on construction.
    #[serde(skip)]
    cells: usize,
    /// Ground truth.
    mines: BTreeSet<Cell>,
    /// Cells revealed so far, mines included if one went off.
    revealed: BTreeSet<Cell>,
    /// Cells the player has marked as mines.
    flagged: BTreeSet<Cell>,
}

impl Board {
    /// A board with `mines` mines placed uniformly at random.
    ///
    /// At least one cell must stay free of mines.
    pub fn new<R: Rng + ?Sized>(height: usize, width: usize, mines: usize, rng: &mut R) -> Result<Self> {
        let cells = cell_count(height, width)?;
        if mines >= cells {
            return Err(Error::TooManyMines { mines, cells });
        }

        let mut placed = BTreeSet::new();
        while placed.len() < mines {
            placed.insert(Cell::new(
                rng.random_range(0..height),
                rng.random_range(0..width),
            ));
        }

        Ok(Board {
            height,
            width,
            cells,
            mines: placed,
            revealed: BTreeSet::new(),
            flagged: BTreeSet::new(),
        })
    }

    /// A board with mines exactly at `mines`.
    pub fn with_mines(height: usize, width: usize, mines: impl IntoIterator<Item = Cell>) -> Result<Self> {
        let board = Board {
            height,
            width,
            cells: cell_count(height, width)?,
            mines: mines.into_iter().collect(),
            revealed: BTreeSet::new(),
            flagged: BTreeSet::new(),
        };
        board.validate()?;
        Ok(board)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    pub fn is_revealed(&self, cell: Cell) -> bool {
        self.revealed.contains(&cell)
    }

    pub fn is_flagged(&self, cell: Cell) -> bool {
        self.flagged.contains(&cell)
    }

    /// Number of mines touching `cell`, not counting the cell itself.
    pub fn nearby_mines(&self, cell: Cell) -> u8 {
        let count = cell
            .neighbors(self.height, self.width)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count();
        // At most eight neighbours.
        count as u8
    }

    pub fn reveal(&mut self, cell: Cell) -> Result<Reveal> {
        self.check_bounds(cell)?;
        self.revealed.insert(cell);
        if self.is_mine(cell) {
            return Ok(Reveal::Detonated);
        }
        Ok(Reveal::Count(self.nearby_mines(cell)))
    }

    /// Marks `cell` as a mine the player has found.
    pub fn flag(&mut self, cell: Cell) -> Result<()> {
        self.check_bounds(cell)?;
        self.flagged.insert(cell);
        Ok(())
    }

    /// Whether a mine has been revealed.
    pub fn detonated(&self) -> bool {
        !self.revealed.is_disjoint(&self.mines)
    }

    /// Won once every mine is flagged, or every safe cell is revealed.
    ///
    /// A board without mines is only won by clearing it.
    pub fn won(&self) -> bool {
        if self.detonated() {
            return false;
        }
        let all_flagged = !self.mines.is_empty() && self.flagged == self.mines;
        all_flagged || self.revealed.len() == self.cells - self.mines.len()
    }

    /// Deserializes a board from bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut board: Board = bcs::from_bytes(bytes)?;
        board.cells = cell_count(board.height, board.width)?;
        board.validate()?;
        Ok(board)
    }

    /// Serializes the board to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    fn check_bounds(&self, cell: Cell) -> Result<()> {
        if !cell.in_bounds(self.height, self.width) {
            return Err(Error::OutOfBounds {
                cell,
                height: self.height,
                width: self.width,
            });
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.mines.len() >= self.cells {
            return Err(Error::TooManyMines {
                mines: self.mines.len(),
                cells: self.cells,
            });
        }
        for &cell in self.mines.iter().chain(&self.revealed).chain(&self.flagged) {
            self.check_bounds(cell)?;
        }
        Ok(())
    }
}

fn cell_count(height: usize, width: usize) -> Result<usize> {
    height
        .checked_mul(width)
        .ok_or(Error::BoardTooLarge { height, width })
}
