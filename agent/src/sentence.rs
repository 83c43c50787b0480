use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;

use crate::Cell;
use crate::error::Contradiction;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// The constructor and both mark operations keep `count <= cells.len()`. Any
/// step that would break it is reported as a [`Contradiction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Sentence {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Result<Self, Contradiction> {
        let sentence = Sentence {
            cells: cells.into_iter().collect(),
            count,
        };
        sentence.check()?;
        Ok(sentence)
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_subset(&self, other: &Sentence) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// Cells that must all be mines, if the count says so.
    ///
    /// An empty sentence is vacuously satisfied and yields nothing.
    pub fn known_mines(&self) -> Option<&BTreeSet<Cell>> {
        (!self.cells.is_empty() && self.count == self.cells.len()).then_some(&self.cells)
    }

    /// Cells that must all be safe, if the count is zero.
    pub fn known_safes(&self) -> Option<&BTreeSet<Cell>> {
        (!self.cells.is_empty() && self.count == 0).then_some(&self.cells)
    }

    /// Drops `cell`, which was found to be a mine, and lowers the count with it.
    ///
    /// Returns whether the sentence changed.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, Contradiction> {
        if !self.cells.remove(&cell) {
            return Ok(false);
        }
        self.count = self.count.checked_sub(1).ok_or(Contradiction::Underflow {
            count: self.count,
            removed: 1,
        })?;
        Ok(true)
    }

    /// Drops `cell`, which was found to be safe. The count is unchanged.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, Contradiction> {
        if !self.cells.remove(&cell) {
            return Ok(false);
        }
        self.check()?;
        Ok(true)
    }

    /// Subset resolution: with `self ⊆ superset`, the cells of `superset` outside
    /// `self` hold exactly the mines `superset` has beyond those of `self`.
    pub(crate) fn difference(&self, superset: &Sentence) -> Result<Sentence, Contradiction> {
        let count = superset
            .count
            .checked_sub(self.count)
            .ok_or(Contradiction::Underflow {
                count: superset.count,
                removed: self.count,
            })?;
        Sentence::new(superset.cells.difference(&self.cells).copied(), count)
    }

    fn check(&self) -> Result<(), Contradiction> {
        if self.count > self.cells.len() {
            return Err(Contradiction::Overfull {
                cells: self.cells.len(),
                count: self.count,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.count)
    }
}
