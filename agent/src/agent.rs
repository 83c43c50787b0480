use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::inference::{Closure, Inference};
use crate::knowledge::KnowledgeBase;
use crate::sentence::Sentence;
use crate::Cell;

/// The move an [`Agent`] suggests next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Logically proven to be safe.
    Safe(Cell),
    /// Picked at random among the cells not known to be mines.
    Guess(Cell),
}

impl Move {
    pub fn cell(self) -> Cell {
        match self {
            Move::Safe(cell) | Move::Guess(cell) => cell,
        }
    }

    pub fn is_safe(self) -> bool {
        matches!(self, Move::Safe(_))
    }
}

/// A Minesweeper player for one game on a `height` x `width` board.
///
/// The board itself is never visible to the agent. It learns through
/// [`Agent::observe`] only, and answers with [`Agent::next_safe_move`] or
/// [`Agent::next_random_move`].
#[derive(Debug, Clone)]
pub struct Agent {
    height: usize,
    width: usize,
    moves_made: BTreeSet<Cell>,
    inference: Inference,
}

impl Agent {
    pub fn new(height: usize, width: usize) -> Self {
        Agent {
            height,
            width,
            moves_made: BTreeSet::new(),
            inference: Inference::default(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cells that have been revealed, in row-major order.
    pub fn moves_made(&self) -> &BTreeSet<Cell> {
        &self.moves_made
    }

    /// Cells proven to be safe, revealed or not.
    pub fn known_safes(&self) -> &BTreeSet<Cell> {
        self.inference.safes()
    }

    /// Cells proven to be mines.
    pub fn known_mines(&self) -> &BTreeSet<Cell> {
        self.inference.mines()
    }

    /// The sentences still held after the last closure.
    pub fn knowledge(&self) -> &KnowledgeBase {
        self.inference.knowledge()
    }

    pub fn sentences(&self) -> &[Sentence] {
        self.inference.knowledge().as_slice()
    }

    /// Takes in that the safe `cell` was revealed with `count` mines around it.
    ///
    /// The cell is marked safe, a sentence is built from its unsettled
    /// neighbours and the knowledge base is closed again. Misuse is rejected
    /// up front. An observation that contradicts earlier ones is rejected as
    /// [`Error::Contradiction`]. Either way a failed call leaves the agent
    /// exactly as it was.
    pub fn observe(&mut self, cell: Cell, count: usize) -> Result<Closure> {
        if !cell.in_bounds(self.height, self.width) {
            return Err(Error::OutOfBounds {
                cell,
                height: self.height,
                width: self.width,
            });
        }
        if self.moves_made.contains(&cell) {
            return Err(Error::AlreadyObserved(cell));
        }
        if self.inference.is_mine(cell) {
            return Err(Error::ObservedMine(cell));
        }

        let neighbors: Vec<Cell> = cell.neighbors(self.height, self.width).collect();
        if count > neighbors.len() {
            return Err(Error::CountOutOfRange {
                cell,
                count,
                neighbors: neighbors.len(),
            });
        }

        let mut staged = self.inference.clone();
        let closure = staged
            .mark_safe(cell)
            .and_then(|_| Sentence::new(neighbors, count))
            .and_then(|sentence| staged.insert(sentence))
            .map_err(|contradiction| {
                warn!(%cell, count, %contradiction, "rejected observation");
                contradiction
            })?;

        self.moves_made.insert(cell);
        self.inference = staged;

        debug!(
            %cell,
            count,
            safes = self.inference.safes().len(),
            mines = self.inference.mines().len(),
            sentences = self.inference.knowledge().len(),
            "observed"
        );
        Ok(closure)
    }

    /// A proven-safe cell that has not been revealed yet, lowest first.
    pub fn next_safe_move(&self) -> Option<Cell> {
        self.inference
            .safes()
            .difference(&self.moves_made)
            .next()
            .copied()
    }

    /// A uniformly random cell that is neither revealed nor a known mine.
    pub fn next_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let candidates: Vec<Cell> = Cell::all(self.height, self.width)
            .filter(|cell| !self.moves_made.contains(cell) && !self.inference.is_mine(*cell))
            .collect();
        candidates.choose(rng).copied()
    }

    /// The safe move if there is one, otherwise a guess.
    pub fn next_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        self.next_safe_move()
            .map(Move::Safe)
            .or_else(|| self.next_random_move(rng).map(Move::Guess))
    }
}
