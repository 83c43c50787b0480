use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::Cell;
use crate::error::Contradiction;
use crate::knowledge::KnowledgeBase;
use crate::sentence::Sentence;

/// What one run of [`Inference::close`] achieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Closure {
    /// Rounds of direct plus subset resolution, including the final quiet one.
    pub rounds: usize,
    /// Newly proven mines.
    pub mines: usize,
    /// Newly proven safe cells.
    pub safes: usize,
    /// Sentences rewritten or dropped by subset resolution.
    pub rewrites: usize,
}

impl Closure {
    pub fn learned_anything(&self) -> bool {
        self.mines > 0 || self.safes > 0 || self.rewrites > 0
    }
}

/// The fact sets and the knowledge base, closed under resolution.
///
/// `mark_mine` and `mark_safe` are the only writers of the fact sets. Both
/// sets only grow, never overlap, and no held sentence mentions a cell from
/// either of them.
#[derive(Debug, Clone, Default)]
pub(crate) struct Inference {
    knowledge: KnowledgeBase,
    mines: BTreeSet<Cell>,
    safes: BTreeSet<Cell>,
}

impl Inference {
    pub(crate) fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub(crate) fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub(crate) fn safes(&self) -> &BTreeSet<Cell> {
        &self.safes
    }

    pub(crate) fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    pub(crate) fn is_safe(&self, cell: Cell) -> bool {
        self.safes.contains(&cell)
    }

    /// Records `cell` as a mine and strips it from every sentence.
    ///
    /// Returns `false` if it was already known.
    pub(crate) fn mark_mine(&mut self, cell: Cell) -> Result<bool, Contradiction> {
        if self.safes.contains(&cell) {
            return Err(Contradiction::Conflict(cell));
        }
        if !self.mines.insert(cell) {
            return Ok(false);
        }
        let touched = self.knowledge.mark_mine(cell)?;
        trace!(%cell, touched, "marked mine");
        Ok(true)
    }

    /// Records `cell` as safe and strips it from every sentence.
    ///
    /// Returns `false` if it was already known.
    pub(crate) fn mark_safe(&mut self, cell: Cell) -> Result<bool, Contradiction> {
        if self.mines.contains(&cell) {
            return Err(Contradiction::Conflict(cell));
        }
        if !self.safes.insert(cell) {
            return Ok(false);
        }
        let touched = self.knowledge.mark_safe(cell)?;
        trace!(%cell, touched, "marked safe");
        Ok(true)
    }

    /// Adds a sentence and closes the knowledge base again.
    ///
    /// Cells that are already settled are taken out first. Each known mine
    /// among them accounts for one of the sentence's mines.
    pub(crate) fn insert(&mut self, mut sentence: Sentence) -> Result<Closure, Contradiction> {
        let settled: Vec<Cell> = sentence
            .cells()
            .iter()
            .copied()
            .filter(|&cell| self.is_mine(cell) || self.is_safe(cell))
            .collect();
        for cell in settled {
            if self.is_mine(cell) {
                sentence.mark_mine(cell)?;
            } else {
                sentence.mark_safe(cell)?;
            }
        }

        if !sentence.is_empty() {
            self.knowledge.insert(sentence);
        }
        self.close()
    }

    /// Runs direct and subset resolution until neither changes anything.
    ///
    /// Every productive step either grows a fact set or lowers the knowledge
    /// base's weight, so the loop ends. On an already closed state this is a
    /// single quiet round.
    pub(crate) fn close(&mut self) -> Result<Closure, Contradiction> {
        let mut closure = Closure::default();

        loop {
            closure.rounds += 1;
            let mut progress = false;

            loop {
                let (mines, safes) = self.knowledge.conclusions();
                let mut learned = false;
                for cell in mines {
                    if self.mark_mine(cell)? {
                        closure.mines += 1;
                        learned = true;
                    }
                }
                for cell in safes {
                    if self.mark_safe(cell)? {
                        closure.safes += 1;
                        learned = true;
                    }
                }
                if self.knowledge.prune_empty() > 0 {
                    progress = true;
                }
                if !learned {
                    break;
                }
                progress = true;
            }

            let rewrites = self.knowledge.resolve_subsets()?;
            if rewrites > 0 {
                closure.rewrites += rewrites;
                progress = true;
            }

            if !progress {
                break;
            }
        }

        debug!(
            rounds = closure.rounds,
            mines = closure.mines,
            safes = closure.safes,
            rewrites = closure.rewrites,
            sentences = self.knowledge.len(),
            "closure reached a fixed point"
        );
        Ok(closure)
    }
}
