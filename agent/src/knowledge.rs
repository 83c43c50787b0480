use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;

use itertools::Itertools;
use tracing::trace;

use crate::Cell;
use crate::error::Contradiction;
use crate::sentence::Sentence;

/// The sentences an agent currently holds, in insertion order.
///
/// Sentences are owned here and only ever changed through explicit traversals,
/// so a mark reaches every sentence that mentions the cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    sentences: Vec<Sentence>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn as_slice(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Total number of cell mentions across all sentences.
    pub fn weight(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }

    pub(crate) fn insert(&mut self, sentence: Sentence) {
        self.sentences.push(sentence);
    }

    /// Removes `cell` from every sentence as a mine. Returns how many changed.
    pub(crate) fn mark_mine(&mut self, cell: Cell) -> Result<usize, Contradiction> {
        let mut touched = 0;
        for sentence in &mut self.sentences {
            if sentence.mark_mine(cell)? {
                touched += 1;
            }
        }
        Ok(touched)
    }

    /// Removes `cell` from every sentence as a safe cell. Returns how many changed.
    pub(crate) fn mark_safe(&mut self, cell: Cell) -> Result<usize, Contradiction> {
        let mut touched = 0;
        for sentence in &mut self.sentences {
            if sentence.mark_safe(cell)? {
                touched += 1;
            }
        }
        Ok(touched)
    }

    /// Every cell some sentence proves to be a mine, and every cell some
    /// sentence proves to be safe.
    pub(crate) fn conclusions(&self) -> (BTreeSet<Cell>, BTreeSet<Cell>) {
        let mines = self
            .sentences
            .iter()
            .filter_map(Sentence::known_mines)
            .flatten()
            .copied()
            .collect();
        let safes = self
            .sentences
            .iter()
            .filter_map(Sentence::known_safes)
            .flatten()
            .copied()
            .collect();
        (mines, safes)
    }

    /// Drops fully resolved sentences. Returns how many were dropped.
    pub(crate) fn prune_empty(&mut self) -> usize {
        let before = self.sentences.len();
        self.sentences.retain(|sentence| !sentence.is_empty());
        before - self.sentences.len()
    }

    /// Drops later copies of content-equal sentences.
    ///
    /// Two sentences over the same cells with different counts cannot both hold.
    pub(crate) fn dedup(&mut self) -> Result<usize, Contradiction> {
        let mut keep = Vec::with_capacity(self.sentences.len());
        {
            let mut seen: BTreeMap<&BTreeSet<Cell>, usize> = BTreeMap::new();
            for sentence in &self.sentences {
                match seen.entry(sentence.cells()) {
                    Entry::Occupied(entry) if *entry.get() == sentence.count() => keep.push(false),
                    Entry::Occupied(entry) => {
                        return Err(Contradiction::Mismatch {
                            cells: sentence.len(),
                            first: *entry.get(),
                            second: sentence.count(),
                        });
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(sentence.count());
                        keep.push(true);
                    }
                }
            }
        }

        let before = self.sentences.len();
        let mut keep = keep.into_iter();
        self.sentences.retain(|_| keep.next().unwrap_or(true));
        Ok(before - self.sentences.len())
    }

    /// One sweep of subset resolution over every ordered pair of sentences.
    ///
    /// Whenever a non-empty `small` is a strict subset of `large`, `large` is
    /// replaced by the sentence over `large - small`. Returns the number of
    /// sentences removed or rewritten; zero means the sweep found nothing.
    pub(crate) fn resolve_subsets(&mut self) -> Result<usize, Contradiction> {
        let mut changes = self.dedup()?;

        let n = self.sentences.len();
        for (i, j) in (0..n).cartesian_product(0..n) {
            if i == j {
                continue;
            }
            let (small, large) = (&self.sentences[i], &self.sentences[j]);
            if small.is_empty() || small.len() >= large.len() || !small.is_subset(large) {
                continue;
            }

            let derived = small.difference(large)?;
            trace!(%small, %large, %derived, "subset resolution");
            self.sentences[j] = derived;
            changes += 1;
        }

        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
        coords.iter().map(|&(row, col)| Cell::new(row, col)).collect()
    }

    fn sentence(coords: &[(usize, usize)], count: usize) -> Sentence {
        Sentence::new(cells(coords), count).unwrap()
    }

    #[test]
    fn test_mark_reaches_every_sentence() {
        let mut kb = KnowledgeBase::new();
        kb.insert(sentence(&[(0, 0), (0, 1)], 1));
        kb.insert(sentence(&[(0, 1), (0, 2)], 1));
        kb.insert(sentence(&[(5, 5), (5, 6)], 1));

        assert_eq!(kb.mark_mine(Cell::new(0, 1)), Ok(2));
        assert_eq!(kb.as_slice()[0], sentence(&[(0, 0)], 0));
        assert_eq!(kb.as_slice()[1], sentence(&[(0, 2)], 0));
        assert_eq!(kb.as_slice()[2], sentence(&[(5, 5), (5, 6)], 1));

        assert_eq!(kb.mark_safe(Cell::new(5, 5)), Ok(1));
        assert_eq!(kb.as_slice()[2], sentence(&[(5, 6)], 1));
    }

    #[test]
    fn test_conclusions() {
        let mut kb = KnowledgeBase::new();
        kb.insert(sentence(&[(0, 0), (0, 1)], 2));
        kb.insert(sentence(&[(1, 0), (1, 1)], 0));
        kb.insert(sentence(&[(2, 0), (2, 1)], 1));

        let (mines, safes) = kb.conclusions();
        assert_eq!(mines, cells(&[(0, 0), (0, 1)]).into_iter().collect());
        assert_eq!(safes, cells(&[(1, 0), (1, 1)]).into_iter().collect());
    }

    #[test]
    fn test_prune_empty() {
        let mut kb = KnowledgeBase::new();
        kb.insert(sentence(&[(0, 0)], 0));
        kb.insert(sentence(&[(1, 1), (1, 2)], 1));
        kb.mark_safe(Cell::new(0, 0)).unwrap();

        assert_eq!(kb.prune_empty(), 1);
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.weight(), 2);
    }

    #[test]
    fn test_dedup_keeps_first_copy() {
        let mut kb = KnowledgeBase::new();
        kb.insert(sentence(&[(0, 0), (0, 1)], 1));
        kb.insert(sentence(&[(2, 2), (2, 3)], 1));
        kb.insert(sentence(&[(0, 1), (0, 0)], 1));

        assert_eq!(kb.dedup(), Ok(1));
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.as_slice()[1], sentence(&[(2, 2), (2, 3)], 1));
    }

    #[test]
    fn test_dedup_detects_mismatch() {
        let mut kb = KnowledgeBase::new();
        kb.insert(sentence(&[(0, 0), (0, 1)], 1));
        kb.insert(sentence(&[(0, 0), (0, 1)], 2));

        assert_eq!(
            kb.dedup(),
            Err(Contradiction::Mismatch { cells: 2, first: 1, second: 2 })
        );
    }

    #[test]
    fn test_resolve_subsets_rewrites_superset() {
        let mut kb = KnowledgeBase::new();
        kb.insert(sentence(&[(0, 0), (0, 1), (0, 2)], 2));
        kb.insert(sentence(&[(0, 0), (0, 1)], 1));

        assert_eq!(kb.resolve_subsets(), Ok(1));
        assert_eq!(kb.as_slice()[0], sentence(&[(0, 2)], 1));
        assert_eq!(kb.as_slice()[1], sentence(&[(0, 0), (0, 1)], 1));

        // Nothing left to resolve.
        assert_eq!(kb.resolve_subsets(), Ok(0));
    }

    #[test]
    fn test_resolve_subsets_ignores_disjoint_and_overlapping() {
        let mut kb = KnowledgeBase::new();
        kb.insert(sentence(&[(0, 0), (0, 1)], 1));
        kb.insert(sentence(&[(0, 1), (0, 2)], 1));
        kb.insert(sentence(&[(4, 4)], 0));

        let before = kb.clone();
        assert_eq!(kb.resolve_subsets(), Ok(0));
        assert_eq!(kb, before);
    }

    #[test]
    fn test_resolve_subsets_surfaces_negative_difference() {
        let mut kb = KnowledgeBase::new();
        kb.insert(sentence(&[(0, 0), (0, 1)], 2));
        kb.insert(sentence(&[(0, 0), (0, 1), (0, 2)], 1));

        assert_eq!(
            kb.resolve_subsets(),
            Err(Contradiction::Underflow { count: 1, removed: 2 })
        );
    }
}
