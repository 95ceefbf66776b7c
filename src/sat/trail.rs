#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The assignment trail: the stack of literals made true, with decision-level
//! markers and the propagation queue head.

use crate::sat::literal::Lit;
use std::ops::Index;

/// Append-only stack of assigned literals. `lim[k]` is the trail length at
/// which decision level `k + 1` began; positions before `lim[0]` are
/// top-level facts. The slice `[qhead, len)` is the pending propagation
/// queue.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    trail: Vec<Lit>,
    lim: Vec<usize>,
    pub(crate) qhead: usize,
}

impl Trail {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trail.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    /// The current decision level.
    #[must_use]
    pub fn decision_level(&self) -> usize {
        self.lim.len()
    }

    /// Opens a new decision level at the current trail position.
    pub fn new_decision_level(&mut self) {
        self.lim.push(self.trail.len());
    }

    /// The trail index at which `level` began. `level` must be at least 1.
    #[must_use]
    pub fn level_start(&self, level: usize) -> usize {
        self.lim[level - 1]
    }

    /// The trail index at which the current (innermost) level began.
    #[must_use]
    pub fn current_level_start(&self) -> usize {
        self.lim.last().copied().unwrap_or(0)
    }

    pub(crate) fn push(&mut self, l: Lit) {
        self.trail.push(l);
    }

    /// Truncates the trail back to the start of `level + 1` and resets the
    /// queue head. Undoing the per-variable state of the popped literals is
    /// the caller's job.
    pub(crate) fn shrink_to_level(&mut self, level: usize) {
        let new_len = self.lim[level];
        self.trail.truncate(new_len);
        self.lim.truncate(level);
        self.qhead = new_len;
    }

    /// Iterates the trail from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = Lit> + '_ {
        self.trail.iter().copied()
    }
}

impl Index<usize> for Trail {
    type Output = Lit;

    fn index(&self, index: usize) -> &Self::Output {
        &self.trail[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bookkeeping() {
        let mut t = Trail::new();
        t.push(Lit::from_dimacs(1));
        assert_eq!(t.decision_level(), 0);

        t.new_decision_level();
        t.push(Lit::from_dimacs(2));
        t.push(Lit::from_dimacs(3));
        t.new_decision_level();
        t.push(Lit::from_dimacs(4));

        assert_eq!(t.decision_level(), 2);
        assert_eq!(t.level_start(1), 1);
        assert_eq!(t.level_start(2), 3);
        assert_eq!(t.current_level_start(), 3);
        assert_eq!(t.len(), 4);

        t.shrink_to_level(0);
        assert_eq!(t.decision_level(), 0);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0], Lit::from_dimacs(1));
        assert_eq!(t.qhead, 1);
    }
}
