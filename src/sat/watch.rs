#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Per-literal watcher lists and per-variable occurrence lists.
//!
//! Watcher entries pair a clause reference with a blocker literal: some other
//! literal of the clause that, when true, lets propagation skip the clause
//! without touching the arena. Both list kinds are cleaned lazily; removing a
//! clause only marks its lists dirty, and entries pointing at removed clauses
//! are filtered out on the next lookup.

use crate::sat::clause::MARK_REMOVED;
use crate::sat::clause_storage::{CRef, ClauseAllocator};
use crate::sat::literal::{Lit, Variable};
use std::ops::{Index, IndexMut};

/// One entry in a watcher list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watcher {
    /// The watched clause.
    pub cref: CRef,
    /// A cached literal of the clause; if it is currently true the clause is
    /// satisfied and need not be inspected.
    pub blocker: Lit,
}

impl Watcher {
    #[must_use]
    pub const fn new(cref: CRef, blocker: Lit) -> Self {
        Self { cref, blocker }
    }
}

/// The watcher lists, indexed by the packed literal encoding.
#[derive(Debug, Clone, Default)]
pub struct WatchLists {
    lists: Vec<Vec<Watcher>>,
    dirty: Vec<bool>,
    dirties: Vec<Lit>,
}

impl WatchLists {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the lists for one fresh variable (two literals).
    pub fn init_var(&mut self) {
        self.lists.push(Vec::new());
        self.lists.push(Vec::new());
        self.dirty.push(false);
        self.dirty.push(false);
    }

    /// Marks `l`'s list as containing entries for removed clauses.
    pub fn smudge(&mut self, l: Lit) {
        if !self.dirty[l.index()] {
            self.dirty[l.index()] = true;
            self.dirties.push(l);
        }
    }

    /// Drops entries for removed clauses from `l`'s list, if it is dirty.
    pub fn clean(&mut self, l: Lit, ca: &ClauseAllocator) {
        if self.dirty[l.index()] {
            self.lists[l.index()].retain(|w| ca.clause(w.cref).mark() != MARK_REMOVED);
            self.dirty[l.index()] = false;
        }
    }

    /// Cleans every dirty list. Required before relocating clause references.
    pub fn clean_all(&mut self, ca: &ClauseAllocator) {
        let dirties = std::mem::take(&mut self.dirties);
        for l in dirties {
            self.clean(l, ca);
        }
    }

    /// Removes the exact entry watching `cref` from `l`'s list, preserving
    /// the order of the remaining entries.
    ///
    /// # Panics
    ///
    /// Panics if no such entry exists.
    pub fn remove(&mut self, l: Lit, cref: CRef) {
        let list = &mut self.lists[l.index()];
        let at = list
            .iter()
            .position(|w| w.cref == cref)
            .expect("watcher to remove is present");
        list.remove(at);
    }

    /// Relocates every watched clause reference into `to`.
    pub fn reloc_all(&mut self, ca: &mut ClauseAllocator, to: &mut ClauseAllocator) {
        for list in &mut self.lists {
            for w in list.iter_mut() {
                ca.reloc(&mut w.cref, to);
            }
        }
    }
}

impl Index<Lit> for WatchLists {
    type Output = Vec<Watcher>;

    fn index(&self, l: Lit) -> &Self::Output {
        &self.lists[l.index()]
    }
}

impl IndexMut<Lit> for WatchLists {
    fn index_mut(&mut self, l: Lit) -> &mut Self::Output {
        &mut self.lists[l.index()]
    }
}

/// Per-variable occurrence lists over problem clauses, used by the
/// simplifier. Same lazy-cleaning scheme as the watcher lists.
#[derive(Debug, Clone, Default)]
pub struct OccLists {
    lists: Vec<Vec<CRef>>,
    dirty: Vec<bool>,
    dirties: Vec<Variable>,
}

impl OccLists {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_var(&mut self) {
        self.lists.push(Vec::new());
        self.dirty.push(false);
    }

    pub fn push(&mut self, v: Variable, cref: CRef) {
        self.lists[v as usize].push(cref);
    }

    pub fn smudge(&mut self, v: Variable) {
        if !self.dirty[v as usize] {
            self.dirty[v as usize] = true;
            self.dirties.push(v);
        }
    }

    /// The occurrence list of `v`, cleaned of removed clauses first.
    pub fn lookup(&mut self, v: Variable, ca: &ClauseAllocator) -> &Vec<CRef> {
        if self.dirty[v as usize] {
            self.lists[v as usize].retain(|&cref| ca.clause(cref).mark() != MARK_REMOVED);
            self.dirty[v as usize] = false;
        }
        &self.lists[v as usize]
    }

    /// The current occurrence list of `v` without cleaning.
    #[must_use]
    pub fn occurrences(&self, v: Variable) -> &Vec<CRef> {
        &self.lists[v as usize]
    }

    /// Removes the exact entry for `cref` from `v`'s list.
    pub fn remove(&mut self, v: Variable, cref: CRef) {
        self.lists[v as usize].retain(|&c| c != cref);
    }

    /// Drops `v`'s list entirely (after the variable has been eliminated).
    pub fn clear_var(&mut self, v: Variable) {
        self.lists[v as usize] = Vec::new();
        self.dirty[v as usize] = false;
    }

    pub fn clean_all(&mut self, ca: &ClauseAllocator) {
        let dirties = std::mem::take(&mut self.dirties);
        for v in dirties {
            if self.dirty[v as usize] {
                self.lists[v as usize].retain(|&cref| ca.clause(cref).mark() != MARK_REMOVED);
                self.dirty[v as usize] = false;
            }
        }
    }

    /// Relocates every clause reference into `to`.
    pub fn reloc_all(&mut self, ca: &mut ClauseAllocator, to: &mut ClauseAllocator) {
        for list in &mut self.lists {
            for cref in list.iter_mut() {
                ca.reloc(cref, to);
            }
        }
    }
}
