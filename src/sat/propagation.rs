#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Two-watched-literal unit propagation.
//!
//! Propagation consumes the trail from the queue head forward. For each newly
//! true literal `p`, the watcher list of `p` is scanned: each entry's clause
//! watches `!p` and must either be satisfied by its blocker, find a
//! replacement watcher, propagate its remaining literal, or report a
//! conflict. The watcher invariant — a stored clause's first two literals are
//! its watchers, and both lists hold an entry for it — is restored on every
//! path out of the scan.

use crate::sat::clause_storage::CRef;
use crate::sat::literal::LBool;
use crate::sat::solver::Solver;
use crate::sat::watch::Watcher;

impl Solver {
    /// Propagates every enqueued assignment to a fixpoint.
    ///
    /// Returns the conflicting clause, or `CRef::UNDEF` if the assignment is
    /// closed under unit propagation.
    pub(crate) fn propagate(&mut self) -> CRef {
        let mut confl = CRef::UNDEF;
        let mut num_props: u64 = 0;

        'queue: while self.trail.qhead < self.trail.len() {
            let p = self.trail[self.trail.qhead];
            self.trail.qhead += 1;
            num_props += 1;

            self.watches.clean(p, &self.ca);
            let false_lit = !p;
            let mut i = 0;
            let mut j = 0;

            'watchers: while i < self.watches[p].len() {
                let Watcher { cref, blocker } = self.watches[p][i];

                // satisfied via the blocker, without touching the clause
                if self.assignment.value(blocker) == LBool::True {
                    self.watches[p][j] = Watcher::new(cref, blocker);
                    j += 1;
                    i += 1;
                    continue 'watchers;
                }

                // make sure the false literal sits in slot 1
                {
                    let mut c = self.ca.clause_mut(cref);
                    if c.lit(0) == false_lit {
                        c.swap(0, 1);
                    }
                    debug_assert_eq!(c.lit(1), false_lit);
                }
                let first = self.ca.clause(cref).lit(0);
                let w = Watcher::new(cref, first);
                i += 1;

                if first != blocker && self.assignment.value(first) == LBool::True {
                    self.watches[p][j] = w;
                    j += 1;
                    continue 'watchers;
                }

                // look for a replacement watcher
                let len = self.ca.clause(cref).len();
                for k in 2..len {
                    let lk = self.ca.clause(cref).lit(k);
                    if self.assignment.value(lk) != LBool::False {
                        let mut c = self.ca.clause_mut(cref);
                        c.set_lit(1, lk);
                        c.set_lit(k, false_lit);
                        self.watches[!lk].push(w);
                        continue 'watchers;
                    }
                }

                // no replacement: unit or conflicting under `first`
                self.watches[p][j] = w;
                j += 1;
                if self.assignment.value(first) == LBool::False {
                    confl = cref;
                    self.trail.qhead = self.trail.len();
                    // keep the unscanned entries, preserving their order
                    while i < self.watches[p].len() {
                        let rest = self.watches[p][i];
                        self.watches[p][j] = rest;
                        j += 1;
                        i += 1;
                    }
                    self.watches[p].truncate(j);
                    break 'queue;
                }
                self.unchecked_enqueue(first, cref);
            }
            self.watches[p].truncate(j);
        }

        self.stats.propagations += num_props;
        #[allow(clippy::cast_possible_wrap)]
        {
            self.simp_db_props -= num_props as i64;
        }
        confl
    }
}
