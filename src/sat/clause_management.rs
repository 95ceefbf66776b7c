#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Learnt-database reduction, top-level simplification and arena compaction.

use crate::sat::clause::MARK_REMOVED;
use crate::sat::clause_storage::{CRef, ClauseAllocator};
use crate::sat::literal::{LBool, Variable};
use crate::sat::solver::Solver;
use log::debug;
use ordered_float::OrderedFloat;

impl Solver {
    /// Removes roughly half of the learnt clauses, keeping binary clauses,
    /// locked clauses and everything above the average activity.
    pub(crate) fn reduce_db(&mut self) {
        #[allow(clippy::cast_precision_loss)]
        let extra_lim = self.cla_inc / self.learnts.len() as f64;

        let mut learnts = std::mem::take(&mut self.learnts);
        // worst first: long clauses with low activity, ties by reference for
        // reproducible runs
        learnts.sort_by_key(|&cref| {
            let c = self.ca.clause(cref);
            (u8::from(c.len() <= 2), OrderedFloat(c.activity()), cref)
        });

        let mid = learnts.len() / 2;
        let mut kept = 0;
        for i in 0..learnts.len() {
            let cref = learnts[i];
            let c = self.ca.clause(cref);
            let len = c.len();
            let act = f64::from(c.activity());
            if len > 2 && !self.locked(cref) && (i < mid || act < extra_lim) {
                self.remove_clause(cref);
            } else {
                learnts[kept] = cref;
                kept += 1;
            }
        }
        learnts.truncate(kept);
        self.learnts = learnts;

        self.check_garbage();
    }

    /// Removes clauses satisfied at the top level from `learnts` or
    /// `clauses`; surviving clauses lose their false literals beyond the
    /// watched pair while occurrence tracking is off.
    fn remove_satisfied_clauses(&mut self, learnt: bool) {
        let mut refs = if learnt {
            std::mem::take(&mut self.learnts)
        } else {
            std::mem::take(&mut self.clauses)
        };

        let mut kept = 0;
        for i in 0..refs.len() {
            let cref = refs[i];
            // entries removed by the simplifier linger until compaction
            if self.ca.clause(cref).mark() == MARK_REMOVED {
                continue;
            }
            if self.satisfied(cref) {
                self.remove_clause(cref);
                continue;
            }
            debug_assert!(
                self.assignment.value(self.ca.clause(cref).lit(0)).is_undef()
                    && self.assignment.value(self.ca.clause(cref).lit(1)).is_undef()
            );
            if !self.config.use_simplification {
                let mut k = 2;
                while k < self.ca.clause(cref).len() {
                    let l = self.ca.clause(cref).lit(k);
                    if self.assignment.value(l) == LBool::False {
                        self.ca.clause_mut(cref).swap_remove_lit(k);
                    } else {
                        k += 1;
                    }
                }
            }
            refs[kept] = cref;
            kept += 1;
        }
        refs.truncate(kept);

        if learnt {
            self.learnts = refs;
        } else {
            self.clauses = refs;
        }
    }

    /// Top-level simplification: drops clauses satisfied at level 0. Only
    /// runs when new top-level facts arrived since the last call. Returns
    /// `false` when the formula is unsatisfiable.
    pub(crate) fn simplify(&mut self) -> bool {
        debug_assert_eq!(self.trail.decision_level(), 0);
        if !self.ok || self.propagate() != CRef::UNDEF {
            self.ok = false;
            return false;
        }

        #[allow(clippy::cast_possible_wrap)]
        if self.num_assigns() as i64 == self.simp_db_assigns || self.simp_db_props > 0 {
            return true;
        }

        self.remove_satisfied_clauses(true);
        if self.remove_satisfied {
            self.remove_satisfied_clauses(false);
        }
        self.check_garbage();
        self.rebuild_order_heap();

        #[allow(clippy::cast_possible_wrap)]
        {
            self.simp_db_assigns = self.num_assigns() as i64;
            self.simp_db_props = (self.stats.clauses_literals + self.stats.learnts_literals) as i64;
        }
        true
    }

    pub(crate) fn rebuild_order_heap(&mut self) {
        #[allow(clippy::cast_possible_truncation)]
        let vars: Vec<Variable> = (0..self.num_vars() as Variable)
            .filter(|&v| {
                self.assignment.decision[v as usize] && self.assignment.var_value(v).is_undef()
            })
            .collect();
        self.vsids.rebuild(vars);
    }

    /// Compacts the arena when the configured fraction of it is wasted.
    pub(crate) fn check_garbage(&mut self) {
        self.check_garbage_frac(self.config.garbage_frac);
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn check_garbage_frac(&mut self, frac: f64) {
        if self.ca.wasted() as f64 > self.ca.len() as f64 * frac {
            self.garbage_collect();
        }
    }

    /// Copies all live clauses into a fresh arena and rewrites every clause
    /// reference held by the solver.
    pub(crate) fn garbage_collect(&mut self) {
        let mut to = ClauseAllocator::with_capacity(self.ca.len() - self.ca.wasted());
        to.set_extra_clause_field(self.ca.extra_clause_field());
        self.reloc_all(&mut to);
        if self.config.verbosity >= 2 {
            eprintln!(
                "|  Garbage collection:   {:12} bytes => {:12} bytes             |",
                self.ca.len() * 4,
                to.len() * 4
            );
        }
        debug!(
            "garbage collect: {} -> {} words",
            self.ca.len(),
            to.len()
        );
        self.ca = to;
    }

    fn reloc_all(&mut self, to: &mut ClauseAllocator) {
        // occurrence lists and the subsumption queue, while the simplifier
        // owns the database
        if self.config.use_simplification {
            let simp = &mut self.simp;
            let ca = &mut self.ca;
            simp.occurs.clean_all(ca);
            simp.occurs.reloc_all(ca, to);
            for cref in &mut simp.subsumption_queue {
                ca.reloc(cref, to);
            }
            if simp.bwdsub_tmpunit != CRef::UNDEF {
                ca.reloc(&mut simp.bwdsub_tmpunit, to);
            }
        }

        // watcher lists
        self.watches.clean_all(&self.ca);
        self.watches.reloc_all(&mut self.ca, to);

        // reasons of assigned variables
        for i in 0..self.trail.len() {
            let v = self.trail[i].var();
            let mut reason = self.assignment.reason(v);
            if reason != CRef::UNDEF {
                debug_assert_ne!(self.ca.clause(reason).mark(), MARK_REMOVED);
                self.ca.reloc(&mut reason, to);
                self.assignment.set_reason(v, reason);
            }
        }

        // the clause lists themselves, dropping entries freed since the last
        // collection
        let mut learnts = std::mem::take(&mut self.learnts);
        learnts.retain(|cref| self.ca.clause(*cref).mark() != MARK_REMOVED);
        for cref in &mut learnts {
            self.ca.reloc(cref, to);
        }
        self.learnts = learnts;

        let mut clauses = std::mem::take(&mut self.clauses);
        clauses.retain(|cref| self.ca.clause(*cref).mark() != MARK_REMOVED);
        for cref in &mut clauses {
            self.ca.reloc(cref, to);
        }
        self.clauses = clauses;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::configs::SolverConfig;
    use crate::sat::literal::Lit;

    fn solver(clauses: &[&[i32]]) -> Solver {
        let mut s = Solver::new(SolverConfig::without_simplification());
        for c in clauses {
            s.add_dimacs_clause(c).unwrap();
        }
        s
    }

    #[test]
    fn test_simplify_removes_satisfied_clauses() {
        let mut s = solver(&[&[1, 2], &[2, 3], &[1]]);
        assert!(s.simplify());
        // the unit 1 satisfies clause [1, 2]
        assert_eq!(s.num_clauses(), 1);
    }

    #[test]
    fn test_simplify_strips_false_literals() {
        let mut s = solver(&[&[1, 2, 3], &[-1]]);
        assert!(s.simplify());
        assert_eq!(s.num_clauses(), 1);
        assert_eq!(s.ca.clause(s.clauses[0]).len(), 2);
    }

    #[test]
    fn test_garbage_collection_preserves_clauses() {
        let mut s = solver(&[&[1, 2], &[2, 3], &[3, 4], &[4, 5]]);
        let before: Vec<Vec<Lit>> = s
            .clauses
            .iter()
            .map(|&cref| s.ca.clause(cref).iter().collect())
            .collect();

        // free half the arena, then force a collection
        let dead = s.clauses[1];
        s.remove_clause(dead);
        s.clauses.remove(1);
        s.garbage_collect();

        assert_eq!(s.ca.wasted(), 0);
        let after: Vec<Vec<Lit>> = s
            .clauses
            .iter()
            .map(|&cref| s.ca.clause(cref).iter().collect())
            .collect();
        assert_eq!(after.len(), 3);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[2]);
        assert_eq!(after[2], before[3]);
    }

    #[test]
    fn test_reduce_db_keeps_locked_and_binary_clauses() {
        let mut s = solver(&[]);
        s.ensure_var(5);
        // fabricate learnt clauses with varying activity
        for (lits, act) in [
            (vec![1, 2, 3], 0.1_f32),
            (vec![2, 3, 4], 5.0),
            (vec![3, 4, 5], 0.2),
            (vec![4, 5], 0.0),
        ] {
            let ps: Vec<Lit> = lits.iter().map(|&l| Lit::from_dimacs(l)).collect();
            let cref = s.ca.alloc(&ps, true).unwrap();
            s.learnts.push(cref);
            s.attach_clause(cref);
            s.ca.clause_mut(cref).set_activity(act);
        }

        s.reduce_db();

        // the binary clause always survives; the most active ternary too
        let survivors: Vec<usize> = s
            .learnts
            .iter()
            .map(|&cref| s.ca.clause(cref).len())
            .collect();
        assert!(survivors.contains(&2));
        assert!(s.learnts.len() < 4);
    }
}
