#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Conflict analysis: first-UIP clause learning, learnt-clause minimisation
//! and final-conflict extraction for assumption solving.
//!
//! The analyser owns the scratch state shared by these walks: a `seen` bit
//! per variable and the stacks needed to unmark exactly the touched
//! variables afterwards, so each call resets in time proportional to what it
//! visited. Every public entry leaves `seen` all-zero.

use crate::sat::clause_storage::CRef;
use crate::sat::literal::{Lit, Variable};
use crate::sat::solver::Solver;
use bit_vec::BitVec;

/// Scratch state for the resolution walks.
#[derive(Debug, Clone, Default)]
pub(crate) struct Analyser {
    seen: BitVec,
    toclear: Vec<Lit>,
    stack: Vec<Lit>,
}

impl Analyser {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn init_var(&mut self) {
        self.seen.push(false);
    }

    fn is_seen(&self, v: Variable) -> bool {
        self.seen[v as usize]
    }

    fn set_seen(&mut self, v: Variable) {
        self.seen.set(v as usize, true);
    }

    fn unset_seen(&mut self, v: Variable) {
        self.seen.set(v as usize, false);
    }
}

impl Solver {
    /// Derives the first-UIP learnt clause from the conflicting clause
    /// `confl`, minimises it, and returns the level to backjump to.
    ///
    /// On return `out_learnt[0]` is the asserting literal; the clause is
    /// fully false under the current assignment.
    pub(crate) fn analyse(&mut self, confl: CRef, out_learnt: &mut Vec<Lit>) -> usize {
        let current_level = self.trail.decision_level();
        let mut path_c: u32 = 0;
        let mut p = Lit::UNDEF;
        let mut confl = confl;

        out_learnt.clear();
        out_learnt.push(Lit::UNDEF); // slot for the asserting literal
        let mut index = self.trail.len();

        loop {
            debug_assert_ne!(confl, CRef::UNDEF, "every resolved literal has a reason");
            if self.ca.clause(confl).learnt() {
                self.cla_bump_activity(confl);
            }

            let start = usize::from(p != Lit::UNDEF);
            for i in start..self.ca.clause(confl).len() {
                let q = self.ca.clause(confl).lit(i);
                let v = q.var();
                if !self.analyser.is_seen(v) && self.assignment.level(v) > 0 {
                    self.vsids.bump(v);
                    self.analyser.set_seen(v);
                    if self.assignment.level(v) as usize >= current_level {
                        path_c += 1;
                    } else {
                        out_learnt.push(q);
                    }
                }
            }

            // next trail literal taking part in the conflict
            loop {
                index -= 1;
                if self.analyser.is_seen(self.trail[index].var()) {
                    break;
                }
            }
            p = self.trail[index];
            confl = self.assignment.reason(p.var());
            self.analyser.unset_seen(p.var());
            path_c -= 1;
            if path_c == 0 {
                break;
            }
        }
        out_learnt[0] = !p;

        self.stats.max_literals += out_learnt.len() as u64;
        self.minimise(out_learnt);
        self.stats.tot_literals += out_learnt.len() as u64;

        // compute the backjump level and move its literal to slot 1
        let backtrack_level = if out_learnt.len() == 1 {
            0
        } else {
            let mut max_i = 1;
            for i in 2..out_learnt.len() {
                if self.assignment.level(out_learnt[i].var())
                    > self.assignment.level(out_learnt[max_i].var())
                {
                    max_i = i;
                }
            }
            out_learnt.swap(1, max_i);
            self.assignment.level(out_learnt[1].var()) as usize
        };

        for i in 0..self.analyser.toclear.len() {
            let v = self.analyser.toclear[i].var();
            self.analyser.unset_seen(v);
        }
        self.analyser.toclear.clear();

        backtrack_level
    }

    /// Shrinks the learnt clause according to the configured minimisation
    /// mode: 0 keeps it, 1 drops literals whose whole reason already appears
    /// in the clause, 2 additionally follows reasons recursively.
    fn minimise(&mut self, out_learnt: &mut Vec<Lit>) {
        self.analyser.toclear.clear();
        self.analyser.toclear.extend(out_learnt.iter().copied());

        match self.config.ccmin_mode {
            2 => {
                let mut abstract_levels: u32 = 0;
                for &l in out_learnt.iter().skip(1) {
                    abstract_levels |= self.abstract_level(l.var());
                }
                let mut j = 1;
                for i in 1..out_learnt.len() {
                    let l = out_learnt[i];
                    if self.assignment.reason(l.var()) == CRef::UNDEF
                        || !self.lit_redundant(l, abstract_levels)
                    {
                        out_learnt[j] = l;
                        j += 1;
                    }
                }
                out_learnt.truncate(j);
            }
            1 => {
                let mut j = 1;
                for i in 1..out_learnt.len() {
                    let l = out_learnt[i];
                    let reason = self.assignment.reason(l.var());
                    if reason == CRef::UNDEF || !self.reason_is_absorbed(reason) {
                        out_learnt[j] = l;
                        j += 1;
                    }
                }
                out_learnt.truncate(j);
            }
            _ => {}
        }
    }

    /// Whether every literal of `reason` past the propagated one is already
    /// part of the learnt clause or assigned at the top level.
    fn reason_is_absorbed(&self, reason: CRef) -> bool {
        let c = self.ca.clause(reason);
        for i in 1..c.len() {
            let v = c.lit(i).var();
            if !self.analyser.is_seen(v) && self.assignment.level(v) > 0 {
                return false;
            }
        }
        true
    }

    /// One-bit-per-level hash of the variable's decision level, used to prune
    /// the recursive minimisation walk.
    fn abstract_level(&self, v: Variable) -> u32 {
        1 << (self.assignment.level(v) & 31)
    }

    /// Whether `p` is redundant in the learnt clause: every path from `p`
    /// through reasons reaches literals that are in the clause, already
    /// marked, or at level 0. On failure, unmarks exactly what this walk
    /// marked.
    fn lit_redundant(&mut self, p: Lit, abstract_levels: u32) -> bool {
        self.analyser.stack.clear();
        self.analyser.stack.push(p);
        let top = self.analyser.toclear.len();

        while let Some(last) = self.analyser.stack.pop() {
            let cref = self.assignment.reason(last.var());
            debug_assert_ne!(cref, CRef::UNDEF);

            for i in 1..self.ca.clause(cref).len() {
                let q = self.ca.clause(cref).lit(i);
                let v = q.var();
                if self.analyser.is_seen(v) || self.assignment.level(v) == 0 {
                    continue;
                }
                if self.assignment.reason(v) != CRef::UNDEF
                    && self.abstract_level(v) & abstract_levels != 0
                {
                    self.analyser.set_seen(v);
                    self.analyser.stack.push(q);
                    self.analyser.toclear.push(q);
                } else {
                    // dead end: roll back the marks of this walk
                    for k in top..self.analyser.toclear.len() {
                        let u = self.analyser.toclear[k].var();
                        self.analyser.seen.set(u as usize, false);
                    }
                    self.analyser.toclear.truncate(top);
                    return false;
                }
            }
        }
        true
    }

    /// Collects the assumptions that entail `!p`, walking the reason graph
    /// from `p` down to decisions. The result lands in `self.conflict`.
    pub(crate) fn analyse_final(&mut self, p: Lit) {
        self.conflict.clear();
        self.conflict.push(p);
        if self.trail.decision_level() == 0 {
            return;
        }

        self.analyser.set_seen(p.var());
        for i in (self.trail.level_start(1)..self.trail.len()).rev() {
            let x = self.trail[i];
            let v = x.var();
            if !self.analyser.is_seen(v) {
                continue;
            }
            let reason = self.assignment.reason(v);
            if reason == CRef::UNDEF {
                debug_assert!(self.assignment.level(v) > 0);
                self.conflict.push(!x);
            } else {
                for k in 1..self.ca.clause(reason).len() {
                    let q = self.ca.clause(reason).lit(k);
                    if self.assignment.level(q.var()) > 0 {
                        self.analyser.set_seen(q.var());
                    }
                }
            }
            self.analyser.unset_seen(v);
        }
        self.analyser.unset_seen(p.var());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::configs::SolverConfig;
    use crate::sat::literal::LBool;

    fn solver(ccmin_mode: u32, clauses: &[&[i32]]) -> Solver {
        let mut s = Solver::new(SolverConfig {
            ccmin_mode,
            ..SolverConfig::without_simplification()
        });
        for c in clauses {
            s.add_dimacs_clause(c).unwrap();
        }
        s
    }

    fn decide(s: &mut Solver, l: i32) {
        s.trail.new_decision_level();
        s.unchecked_enqueue(Lit::from_dimacs(l), CRef::UNDEF);
    }

    /// Classic diamond: deciding 1 forces 2 and 3, which conflict.
    fn diamond(ccmin_mode: u32) -> (Solver, CRef) {
        let mut s = solver(ccmin_mode, &[&[-1, 2], &[-1, 3], &[-2, -3]]);
        decide(&mut s, 1);
        let confl = s.propagate();
        assert_ne!(confl, CRef::UNDEF);
        (s, confl)
    }

    #[test]
    fn test_first_uip_is_the_decision_here() {
        let (mut s, confl) = diamond(2);
        let mut learnt = Vec::new();
        let bt = s.analyse(confl, &mut learnt);

        assert_eq!(learnt, vec![Lit::from_dimacs(-1)]);
        assert_eq!(bt, 0);
    }

    #[test]
    fn test_learnt_clause_is_false_under_assignment() {
        let (mut s, confl) = diamond(2);
        let mut learnt = Vec::new();
        s.analyse(confl, &mut learnt);
        for &l in &learnt {
            assert_eq!(s.assignment.value(l), LBool::False);
        }
    }

    #[test]
    fn test_minimisation_drops_dominated_literal() {
        // level 1: deciding 1 forces 2. level 2: deciding 3 forces 4 and
        // then 5; the conflict pulls both level-1 literals into the learnt
        // clause, where -2 is redundant given -1.
        let clauses: &[&[i32]] = &[&[-1, 2], &[-3, 4], &[-4, -2, 5], &[-5, -4, -1]];
        for mode in [0, 1, 2] {
            let mut s = solver(mode, clauses);
            decide(&mut s, 1);
            assert_eq!(s.propagate(), CRef::UNDEF);
            decide(&mut s, 3);
            let confl = s.propagate();
            assert_ne!(confl, CRef::UNDEF);

            let mut learnt = Vec::new();
            let bt = s.analyse(confl, &mut learnt);
            assert_eq!(bt, 1);
            assert_eq!(learnt[0], Lit::from_dimacs(-4));
            if mode == 0 {
                assert_eq!(learnt.len(), 3);
                assert!(learnt.contains(&Lit::from_dimacs(-2)));
            } else {
                // -2 follows from -1 through its reason, so it is dropped
                assert_eq!(learnt.len(), 2);
                assert!(learnt.contains(&Lit::from_dimacs(-1)));
            }
        }
    }

    #[test]
    fn test_seen_is_clear_after_analyse() {
        let (mut s, confl) = diamond(2);
        let mut learnt = Vec::new();
        s.analyse(confl, &mut learnt);
        for v in 0..s.num_vars() {
            #[allow(clippy::cast_possible_truncation)]
            let v = v as Variable;
            assert!(!s.analyser.is_seen(v));
        }
    }

    #[test]
    fn test_analyse_final_collects_assumption_chain() {
        let mut s = solver(2, &[&[-1, 2], &[-2, 3]]);
        // assumption levels: 1 forces 2 and 3
        s.trail.new_decision_level();
        s.unchecked_enqueue(Lit::from_dimacs(1), CRef::UNDEF);
        assert_eq!(s.propagate(), CRef::UNDEF);

        // pretend -3 was the failing assumption
        s.analyse_final(Lit::from_dimacs(3));
        assert!(s.conflict.contains(&Lit::from_dimacs(3)));
        assert!(s.conflict.contains(&Lit::from_dimacs(-1)));
        assert_eq!(s.conflict.len(), 2);
    }
}
