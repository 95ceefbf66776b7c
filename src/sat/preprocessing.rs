#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Pre- and inprocessing on top of the kernel: backward subsumption,
//! self-subsuming resolution and bounded variable elimination, driven by a
//! priority queue over elimination cost.
//!
//! The simplifier owns per-variable occurrence lists over the problem
//! clauses and keeps them in sync lazily through the clause mark bit.
//! Eliminated variables leave a reconstruction stack behind; after a
//! satisfiable solve the stack is replayed backwards to extend the model
//! over them.

use crate::sat::clause::{Subsumption, MARK_REMOVED, MARK_TOUCHED};
use crate::sat::clause_storage::{CRef, OutOfMemoryError};
use crate::sat::literal::{LBool, Lit, Variable};
use crate::sat::solver::Solver;
use crate::sat::variable_selection::IndexedHeap;
use crate::sat::watch::OccLists;
use log::debug;
use std::collections::VecDeque;
use std::sync::atomic::Ordering;

/// Simplifier state carried by the solver.
#[derive(Debug, Clone, Default)]
pub(crate) struct SimpState {
    pub merges: u64,
    pub asymm_lits: u64,
    pub eliminated_vars: u64,
    pub subsumed: u64,
    pub strengthened: u64,

    elim_heap: IndexedHeap,
    pub n_occ: Vec<i32>,
    pub occurs: OccLists,
    pub subsumption_queue: VecDeque<CRef>,
    pub touched: Vec<u8>,
    pub n_touched: usize,
    pub frozen: Vec<bool>,
    pub eliminated: Vec<bool>,
    pub elimclauses: Vec<u32>,
    pub bwdsub_assigns: usize,
    pub bwdsub_tmpunit: CRef,
}

/// Elimination cost ordering: fewest potential resolvents first, ties by
/// variable id.
fn elim_before(n_occ: &[i32], x: Variable, y: Variable) -> bool {
    let cost = |v: Variable| {
        i64::from(n_occ[Lit::positive(v).index()]) * i64::from(n_occ[(!Lit::positive(v)).index()])
    };
    let (cx, cy) = (cost(x), cost(y));
    cx < cy || (cx == cy && x < y)
}

impl SimpState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bwdsub_tmpunit: CRef::UNDEF,
            ..Self::default()
        }
    }

    pub fn init_var(&mut self, use_simplification: bool) {
        self.frozen.push(false);
        self.eliminated.push(false);
        if use_simplification {
            #[allow(clippy::cast_possible_truncation)]
            let v = self.eliminated.len() as Variable - 1;
            self.n_occ.push(0);
            self.n_occ.push(0);
            self.occurs.init_var();
            self.touched.push(0);
            self.elim_heap.init_var();
            let n_occ = &self.n_occ;
            self.elim_heap.insert(v, |x, y| elim_before(n_occ, x, y));
        }
    }

    #[must_use]
    pub fn is_eliminated(&self, v: Variable) -> bool {
        self.eliminated[v as usize]
    }

    #[must_use]
    pub fn elim_heap_len(&self) -> usize {
        self.elim_heap.len()
    }
}

impl Solver {
    /// Whether `v` has been eliminated by the simplifier.
    #[must_use]
    pub fn is_eliminated(&self, v: Variable) -> bool {
        self.simp.is_eliminated(v)
    }

    /// Number of variables eliminated so far.
    #[must_use]
    pub fn eliminated_vars(&self) -> u64 {
        self.simp.eliminated_vars
    }

    /// Protects `v` from elimination (or releases it again). Assumption
    /// variables are frozen automatically for the duration of a solve.
    pub fn set_frozen(&mut self, v: Variable, frozen: bool) {
        self.simp.frozen[v as usize] = frozen;
        if self.config.use_simplification && !frozen {
            self.update_elim_heap(v);
        }
    }

    /// Occurrence bookkeeping for a freshly added problem clause.
    pub(crate) fn simp_clause_added(&mut self, cref: CRef) {
        self.simp.subsumption_queue.push_back(cref);
        for i in 0..self.ca.clause(cref).len() {
            let l = self.ca.clause(cref).lit(i);
            let v = l.var();
            self.simp.occurs.push(v, cref);
            self.simp.n_occ[l.index()] += 1;
            self.simp.touched[v as usize] = 1;
            self.simp.n_touched += 1;
            if self.simp.elim_heap.in_heap(v) {
                let n_occ = &self.simp.n_occ;
                self.simp.elim_heap.update_down(v, |x, y| elim_before(n_occ, x, y));
            }
        }
    }

    /// Occurrence bookkeeping for a problem clause about to be removed.
    pub(crate) fn simp_clause_removed(&mut self, cref: CRef) {
        for l in self.ca.clause(cref).iter() {
            self.simp.n_occ[l.index()] -= 1;
        }
        for i in 0..self.ca.clause(cref).len() {
            let v = self.ca.clause(cref).lit(i).var();
            self.update_elim_heap(v);
            self.simp.occurs.smudge(v);
        }
    }

    /// Requeues `v` for elimination if its cost may have changed and it is
    /// still a candidate.
    pub(crate) fn update_elim_heap(&mut self, v: Variable) {
        if self.simp.elim_heap.in_heap(v)
            || (!self.simp.frozen[v as usize]
                && !self.simp.is_eliminated(v)
                && self.assignment.var_value(v).is_undef())
        {
            let n_occ = &self.simp.n_occ;
            self.simp.elim_heap.update(v, |x, y| elim_before(n_occ, x, y));
        }
    }

    fn pop_elim_var(&mut self) -> Option<Variable> {
        let n_occ = &self.simp.n_occ;
        self.simp.elim_heap.pop_first(|x, y| elim_before(n_occ, x, y))
    }

    /// Whether the clause is already implied by the rest of the formula,
    /// checked by propagating its negation at the top level.
    pub(crate) fn implied(&mut self, ps: &[Lit]) -> bool {
        debug_assert_eq!(self.trail.decision_level(), 0);
        self.trail.new_decision_level();
        for &p in ps {
            match self.assignment.value(p) {
                LBool::True => {
                    self.cancel_until(0);
                    return true;
                }
                LBool::Undef => self.unchecked_enqueue(!p, CRef::UNDEF),
                LBool::False => {}
            }
        }
        let result = self.propagate() != CRef::UNDEF;
        self.cancel_until(0);
        result
    }

    /// Runs simplification to a fixpoint: gathered touched clauses feed
    /// backward subsumption, then variables are eliminated in cost order.
    ///
    /// With `turn_off_elim` the simplifier releases its data structures
    /// afterwards and never runs again. Returns `false` when the formula
    /// became unsatisfiable.
    ///
    /// # Errors
    ///
    /// Propagates arena exhaustion while storing resolvents.
    pub fn eliminate(&mut self, turn_off_elim: bool) -> Result<bool, OutOfMemoryError> {
        if !self.simplify() {
            return Ok(false);
        }
        if !self.config.use_simplification {
            return Ok(true);
        }

        'outer: while self.simp.n_touched > 0
            || self.simp.bwdsub_assigns < self.trail.len()
            || self.simp.elim_heap_len() > 0
        {
            self.gather_touched_clauses();

            if (!self.simp.subsumption_queue.is_empty()
                || self.simp.bwdsub_assigns < self.trail.len())
                && !self.backward_subsumption_check(true)?
            {
                self.ok = false;
                break 'outer;
            }

            if self.interrupt.load(Ordering::Relaxed) {
                break 'outer;
            }

            let mut cnt: u64 = 0;
            while let Some(elim) = self.pop_elim_var() {
                if self.interrupt.load(Ordering::Relaxed) {
                    break 'outer;
                }
                if self.simp.is_eliminated(elim) || !self.assignment.var_value(elim).is_undef() {
                    continue;
                }
                if self.config.verbosity >= 2 && cnt % 100 == 0 {
                    eprintln!("c elimination queue: {:10}", self.simp.elim_heap_len());
                }

                if self.config.use_asymm {
                    // freeze the variable so strengthening does not requeue it
                    let was_frozen = self.simp.frozen[elim as usize];
                    self.simp.frozen[elim as usize] = true;
                    if !self.asymm_var(elim)? {
                        self.ok = false;
                        break 'outer;
                    }
                    self.simp.frozen[elim as usize] = was_frozen;
                }

                // asymmetric branching may have assigned the variable; frozen
                // variables are never eliminated
                if self.ok
                    && self.config.use_elim
                    && self.assignment.var_value(elim).is_undef()
                    && !self.simp.frozen[elim as usize]
                    && !self.eliminate_var(elim)?
                {
                    self.ok = false;
                    break 'outer;
                }

                self.check_garbage_frac(self.config.simp_garbage_frac);
                cnt += 1;
            }

            debug_assert!(self.simp.subsumption_queue.is_empty() || !self.ok);
        }

        if turn_off_elim {
            self.turn_off_simplification();
        } else {
            self.simp.occurs.clean_all(&self.ca);
            self.check_garbage_frac(self.config.simp_garbage_frac);
        }

        debug!(
            "eliminate: {} vars eliminated, {} subsumed, {} strengthened, {} merges, {} asymm literals, ok = {}",
            self.simp.eliminated_vars,
            self.simp.subsumed,
            self.simp.strengthened,
            self.simp.merges,
            self.simp.asymm_lits,
            self.ok
        );
        if self.config.verbosity >= 1 && !self.simp.elimclauses.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let megabytes = (self.simp.elimclauses.len() * 4) as f64 / (1024.0 * 1024.0);
            eprintln!(
                "|  Eliminated clauses:     {megabytes:10.2} Mb                                      |"
            );
        }

        Ok(self.ok)
    }

    /// Moves clauses over recently touched variables into the subsumption
    /// queue, using the scratch mark to avoid duplicates.
    fn gather_touched_clauses(&mut self) {
        if self.simp.n_touched == 0 {
            return;
        }

        for qi in 0..self.simp.subsumption_queue.len() {
            let cref = self.simp.subsumption_queue[qi];
            if self.ca.clause(cref).mark() == 0 {
                self.ca.clause_mut(cref).set_mark(MARK_TOUCHED);
            }
        }

        for vi in 0..self.num_vars() {
            if self.simp.touched[vi] == 0 {
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let v = vi as Variable;
            let _ = self.simp.occurs.lookup(v, &self.ca);
            for oi in 0..self.simp.occurs.occurrences(v).len() {
                let cref = self.simp.occurs.occurrences(v)[oi];
                if self.ca.clause(cref).mark() == 0 {
                    self.simp.subsumption_queue.push_back(cref);
                    self.ca.clause_mut(cref).set_mark(MARK_TOUCHED);
                }
            }
            self.simp.touched[vi] = 0;
        }

        for qi in 0..self.simp.subsumption_queue.len() {
            let cref = self.simp.subsumption_queue[qi];
            if self.ca.clause(cref).mark() == MARK_TOUCHED {
                self.ca.clause_mut(cref).set_mark(0);
            }
        }

        self.simp.n_touched = 0;
    }

    /// Checks every queued clause as a subsumer against the clauses sharing
    /// its rarest variable; top-level facts take part as virtual unit
    /// clauses. Returns `false` when strengthening derived a contradiction.
    ///
    /// # Errors
    ///
    /// Propagates arena exhaustion for the subsumption temporary.
    pub(crate) fn backward_subsumption_check(
        &mut self,
        verbose: bool,
    ) -> Result<bool, OutOfMemoryError> {
        debug_assert_eq!(self.trail.decision_level(), 0);
        let mut cnt: u64 = 0;
        let mut subsumed: u64 = 0;
        let mut deleted_literals: u64 = 0;

        loop {
            if self.interrupt.load(Ordering::Relaxed) {
                break;
            }

            let cref = if self.simp.subsumption_queue.is_empty()
                && self.simp.bwdsub_assigns < self.trail.len()
            {
                let l = self.trail[self.simp.bwdsub_assigns];
                self.simp.bwdsub_assigns += 1;
                self.tmpunit(l)?
            } else if let Some(cref) = self.simp.subsumption_queue.pop_front() {
                cref
            } else {
                break;
            };

            if self.ca.clause(cref).mark() == MARK_REMOVED {
                continue;
            }

            if verbose && self.config.verbosity >= 2 && cnt % 1000 == 0 {
                eprintln!(
                    "c subsumption left: {:10} ({:10} subsumed, {:10} deleted literals)",
                    self.simp.subsumption_queue.len(),
                    subsumed,
                    deleted_literals
                );
            }
            cnt += 1;

            debug_assert!(
                self.ca.clause(cref).len() > 1
                    || self.assignment.value(self.ca.clause(cref).lit(0)) == LBool::True
            );

            // scan the occurrences of the clause's rarest variable
            let mut best = self.ca.clause(cref).lit(0).var();
            for i in 1..self.ca.clause(cref).len() {
                let v = self.ca.clause(cref).lit(i).var();
                if self.simp.occurs.occurrences(v).len() < self.simp.occurs.occurrences(best).len()
                {
                    best = v;
                }
            }

            let candidates: Vec<CRef> = self.simp.occurs.lookup(best, &self.ca).clone();
            for &other in &candidates {
                if self.ca.clause(cref).mark() == MARK_REMOVED {
                    break;
                }
                if other == cref || self.ca.clause(other).mark() == MARK_REMOVED {
                    continue;
                }
                #[allow(clippy::cast_sign_loss)]
                if self.config.subsumption_lim != -1
                    && self.ca.clause(other).len() > self.config.subsumption_lim as usize
                {
                    continue;
                }

                let relation = {
                    let c = self.ca.clause(cref);
                    let d = self.ca.clause(other);
                    c.subsumes(&d)
                };
                match relation {
                    Subsumption::Subsumes => {
                        self.simp.subsumed += 1;
                        subsumed += 1;
                        self.remove_clause(other);
                    }
                    Subsumption::Strengthen(l) => {
                        self.simp.strengthened += 1;
                        deleted_literals += 1;
                        if !self.strengthen_clause(other, !l) {
                            return Ok(false);
                        }
                    }
                    Subsumption::Neither => {}
                }
            }
        }

        Ok(true)
    }

    /// The reusable one-literal clause lending top-level facts a clause
    /// record for the subsumption walk.
    fn tmpunit(&mut self, l: Lit) -> Result<CRef, OutOfMemoryError> {
        if self.simp.bwdsub_tmpunit == CRef::UNDEF {
            self.simp.bwdsub_tmpunit = self.ca.alloc(&[l], false)?;
        } else {
            let mut c = self.ca.clause_mut(self.simp.bwdsub_tmpunit);
            c.set_lit(0, l);
            c.calc_abstraction();
        }
        Ok(self.simp.bwdsub_tmpunit)
    }

    /// Removes `l` from the clause by self-subsuming resolution, keeping the
    /// watcher and occurrence structures exact. Returns `false` when the
    /// resulting unit contradicts the assignment.
    pub(crate) fn strengthen_clause(&mut self, cref: CRef, l: Lit) -> bool {
        debug_assert_eq!(self.trail.decision_level(), 0);
        self.simp.subsumption_queue.push_back(cref);

        if self.ca.clause(cref).len() == 2 {
            self.remove_clause(cref);
            self.ca.clause_mut(cref).strengthen(l);
        } else {
            self.detach_clause(cref, true);
            self.ca.clause_mut(cref).strengthen(l);
            self.attach_clause(cref);
            self.simp.occurs.remove(l.var(), cref);
            self.simp.n_occ[l.index()] -= 1;
            self.update_elim_heap(l.var());
        }

        if self.ca.clause(cref).len() == 1 {
            let unit = self.ca.clause(cref).lit(0);
            self.enqueue(unit, CRef::UNDEF) && self.propagate() == CRef::UNDEF
        } else {
            true
        }
    }

    /// Resolves the clauses at `p_cr` and `n_cr` on `v` into `out`. Returns
    /// `false` for a tautological resolvent.
    fn merge(&mut self, p_cr: CRef, n_cr: CRef, v: Variable, out: &mut Vec<Lit>) -> bool {
        self.simp.merges += 1;
        out.clear();

        let pc = self.ca.clause(p_cr);
        let qc = self.ca.clause(n_cr);
        let (larger, smaller) = if pc.len() < qc.len() { (qc, pc) } else { (pc, qc) };

        'smaller: for q in smaller.iter() {
            if q.var() == v {
                continue;
            }
            for p in larger.iter() {
                if p.var() == q.var() {
                    if p == !q {
                        return false;
                    }
                    continue 'smaller;
                }
            }
            out.push(q);
        }
        for p in larger.iter() {
            if p.var() != v {
                out.push(p);
            }
        }
        true
    }

    /// Size of the resolvent of the clauses at `p_cr` and `n_cr` on `v`, or
    /// `None` for a tautology.
    fn merge_count(&mut self, p_cr: CRef, n_cr: CRef, v: Variable) -> Option<usize> {
        self.simp.merges += 1;

        let pc = self.ca.clause(p_cr);
        let qc = self.ca.clause(n_cr);
        let (larger, smaller) = if pc.len() < qc.len() { (qc, pc) } else { (pc, qc) };

        let mut size = larger.len() - 1;
        'smaller: for q in smaller.iter() {
            if q.var() == v {
                continue;
            }
            for p in larger.iter() {
                if p.var() == q.var() {
                    if p == !q {
                        return None;
                    }
                    continue 'smaller;
                }
            }
            size += 1;
        }
        Some(size)
    }

    /// Appends one clause of `v`'s occurrence set to the reconstruction
    /// stack: the variable's own literal first, the block length last.
    fn mk_elim_clause(&mut self, v: Variable, cref: CRef) {
        let first = self.simp.elimclauses.len();
        let mut v_pos = first;
        for (i, l) in self.ca.clause(cref).iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            self.simp.elimclauses.push(l.index() as u32);
            if l.var() == v {
                v_pos = first + i;
            }
        }
        self.simp.elimclauses.swap(first, v_pos);
        #[allow(clippy::cast_possible_truncation)]
        self.simp
            .elimclauses
            .push(self.ca.clause(cref).len() as u32);
    }

    fn mk_elim_unit(&mut self, l: Lit) {
        #[allow(clippy::cast_possible_truncation)]
        self.simp.elimclauses.push(l.index() as u32);
        self.simp.elimclauses.push(1);
    }

    /// Eliminates `v` by resolving its positive against its negative
    /// occurrences, unless the resolvent set would grow the formula past the
    /// configured bounds. Returns `false` when a resolvent made the formula
    /// unsatisfiable.
    ///
    /// # Errors
    ///
    /// Propagates arena exhaustion while storing resolvents.
    fn eliminate_var(&mut self, v: Variable) -> Result<bool, OutOfMemoryError> {
        debug_assert!(!self.simp.frozen[v as usize] && !self.simp.is_eliminated(v));
        debug_assert!(self.assignment.var_value(v).is_undef());

        let cls: Vec<CRef> = self.simp.occurs.lookup(v, &self.ca).clone();
        let mut pos: Vec<CRef> = Vec::new();
        let mut neg: Vec<CRef> = Vec::new();
        for &cref in &cls {
            for l in self.ca.clause(cref).iter() {
                if l.var() == v {
                    if l.sign() {
                        neg.push(cref);
                    } else {
                        pos.push(cref);
                    }
                    break;
                }
            }
        }

        // check that elimination does not blow up the formula
        let mut cnt: i64 = 0;
        #[allow(clippy::cast_possible_wrap)]
        let bound = cls.len() as i64 + i64::from(self.config.grow);
        for &p in &pos {
            for &n in &neg {
                if let Some(size) = self.merge_count(p, n, v) {
                    cnt += 1;
                    #[allow(clippy::cast_sign_loss)]
                    if cnt > bound
                        || (self.config.clause_lim != -1 && size > self.config.clause_lim as usize)
                    {
                        return Ok(true);
                    }
                }
            }
        }

        self.simp.eliminated[v as usize] = true;
        self.set_decision_var(v, false);
        self.simp.eliminated_vars += 1;

        // store the smaller side on the reconstruction stack
        if pos.len() > neg.len() {
            for &cref in &neg {
                self.mk_elim_clause(v, cref);
            }
            self.mk_elim_unit(Lit::positive(v));
        } else {
            for &cref in &pos {
                self.mk_elim_clause(v, cref);
            }
            self.mk_elim_unit(!Lit::positive(v));
        }

        for &cref in &cls {
            self.remove_clause(cref);
        }

        // produce the resolvents
        let mut resolvent: Vec<Lit> = Vec::new();
        for &p in &pos {
            for &n in &neg {
                if self.merge(p, n, v, &mut resolvent) && !self.add_clause(&resolvent)? {
                    return Ok(false);
                }
            }
        }

        self.simp.occurs.clear_var(v);
        self.simp.n_occ[Lit::positive(v).index()] = 0;
        self.simp.n_occ[(!Lit::positive(v)).index()] = 0;

        self.backward_subsumption_check(false)
    }

    /// Asymmetric branching over every clause of `v`: a clause is
    /// strengthened when asserting the negation of its other literals
    /// already fails.
    fn asymm_var(&mut self, v: Variable) -> Result<bool, OutOfMemoryError> {
        debug_assert!(self.config.use_simplification);

        let cls: Vec<CRef> = self.simp.occurs.lookup(v, &self.ca).clone();
        if !self.assignment.var_value(v).is_undef() || cls.is_empty() {
            return Ok(true);
        }
        for &cref in &cls {
            if !self.asymm(v, cref) {
                return Ok(false);
            }
        }
        self.backward_subsumption_check(false)
    }

    fn asymm(&mut self, v: Variable, cref: CRef) -> bool {
        debug_assert_eq!(self.trail.decision_level(), 0);
        if self.ca.clause(cref).mark() != 0 || self.satisfied(cref) {
            return true;
        }

        self.trail.new_decision_level();
        let mut l = Lit::UNDEF;
        for i in 0..self.ca.clause(cref).len() {
            let li = self.ca.clause(cref).lit(i);
            if li.var() != v && self.assignment.value(li) != LBool::False {
                self.unchecked_enqueue(!li, CRef::UNDEF);
            } else {
                l = li;
            }
        }

        if self.propagate() == CRef::UNDEF {
            self.cancel_until(0);
        } else {
            self.cancel_until(0);
            self.simp.asymm_lits += 1;
            if !self.strengthen_clause(cref, l) {
                return false;
            }
        }
        true
    }

    /// Releases the simplifier permanently: occurrence tracking stops and
    /// the problem clauses drop their abstraction words at the forced
    /// compaction.
    fn turn_off_simplification(&mut self) {
        self.config.use_simplification = false;
        self.simp.touched = Vec::new();
        self.simp.n_touched = 0;
        self.simp.occurs = OccLists::new();
        self.simp.n_occ = Vec::new();
        self.simp.subsumption_queue.clear();
        self.simp.elim_heap.clear();
        self.simp.bwdsub_tmpunit = CRef::UNDEF;
        self.remove_satisfied = true;
        self.ca.set_extra_clause_field(false);
        self.rebuild_order_heap();
        self.garbage_collect();
    }

    /// The simp-aware solve driver: freezes assumption variables, runs
    /// elimination, searches, and extends the model over eliminated
    /// variables.
    pub(crate) fn solve_with_simp(&mut self, do_simp: bool, turn_off_simp: bool) -> LBool {
        self.model.clear();
        self.conflict.clear();
        let do_simp = do_simp && self.config.use_simplification;
        let mut extra_frozen: Vec<Variable> = Vec::new();
        let mut result = LBool::True;

        if do_simp {
            let assumptions = self.assumptions.clone();
            for p in &assumptions {
                let v = p.var();
                debug_assert!(!self.simp.is_eliminated(v));
                if !self.simp.frozen[v as usize] {
                    self.set_frozen(v, true);
                    extra_frozen.push(v);
                }
            }
            result = match self.eliminate(turn_off_simp) {
                Ok(true) => LBool::True,
                Ok(false) => LBool::False,
                Err(oom) => {
                    eprintln!("c WARNING: {oom}; answering INDETERMINATE");
                    LBool::Undef
                }
            };
        }

        if result == LBool::True {
            result = self.solve_internal();
        }

        if result == LBool::True && self.config.extend_model {
            self.extend_model();
        }

        for v in extra_frozen {
            self.set_frozen(v, false);
        }
        result
    }

    /// Replays the reconstruction stack backwards, flipping each eliminated
    /// variable whose recorded clause the partial model falsifies.
    pub(crate) fn extend_model(&mut self) {
        let mut i = self.simp.elimclauses.len();
        while i > 0 {
            let size = self.simp.elimclauses[i - 1] as usize;
            let start = i - 1 - size;

            let mut satisfied = false;
            for k in (start + 1)..(i - 1) {
                let l = Lit::from_index(self.simp.elimclauses[k] as usize);
                if self.model[l.var() as usize].apply_sign(l.sign()) != LBool::False {
                    satisfied = true;
                    break;
                }
            }
            if !satisfied {
                let x = Lit::from_index(self.simp.elimclauses[start] as usize);
                self.model[x.var() as usize] = LBool::from_bool(!x.sign());
            }
            i = start;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::configs::SolverConfig;

    fn simp_solver(clauses: &[&[i32]]) -> Solver {
        let mut s = Solver::new(SolverConfig::default());
        for c in clauses {
            s.add_dimacs_clause(c).unwrap();
        }
        s
    }

    #[test]
    fn test_subsumed_clause_is_removed() {
        let mut s = simp_solver(&[&[1, 2], &[1, 2, 3]]);
        assert!(s.backward_subsumption_check(false).unwrap());
        assert_eq!(s.simp.subsumed, 1);
        let live = s
            .clauses
            .iter()
            .filter(|&&cref| s.ca.clause(cref).mark() == 0)
            .count();
        assert_eq!(live, 1);
    }

    #[test]
    fn test_self_subsumption_strengthens() {
        // {1, 2} and {-1, 2, 3}: resolving on 1 strengthens the second
        // clause to {2, 3}
        let mut s = simp_solver(&[&[1, 2], &[-1, 2, 3]]);
        assert!(s.backward_subsumption_check(false).unwrap());
        assert_eq!(s.simp.strengthened, 1);

        let live: Vec<Vec<i32>> = s
            .clauses
            .iter()
            .filter(|&&cref| s.ca.clause(cref).mark() == 0)
            .map(|&cref| {
                let mut lits: Vec<i32> = s.ca.clause(cref).iter().map(Lit::to_dimacs).collect();
                lits.sort_unstable();
                lits
            })
            .collect();
        assert!(live.contains(&vec![2, 3]), "live clauses: {live:?}");
    }

    #[test]
    fn test_eliminate_preserves_satisfiability() {
        let mut s = simp_solver(&[&[1, 2], &[-2, 3], &[-1, 3], &[-3, 4]]);
        assert!(s.eliminate(false).unwrap());
        assert_eq!(s.solve(&[]), LBool::True);

        // the model must cover eliminated variables and satisfy the input
        let model = s.model().to_vec();
        for clause in [&[1, 2][..], &[-2, 3], &[-1, 3], &[-3, 4]] {
            let ok = clause.iter().any(|&l| {
                let lit = Lit::from_dimacs(l);
                model[lit.var() as usize].apply_sign(lit.sign()) == LBool::True
            });
            assert!(ok, "clause {clause:?} unsatisfied after model extension");
        }
    }

    #[test]
    fn test_eliminate_detects_unsat() {
        let mut s = simp_solver(&[&[1], &[-1]]);
        assert!(!s.eliminate(false).unwrap());
        assert_eq!(s.solve(&[]), LBool::False);
    }

    #[test]
    fn test_frozen_variable_is_not_eliminated() {
        let mut s = simp_solver(&[&[1, 2], &[-1, 3]]);
        s.set_frozen(0, true);
        assert!(s.eliminate(false).unwrap());
        assert!(!s.is_eliminated(0));
    }

    #[test]
    fn test_solve_with_assumptions_on_simp_solver() {
        let mut s = simp_solver(&[&[1, 2], &[-1, 2]]);
        assert_eq!(s.solve(&[Lit::from_dimacs(-2)]), LBool::False);
        assert!(s
            .conflict()
            .iter()
            .all(|&l| l == Lit::from_dimacs(-2) || l == Lit::from_dimacs(2)));
        assert_eq!(s.solve(&[]), LBool::True);
    }

    #[test]
    fn test_turn_off_elim_keeps_formula_intact() {
        let mut s = simp_solver(&[&[1, 2, 3], &[-1, 2], &[-2, 3]]);
        assert!(s.eliminate(true).unwrap());
        assert!(!s.config.use_simplification);
        assert_eq!(s.solve(&[]), LBool::True);
    }
}
