#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The solver façade: variable and clause ingestion, assignment bookkeeping,
//! branching, budgets and result extraction. The search loop itself lives in
//! [`crate::sat::cdcl`], propagation in [`crate::sat::propagation`] and the
//! simplifier in [`crate::sat::preprocessing`].

use crate::sat::assignment::Assignment;
use crate::sat::clause::MARK_REMOVED;
use crate::sat::clause_storage::{CRef, ClauseAllocator, OutOfMemoryError};
use crate::sat::configs::SolverConfig;
use crate::sat::conflict_analysis::Analyser;
use crate::sat::literal::{LBool, Lit, Variable};
use crate::sat::preprocessing::SimpState;
use crate::sat::trail::Trail;
use crate::sat::variable_selection::Vsids;
use crate::sat::watch::{Watcher, WatchLists};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters accumulated over the lifetime of a solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    /// Top-level solve calls.
    pub solves: u64,
    /// Search episodes (restarts included).
    pub starts: u64,
    /// Branching decisions.
    pub decisions: u64,
    /// Decisions made by the random picker.
    pub rnd_decisions: u64,
    /// Literals enqueued by propagation.
    pub propagations: u64,
    /// Conflicts analysed.
    pub conflicts: u64,
    /// Variables currently eligible for branching.
    pub dec_vars: u64,
    /// Literal count over live problem clauses.
    pub clauses_literals: u64,
    /// Literal count over live learnt clauses.
    pub learnts_literals: u64,
    /// Literals in learnt clauses before minimisation.
    pub max_literals: u64,
    /// Literals in learnt clauses after minimisation.
    pub tot_literals: u64,
}

/// A CDCL solver over a compact clause arena, with two-watched-literal
/// propagation, first-UIP learning, activity-driven branching and an optional
/// variable-elimination simplifier.
#[derive(Debug)]
pub struct Solver {
    pub(crate) config: SolverConfig,

    pub(crate) ca: ClauseAllocator,
    pub(crate) clauses: Vec<CRef>,
    pub(crate) learnts: Vec<CRef>,
    pub(crate) watches: WatchLists,

    pub(crate) assignment: Assignment,
    pub(crate) trail: Trail,

    pub(crate) vsids: Vsids,
    pub(crate) analyser: Analyser,
    pub(crate) simp: SimpState,

    pub(crate) rng: StdRng,
    pub(crate) ok: bool,
    pub(crate) cla_inc: f64,
    pub(crate) simp_db_assigns: i64,
    pub(crate) simp_db_props: i64,
    pub(crate) progress: f64,
    pub(crate) remove_satisfied: bool,

    pub(crate) model: Vec<LBool>,
    pub(crate) conflict: Vec<Lit>,
    pub(crate) assumptions: Vec<Lit>,

    pub(crate) max_learnts: f64,
    pub(crate) learntsize_adjust_confl: f64,
    pub(crate) learntsize_adjust_cnt: i64,

    pub(crate) stats: SearchStats,
    pub(crate) conflict_budget: i64,
    pub(crate) propagation_budget: i64,
    pub(crate) interrupt: Arc<AtomicBool>,
    pub(crate) start_time: Instant,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Solver {
    /// Creates a solver from a configuration value.
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        let mut ca = ClauseAllocator::new();
        ca.set_extra_clause_field(config.use_simplification);
        let vsids = Vsids::new(config.var_decay);
        let rng = StdRng::seed_from_u64(config.random_seed);

        Self {
            ca,
            clauses: Vec::new(),
            learnts: Vec::new(),
            watches: WatchLists::new(),
            assignment: Assignment::new(),
            trail: Trail::new(),
            vsids,
            analyser: Analyser::new(),
            simp: SimpState::new(),
            rng,
            ok: true,
            cla_inc: 1.0,
            simp_db_assigns: -1,
            simp_db_props: 0,
            progress: 0.0,
            remove_satisfied: true,
            model: Vec::new(),
            conflict: Vec::new(),
            assumptions: Vec::new(),
            max_learnts: 0.0,
            learntsize_adjust_confl: 0.0,
            learntsize_adjust_cnt: 0,
            stats: SearchStats::default(),
            conflict_budget: -1,
            propagation_budget: -1,
            interrupt: Arc::new(AtomicBool::new(false)),
            start_time: Instant::now(),
            config,
        }
    }

    /// The configuration the solver was built with.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Number of variables created so far.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.assignment.num_vars()
    }

    /// Number of live problem clauses.
    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Number of live learnt clauses.
    #[must_use]
    pub fn num_learnts(&self) -> usize {
        self.learnts.len()
    }

    /// Number of currently assigned variables.
    #[must_use]
    pub fn num_assigns(&self) -> usize {
        self.trail.len()
    }

    /// Whether no top-level contradiction has been derived yet.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.ok
    }

    /// Search statistics.
    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Seconds since the solver was created.
    #[must_use]
    pub fn cpu_time(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Level-weighted trail-fill fraction captured at the last restart.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// The model found by the last satisfiable solve, indexed by variable.
    #[must_use]
    pub fn model(&self) -> &[LBool] {
        &self.model
    }

    /// The subset of assumptions responsible for the last `False` answer.
    #[must_use]
    pub fn conflict(&self) -> &[Lit] {
        &self.conflict
    }

    /// A shared handle to the cooperative interrupt flag. Setting it makes
    /// the solver unwind to the top level and answer `Undef`.
    #[must_use]
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Limits the number of conflicts of the following `solve_limited` calls;
    /// negative means no limit.
    pub fn set_conf_budget(&mut self, budget: i64) {
        self.conflict_budget = if budget < 0 {
            -1
        } else {
            #[allow(clippy::cast_possible_wrap)]
            {
                self.stats.conflicts as i64 + budget
            }
        };
    }

    /// Limits the number of propagations of the following `solve_limited`
    /// calls; negative means no limit.
    pub fn set_prop_budget(&mut self, budget: i64) {
        self.propagation_budget = if budget < 0 {
            -1
        } else {
            #[allow(clippy::cast_possible_wrap)]
            {
                self.stats.propagations as i64 + budget
            }
        };
    }

    /// Removes all resource budgets.
    pub fn budget_off(&mut self) {
        self.conflict_budget = -1;
        self.propagation_budget = -1;
    }

    /// Caps the clause arena at roughly `megabytes`.
    pub fn set_memory_limit(&mut self, megabytes: usize) {
        self.ca.set_memory_limit(megabytes);
    }

    #[allow(clippy::cast_sign_loss)]
    pub(crate) fn within_budget(&self) -> bool {
        !self.interrupt.load(Ordering::Relaxed)
            && (self.conflict_budget < 0 || self.stats.conflicts < self.conflict_budget as u64)
            && (self.propagation_budget < 0
                || self.stats.propagations < self.propagation_budget as u64)
    }

    /// Creates a fresh variable.
    ///
    /// `upol` pins the branching value (overriding phase saving) and `dvar`
    /// makes the variable eligible for branching.
    pub fn new_var(&mut self, upol: LBool, dvar: bool) -> Variable {
        #[allow(clippy::cast_possible_truncation)]
        let v = self.num_vars() as Variable;
        self.watches.init_var();
        self.assignment.init_var(upol);
        let initial_activity = if self.config.rnd_init_act {
            self.rng.gen::<f64>() * 0.000_01
        } else {
            0.0
        };
        self.vsids.init_var(initial_activity);
        self.analyser.init_var();
        self.simp.init_var(self.config.use_simplification);
        self.set_decision_var(v, dvar);
        v
    }

    /// Creates a default fresh variable.
    pub fn new_var_default(&mut self) -> Variable {
        self.new_var(LBool::Undef, true)
    }

    /// Grows the variable set so that `v` exists.
    pub fn ensure_var(&mut self, v: Variable) {
        while self.num_vars() <= v as usize {
            self.new_var_default();
        }
    }

    /// Makes `v` eligible or ineligible for branching.
    pub fn set_decision_var(&mut self, v: Variable, dvar: bool) {
        let was = self.assignment.decision[v as usize];
        if dvar && !was {
            self.stats.dec_vars += 1;
        } else if !dvar && was {
            self.stats.dec_vars -= 1;
        }
        self.assignment.decision[v as usize] = dvar;
        self.vsids.insert_var_order(v, &self.assignment.decision);
    }

    /// Pins the branching value of `v`; `Undef` restores phase saving.
    pub fn set_user_polarity(&mut self, v: Variable, pol: LBool) {
        self.assignment.user_pol[v as usize] = pol;
    }

    /// Adds a clause given in DIMACS numbering, creating variables on demand.
    ///
    /// # Errors
    ///
    /// Propagates arena exhaustion.
    pub fn add_dimacs_clause(&mut self, lits: &[i32]) -> Result<bool, OutOfMemoryError> {
        let mut ps: SmallVec<[Lit; 8]> = SmallVec::with_capacity(lits.len());
        for &l in lits {
            let lit = Lit::from_dimacs(l);
            self.ensure_var(lit.var());
            ps.push(lit);
        }
        self.add_clause(&ps)
    }

    /// Adds a problem clause. Only legal at decision level 0.
    ///
    /// Duplicates, tautologies and literals already false at the top level
    /// are removed; an emptied clause makes the formula unsatisfiable, a unit
    /// becomes a top-level fact. Returns `false` once the formula is known
    /// unsatisfiable.
    ///
    /// # Errors
    ///
    /// Propagates arena exhaustion.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when called below a decision or on an
    /// eliminated variable.
    pub fn add_clause(&mut self, lits: &[Lit]) -> Result<bool, OutOfMemoryError> {
        debug_assert_eq!(self.trail.decision_level(), 0);
        if !self.ok {
            return Ok(false);
        }

        let mut ps: SmallVec<[Lit; 8]> = lits.into();
        // Normalised literal order keeps duplicate detection a neighbour scan
        // and subsumption's subset walk reliable.
        ps.sort_unstable();

        let mut j = 0;
        let mut prev = Lit::UNDEF;
        for i in 0..ps.len() {
            let l = ps[i];
            debug_assert!(!self.simp.is_eliminated(l.var()));
            let value = self.assignment.value(l);
            if value == LBool::True || l == !prev {
                return Ok(true);
            }
            if value != LBool::False && l != prev {
                prev = l;
                ps[j] = l;
                j += 1;
            }
        }
        ps.truncate(j);

        if self.config.use_rcheck && self.implied(&ps) {
            return Ok(true);
        }

        match ps.len() {
            0 => {
                self.ok = false;
                Ok(false)
            }
            1 => {
                self.unchecked_enqueue(ps[0], CRef::UNDEF);
                self.ok = self.propagate() == CRef::UNDEF;
                Ok(self.ok)
            }
            _ => {
                let cref = self.ca.alloc(&ps, false)?;
                self.clauses.push(cref);
                self.attach_clause(cref);
                if self.config.use_simplification {
                    self.simp_clause_added(cref);
                }
                Ok(true)
            }
        }
    }

    /// Hooks a clause into the watcher lists of its first two literals.
    pub(crate) fn attach_clause(&mut self, cref: CRef) {
        let c = self.ca.clause(cref);
        debug_assert!(c.len() > 1);
        let c0 = c.lit(0);
        let c1 = c.lit(1);
        let learnt = c.learnt();
        let len = c.len() as u64;

        self.watches[!c0].push(Watcher::new(cref, c1));
        self.watches[!c1].push(Watcher::new(cref, c0));
        if learnt {
            self.stats.learnts_literals += len;
        } else {
            self.stats.clauses_literals += len;
        }
    }

    /// Unhooks a clause from its watcher lists. A strict detach removes the
    /// entries immediately; otherwise the lists are cleaned lazily.
    pub(crate) fn detach_clause(&mut self, cref: CRef, strict: bool) {
        let c = self.ca.clause(cref);
        debug_assert!(c.len() > 1);
        let c0 = c.lit(0);
        let c1 = c.lit(1);
        let learnt = c.learnt();
        let len = c.len() as u64;

        if strict {
            self.watches.remove(!c0, cref);
            self.watches.remove(!c1, cref);
        } else {
            self.watches.smudge(!c0);
            self.watches.smudge(!c1);
        }
        if learnt {
            self.stats.learnts_literals -= len;
        } else {
            self.stats.clauses_literals -= len;
        }
    }

    /// Detaches, marks and frees a clause. The record stays readable until
    /// the next compaction.
    pub(crate) fn remove_clause(&mut self, cref: CRef) {
        if self.config.use_simplification && !self.ca.clause(cref).learnt() {
            self.simp_clause_removed(cref);
        }
        self.detach_clause(cref, false);
        if self.locked(cref) {
            let c0 = self.ca.clause(cref).lit(0);
            self.assignment.set_reason(c0.var(), CRef::UNDEF);
        }
        self.ca.clause_mut(cref).set_mark(MARK_REMOVED);
        self.ca.free(cref);
    }

    /// Whether the clause is the reason of its first literal's assignment.
    pub(crate) fn locked(&self, cref: CRef) -> bool {
        let c0 = self.ca.clause(cref).lit(0);
        self.assignment.value(c0) == LBool::True && self.assignment.reason(c0.var()) == cref
    }

    /// Whether some literal of the clause is true.
    pub(crate) fn satisfied(&self, cref: CRef) -> bool {
        self.ca
            .clause(cref)
            .iter()
            .any(|l| self.assignment.value(l) == LBool::True)
    }

    /// Makes `p` true with the given reason. `p` must not be false.
    pub(crate) fn enqueue(&mut self, p: Lit, from: CRef) -> bool {
        match self.assignment.value(p) {
            LBool::False => false,
            LBool::True => true,
            LBool::Undef => {
                self.unchecked_enqueue(p, from);
                true
            }
        }
    }

    /// Makes the unassigned literal `p` true with the given reason.
    pub(crate) fn unchecked_enqueue(&mut self, p: Lit, from: CRef) {
        debug_assert!(self.assignment.value(p).is_undef());
        #[allow(clippy::cast_possible_truncation)]
        let level = self.trail.decision_level() as u32;
        self.assignment.assign(p, level, from);
        self.trail.push(p);
    }

    /// Undoes every assignment above `level`, saving polarities and
    /// reinserting the undone variables into the order heap.
    pub(crate) fn cancel_until(&mut self, level: usize) {
        if self.trail.decision_level() <= level {
            return;
        }
        let current_level_start = self.trail.current_level_start();
        let new_len = self.trail.level_start(level + 1);
        for c in (new_len..self.trail.len()).rev() {
            let p = self.trail[c];
            let v = p.var();
            self.assignment.unassign(v);
            if self.config.phase_saving > 1
                || (self.config.phase_saving == 1 && c > current_level_start)
            {
                self.assignment.polarity[v as usize] = p.sign();
            }
            self.vsids.insert_var_order(v, &self.assignment.decision);
        }
        self.trail.shrink_to_level(level);
    }

    /// Picks the next branching literal, or `Lit::UNDEF` when every decision
    /// variable is assigned.
    pub(crate) fn pick_branch_lit(&mut self) -> Lit {
        let mut next: Option<Variable> = None;

        if self.config.random_var_freq > 0.0
            && self.rng.gen::<f64>() < self.config.random_var_freq
            && self.vsids.heap_len() > 0
        {
            let candidate = self.vsids.heap_nth(self.rng.gen_range(0..self.vsids.heap_len()));
            if self.assignment.var_value(candidate).is_undef()
                && self.assignment.decision[candidate as usize]
            {
                self.stats.rnd_decisions += 1;
                next = Some(candidate);
            }
        }

        let v = loop {
            if let Some(v) = next {
                if self.assignment.var_value(v).is_undef() && self.assignment.decision[v as usize] {
                    break v;
                }
            }
            match self.vsids.pop_max() {
                None => return Lit::UNDEF,
                Some(v) => next = Some(v),
            }
        };

        let sign = match self.assignment.user_pol[v as usize] {
            LBool::True => false,
            LBool::False => true,
            LBool::Undef => {
                if self.config.rnd_pol {
                    self.rng.gen::<f64>() < 0.5
                } else {
                    self.assignment.polarity[v as usize]
                }
            }
        };
        Lit::new(v, sign)
    }

    /// Bumps a learnt clause's activity, rescaling all of them when the
    /// values grow past the limit.
    pub(crate) fn cla_bump_activity(&mut self, cref: CRef) {
        #[allow(clippy::cast_possible_truncation)]
        let bumped = self.ca.clause(cref).activity() + self.cla_inc as f32;
        self.ca.clause_mut(cref).set_activity(bumped);
        if f64::from(bumped) > 1e20 {
            for &cr in &self.learnts {
                let act = self.ca.clause(cr).activity();
                self.ca.clause_mut(cr).set_activity(act * 1e-20);
            }
            self.cla_inc *= 1e-20;
        }
    }

    pub(crate) fn cla_decay_activity(&mut self) {
        self.cla_inc /= self.config.clause_decay;
    }

    /// The value of `l` in the extracted model.
    #[must_use]
    pub fn model_value(&self, l: Lit) -> LBool {
        self.model[l.var() as usize].apply_sign(l.sign())
    }

    /// Level-weighted fraction of assigned variables, a coarse progress
    /// indicator for the status line.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub(crate) fn progress_estimate(&self) -> f64 {
        if self.num_vars() == 0 {
            return 0.0;
        }
        let f = 1.0 / self.num_vars() as f64;
        let mut progress = 0.0;
        for level in 0..=self.trail.decision_level() {
            let begin = if level == 0 {
                0
            } else {
                self.trail.level_start(level)
            };
            let end = if level == self.trail.decision_level() {
                self.trail.len()
            } else {
                self.trail.level_start(level + 1)
            };
            progress += f.powi(level as i32) * (end - begin) as f64;
        }
        progress / self.num_vars() as f64
    }
}
