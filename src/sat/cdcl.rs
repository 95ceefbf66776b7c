#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The CDCL search driver: the conflict loop, the restart schedule, the
//! learnt-budget schedule, assumption handling and the public solve entry
//! points.

use crate::sat::clause_storage::{CRef, OutOfMemoryError};
use crate::sat::literal::{LBool, Lit};
use crate::sat::restarter::{RestartSchedule, Schedule};
use crate::sat::solver::Solver;

impl Solver {
    /// Runs one search episode with a conflict budget.
    ///
    /// Returns `True` when a model is found, `False` on unsatisfiability
    /// (including a failed assumption, with `self.conflict` filled), and
    /// `Undef` when the budget ran out and the search unwound for a restart.
    ///
    /// # Errors
    ///
    /// Propagates arena exhaustion while storing a learnt clause.
    pub(crate) fn search(&mut self, nof_conflicts: u64) -> Result<LBool, OutOfMemoryError> {
        debug_assert!(self.ok);
        self.stats.starts += 1;
        let mut conflict_c: u64 = 0;
        let mut learnt_clause: Vec<Lit> = Vec::new();

        loop {
            let confl = self.propagate();
            if confl == CRef::UNDEF {
                // no conflict
                if conflict_c >= nof_conflicts || !self.within_budget() {
                    self.progress = self.progress_estimate();
                    self.cancel_until(0);
                    return Ok(LBool::Undef);
                }

                if self.trail.decision_level() == 0 && !self.simplify() {
                    return Ok(LBool::False);
                }

                #[allow(clippy::cast_precision_loss)]
                if self.learnts.len() as f64 - self.num_assigns() as f64 >= self.max_learnts {
                    self.reduce_db();
                }

                let mut next = Lit::UNDEF;
                while self.trail.decision_level() < self.assumptions.len() {
                    // handle the pending assumptions in order
                    let p = self.assumptions[self.trail.decision_level()];
                    match self.assignment.value(p) {
                        LBool::True => self.trail.new_decision_level(),
                        LBool::False => {
                            self.analyse_final(!p);
                            return Ok(LBool::False);
                        }
                        LBool::Undef => {
                            next = p;
                            break;
                        }
                    }
                }

                if next == Lit::UNDEF {
                    self.stats.decisions += 1;
                    next = self.pick_branch_lit();
                    if next == Lit::UNDEF {
                        // every decision variable is assigned: model found
                        return Ok(LBool::True);
                    }
                }

                self.trail.new_decision_level();
                self.unchecked_enqueue(next, CRef::UNDEF);
            } else {
                self.stats.conflicts += 1;
                conflict_c += 1;
                if self.trail.decision_level() == 0 {
                    return Ok(LBool::False);
                }

                let backtrack_level = self.analyse(confl, &mut learnt_clause);
                self.cancel_until(backtrack_level);

                if learnt_clause.len() == 1 {
                    self.unchecked_enqueue(learnt_clause[0], CRef::UNDEF);
                } else {
                    let cref = self.ca.alloc(&learnt_clause, true)?;
                    self.learnts.push(cref);
                    self.attach_clause(cref);
                    self.cla_bump_activity(cref);
                    self.unchecked_enqueue(learnt_clause[0], cref);
                }

                self.vsids.decay();
                self.cla_decay_activity();

                self.learntsize_adjust_cnt -= 1;
                if self.learntsize_adjust_cnt == 0 {
                    self.learntsize_adjust_confl *= self.config.learntsize_adjust_inc;
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        self.learntsize_adjust_cnt = self.learntsize_adjust_confl as i64;
                    }
                    self.max_learnts *= self.config.learntsize_inc;
                    if self.config.verbosity >= 1 {
                        self.print_status_line();
                    }
                }
            }
        }
    }

    /// Runs the restart schedule until the search settles on an answer or a
    /// budget is exhausted.
    pub(crate) fn solve_internal(&mut self) -> LBool {
        self.model.clear();
        self.conflict.clear();
        if !self.ok {
            return LBool::False;
        }
        self.stats.solves += 1;

        #[allow(clippy::cast_precision_loss)]
        {
            self.max_learnts = (self.num_clauses() as f64 * self.config.learntsize_factor)
                .max(self.config.min_learnts_lim as f64);
            self.learntsize_adjust_confl = self.config.learntsize_adjust_start as f64;
        }
        #[allow(clippy::cast_possible_wrap)]
        {
            self.learntsize_adjust_cnt = self.config.learntsize_adjust_start as i64;
        }

        if self.config.verbosity >= 1 {
            self.print_status_header();
        }

        let mut schedule = Schedule::new(
            self.config.luby_restart,
            self.config.restart_first,
            self.config.restart_inc,
        );
        let mut status = LBool::Undef;
        while status == LBool::Undef {
            let budget = schedule.next_budget().max(1);
            match self.search(budget) {
                Ok(s) => status = s,
                Err(oom) => {
                    eprintln!("c WARNING: {oom}; answering INDETERMINATE");
                    break;
                }
            }
            if status == LBool::Undef && !self.within_budget() {
                break;
            }
        }

        if self.config.verbosity >= 1 {
            self.print_status_footer();
        }

        if status == LBool::True {
            #[allow(clippy::cast_possible_truncation)]
            {
                self.model = (0..self.num_vars())
                    .map(|v| self.assignment.var_value(v as u32))
                    .collect();
            }
        } else if status == LBool::False && self.conflict.is_empty() {
            self.ok = false;
        }

        self.cancel_until(0);
        status
    }

    /// Solves under the given assumptions without resource budgets.
    ///
    /// `True` means satisfiable (see [`Solver::model`]); `False` means
    /// unsatisfiable under the assumptions (see [`Solver::conflict`]).
    pub fn solve(&mut self, assumptions: &[Lit]) -> LBool {
        self.budget_off();
        self.solve_limited(assumptions)
    }

    /// Solves under the given assumptions, honouring the configured conflict
    /// and propagation budgets and the interrupt flag; `Undef` means a limit
    /// was hit.
    pub fn solve_limited(&mut self, assumptions: &[Lit]) -> LBool {
        for p in assumptions {
            self.ensure_var(p.var());
        }
        self.assumptions = assumptions.to_vec();
        self.solve_with_simp(true, false)
    }

    fn print_status_header(&self) {
        eprintln!("============================[ Search Statistics ]=============================");
        eprintln!("| Conflicts |  Decisions   Propagations |  Learnts  Lits/Cl | Progress  CPU  |");
        eprintln!("==============================================================================");
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn print_status_line(&self) {
        let avg = if self.learnts.is_empty() {
            0.0
        } else {
            self.stats.learnts_literals as f64 / self.learnts.len() as f64
        };
        eprintln!(
            "| {:9} | {:10} {:13} | {:8} {:8.1} | {:6.2} % {:5.1}s |",
            self.stats.conflicts,
            self.stats.decisions,
            self.stats.propagations,
            self.learnts.len(),
            avg,
            self.progress_estimate() * 100.0,
            self.cpu_time(),
        );
    }

    fn print_status_footer(&self) {
        eprintln!("==============================================================================");
    }
}
