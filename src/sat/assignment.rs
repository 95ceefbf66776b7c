#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Per-variable assignment state: value, decision level, reason clause,
//! saved and pinned polarities, and the branching-eligibility flag.

use crate::sat::clause_storage::CRef;
use crate::sat::literal::{LBool, Lit, Variable};

/// The dense per-variable state of the solver.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    assigns: Vec<LBool>,
    level: Vec<u32>,
    reason: Vec<CRef>,
    /// Saved sign from the variable's last assignment; `true` branches the
    /// variable to false first, which is also the initial default.
    pub(crate) polarity: Vec<bool>,
    /// User-pinned branching value, overriding phase saving when not `Undef`.
    pub(crate) user_pol: Vec<LBool>,
    /// Whether the variable is eligible for branching.
    pub(crate) decision: Vec<bool>,
}

impl Assignment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.assigns.len()
    }

    /// Extends every per-variable array for one fresh variable.
    pub fn init_var(&mut self, upol: LBool) {
        self.assigns.push(LBool::Undef);
        self.level.push(0);
        self.reason.push(CRef::UNDEF);
        self.polarity.push(true);
        self.user_pol.push(upol);
        self.decision.push(false);
    }

    /// The variable's current value.
    #[must_use]
    pub fn var_value(&self, v: Variable) -> LBool {
        self.assigns[v as usize]
    }

    /// The literal's current value under the assignment.
    #[must_use]
    pub fn value(&self, l: Lit) -> LBool {
        self.assigns[l.var() as usize].apply_sign(l.sign())
    }

    /// The decision level the variable was assigned at. Only meaningful
    /// while the variable is assigned.
    #[must_use]
    pub fn level(&self, v: Variable) -> u32 {
        self.level[v as usize]
    }

    /// The clause that forced the variable, or `CRef::UNDEF` for decisions
    /// and top-level facts. Only meaningful while the variable is assigned.
    #[must_use]
    pub fn reason(&self, v: Variable) -> CRef {
        self.reason[v as usize]
    }

    pub(crate) fn set_reason(&mut self, v: Variable, reason: CRef) {
        self.reason[v as usize] = reason;
    }

    /// Makes the literal true at `level` with the given reason.
    pub(crate) fn assign(&mut self, l: Lit, level: u32, reason: CRef) {
        let v = l.var() as usize;
        debug_assert!(self.assigns[v].is_undef());
        self.assigns[v] = LBool::from_bool(!l.sign());
        self.level[v] = level;
        self.reason[v] = reason;
    }

    pub(crate) fn unassign(&mut self, v: Variable) {
        self.assigns[v as usize] = LBool::Undef;
    }
}
