#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Solver configuration: every tunable the engine honours, as a plain value
//! handed to the solver at construction.

/// Tunables of the search kernel and the simplifier.
///
/// Field names follow the command-line option names; defaults are the
/// engine's standard settings.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SolverConfig {
    /// Inverse growth factor of the variable-activity increment (`var-decay`).
    pub var_decay: f64,
    /// Inverse growth factor of the clause-activity increment (`cla-decay`).
    pub clause_decay: f64,
    /// Probability of picking the next decision variable at random
    /// (`rnd-freq`).
    pub random_var_freq: f64,
    /// Seed of the solver's private generator (`rnd-seed`).
    pub random_seed: u64,
    /// Initialise variable activities with small random values (`rnd-init`).
    pub rnd_init_act: bool,
    /// Learnt-clause minimisation: 0 none, 1 local, 2 deep (`ccmin-mode`).
    pub ccmin_mode: u32,
    /// Phase saving: 0 none, 1 limited to the deepest level, 2 full
    /// (`phase-saving`).
    pub phase_saving: u32,
    /// Pick branch polarities at random (`rnd-pol`).
    pub rnd_pol: bool,
    /// Luby restart sequence instead of plain geometric growth (`luby`).
    pub luby_restart: bool,
    /// Restart interval growth factor (`rinc`).
    pub restart_inc: f64,
    /// Base restart interval in conflicts (`rfirst`).
    pub restart_first: u64,
    /// Wasted-space fraction that triggers arena compaction (`gc-frac`).
    pub garbage_frac: f64,
    /// Lower bound on the learnt-clause budget (`min-learnts`).
    pub min_learnts_lim: u64,
    /// Initial learnt budget as a fraction of the problem clauses.
    pub learntsize_factor: f64,
    /// Growth of the learnt budget at every adjustment.
    pub learntsize_inc: f64,
    /// Conflicts before the first learnt-budget adjustment.
    pub learntsize_adjust_start: u64,
    /// Growth of the adjustment interval itself.
    pub learntsize_adjust_inc: f64,
    /// Verbosity of the status output: 0 silent, 1 search table, 2 plus
    /// GC/elimination chatter (`verb`).
    pub verbosity: u32,

    /// Whether the simplifier owns the clause database at all. Turned off
    /// permanently by `eliminate(true)`.
    pub use_simplification: bool,
    /// Asymmetric branching during simplification (`asymm`).
    pub use_asymm: bool,
    /// Discard clauses already implied by the rest of the formula (`rcheck`).
    pub use_rcheck: bool,
    /// Bounded variable elimination (`elim`).
    pub use_elim: bool,
    /// Wasted-space fraction triggering compaction during simplification
    /// (`simp-gc-frac`).
    pub simp_garbage_frac: f64,
    /// Skip subsumption checks against clauses longer than this; -1 means no
    /// limit (`sub-lim`).
    pub subsumption_lim: i32,
    /// Longest resolvent variable elimination may produce; -1 means no limit
    /// (`cl-lim`).
    pub clause_lim: i32,
    /// Number of clauses an elimination may add over what it removes
    /// (`grow`).
    pub grow: i32,
    /// Extend satisfying assignments over eliminated variables.
    pub extend_model: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            var_decay: 0.95,
            clause_decay: 0.999,
            random_var_freq: 0.0,
            random_seed: 91_648_253,
            rnd_init_act: false,
            ccmin_mode: 2,
            phase_saving: 2,
            rnd_pol: false,
            luby_restart: true,
            restart_inc: 2.0,
            restart_first: 100,
            garbage_frac: 0.20,
            min_learnts_lim: 0,
            learntsize_factor: 1.0 / 3.0,
            learntsize_inc: 1.1,
            learntsize_adjust_start: 100,
            learntsize_adjust_inc: 1.5,
            verbosity: 0,

            use_simplification: true,
            use_asymm: false,
            use_rcheck: false,
            use_elim: true,
            simp_garbage_frac: 0.5,
            subsumption_lim: 1000,
            clause_lim: 20,
            grow: 0,
            extend_model: true,
        }
    }
}

impl SolverConfig {
    /// A configuration with the simplifier disabled, for a plain search
    /// kernel.
    #[must_use]
    pub fn without_simplification() -> Self {
        Self {
            use_simplification: false,
            ..Self::default()
        }
    }
}
