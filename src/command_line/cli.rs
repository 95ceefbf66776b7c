#![allow(clippy::cast_precision_loss)]
//! Command-line parsing and the solve-and-report flow of the binary.
//!
//! Exit codes follow the DIMACS convention: 10 for satisfiable, 20 for
//! unsatisfiable, 0 for an indeterminate answer (limit or interrupt), 1 for
//! input or option errors. Numeric options can also be supplied through
//! `MINISAT_<OPTION>` environment variables, command line taking precedence.

use crate::sat::configs::SolverConfig;
use crate::sat::dimacs::{load_dimacs, write_dimacs, DimacsStats};
use crate::sat::literal::LBool;
use crate::sat::solver::Solver;
use clap::error::ErrorKind;
use clap::Parser;
use flate2::read::GzDecoder;
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A SAT solver for DIMACS CNF files.
#[derive(Parser, Debug)]
#[command(
    name = "satori",
    version,
    about = "A CDCL SAT solver with preprocessing"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input file in DIMACS CNF format, plain or gzip-compressed; stdin when
    /// omitted.
    pub input: Option<PathBuf>,

    /// Result file; receives SAT/UNSAT/INDET and the model.
    pub output: Option<PathBuf>,

    /// Verbosity: 0 quiet, 1 statistics, 2 internals.
    #[arg(long, default_value_t = 1, env = "MINISAT_VERB", value_parser = clap::value_parser!(u32).range(0..=2))]
    pub verb: u32,

    /// CPU time limit in seconds.
    #[arg(long = "cpu-lim", env = "MINISAT_CPU_LIM")]
    pub cpu_lim: Option<u64>,

    /// Clause-memory limit in megabytes.
    #[arg(long = "mem-lim", env = "MINISAT_MEM_LIM")]
    pub mem_lim: Option<usize>,

    /// Write the simplified CNF to this file and exit.
    #[arg(long = "dimacs", env = "MINISAT_DIMACS")]
    pub dimacs: Option<PathBuf>,

    /// Turn preprocessing on (the default).
    #[arg(long, overrides_with = "no_pre")]
    pub pre: bool,

    /// Turn preprocessing off.
    #[arg(long = "no-pre")]
    pub no_pre: bool,

    /// Variable activity decay factor.
    #[arg(long = "var-decay", default_value_t = 0.95, env = "MINISAT_VAR_DECAY")]
    pub var_decay: f64,

    /// Clause activity decay factor.
    #[arg(long = "cla-decay", default_value_t = 0.999, env = "MINISAT_CLA_DECAY")]
    pub cla_decay: f64,

    /// Frequency of random decisions.
    #[arg(long = "rnd-freq", default_value_t = 0.0, env = "MINISAT_RND_FREQ")]
    pub rnd_freq: f64,

    /// Seed of the random generator.
    #[arg(long = "rnd-seed", default_value_t = 91_648_253, env = "MINISAT_RND_SEED")]
    pub rnd_seed: u64,

    /// Randomise initial activities.
    #[arg(long = "rnd-init")]
    pub rnd_init: bool,

    /// Random branch polarities.
    #[arg(long = "rnd-pol")]
    pub rnd_pol: bool,

    /// Learnt-clause minimisation: 0 none, 1 local, 2 deep.
    #[arg(long = "ccmin-mode", default_value_t = 2, env = "MINISAT_CCMIN_MODE", value_parser = clap::value_parser!(u32).range(0..=2))]
    pub ccmin_mode: u32,

    /// Phase saving: 0 none, 1 limited, 2 full.
    #[arg(long = "phase-saving", default_value_t = 2, env = "MINISAT_PHASE_SAVING", value_parser = clap::value_parser!(u32).range(0..=2))]
    pub phase_saving: u32,

    /// Use the Luby restart sequence (the default).
    #[arg(long, overrides_with = "no_luby")]
    pub luby: bool,

    /// Use the geometric restart sequence instead of Luby.
    #[arg(long = "no-luby")]
    pub no_luby: bool,

    /// Restart interval growth factor.
    #[arg(long, default_value_t = 2.0, env = "MINISAT_RINC")]
    pub rinc: f64,

    /// Base restart interval in conflicts.
    #[arg(long, default_value_t = 100, env = "MINISAT_RFIRST")]
    pub rfirst: u64,

    /// Wasted-memory fraction triggering garbage collection.
    #[arg(long = "gc-frac", default_value_t = 0.20, env = "MINISAT_GC_FRAC")]
    pub gc_frac: f64,

    /// Lower bound on the learnt-clause budget.
    #[arg(long = "min-learnts", default_value_t = 0, env = "MINISAT_MIN_LEARNTS")]
    pub min_learnts: u64,

    /// Use variable elimination (the default).
    #[arg(long, overrides_with = "no_elim")]
    pub elim: bool,

    /// Turn variable elimination off.
    #[arg(long = "no-elim")]
    pub no_elim: bool,

    /// Asymmetric branching during simplification.
    #[arg(long)]
    pub asymm: bool,

    /// Drop clauses implied by the rest of the formula.
    #[arg(long)]
    pub rcheck: bool,

    /// Wasted-memory fraction triggering collection during simplification.
    #[arg(long = "simp-gc-frac", default_value_t = 0.5, env = "MINISAT_SIMP_GC_FRAC")]
    pub simp_gc_frac: f64,

    /// Skip subsumption checks against clauses longer than this (-1: none).
    #[arg(long = "sub-lim", default_value_t = 1000, env = "MINISAT_SUB_LIM")]
    pub sub_lim: i32,

    /// Longest resolvent variable elimination may create (-1: none).
    #[arg(long = "cl-lim", default_value_t = 20, env = "MINISAT_CL_LIM")]
    pub cl_lim: i32,

    /// Clauses elimination may add over what it removes.
    #[arg(long, default_value_t = 0, env = "MINISAT_GROW")]
    pub grow: i32,
}

impl Cli {
    fn to_config(&self) -> Result<SolverConfig, String> {
        for (name, value) in [
            ("var-decay", self.var_decay),
            ("cla-decay", self.cla_decay),
        ] {
            if !(0.0 < value && value < 1.0) {
                return Err(format!("option `{name}` must lie in (0, 1), got {value}"));
            }
        }
        if !(0.0..=1.0).contains(&self.rnd_freq) {
            return Err(format!(
                "option `rnd-freq` must lie in [0, 1], got {}",
                self.rnd_freq
            ));
        }
        for (name, value) in [("gc-frac", self.gc_frac), ("simp-gc-frac", self.simp_gc_frac)] {
            if value <= 0.0 {
                return Err(format!("option `{name}` must be positive, got {value}"));
            }
        }
        if self.rinc < 1.0 {
            return Err(format!("option `rinc` must be at least 1, got {}", self.rinc));
        }
        if self.rfirst == 0 {
            return Err("option `rfirst` must be positive".to_owned());
        }

        Ok(SolverConfig {
            var_decay: self.var_decay,
            clause_decay: self.cla_decay,
            random_var_freq: self.rnd_freq,
            random_seed: self.rnd_seed,
            rnd_init_act: self.rnd_init,
            ccmin_mode: self.ccmin_mode,
            phase_saving: self.phase_saving,
            rnd_pol: self.rnd_pol,
            luby_restart: !self.no_luby,
            restart_inc: self.rinc,
            restart_first: self.rfirst,
            garbage_frac: self.gc_frac,
            min_learnts_lim: self.min_learnts,
            verbosity: self.verb,
            use_asymm: self.asymm,
            use_rcheck: self.rcheck,
            use_elim: !self.no_elim,
            simp_garbage_frac: self.simp_gc_frac,
            subsumption_lim: self.sub_lim,
            clause_lim: self.cl_lim,
            grow: self.grow,
            ..SolverConfig::default()
        })
    }
}

/// Parses the command line, solves the input, reports, and returns the
/// process exit code.
#[must_use]
pub fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let kind = e.kind();
            let _ = e.print();
            return i32::from(!matches!(
                kind,
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ));
        }
    };

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("ERROR! {message}");
            return 1;
        }
    };

    let mut solver = Solver::new(config);
    if let Some(mb) = cli.mem_lim {
        solver.set_memory_limit(mb);
    }
    if let Some(secs) = cli.cpu_lim {
        let flag = solver.interrupt_flag();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(secs));
            warn!("cpu time limit reached, interrupting");
            flag.store(true, std::sync::atomic::Ordering::Relaxed);
        });
    }
    if cli.no_pre {
        if let Err(e) = solver.eliminate(true) {
            eprintln!("ERROR! {e}");
            return 1;
        }
    }

    let reader = match open_input(cli.input.as_deref()) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("ERROR! could not open input: {e}");
            return 1;
        }
    };

    let parse_start = std::time::Instant::now();
    let stats = match load_dimacs(reader, &mut solver) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("ERROR! {e}");
            return 1;
        }
    };
    let parse_time = parse_start.elapsed();

    if let Some(declared) = stats.declared_clauses {
        if declared != stats.parsed_clauses {
            warn!(
                "problem line declared {declared} clauses, parsed {}",
                stats.parsed_clauses
            );
        }
    }
    if cli.verb >= 1 {
        print_problem_stats(&solver, &stats, parse_time.as_secs_f64());
    }

    if let Some(path) = cli.dimacs.as_deref() {
        return emit_simplified(&mut solver, path, cli.verb);
    }

    let result = solver.solve_limited(&[]);

    if cli.verb >= 1 {
        print_search_stats(&solver);
    }
    match result {
        LBool::True => println!("SATISFIABLE"),
        LBool::False => println!("UNSATISFIABLE"),
        LBool::Undef => println!("INDETERMINATE"),
    }
    if let Some(path) = cli.output.as_deref() {
        if let Err(e) = write_result(&solver, result, path) {
            eprintln!("ERROR! could not write result: {e}");
            return 1;
        }
    }

    match result {
        LBool::True => 10,
        LBool::False => 20,
        LBool::Undef => 0,
    }
}

fn open_input(path: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let mut reader = BufReader::new(File::open(path)?);
            // gzip magic bytes
            let compressed = reader.fill_buf()?.starts_with(&[0x1f, 0x8b]);
            if compressed {
                info!("reading gzip-compressed input");
                Ok(Box::new(BufReader::new(GzDecoder::new(reader))))
            } else {
                Ok(Box::new(reader))
            }
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn emit_simplified(solver: &mut Solver, path: &Path, verb: u32) -> i32 {
    if let Err(e) = solver.eliminate(true) {
        eprintln!("ERROR! {e}");
        return 1;
    }
    if verb >= 1 {
        stat_line("Eliminated variables", solver.eliminated_vars());
        stat_line("Remaining clauses", solver.num_clauses());
    }
    let result = File::create(path).and_then(|file| {
        let mut out = BufWriter::new(file);
        write_dimacs(solver, &mut out)
    });
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("ERROR! could not write {}: {e}", path.display());
            1
        }
    }
}

fn write_result(solver: &Solver, result: LBool, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    match result {
        LBool::True => {
            writeln!(out, "SAT")?;
            for (v, &value) in solver.model().iter().enumerate() {
                #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
                let dimacs = v as i32 + 1;
                match value {
                    LBool::True => write!(out, "{dimacs} ")?,
                    LBool::False => write!(out, "-{dimacs} ")?,
                    LBool::Undef => {}
                }
            }
            writeln!(out, "0")?;
        }
        LBool::False => writeln!(out, "UNSAT")?,
        LBool::Undef => writeln!(out, "INDET")?,
    }
    Ok(())
}

fn stat_line(label: &str, value: impl std::fmt::Display) {
    eprintln!("|  {label:<28} {value:>18}  |");
}

fn stat_line_with_rate(label: &str, value: u64, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    eprintln!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

fn print_problem_stats(solver: &Solver, stats: &DimacsStats, parse_secs: f64) {
    eprintln!("=======================[ Problem Statistics ]========================");
    stat_line("Parse time (s)", format!("{parse_secs:.3}"));
    stat_line("Variables", solver.num_vars());
    stat_line("Clauses", stats.parsed_clauses);
}

fn print_search_stats(solver: &Solver) {
    let s = solver.stats();
    let elapsed = solver.cpu_time();
    eprintln!("=======================[ Search Statistics ]=========================");
    stat_line("Restarts", s.starts);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed);
    stat_line_with_rate("Decisions", s.decisions, elapsed);
    stat_line_with_rate("Propagations", s.propagations, elapsed);
    stat_line(
        "Conflict literals (deleted)",
        format!(
            "{} ({:.2} %)",
            s.tot_literals,
            if s.max_literals > 0 {
                100.0 * (s.max_literals - s.tot_literals) as f64 / s.max_literals as f64
            } else {
                0.0
            }
        ),
    );
    stat_line("Eliminated variables", solver.eliminated_vars());
    stat_line("CPU time (s)", format!("{elapsed:.3}"));
    eprintln!("=====================================================================");
}
