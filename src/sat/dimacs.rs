#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! DIMACS CNF input and output.
//!
//! The reader streams clauses straight into a solver: comment lines start
//! with `c`, the problem line is `p cnf <vars> <clauses>`, clauses are
//! whitespace-separated integers terminated by `0`, and a `%` line ends the
//! data (competition files). Malformed input is reported with its line and
//! column.
//!
//! The writer emits the current (possibly simplified) formula in the same
//! format over a compacted variable numbering, preceded by comment lines
//! recording the eliminated-variable reconstruction stack.

use crate::sat::clause_storage::OutOfMemoryError;
use crate::sat::literal::{LBool, Lit, Variable};
use crate::sat::solver::Solver;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Failure while loading a DIMACS file.
#[derive(Debug, Error)]
pub enum DimacsError {
    /// Malformed input, located by line and column (both 1-based).
    #[error("parse error at line {line}, column {column}: {message}")]
    Syntax {
        /// 1-based line of the offending token.
        line: usize,
        /// 1-based column of the offending token.
        column: usize,
        /// What was wrong.
        message: String,
    },
    /// The underlying reader failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The solver ran out of clause memory while ingesting.
    #[error(transparent)]
    OutOfMemory(#[from] OutOfMemoryError),
}

/// What the problem line declared and what was actually read.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimacsStats {
    /// Variable count from the problem line, if present.
    pub declared_vars: Option<usize>,
    /// Clause count from the problem line, if present.
    pub declared_clauses: Option<usize>,
    /// Clauses actually handed to the solver.
    pub parsed_clauses: usize,
}

/// Streams a DIMACS CNF formula into `solver`, creating variables on demand.
///
/// # Errors
///
/// Reports malformed input with line/column, and propagates I/O failures and
/// arena exhaustion.
pub fn load_dimacs<R: BufRead>(reader: R, solver: &mut Solver) -> Result<DimacsStats, DimacsError> {
    let mut stats = DimacsStats::default();
    let mut clause: Vec<Lit> = Vec::new();
    let mut clause_open = false;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_no + 1;

        let trimmed = line.trim_start();
        if trimmed.starts_with('c') {
            continue;
        }
        if trimmed.starts_with('%') {
            break;
        }
        if trimmed.starts_with('p') {
            parse_problem_line(&line, line_no, &mut stats)?;
            continue;
        }

        for (column, token) in tokens(&line) {
            let value: i64 = token.parse().map_err(|_| DimacsError::Syntax {
                line: line_no,
                column,
                message: format!("expected a literal or 0, found `{token}`"),
            })?;
            if value == 0 {
                solver.add_clause_from(&clause)?;
                clause.clear();
                clause_open = false;
                stats.parsed_clauses += 1;
            } else {
                let value = i32::try_from(value).map_err(|_| DimacsError::Syntax {
                    line: line_no,
                    column,
                    message: format!("literal `{token}` out of range"),
                })?;
                clause.push(Lit::from_dimacs(value));
                clause_open = true;
            }
        }
    }

    if clause_open {
        // tolerate a missing terminator on the final clause
        solver.add_clause_from(&clause)?;
        stats.parsed_clauses += 1;
    }
    Ok(stats)
}

/// Parses DIMACS text held in memory; convenient for tests.
///
/// # Errors
///
/// As [`load_dimacs`].
pub fn load_dimacs_text(text: &str, solver: &mut Solver) -> Result<DimacsStats, DimacsError> {
    load_dimacs(io::Cursor::new(text), solver)
}

fn parse_problem_line(
    line: &str,
    line_no: usize,
    stats: &mut DimacsStats,
) -> Result<(), DimacsError> {
    let mut fields = tokens(line);
    let syntax = |column: usize, message: String| DimacsError::Syntax {
        line: line_no,
        column,
        message,
    };

    fields.next(); // the `p` itself
    match fields.next() {
        Some((_, "cnf")) => {}
        Some((column, other)) => {
            return Err(syntax(column, format!("expected `cnf`, found `{other}`")))
        }
        None => return Err(syntax(1, "incomplete problem line".to_owned())),
    }
    for slot in [&mut stats.declared_vars, &mut stats.declared_clauses] {
        match fields.next() {
            Some((column, token)) => {
                let n: usize = token.parse().map_err(|_| {
                    syntax(column, format!("expected a count, found `{token}`"))
                })?;
                *slot = Some(n);
            }
            None => return Err(syntax(1, "incomplete problem line".to_owned())),
        }
    }
    Ok(())
}

/// Whitespace-separated tokens of a line with their 1-based start columns.
fn tokens(line: &str) -> impl Iterator<Item = (usize, &str)> {
    let bytes = line.as_bytes();
    let mut at = 0;
    std::iter::from_fn(move || {
        while at < bytes.len() && bytes[at].is_ascii_whitespace() {
            at += 1;
        }
        if at >= bytes.len() {
            return None;
        }
        let start = at;
        while at < bytes.len() && !bytes[at].is_ascii_whitespace() {
            at += 1;
        }
        Some((start + 1, &line[start..at]))
    })
}

impl Solver {
    /// Adds one parsed clause, creating its variables on demand.
    ///
    /// # Errors
    ///
    /// Propagates arena exhaustion.
    pub fn add_clause_from(&mut self, lits: &[Lit]) -> Result<bool, OutOfMemoryError> {
        for l in lits {
            self.ensure_var(l.var());
        }
        self.add_clause(lits)
    }
}

/// Writes the solver's current formula in DIMACS format over a compacted
/// variable numbering.
///
/// Top-level facts are emitted as unit clauses; clauses already satisfied at
/// the top level are skipped and false literals dropped. The eliminated-
/// variable reconstruction stack precedes the clauses as `c elim` comment
/// lines, newest block first, so an external consumer can extend a model the
/// same way the solver would.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_dimacs<W: Write>(solver: &Solver, out: &mut W) -> io::Result<()> {
    if !solver.is_ok() {
        writeln!(out, "p cnf 1 2")?;
        writeln!(out, "1 0")?;
        writeln!(out, "-1 0")?;
        return Ok(());
    }

    let mut map: FxHashMap<Variable, i32> = FxHashMap::default();
    let mut next = 0_i32;
    let mut map_lit = |l: Lit| {
        let v = *map.entry(l.var()).or_insert_with(|| {
            next += 1;
            next
        });
        if l.sign() {
            -v
        } else {
            v
        }
    };

    let mut lines: Vec<Vec<i32>> = Vec::new();
    for l in solver.trail.iter() {
        lines.push(vec![map_lit(l)]);
    }
    for &cref in &solver.clauses {
        if solver.ca.clause(cref).mark() == crate::sat::clause::MARK_REMOVED
            || solver.satisfied(cref)
        {
            continue;
        }
        let line: Vec<i32> = solver
            .ca
            .clause(cref)
            .iter()
            .filter(|&l| solver.assignment.value(l) != LBool::False)
            .map(&mut map_lit)
            .collect();
        lines.push(line);
    }

    let mut elim_lines: Vec<Vec<i32>> = Vec::new();
    let stack = &solver.simp.elimclauses;
    let mut i = stack.len();
    while i > 0 {
        let size = stack[i - 1] as usize;
        let start = i - 1 - size;
        let block: Vec<i32> = (start..i - 1)
            .map(|k| map_lit(Lit::from_index(stack[k] as usize)))
            .collect();
        elim_lines.push(block);
        i = start;
    }

    writeln!(out, "p cnf {} {}", next, lines.len())?;
    for block in &elim_lines {
        writeln!(out, "c elim {} 0", block.iter().join(" "))?;
    }
    for line in &lines {
        writeln!(out, "{} 0", line.iter().join(" "))?;
    }
    Ok(())
}
