#![warn(missing_docs)]
//! A CDCL SAT solver with two-watched-literal propagation, first-UIP clause
//! learning, activity-driven branching, Luby restarts and bounded variable
//! elimination.
//!
//! The typical round trip:
//!
//! ```
//! use satori::sat::configs::SolverConfig;
//! use satori::sat::literal::{LBool, Lit};
//! use satori::sat::solver::Solver;
//!
//! let mut solver = Solver::new(SolverConfig::default());
//! solver.add_dimacs_clause(&[1, 2]).unwrap();
//! solver.add_dimacs_clause(&[-1, 2]).unwrap();
//! assert_eq!(solver.solve(&[]), LBool::True);
//! assert_eq!(solver.model_value(Lit::from_dimacs(2)), LBool::True);
//! ```

/// The `sat` module implements the solving engine itself.
pub mod sat;

/// The `command_line` module implements the DIMACS front end used by the
/// binary.
pub mod command_line;
