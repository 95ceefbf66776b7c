#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The DIMACS command-line front end.

mod cli;

pub use cli::{run, Cli};
