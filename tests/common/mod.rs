//! Shared helpers for the integration tests.
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use satori::sat::configs::SolverConfig;
use satori::sat::literal::{LBool, Lit};
use satori::sat::solver::Solver;

/// Builds a solver over the given DIMACS-style clauses.
pub fn solver_from(config: SolverConfig, clauses: &[Vec<i32>]) -> Solver {
    let mut solver = Solver::new(config);
    for clause in clauses {
        solver.add_dimacs_clause(clause).unwrap();
    }
    solver
}

/// Whether the model on `solver` satisfies every given clause.
pub fn model_satisfies(solver: &Solver, clauses: &[Vec<i32>]) -> bool {
    clauses.iter().all(|clause| {
        clause
            .iter()
            .any(|&l| solver.model_value(Lit::from_dimacs(l)) == LBool::True)
    })
}

/// Exhaustive satisfiability check for small variable counts.
pub fn brute_force_sat(num_vars: u32, clauses: &[Vec<i32>]) -> bool {
    assert!(num_vars <= 20);
    for assignment in 0u32..(1 << num_vars) {
        let satisfied = clauses.iter().all(|clause| {
            clause.iter().any(|&l| {
                let var = l.unsigned_abs() - 1;
                let value = assignment & (1 << var) != 0;
                if l > 0 {
                    value
                } else {
                    !value
                }
            })
        });
        if satisfied {
            return true;
        }
    }
    false
}

/// A uniform random k-SAT instance.
pub fn random_ksat(seed: u64, num_vars: i32, num_clauses: usize, k: usize) -> Vec<Vec<i32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_clauses)
        .map(|_| {
            let mut clause = Vec::with_capacity(k);
            while clause.len() < k {
                let var = rng.gen_range(1..=num_vars);
                if clause.iter().any(|&l: &i32| l.abs() == var) {
                    continue;
                }
                let sign = if rng.gen::<bool>() { 1 } else { -1 };
                clause.push(var * sign);
            }
            clause
        })
        .collect()
}

/// A random instance made satisfiable by construction: a hidden assignment
/// is drawn first and every clause is forced to agree with it somewhere.
pub fn random_satisfiable(seed: u64, num_vars: i32, num_clauses: usize, k: usize) -> Vec<Vec<i32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let hidden: Vec<bool> = (0..num_vars).map(|_| rng.gen()).collect();
    (0..num_clauses)
        .map(|_| {
            let mut clause = Vec::with_capacity(k);
            while clause.len() < k {
                let var = rng.gen_range(1..=num_vars);
                if clause.iter().any(|&l: &i32| l.abs() == var) {
                    continue;
                }
                let sign = if rng.gen::<bool>() { 1 } else { -1 };
                clause.push(var * sign);
            }
            // force one literal to agree with the hidden assignment
            let fix = rng.gen_range(0..k);
            let var = clause[fix].abs();
            clause[fix] = if hidden[(var - 1) as usize] { var } else { -var };
            clause
        })
        .collect()
}

/// The pigeonhole principle PHP(pigeons, holes), unsatisfiable whenever
/// `pigeons > holes`.
pub fn pigeonhole(pigeons: i32, holes: i32) -> Vec<Vec<i32>> {
    let var = |p: i32, h: i32| p * holes + h + 1;
    let mut clauses = Vec::new();
    for p in 0..pigeons {
        clauses.push((0..holes).map(|h| var(p, h)).collect());
    }
    for h in 0..holes {
        for p1 in 0..pigeons {
            for p2 in (p1 + 1)..pigeons {
                clauses.push(vec![-var(p1, h), -var(p2, h)]);
            }
        }
    }
    clauses
}
