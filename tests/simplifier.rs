//! End-to-end tests of the variable-elimination simplifier.

mod common;

use common::{
    brute_force_sat, model_satisfies, pigeonhole, random_ksat, random_satisfiable, solver_from,
};
use satori::sat::configs::SolverConfig;
use satori::sat::dimacs::{load_dimacs_text, write_dimacs};
use satori::sat::literal::{LBool, Lit};
use satori::sat::solver::Solver;

#[test]
fn test_preprocessing_preserves_the_verdict() {
    // the -no-pre/-pre comparison from the contract, on a 100-variable
    // random 3-SAT instance at ratio 4.2
    let clauses = random_ksat(5, 100, 420, 3);

    let mut with_pre = solver_from(SolverConfig::default(), &clauses);
    let mut without_pre = solver_from(SolverConfig::without_simplification(), &clauses);

    let a = with_pre.solve(&[]);
    let b = without_pre.solve(&[]);
    assert_eq!(a, b);
    if a == LBool::True {
        assert!(model_satisfies(&with_pre, &clauses));
        assert!(model_satisfies(&without_pre, &clauses));
    }
}

#[test]
fn test_preprocessed_models_cover_eliminated_variables() {
    for seed in 0..25 {
        let clauses = random_satisfiable(seed, 30, 100, 3);
        let mut s = solver_from(SolverConfig::default(), &clauses);
        assert_eq!(s.solve(&[]), LBool::True, "seed {seed}");
        assert!(
            model_satisfies(&s, &clauses),
            "model extension failed on seed {seed}"
        );
    }
}

#[test]
fn test_eliminate_agrees_with_brute_force() {
    for seed in 100..140 {
        let clauses = random_ksat(seed, 7, 18, 3);
        let expected = brute_force_sat(7, &clauses);
        let mut s = solver_from(SolverConfig::default(), &clauses);
        assert_eq!(s.solve(&[]) == LBool::True, expected, "seed {seed}");
    }
}

#[test]
fn test_pigeonhole_stays_unsat_with_preprocessing() {
    let mut s = solver_from(SolverConfig::default(), &pigeonhole(4, 3));
    assert_eq!(s.solve(&[]), LBool::False);
}

#[test]
fn test_explicit_eliminate_then_solve() {
    let clauses = random_satisfiable(77, 40, 140, 3);
    let mut s = solver_from(SolverConfig::default(), &clauses);

    assert!(s.eliminate(false).unwrap());
    let eliminated_before = s.eliminated_vars();
    assert_eq!(s.solve(&[]), LBool::True);
    assert!(model_satisfies(&s, &clauses));
    assert!(s.eliminated_vars() >= eliminated_before);
}

#[test]
fn test_frozen_assumption_variables_survive() {
    let clauses = vec![vec![1, 2], vec![-1, 3], vec![-2, 3], vec![-3, 4]];
    let mut s = solver_from(SolverConfig::default(), &clauses);

    let a = Lit::from_dimacs(4);
    assert_eq!(s.solve(&[!a]), LBool::False);
    assert!(s.conflict().iter().all(|&l| l == a || l == !a));
}

#[test]
fn test_asymmetric_branching_keeps_equivalence() {
    let config = SolverConfig {
        use_asymm: true,
        ..SolverConfig::default()
    };
    for seed in 300..315 {
        let clauses = random_ksat(seed, 8, 24, 3);
        let expected = brute_force_sat(8, &clauses);
        let mut s = solver_from(config.clone(), &clauses);
        assert_eq!(s.solve(&[]) == LBool::True, expected, "seed {seed}");
    }
}

#[test]
fn test_rcheck_keeps_equivalence() {
    let config = SolverConfig {
        use_rcheck: true,
        ..SolverConfig::default()
    };
    for seed in 400..415 {
        let clauses = random_ksat(seed, 8, 24, 3);
        let expected = brute_force_sat(8, &clauses);
        let mut s = solver_from(config.clone(), &clauses);
        assert_eq!(s.solve(&[]) == LBool::True, expected, "seed {seed}");
    }
}

#[test]
fn test_emitted_simplified_cnf_is_equisatisfiable() {
    for seed in [9, 10, 11, 12] {
        let clauses = random_ksat(seed, 20, 70, 3);
        let expected = {
            let mut s = solver_from(SolverConfig::without_simplification(), &clauses);
            s.solve(&[])
        };

        let mut simp = solver_from(SolverConfig::default(), &clauses);
        simp.eliminate(true).unwrap();
        let mut buffer = Vec::new();
        write_dimacs(&simp, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut reparsed = Solver::new(SolverConfig::default());
        load_dimacs_text(&text, &mut reparsed).unwrap();
        assert_eq!(reparsed.solve(&[]), expected, "seed {seed}");
    }
}
