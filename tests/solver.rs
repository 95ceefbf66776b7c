//! End-to-end tests of the search kernel.

mod common;

use common::{brute_force_sat, model_satisfies, pigeonhole, random_ksat, solver_from};
use satori::sat::configs::SolverConfig;
use satori::sat::literal::{LBool, Lit};

fn plain() -> SolverConfig {
    SolverConfig::without_simplification()
}

#[test]
fn test_single_variable_contradiction_is_unsat() {
    let mut s = solver_from(plain(), &[vec![1], vec![-1]]);
    assert_eq!(s.solve(&[]), LBool::False);
}

#[test]
fn test_implication_chain_is_sat_and_model_checks() {
    let clauses = vec![vec![1, 2, 3], vec![-1, 2], vec![-2, 3]];
    let mut s = solver_from(plain(), &clauses);
    assert_eq!(s.solve(&[]), LBool::True);
    assert!(model_satisfies(&s, &clauses));
}

#[test]
fn test_pigeonhole_three_into_two_is_unsat() {
    let mut s = solver_from(plain(), &pigeonhole(3, 2));
    assert_eq!(s.solve(&[]), LBool::False);
}

#[test]
fn test_pigeonhole_five_into_four_is_unsat() {
    let mut s = solver_from(plain(), &pigeonhole(5, 4));
    assert_eq!(s.solve(&[]), LBool::False);
}

#[test]
fn test_contradictory_assumptions() {
    let clauses = vec![vec![1, 2], vec![-2, 3]];
    let mut s = solver_from(plain(), &clauses);
    let a = Lit::from_dimacs(1);

    assert_eq!(s.solve(&[a, !a]), LBool::False);
    assert!(!s.conflict().is_empty());
    assert!(s.conflict().iter().all(|&l| l == a || l == !a));

    // without the assumptions the instance is satisfiable
    assert_eq!(s.solve(&[]), LBool::True);
}

#[test]
fn test_failed_assumption_is_implied_false() {
    // 1 forces 2; assuming -2 must fail and blame the assumptions
    let clauses = vec![vec![1], vec![-1, 2]];
    let mut s = solver_from(plain(), &clauses);
    let failing = Lit::from_dimacs(-2);
    assert_eq!(s.solve(&[failing]), LBool::False);
    assert!(s.conflict().contains(&!failing) || s.conflict().contains(&failing));
}

#[test]
fn test_tautological_clause_changes_nothing() {
    let base = vec![vec![1, 2], vec![-1, 2], vec![-2, 1]];
    let mut with_taut = base.clone();
    with_taut.insert(1, vec![1, -1, 2]);

    let mut s1 = solver_from(plain(), &base);
    let mut s2 = solver_from(plain(), &with_taut);
    assert_eq!(s1.solve(&[]), s2.solve(&[]));
    assert_eq!(s1.num_clauses(), s2.num_clauses());
}

#[test]
fn test_identical_runs_are_identical() {
    let clauses = random_ksat(7, 60, 250, 3);

    let mut first = solver_from(plain(), &clauses);
    let mut second = solver_from(plain(), &clauses);
    let r1 = first.solve(&[]);
    let r2 = second.solve(&[]);

    assert_eq!(r1, r2);
    assert_eq!(first.stats().conflicts, second.stats().conflicts);
    assert_eq!(first.stats().decisions, second.stats().decisions);
    assert_eq!(first.stats().propagations, second.stats().propagations);
    if r1 == LBool::True {
        assert_eq!(first.model(), second.model());
    }
}

#[test]
fn test_conflict_budget_is_honoured() {
    let mut s = solver_from(plain(), &pigeonhole(5, 4));
    s.set_conf_budget(2);
    assert_eq!(s.solve_limited(&[]), LBool::Undef);

    s.budget_off();
    assert_eq!(s.solve_limited(&[]), LBool::False);
}

#[test]
fn test_interrupt_flag_yields_indeterminate() {
    let mut s = solver_from(plain(), &pigeonhole(5, 4));
    s.interrupt_flag().store(true, std::sync::atomic::Ordering::Relaxed);
    assert_eq!(s.solve_limited(&[]), LBool::Undef);

    s.interrupt_flag().store(false, std::sync::atomic::Ordering::Relaxed);
    assert_eq!(s.solve_limited(&[]), LBool::False);
}

#[test]
fn test_agrees_with_brute_force_on_fixed_instances() {
    for seed in 0..40 {
        let clauses = random_ksat(seed, 6, 14, 3);
        let expected = brute_force_sat(6, &clauses);
        let mut s = solver_from(plain(), &clauses);
        let verdict = s.solve(&[]) == LBool::True;
        assert_eq!(verdict, expected, "seed {seed}");
        if verdict {
            assert!(model_satisfies(&s, &clauses), "seed {seed}");
        }
    }
}

#[test]
fn test_geometric_restarts_reach_the_same_verdicts() {
    let config = SolverConfig {
        luby_restart: false,
        ..plain()
    };
    let clauses = random_ksat(11, 40, 168, 3);
    let mut geometric = solver_from(config, &clauses);
    let mut luby = solver_from(plain(), &clauses);
    assert_eq!(geometric.solve(&[]), luby.solve(&[]));
}

#[test]
fn test_all_minimisation_modes_agree() {
    let clauses = random_ksat(23, 50, 210, 3);
    let mut verdicts = Vec::new();
    for mode in [0, 1, 2] {
        let config = SolverConfig {
            ccmin_mode: mode,
            ..plain()
        };
        let mut s = solver_from(config, &clauses);
        verdicts.push(s.solve(&[]));
    }
    assert_eq!(verdicts[0], verdicts[1]);
    assert_eq!(verdicts[1], verdicts[2]);
}
