//! Property-based tests: the solver against a brute-force oracle, soundness
//! of produced models, and equivalence under simplification.

mod common;

use common::{brute_force_sat, model_satisfies, solver_from};
use proptest::collection::vec;
use proptest::prelude::*;
use satori::sat::configs::SolverConfig;
use satori::sat::literal::LBool;

const MAX_VARS: i32 = 8;

/// A literal over at most `MAX_VARS` variables, never zero.
fn literal() -> impl Strategy<Value = i32> {
    (1..=MAX_VARS, any::<bool>()).prop_map(|(v, sign)| if sign { -v } else { v })
}

fn clause() -> impl Strategy<Value = Vec<i32>> {
    vec(literal(), 1..=4)
}

fn formula() -> impl Strategy<Value = Vec<Vec<i32>>> {
    vec(clause(), 0..=24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Completeness on small instances: the verdict matches exhaustive
    /// search, with and without the simplifier.
    #[test]
    fn prop_matches_brute_force(clauses in formula()) {
        let expected = brute_force_sat(MAX_VARS as u32, &clauses);

        let mut plain = solver_from(SolverConfig::without_simplification(), &clauses);
        prop_assert_eq!(plain.solve(&[]) == LBool::True, expected);

        let mut simp = solver_from(SolverConfig::default(), &clauses);
        prop_assert_eq!(simp.solve(&[]) == LBool::True, expected);
    }

    /// Soundness of SAT answers: a claimed model satisfies every original
    /// clause, including over eliminated variables.
    #[test]
    fn prop_models_are_sound(clauses in formula()) {
        let mut s = solver_from(SolverConfig::default(), &clauses);
        if s.solve(&[]) == LBool::True {
            prop_assert!(model_satisfies(&s, &clauses));
        }
    }

    /// Instances satisfiable by construction never come back UNSAT.
    #[test]
    fn prop_satisfiable_instances_never_unsat(seed in 0u64..1024) {
        let clauses = common::random_satisfiable(seed, 20, 60, 3);
        let mut s = solver_from(SolverConfig::default(), &clauses);
        prop_assert_eq!(s.solve(&[]), LBool::True);
        prop_assert!(model_satisfies(&s, &clauses));
    }

    /// Assumption answers are consistent: a False under one assumption
    /// means the formula indeed forces its negation.
    #[test]
    fn prop_failed_assumptions_are_real(clauses in formula(), var in 1..=MAX_VARS) {
        let mut s = solver_from(SolverConfig::without_simplification(), &clauses);
        let assumption = var;
        if s.solve(&[satori::sat::literal::Lit::from_dimacs(assumption)]) == LBool::False {
            // the formula together with the assumption is unsatisfiable
            let mut strengthened = clauses.clone();
            strengthened.push(vec![assumption]);
            prop_assert!(!brute_force_sat(MAX_VARS as u32, &strengthened));
        }
    }
}
