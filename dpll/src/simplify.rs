//! Simplification by unit propagation and pure literal elimination.
use log::debug;

use dpll_formula::{Formula, Lit};

use crate::polarity::PolarityMap;

/// Outcome of a simplification pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reduction {
    /// The literals made true by the pass, in order. Empty if nothing could be simplified.
    Assigned(Vec<Lit>),
    /// The pass produced an empty clause.
    Unsat,
}

/// Assigns the literals of unit clauses until no unit clause is left.
///
/// Unit clauses are processed in clause order. Making a unit literal true removes all clauses
/// containing it and removes its negation from all other clauses, which can produce new unit
/// clauses. When this produces an empty clause the formula is unsatisfiable.
pub fn propagate_units(formula: &mut Formula) -> Reduction {
    let mut assigned = vec![];

    while let Some(lit) = formula.clauses().iter().find_map(|clause| clause.unit()) {
        assigned.push(lit);
        if let Err(err) = formula.fix_literal(lit) {
            debug!("Unit propagation: {}", err);
            return Reduction::Unsat;
        }
    }

    Reduction::Assigned(assigned)
}

/// Assigns every pure variable the value satisfying all its occurrences.
///
/// The polarities are taken from `polarities`, which must be computed for `formula` before calling
/// this. They are not recomputed after each assignment.
pub fn eliminate_pure_literals(formula: &mut Formula, polarities: &PolarityMap) -> Reduction {
    let pure: Vec<Lit> = polarities.pure_literals(formula).collect();

    for &lit in pure.iter() {
        // Satisfying another pure literal can remove all clauses of this variable.
        if !formula.variables().contains(&lit.var()) {
            continue;
        }
        if let Err(err) = formula.fix_literal(lit) {
            debug!("Pure literal elimination: {}", err);
            return Reduction::Unsat;
        }
    }

    Reduction::Assigned(pure)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use dpll_formula::formula::strategy::*;
    use dpll_formula::{formula, lit, lits, var};

    #[test]
    fn positive_unit() {
        let mut formula = formula![
            1;
            1, 2;
            -1, 3;
            -2, 4, 5;
        ];

        assert_eq!(propagate_units(&mut formula), Reduction::Assigned(lits![1, 3].to_vec()));
        assert_eq!(formula, formula![-2, 4, 5;]);
        for clause in formula.clauses() {
            assert!(!clause.contains(lit!(1)));
        }
        assert!(formula.check_variables());
    }

    #[test]
    fn negative_unit_strips_positive_occurrences() {
        let mut formula = formula![
            -1;
            1, 2, 3;
            -1, 4;
        ];

        assert_eq!(propagate_units(&mut formula), Reduction::Assigned(lits![-1].to_vec()));
        assert_eq!(formula, formula![2, 3;]);
    }

    #[test]
    fn conflicting_units() {
        let mut formula = formula![
            1;
            -1;
        ];

        assert_eq!(propagate_units(&mut formula), Reduction::Unsat);

        let mut formula = formula![
            -1;
            1, 2;
            -2, 3;
            -3, 1;
        ];

        assert_eq!(propagate_units(&mut formula), Reduction::Unsat);
    }

    #[test]
    fn nothing_to_propagate() {
        let mut formula = formula![
            1, 2;
            -1, -2;
        ];
        let before = formula.copy();

        assert_eq!(propagate_units(&mut formula), Reduction::Assigned(vec![]));
        assert_eq!(formula, before);
    }

    #[test]
    fn negative_pure_literal() {
        let mut formula = formula![
            -1, 2;
            -1, -2, 3;
            2, -3;
            -2, 3;
        ];

        let polarities = PolarityMap::compute(&formula);
        assert_eq!(
            eliminate_pure_literals(&mut formula, &polarities),
            Reduction::Assigned(lits![-1].to_vec())
        );
        assert!(!formula.variables().contains(&var!(1)));
        assert_eq!(formula, formula![2, -3; -2, 3;]);
    }

    #[test]
    fn pure_literals_of_removed_clauses_are_assigned() {
        let mut formula = formula![
            -1, -2;
            3, 4;
        ];

        let polarities = PolarityMap::compute(&formula);
        assert_eq!(
            eliminate_pure_literals(&mut formula, &polarities),
            Reduction::Assigned(lits![-1, -2, 3, 4].to_vec())
        );
        assert!(formula.is_empty());
        assert!(formula.variables().is_empty());
    }

    proptest! {
        #[test]
        fn unit_propagation_contract(
            input in formula(1..20usize, 0..50, 1..6),
            unit in dpll_formula::lit::strategy::lit(0..20usize),
        ) {
            let mut formula = input.copy();
            formula.add_clause(&[unit]);

            match propagate_units(&mut formula) {
                Reduction::Assigned(assigned) => {
                    let expected_first = input
                        .clauses()
                        .iter()
                        .find_map(|clause| clause.unit())
                        .or(Some(unit));
                    prop_assert_eq!(assigned.first(), expected_first.as_ref());
                    prop_assert!(assigned.contains(&unit));
                    for clause in formula.clauses() {
                        prop_assert!(clause.unit().is_none());
                        prop_assert!(!clause.is_empty());
                        prop_assert!(!clause.contains(unit));
                        prop_assert!(!clause.contains(!unit));
                    }
                }
                Reduction::Unsat => {
                    prop_assert!(formula.has_empty_clause());
                }
            }
            prop_assert!(formula.check_variables());
        }

        #[test]
        fn pure_literal_contract(input in formula(1..20usize, 0..50, 1..6)) {
            let mut formula = input.copy();
            let polarities = PolarityMap::compute(&formula);

            match eliminate_pure_literals(&mut formula, &polarities) {
                Reduction::Assigned(assigned) => {
                    for lit in assigned {
                        prop_assert_eq!(polarities.get(lit.var()).value(), Some(lit.is_positive()));
                        prop_assert!(!formula.variables().contains(&lit.var()));
                    }
                    let remaining = PolarityMap::compute(&formula);
                    for &var in formula.variables() {
                        prop_assert!(!polarities.get(var).is_pure());
                        prop_assert!(!remaining.get(var).is_pure() || formula.len() < input.len());
                    }
                }
                Reduction::Unsat => prop_assert!(false, "pure literals cannot conflict"),
            }
        }
    }
}
