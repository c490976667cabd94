//! CNF formulas.
use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;
use vec_mut_scan::VecMutScan;

use crate::assignment::Assignment;
use crate::clause::Clause;
use crate::lit::{Lit, Var};

/// Possible errors while evaluating a formula.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("Variable {} occurs in the formula but is not assigned", var)]
    Unassigned { var: Var },
}

/// Fixing a literal removed the last literal of a clause.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("Fixing {} produced an empty clause", lit)]
pub struct EmptyClause {
    pub lit: Lit,
}

/// A formula in conjunctive normal form (CNF).
///
/// Consists of a list of clauses and the set of variables occurring in them. The variable set is
/// derived from the clauses and every mutating method keeps it equal to
/// [`free_variables`](Formula::free_variables).
///
/// Cloning a formula produces a fully independent copy.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Formula {
    variables: BTreeSet<Var>,
    clauses: Vec<Clause>,
}

impl Formula {
    /// Create an empty formula.
    pub fn new() -> Formula {
        Formula::default()
    }

    /// Independent copy of this formula.
    ///
    /// Mutating the copy never affects `self`.
    pub fn copy(&self) -> Formula {
        self.clone()
    }

    /// The variables occurring in the clauses.
    pub fn variables(&self) -> &BTreeSet<Var> {
        &self.variables
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Iterator over the literals of all clauses.
    pub fn iter(&self) -> impl Iterator<Item = &[Lit]> {
        self.clauses.iter().map(|clause| clause.lits())
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether there are no clauses, i.e. the formula is vacuously true.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// One more than the largest variable index present, zero when there are no variables.
    pub fn var_count(&self) -> usize {
        self.variables
            .iter()
            .next_back()
            .map_or(0, |var| var.index() + 1)
    }

    /// Appends a clause.
    ///
    /// `literals` can be an `IntoIterator<Item = Lit>` or `IntoIterator<Item = &Lit>`.
    pub fn add_clause<L>(&mut self, literals: impl IntoIterator<Item = L>)
    where
        Vec<Lit>: Extend<L>,
    {
        self.push_clause(Clause::new(literals));
    }

    pub fn push_clause(&mut self, clause: Clause) {
        self.variables
            .extend(clause.lits().iter().map(|lit| lit.var()));
        self.clauses.push(clause);
    }

    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(|clause| clause.is_empty())
    }

    /// The distinct variables across all clauses.
    pub fn free_variables(&self) -> BTreeSet<Var> {
        self.clauses
            .iter()
            .flat_map(|clause| clause.lits().iter().map(|lit| lit.var()))
            .collect()
    }

    /// Re-derives the variable set from the clauses.
    pub fn reconcile_variables(&mut self) {
        self.variables = self.free_variables();
    }

    /// Whether the variable set matches the clauses.
    pub fn check_variables(&self) -> bool {
        self.variables == self.free_variables()
    }

    /// Evaluates the formula under a total assignment.
    ///
    /// Fails if a variable occurring in the formula is not assigned.
    pub fn evaluate(&self, assignment: &Assignment) -> Result<bool, EvalError> {
        let values = assignment.to_map();
        for clause in self.clauses.iter() {
            let satisfied = clause
                .eval_with(|var| values.get(&var).cloned())
                .map_err(|var| EvalError::Unassigned { var })?;
            if !satisfied {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Makes `lit` true.
    ///
    /// Every clause containing `lit` is removed as satisfied and `!lit` is removed from the
    /// remaining clauses. Afterwards the variable of `lit` no longer occurs in the formula.
    ///
    /// Returns an error if removing `!lit` left a clause without literals. The formula is fully
    /// updated in that case too and contains the empty clause.
    pub fn fix_literal(&mut self, lit: Lit) -> Result<(), EmptyClause> {
        let mut produced_empty = false;

        let mut scan = VecMutScan::new(&mut self.clauses);
        while let Some(mut clause) = scan.next() {
            if clause.contains(lit) {
                clause.remove();
            } else if clause.remove_lit(!lit) && clause.is_empty() {
                produced_empty = true;
            }
        }
        drop(scan);

        self.reconcile_variables();

        if produced_empty {
            Err(EmptyClause { lit })
        } else {
            Ok(())
        }
    }

    /// Removes all clauses matching `pred` and returns how many were removed.
    pub fn remove_clauses_where(&mut self, mut pred: impl FnMut(&Clause) -> bool) -> usize {
        let len_before = self.clauses.len();
        self.clauses.retain(|clause| !pred(clause));
        let removed = len_before - self.clauses.len();
        if removed > 0 {
            self.reconcile_variables();
        }
        removed
    }
}

/// Convert any iterable of [`Lit`] iterables into a formula.
impl<F, I, L> From<F> for Formula
where
    F: IntoIterator<Item = I>,
    I: IntoIterator<Item = L>,
    Vec<Lit>: Extend<L>,
{
    fn from(clauses: F) -> Formula {
        let mut formula = Formula::new();
        for clause in clauses {
            formula.add_clause(clause);
        }
        formula
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clauses.iter()).finish()
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    use crate::lit::strategy::lit;

    pub fn vec_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Vec<Vec<Lit>>> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        // Not using ind_flat_map makes shrinking too expensive
        vars.prop_ind_flat_map(move |vars| {
            collection::vec(
                collection::vec(lit(0..vars), clause_len.clone()),
                clauses.clone(),
            )
        })
    }

    pub fn formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Formula> {
        vec_formula(vars, clauses, clause_len).prop_map(Formula::from)
    }
}

#[cfg(test)]
mod tests {
    use super::{strategy::*, *};

    use proptest::*;

    #[test]
    fn variables_follow_clauses() {
        let formula = formula![
            1, -2;
            7, 2;
            ;
            -4;
        ];

        assert_eq!(formula.len(), 4);
        assert!(formula.has_empty_clause());
        assert_eq!(
            formula.variables().iter().cloned().collect::<Vec<_>>(),
            vars![1, 2, 4, 7].to_vec()
        );
        assert_eq!(formula.var_count(), 7);
        assert!(formula.check_variables());
    }

    #[test]
    fn evaluate_needs_total_assignment() {
        let formula = formula![
            1, 2;
            -1, 3;
        ];

        let assignment = Assignment::from(lits![-1, 2, 3].to_vec());
        assert_eq!(formula.evaluate(&assignment), Ok(true));

        let assignment = Assignment::from(lits![1, 2, -3].to_vec());
        assert_eq!(formula.evaluate(&assignment), Ok(false));

        let assignment = Assignment::from(lits![1, 2].to_vec());
        assert_eq!(
            formula.evaluate(&assignment),
            Err(EvalError::Unassigned { var: var!(3) })
        );

        assert_eq!(
            formula.evaluate(&Assignment::new()),
            Err(EvalError::Unassigned { var: var!(1) })
        );
    }

    #[test]
    fn empty_formula_is_true() {
        assert_eq!(Formula::new().evaluate(&Assignment::new()), Ok(true));
        assert_eq!(Formula::new().var_count(), 0);
    }

    #[test]
    fn fix_literal_removes_and_strips() {
        let mut formula = formula![
            1, 2;
            -1, 3;
            -1;
            2, 3;
        ];

        assert_eq!(
            formula.fix_literal(lit!(1)),
            Err(EmptyClause { lit: lit!(1) })
        );
        assert_eq!(formula.clauses().len(), 3);
        assert!(formula.has_empty_clause());
        assert!(!formula.variables().contains(&var!(1)));
        assert!(formula.check_variables());

        let mut formula = formula![
            1, 2;
            -1, 3;
            2, 3;
        ];

        assert_eq!(formula.fix_literal(lit!(-1)), Ok(()));
        assert_eq!(formula, formula![2; 2, 3;]);
        assert!(formula.check_variables());
    }

    #[test]
    fn remove_clauses_reconciles() {
        let mut formula = formula![
            1, -1, 5;
            2, 3;
        ];

        assert_eq!(formula.remove_clauses_where(|clause| clause.is_mixed_in(var!(1))), 1);
        assert_eq!(formula, formula![2, 3;]);
        assert!(!formula.variables().contains(&var!(5)));
    }

    proptest! {
        #[test]
        fn copy_is_independent(
            input in formula(1..20usize, 0..50, 0..6),
            pick in 0..20usize,
        ) {
            let original = input.copy();
            let mut copy = input.copy();

            let picked = copy.variables().iter().nth(pick % (copy.variables().len() + 1)).cloned();
            if let Some(var) = picked {
                let _ = copy.fix_literal(var.positive());
                prop_assert!(!copy.variables().contains(&var));
            }
            copy.add_clause(&lits![1]);

            prop_assert_eq!(&input, &original);
            prop_assert!(input.check_variables());
        }

        #[test]
        fn fix_literal_keeps_invariant(
            input in formula(1..20usize, 0..50, 0..6),
            lit in crate::lit::strategy::lit(0..20usize),
        ) {
            let mut formula = input;
            let _ = formula.fix_literal(lit);

            prop_assert!(formula.check_variables());
            prop_assert!(!formula.variables().contains(&lit.var()));
            for clause in formula.clauses() {
                prop_assert!(!clause.contains(lit));
                prop_assert!(!clause.contains(!lit));
            }
        }
    }
}
