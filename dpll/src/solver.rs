//! Boolean satisfiability solver.
use std::io;

use anyhow::Error;
use log::{debug, info, warn};
use thiserror::Error;

use dpll_formula::{Assignment, EvalError, Formula, Lit};

use crate::config::{SolverConfig, SolverConfigUpdate};
use crate::dimacs::DimacsParser;
use crate::polarity::remove_tautologies;
use crate::search::{search, SearchContext, SearchResult, SearchStats};
use crate::state::SatState;

/// Possible errors while solving a formula.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    #[error("Search exceeded the decision limit of {}", limit)]
    DecisionLimit { limit: u64 },
    #[error("The computed model does not satisfy the formula")]
    ModelCheckFailed,
    #[error("Model check failed: {0}")]
    Eval(#[from] EvalError),
}

/// A boolean satisfiability solver.
#[derive(Default)]
pub struct Solver {
    config: SolverConfig,
    formula: Formula,
    state: SatState,
    model: Option<Vec<Lit>>,
    stats: SearchStats,
    self_checking: bool,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Change the solver configuration.
    pub fn config(&mut self, update: &SolverConfigUpdate) {
        update.apply(&mut self.config);
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &Formula) {
        for clause in formula.clauses() {
            self.formula.push_clause(clause.clone());
        }
        self.invalidate();
    }

    /// Add a single clause to the solver.
    pub fn add_clause(&mut self, clause: &[Lit]) {
        self.formula.add_clause(clause);
        self.invalidate();
    }

    /// Reads and adds a formula in DIMACS CNF format.
    ///
    /// Using this avoids creating a temporary [`Formula`].
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let parser = DimacsParser::parse_incremental(input, |parser| {
            self.add_formula(&parser.take_formula());
            Ok(())
        })?;

        if let Err(err) = parser.check_header() {
            warn!("{}", err);
        }

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// The formula loaded so far.
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Check every model against the loaded formula before reporting it.
    pub fn enable_self_checking(&mut self) {
        self.self_checking = true;
    }

    /// Check the satisfiability of the current formula.
    ///
    /// The loaded formula is not modified, so clauses can be added and the formula solved again.
    pub fn solve(&mut self) -> Result<bool, SolverError> {
        self.invalidate();

        let mut formula = self.formula.copy();
        let removed = remove_tautologies(&mut formula);
        if removed > 0 {
            debug!("Removed {} tautological clauses", removed);
        }

        let mut ctx = SearchContext::new(&self.config);
        let result = search(&formula, &mut ctx);
        self.stats = ctx.into_stats();

        info!(
            "Search: {} calls, {} decisions, {} propagations, {} pure literals, {} conflicts",
            self.stats.calls,
            self.stats.decisions,
            self.stats.propagations,
            self.stats.pure_literals,
            self.stats.conflicts,
        );

        match result? {
            SearchResult::Unsat => {
                self.state = SatState::Unsat;
                Ok(false)
            }
            SearchResult::Sat(assignment) => {
                let model = self.complete_model(&assignment);
                if self.self_checking {
                    self.check_model(&model)?;
                }
                self.model = Some(model);
                self.state = SatState::Sat;
                Ok(true)
            }
        }
    }

    /// Outcome of the last call to [`solve`](Solver::solve).
    pub fn state(&self) -> SatState {
        self.state
    }

    /// Set of literals that satisfy the formula.
    ///
    /// Contains one literal for every variable of the formula, ordered by variable.
    pub fn model(&self) -> Option<Vec<Lit>> {
        if self.state == SatState::Sat {
            self.model.clone()
        } else {
            None
        }
    }

    /// Counters of the last search.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn invalidate(&mut self) {
        self.state = SatState::Unknown;
        self.model = None;
    }

    /// Extends a search result to all variables of the formula.
    fn complete_model(&self, assignment: &Assignment) -> Vec<Lit> {
        let values = assignment.to_map();
        let mut completed = 0;
        let model = self
            .formula
            .variables()
            .iter()
            .map(|&var| {
                let value = values.get(&var).cloned().unwrap_or_else(|| {
                    completed += 1;
                    self.config.dont_care_value
                });
                var.lit(value)
            })
            .collect();
        if completed > 0 {
            debug!("Assigned {} unconstrained variables", completed);
        }
        model
    }

    fn check_model(&self, model: &[Lit]) -> Result<(), SolverError> {
        let assignment = Assignment::from(model.to_vec());
        if self.formula.evaluate(&assignment)? {
            Ok(())
        } else {
            Err(SolverError::ModelCheckFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use dpll_formula::test::{sat_formula, sgen_unsat_formula};
    use dpll_formula::{formula, lit, lits};

    use crate::dimacs::write_dimacs;

    #[test]
    fn empty_formula() {
        let mut solver = Solver::new();
        assert_eq!(solver.state(), SatState::Unknown);
        assert_eq!(solver.model(), None);

        assert_eq!(solver.solve(), Ok(true));
        assert_eq!(solver.model(), Some(vec![]));
    }

    #[test]
    fn model_covers_all_variables() {
        let formula = formula![
            1, -1;
            2, 3;
        ];

        let mut solver = Solver::new();
        solver.add_formula(&formula);
        assert_eq!(solver.solve(), Ok(true));
        assert_eq!(solver.model(), Some(lits![-1, 2, 3].to_vec()));

        solver.config(&SolverConfigUpdate {
            dont_care_value: Some(true),
            ..SolverConfigUpdate::default()
        });
        assert_eq!(solver.solve(), Ok(true));
        assert_eq!(solver.model(), Some(lits![1, 2, 3].to_vec()));
    }

    #[test]
    fn adding_clauses_after_solving() {
        let mut solver = Solver::new();
        solver.enable_self_checking();
        solver.add_clause(&lits![1, 2]);
        assert_eq!(solver.solve(), Ok(true));

        solver.add_clause(&lits![-1]);
        assert_eq!(solver.state(), SatState::Unknown);
        assert_eq!(solver.model(), None);
        assert_eq!(solver.solve(), Ok(true));
        assert_eq!(solver.model(), Some(lits![-1, 2].to_vec()));

        solver.add_clause(&[lit!(-2)]);
        assert_eq!(solver.solve(), Ok(false));
        assert_eq!(solver.state(), SatState::Unsat);
        assert_eq!(solver.model(), None);
    }

    #[test]
    fn decision_limit() {
        let mut solver = Solver::new();
        solver.add_formula(&formula![
            1, 2, 3;
            -1, -2, -3;
            1, -2;
            2, -3;
            3, -1;
            -1, -2;
        ]);
        solver.config(&SolverConfigUpdate {
            decision_limit: Some(0),
            ..SolverConfigUpdate::default()
        });

        assert_eq!(solver.solve(), Err(SolverError::DecisionLimit { limit: 0 }));
        assert_eq!(solver.state(), SatState::Unknown);
        assert_eq!(solver.model(), None);

        solver.config(&SolverConfigUpdate {
            decision_limit: Some(100),
            ..SolverConfigUpdate::default()
        });
        assert_eq!(solver.solve(), Ok(false));
        assert!(solver.stats().decisions > 0);
    }

    proptest! {
        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..4usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), Ok(false));
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();
            solver.enable_self_checking();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), Ok(true));

            let model = solver.model().unwrap();
            prop_assert_eq!(model.len(), formula.variables().len());

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert_eq!(solver.solve(), Ok(true));

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sgen_unsat_incremental_clauses(formula in sgen_unsat_formula(1..3usize)) {
            let mut solver = Solver::new();

            let mut last_state = Ok(true);

            for clause in formula.iter() {
                solver.add_clause(clause);

                let state = solver.solve();
                if state != last_state {
                    prop_assert_eq!(state.clone(), Ok(false));
                    prop_assert_eq!(last_state, Ok(true));
                    last_state = state;
                }
            }

            prop_assert_eq!(last_state, Ok(false));
        }
    }
}
