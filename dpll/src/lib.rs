//! A [DPLL][dpll] based SAT solver. Given a boolean formula in [conjunctive normal form][cnf], it
//! either finds a variable assignment that makes the formula true or determines that no such
//! assignment exists.
//!
//! The search interleaves unit propagation and pure literal elimination with case splits on a
//! single variable, trying `false` before `true`.
//!
//! [dpll]: https://en.wikipedia.org/wiki/DPLL_algorithm
//! [cnf]: https://en.wikipedia.org/wiki/Conjunctive_normal_form

pub mod config;
pub mod polarity;
pub mod search;
pub mod simplify;
pub mod solver;

mod state;

pub use dpll_formula::{assignment, clause, formula, lit, Assignment, Clause, Formula, Lit, Var};

pub use solver::{Solver, SolverError};
pub use state::SatState;

pub mod dimacs {
    //! DIMCAS CNF parser and writer.
    pub use dpll_dimacs::*;
}
