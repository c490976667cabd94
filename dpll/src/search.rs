//! Backtracking search.
//!
//! Each invocation works on its own copy of the formula. Simplification destructively shrinks
//! that copy and the two branches of a case split each receive a fresh copy, so backtracking
//! needs no undo information.
use std::cmp::max;

use log::trace;

use dpll_formula::{Assignment, Formula, Lit};

use crate::config::SolverConfig;
use crate::polarity::PolarityMap;
use crate::simplify::{eliminate_pure_literals, propagate_units, Reduction};
use crate::solver::SolverError;

/// Outcome of a search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// An assignment satisfying the formula.
    ///
    /// Variables that vanished from the formula without being decided are not included.
    Sat(Assignment),
    Unsat,
}

/// Counters collected during search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of search invocations.
    pub calls: u64,
    /// Number of branches taken.
    pub decisions: u64,
    /// Number of literals assigned by unit propagation.
    pub propagations: u64,
    /// Number of literals assigned by pure literal elimination.
    pub pure_literals: u64,
    /// Number of invocations that ended in an empty clause.
    pub conflicts: u64,
    /// Number of invocations answered by the polarity fast path.
    pub fast_path_hits: u64,
    /// Deepest nesting of invocations, the initial one having depth 0.
    pub max_depth: usize,
}

/// State shared by all invocations of a search.
pub struct SearchContext<'a> {
    config: &'a SolverConfig,
    stats: SearchStats,
}

impl<'a> SearchContext<'a> {
    pub fn new(config: &'a SolverConfig) -> SearchContext<'a> {
        SearchContext {
            config,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn into_stats(self) -> SearchStats {
        self.stats
    }

    /// Accounts for a new branch, failing once the decision limit is exhausted.
    fn decide(&mut self) -> Result<(), SolverError> {
        if let Some(limit) = self.config.decision_limit {
            if self.stats.decisions >= limit {
                return Err(SolverError::DecisionLimit { limit });
            }
        }
        self.stats.decisions += 1;
        Ok(())
    }

    fn conflict(&mut self) -> SearchResult {
        self.stats.conflicts += 1;
        SearchResult::Unsat
    }
}

/// Decides the satisfiability of `formula`.
///
/// The formula itself is left untouched.
pub fn search(formula: &Formula, ctx: &mut SearchContext) -> Result<SearchResult, SolverError> {
    search_at(formula.copy(), 0, ctx)
}

fn search_at(
    mut formula: Formula,
    depth: usize,
    ctx: &mut SearchContext,
) -> Result<SearchResult, SolverError> {
    ctx.stats.calls += 1;
    ctx.stats.max_depth = max(ctx.stats.max_depth, depth);

    if formula.has_empty_clause() {
        return Ok(ctx.conflict());
    }

    let polarities = PolarityMap::compute(&formula);
    polarities.report_unknown(&formula);

    if ctx.config.polarity_fast_path {
        if let Some(assignment) = polarity_assignment(&formula, &polarities) {
            ctx.stats.fast_path_hits += 1;
            return Ok(SearchResult::Sat(assignment));
        }
    }

    let mut fragments = Assignment::new();

    match propagate_units(&mut formula) {
        Reduction::Unsat => return Ok(ctx.conflict()),
        Reduction::Assigned(lits) => {
            ctx.stats.propagations += lits.len() as u64;
            fragments.append(lits);
        }
    }

    if ctx.config.pure_literal_elimination {
        let polarities = PolarityMap::compute(&formula);
        match eliminate_pure_literals(&mut formula, &polarities) {
            Reduction::Unsat => return Ok(ctx.conflict()),
            Reduction::Assigned(lits) => {
                ctx.stats.pure_literals += lits.len() as u64;
                fragments.append(lits);
            }
        }
    }

    let branch_var = match formula.variables().iter().next_back() {
        Some(&var) => var,
        None if formula.has_empty_clause() => return Ok(ctx.conflict()),
        None => return Ok(SearchResult::Sat(fragments)),
    };

    for &positive in [false, true].iter() {
        ctx.decide()?;

        let decision = branch_var.lit(positive);
        trace!("depth {}: deciding {}", depth, decision);

        let mut branch = formula.copy();
        branch.add_clause(&[decision]);

        if let SearchResult::Sat(assignment) = search_at(branch, depth + 1, ctx)? {
            fragments.append(assignment.into_lits());
            return Ok(SearchResult::Sat(fragments));
        }
    }

    Ok(SearchResult::Unsat)
}

/// Assignment read off the polarities when every variable is pure.
///
/// The assignment is checked against every clause before it is returned.
fn polarity_assignment(formula: &Formula, polarities: &PolarityMap) -> Option<Assignment> {
    if !polarities.all_pure(formula) {
        return None;
    }

    let lits: Vec<Lit> = polarities.pure_literals(formula).collect();
    let assignment = Assignment::from(lits);

    match formula.evaluate(&assignment) {
        Ok(true) => Some(assignment),
        _ => None,
    }
}
