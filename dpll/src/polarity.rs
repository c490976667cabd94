//! Polarity analysis.
//!
//! The polarity of a variable describes with which signs it occurs in a set of clauses.
use log::{debug, warn};

use dpll_formula::{Formula, Lit, Var};

/// Signs with which a variable occurs.
///
/// Polarities form a join-semilattice with `Unknown` as bottom and `Mixed` as top, see
/// [`join`](Polarity::join).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// No occurrence.
    Unknown,
    /// Only positive occurrences.
    Positive,
    /// Only negative occurrences.
    Negative,
    /// Positive and negative occurrences.
    Mixed,
}

impl Default for Polarity {
    fn default() -> Polarity {
        Polarity::Unknown
    }
}

impl Polarity {
    /// Polarity of a single occurrence.
    pub fn of_lit(lit: Lit) -> Polarity {
        if lit.is_positive() {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }

    /// Least upper bound of two polarities.
    ///
    /// Commutative and idempotent, `Unknown` is the identity and `Mixed` is absorbing.
    pub fn join(self, other: Polarity) -> Polarity {
        match (self, other) {
            (Polarity::Unknown, polarity) | (polarity, Polarity::Unknown) => polarity,
            (a, b) if a == b => a,
            _ => Polarity::Mixed,
        }
    }

    /// Whether all occurrences have the same sign.
    pub fn is_pure(self) -> bool {
        self.value().is_some()
    }

    /// The value satisfying all occurrences of a pure variable.
    pub fn value(self) -> Option<bool> {
        match self {
            Polarity::Positive => Some(true),
            Polarity::Negative => Some(false),
            Polarity::Unknown | Polarity::Mixed => None,
        }
    }
}

/// Polarity of every variable of a formula.
#[derive(Clone, Debug, Default)]
pub struct PolarityMap {
    polarities: Vec<Polarity>,
}

impl PolarityMap {
    /// Computes the polarities of all variables in one scan over the clauses.
    pub fn compute(formula: &Formula) -> PolarityMap {
        let mut polarities = vec![Polarity::Unknown; formula.var_count()];
        for clause in formula.clauses() {
            for &lit in clause.lits() {
                let slot = &mut polarities[lit.index()];
                *slot = slot.join(Polarity::of_lit(lit));
            }
        }
        PolarityMap { polarities }
    }

    pub fn get(&self, var: Var) -> Polarity {
        self.polarities
            .get(var.index())
            .cloned()
            .unwrap_or_default()
    }

    /// Literals satisfying every occurrence of their pure variable.
    pub fn pure_literals<'a>(&'a self, formula: &'a Formula) -> impl Iterator<Item = Lit> + 'a {
        formula
            .variables()
            .iter()
            .filter_map(move |&var| self.get(var).value().map(|value| var.lit(value)))
    }

    /// Whether every variable of the formula is pure.
    pub fn all_pure(&self, formula: &Formula) -> bool {
        formula
            .variables()
            .iter()
            .all(|&var| self.get(var).is_pure())
    }

    /// Logs variables of the formula that occur in no clause.
    ///
    /// Returns the number of such variables.
    pub fn report_unknown(&self, formula: &Formula) -> usize {
        let mut count = 0;
        for &var in formula.variables() {
            if self.get(var) == Polarity::Unknown {
                warn!("Variable {} is free but occurs in no clause", var);
                count += 1;
            }
        }
        count
    }
}

/// Computes the polarity of a single variable.
///
/// As a side effect this removes every clause in which `var` occurs with both signs. Such a clause
/// is a tautology. The returned polarity covers the remaining clauses only.
pub fn var_polarity(formula: &mut Formula, var: Var) -> Polarity {
    let occurs = formula.variables().contains(&var);

    let removed = formula.remove_clauses_where(|clause| clause.is_mixed_in(var));
    if removed > 0 {
        debug!("Removed {} clauses containing {} and -{}", removed, var, var);
    }

    let mut polarity = Polarity::Unknown;
    for clause in formula.clauses() {
        for &lit in clause.lits() {
            if lit.var() == var {
                polarity = polarity.join(Polarity::of_lit(lit));
            }
        }
    }

    if !occurs {
        warn!("Variable {} occurs in no clause", var);
    }

    polarity
}

/// Removes all tautological clauses.
///
/// Applies [`var_polarity`] to every variable of the formula and returns the number of removed
/// clauses.
pub fn remove_tautologies(formula: &mut Formula) -> usize {
    let len_before = formula.len();
    let vars: Vec<Var> = formula.variables().iter().cloned().collect();
    for var in vars {
        if formula.variables().contains(&var) {
            var_polarity(formula, var);
        }
    }
    len_before - formula.len()
}
