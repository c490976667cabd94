//! Variable assignments.
use std::fmt;

use rustc_hash::FxHashMap;

use crate::lit::{Lit, Var};

/// An ordered sequence of variable assignments.
///
/// Each entry is stored as the literal made true by it, i.e. `x` for `x = true` and `-x` for
/// `x = false`. During search an assignment is partial. Fragments produced by different parts of
/// the solver are concatenated in the order they were decided.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    lits: Vec<Lit>,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    /// Appends the assignment making `lit` true.
    ///
    /// The variable of `lit` must not be assigned already.
    pub fn push(&mut self, lit: Lit) {
        self.lits.push(lit);
    }

    /// Appends all entries of another fragment.
    pub fn append(&mut self, fragment: impl IntoIterator<Item = Lit>) {
        self.lits.extend(fragment);
    }

    /// Whether no variable is assigned more than once.
    pub fn assigns_each_var_once(&self) -> bool {
        self.to_map().len() == self.lits.len()
    }

    /// The entries as true literals, in decision order.
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn into_lits(self) -> Vec<Lit> {
        self.lits
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// Iterator over `(variable, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Var, bool)> + '_ {
        self.lits.iter().map(|lit| (lit.var(), lit.is_positive()))
    }

    /// The value assigned to `var`, if any.
    ///
    /// This is a linear scan, use [`to_map`](Assignment::to_map) for repeated lookups.
    pub fn value(&self, var: Var) -> Option<bool> {
        self.lits
            .iter()
            .find(|lit| lit.var() == var)
            .map(|lit| lit.is_positive())
    }

    pub fn to_map(&self) -> FxHashMap<Var, bool> {
        self.iter().collect()
    }
}

impl From<Vec<Lit>> for Assignment {
    fn from(lits: Vec<Lit>) -> Assignment {
        let assignment = Assignment { lits };
        debug_assert!(
            assignment.assigns_each_var_once(),
            "variable assigned twice in {:?}",
            assignment
        );
        assignment
    }
}

impl std::iter::FromIterator<Lit> for Assignment {
    fn from_iter<I: IntoIterator<Item = Lit>>(iter: I) -> Assignment {
        Assignment::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.lits.iter()).finish()
    }
}
