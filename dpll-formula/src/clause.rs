//! Clauses.
use std::fmt;

use crate::lit::{Lit, Var};

/// A disjunction of literals.
///
/// Literals are kept sorted and duplicates are removed on construction, so a clause behaves like
/// a set of literals. Both polarities of a variable may be present, which makes the clause a
/// tautology.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Clause {
    lits: Vec<Lit>,
}

impl Clause {
    pub fn new<L>(lits: impl IntoIterator<Item = L>) -> Clause
    where
        Vec<Lit>: Extend<L>,
    {
        let mut clause = Clause { lits: vec![] };
        clause.lits.extend(lits);
        clause.lits.sort_unstable();
        clause.lits.dedup();
        clause
    }

    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// An empty clause cannot be satisfied.
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// The single literal of a unit clause.
    pub fn unit(&self) -> Option<Lit> {
        match self.lits[..] {
            [lit] => Some(lit),
            _ => None,
        }
    }

    pub fn contains(&self, lit: Lit) -> bool {
        self.lits.binary_search(&lit).is_ok()
    }

    /// Whether the clause contains both polarities of `var`.
    pub fn is_mixed_in(&self, var: Var) -> bool {
        self.contains(var.positive()) && self.contains(var.negative())
    }

    /// Removes `lit` if present and returns whether it was present.
    pub fn remove_lit(&mut self, lit: Lit) -> bool {
        match self.lits.binary_search(&lit) {
            Ok(pos) => {
                self.lits.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Whether some literal of the clause is satisfied by `value`.
    ///
    /// Fails with the variable of the first literal for which `value` returns `None`, unless a
    /// satisfied literal precedes it.
    pub fn eval_with(&self, mut value: impl FnMut(Var) -> Option<bool>) -> Result<bool, Var> {
        for &lit in self.lits.iter() {
            let var = lit.var();
            if lit.is_satisfied_by(value(var).ok_or(var)?) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl<L> std::iter::FromIterator<L> for Clause
where
    Vec<Lit>: Extend<L>,
{
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Clause {
        Clause::new(iter)
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.lits.iter()).finish()
    }
}
