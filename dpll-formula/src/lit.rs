//! Variables and literals.
use std::{fmt, ops};

/// Integer type backing [`Var`] and [`Lit`].
pub type LitIdx = u32;

/// A boolean variable.
///
/// Variables are opaque identifiers that only support comparison. They are stored as a 0-based
/// index, but displayed and parsed using the 1-based numbering of the DIMACS CNF format, where the
/// variable `7` appears as `7` or `-7`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var {
    index: LitIdx,
}

impl Var {
    /// Variable with the given 1-based DIMACS number.
    ///
    /// The number must be positive.
    #[inline]
    pub fn from_dimacs(number: isize) -> Var {
        debug_assert!(number > 0);
        Var::from_index((number - 1) as usize)
    }

    /// Variable with the given 0-based index.
    #[inline]
    pub fn from_index(index: usize) -> Var {
        debug_assert!(index <= Var::max_var().index());
        Var {
            index: index as LitIdx,
        }
    }

    /// The 1-based DIMACS number of this variable.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        (self.index + 1) as isize
    }

    /// The 0-based index of this variable.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Variable with the largest supported index.
    ///
    /// The top bits of the backing integer are reserved for the sign bit of `Lit`.
    pub const fn max_var() -> Var {
        Var {
            index: LitIdx::max_value() >> 4,
        }
    }

    /// Number of distinct variables that can be represented.
    pub const fn max_count() -> usize {
        Self::max_var().index() + 1
    }

    /// Literal of this variable with the given sign, `true` being positive.
    #[inline]
    pub fn lit(self, positive: bool) -> Lit {
        Lit::from_var(self, positive)
    }

    #[inline]
    pub fn positive(self) -> Lit {
        Lit::from_var(self, true)
    }

    #[inline]
    pub fn negative(self) -> Lit {
        Lit::from_var(self, false)
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A variable together with a sign.
///
/// A positive literal is satisfied when its variable is assigned `true`, a negative one when its
/// variable is assigned `false`. A literal doubles as a single entry of an assignment: the literal
/// `x` stands for `x = true`, the literal `-x` for `x = false`.
///
/// The variable index and the sign are packed into one integer, with the lowest bit set for
/// negative literals. This keeps literals of the same variable adjacent when sorted.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Lit {
    code: LitIdx,
}

impl Lit {
    /// Literal of `var` with the given sign, `true` being positive.
    #[inline]
    pub fn from_var(var: Var, positive: bool) -> Lit {
        Lit {
            code: (var.index << 1) | (!positive as LitIdx),
        }
    }

    /// Literal for a variable index and a sign.
    #[inline]
    pub fn from_index(index: usize, positive: bool) -> Lit {
        Lit::from_var(Var::from_index(index), positive)
    }

    /// Literal from a non-zero DIMACS integer.
    ///
    /// The absolute value names the variable, the sign of the integer is the sign of the
    /// literal.
    #[inline]
    pub fn from_dimacs(number: isize) -> Lit {
        Lit::from_var(Var::from_dimacs(number.abs()), number > 0)
    }

    /// DIMACS integer for this literal, the inverse of `from_dimacs`.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        let number = self.var().to_dimacs();
        if self.is_negative() {
            -number
        } else {
            number
        }
    }

    #[inline]
    pub fn var(self) -> Var {
        Var {
            index: self.code >> 1,
        }
    }

    /// 0-based index of the literal's variable.
    #[inline]
    pub fn index(self) -> usize {
        (self.code >> 1) as usize
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        (self.code & 1) != 0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        !self.is_negative()
    }

    /// Whether this literal is satisfied when its variable has the given value.
    ///
    /// This is the sign of the literal XNOR the value.
    #[inline]
    pub fn is_satisfied_by(self, value: bool) -> bool {
        self.is_positive() == value
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit {
            code: self.code ^ 1,
        }
    }
}

/// Negates the literal when the right hand side is `true`.
impl ops::BitXor<bool> for Lit {
    type Output = Lit;

    #[inline]
    fn bitxor(self, rhs: bool) -> Lit {
        Lit {
            code: self.code ^ (rhs as LitIdx),
        }
    }
}

impl From<Var> for Lit {
    #[inline]
    fn from(var: Var) -> Lit {
        var.positive()
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;
    use proptest::{prelude::*, *};

    pub fn var(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Var> {
        index.prop_map(Var::from_index)
    }

    pub fn lit(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Lit> {
        (var(index), bool::ANY).prop_map(|(var, positive)| var.lit(positive))
    }
}
