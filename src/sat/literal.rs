#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Variables, literals and the three-valued assignment domain.
//!
//! A variable is a dense non-negative index. A literal packs a variable and a
//! sign into a single `u32` as `2 * var + sign`, so the negation of a literal
//! is a single bit flip and per-literal arrays can be indexed directly by the
//! packed encoding.

use std::fmt;
use std::ops::Not;

/// A propositional variable, a dense index in `[0, num_vars)`.
pub type Variable = u32;

/// A literal: a variable together with a sign.
///
/// The packed encoding is `2 * var + sign`, where `sign == 1` means the
/// literal is the negation of its variable. Ordering is by the packed word,
/// which groups the two literals of a variable next to each other; this is
/// the order clause literals are normalised to on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lit(u32);

impl Lit {
    /// Sentinel for "no literal".
    pub const UNDEF: Self = Self(u32::MAX);

    /// Creates a literal from a variable and a sign. A true `sign` yields the
    /// negated literal.
    #[must_use]
    pub const fn new(var: Variable, sign: bool) -> Self {
        Self(var.wrapping_mul(2).wrapping_add(sign as u32))
    }

    /// Creates the positive literal of `var`.
    #[must_use]
    pub const fn positive(var: Variable) -> Self {
        Self::new(var, false)
    }

    /// The literal's variable.
    #[must_use]
    pub const fn var(self) -> Variable {
        self.0 >> 1
    }

    /// Whether the literal is negated.
    #[must_use]
    pub const fn sign(self) -> bool {
        self.0 & 1 != 0
    }

    /// The packed encoding, usable as an index into per-literal arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Reconstructs a literal from its packed encoding.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self(index as u32)
    }

    /// Parses a DIMACS literal: `n` is the positive literal of variable
    /// `n - 1`, `-n` its negation.
    ///
    /// # Panics
    ///
    /// Panics if `value` is zero (the DIMACS clause terminator is not a
    /// literal).
    #[must_use]
    pub fn from_dimacs(value: i32) -> Self {
        assert!(value != 0, "0 is the DIMACS clause terminator, not a literal");
        Self::new(value.unsigned_abs() - 1, value < 0)
    }

    /// The DIMACS rendering of this literal (1-indexed, sign-prefixed).
    #[must_use]
    pub fn to_dimacs(self) -> i32 {
        #[allow(clippy::cast_possible_wrap)]
        let v = (self.var() + 1) as i32;
        if self.sign() {
            -v
        } else {
            v
        }
    }
}

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self {
        Self(self.0 ^ 1)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// A three-valued truth value: the assignment domain of a variable.
///
/// `Undef` is absorbing under negation, so evaluating a literal of an
/// unassigned variable stays `Undef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LBool {
    /// Assigned true.
    True,
    /// Assigned false.
    False,
    /// Not assigned.
    #[default]
    Undef,
}

impl LBool {
    /// Lifts a `bool`.
    #[must_use]
    pub const fn from_bool(b: bool) -> Self {
        if b {
            Self::True
        } else {
            Self::False
        }
    }

    /// Applies a literal sign: flips `True`/`False` when `sign` holds,
    /// leaves `Undef` untouched.
    #[must_use]
    pub const fn apply_sign(self, sign: bool) -> Self {
        match (self, sign) {
            (Self::True, true) => Self::False,
            (Self::False, true) => Self::True,
            (v, false) => v,
            (Self::Undef, true) => Self::Undef,
        }
    }

    /// Whether this value is `Undef`.
    #[must_use]
    pub const fn is_undef(self) -> bool {
        matches!(self, Self::Undef)
    }
}

impl Not for LBool {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Undef => Self::Undef,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_packing() {
        let p = Lit::new(3, false);
        let n = Lit::new(3, true);

        assert_eq!(p.var(), 3);
        assert_eq!(n.var(), 3);
        assert!(!p.sign());
        assert!(n.sign());
        assert_eq!(p.index(), 6);
        assert_eq!(n.index(), 7);
        assert_eq!(Lit::from_index(7), n);
    }

    #[test]
    fn test_literal_negation() {
        let p = Lit::new(1, false);
        assert_eq!(!p, Lit::new(1, true));
        assert_eq!(!!p, p);
        assert_ne!(!p, p);
    }

    #[test]
    fn test_dimacs_round_trip() {
        for value in [1, -1, 2, -2, 42, -42] {
            assert_eq!(Lit::from_dimacs(value).to_dimacs(), value);
        }
        assert_eq!(Lit::from_dimacs(1).var(), 0);
        assert!(Lit::from_dimacs(-5).sign());
    }

    #[test]
    fn test_lbool_sign_application() {
        assert_eq!(LBool::True.apply_sign(true), LBool::False);
        assert_eq!(LBool::False.apply_sign(true), LBool::True);
        assert_eq!(LBool::Undef.apply_sign(true), LBool::Undef);
        assert_eq!(LBool::True.apply_sign(false), LBool::True);
    }

    #[test]
    fn test_lbool_negation() {
        assert_eq!(!LBool::True, LBool::False);
        assert_eq!(!LBool::False, LBool::True);
        assert_eq!(!LBool::Undef, LBool::Undef);
    }

    #[test]
    fn test_ordering_groups_variables() {
        let mut lits = vec![
            Lit::new(2, true),
            Lit::new(0, false),
            Lit::new(2, false),
            Lit::new(1, true),
        ];
        lits.sort_unstable();
        assert_eq!(
            lits,
            vec![
                Lit::new(0, false),
                Lit::new(1, true),
                Lit::new(2, false),
                Lit::new(2, true),
            ]
        );
    }
}
