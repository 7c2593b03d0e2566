//! A [`Literal`] points at an [`AigNode`] and can be complemented (indicates the presence of a NOT gate).
//!
//! [`AigNode`]: crate::AigNode

use std::{
    fmt::Display,
    ops::{BitXor, Not},
};

use super::NodeId;

/// Unambiguous fanin selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaninId {
    Fanin0,
    Fanin1,
}

/// A reference to a node together with a polarity, encoded as `2 * node + complement`.
///
/// This is the same encoding as the AIGER format, so literals read from a file can be used as is.
///
/// ```rust
/// use fraig::Literal;
/// let lit = Literal::new(3, true);
/// assert_eq!(lit.raw(), 7);
/// assert_eq!(lit.node(), 3);
/// assert!(lit.is_complement());
/// assert_eq!(!lit, Literal::new(3, false));
/// assert_eq!(!Literal::FALSE, Literal::TRUE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Literal(usize);

impl Literal {
    /// The constant low signal (node 0, not complemented).
    pub const FALSE: Literal = Literal(0);
    /// The constant high signal (node 0, complemented).
    pub const TRUE: Literal = Literal(1);

    pub fn new(node: NodeId, complement: bool) -> Self {
        Literal((node << 1) | complement as usize)
    }

    /// Builds a literal from its raw `2 * node + complement` encoding.
    pub fn from_raw(raw: usize) -> Self {
        Literal(raw)
    }

    pub fn raw(&self) -> usize {
        self.0
    }

    pub fn node(&self) -> NodeId {
        self.0 >> 1
    }

    pub fn is_complement(&self) -> bool {
        self.0 & 1 == 1
    }

    /// The same node, without inverter.
    pub fn regular(&self) -> Self {
        Literal(self.0 & !1)
    }

    pub fn is_cst_false(&self) -> bool {
        *self == Literal::FALSE
    }

    pub fn is_cst_true(&self) -> bool {
        *self == Literal::TRUE
    }

    pub fn is_complement_of(&self, other: &Literal) -> bool {
        self.0 ^ other.0 == 1
    }

    /// All-ones if the literal is complemented, else all-zeros.
    /// Used to apply the polarity on a whole simulation word at once.
    pub fn mask(&self) -> u32 {
        if self.is_complement() { u32::MAX } else { 0 }
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Literal(self.0 ^ 1)
    }
}

impl BitXor<bool> for Literal {
    type Output = Self;

    fn bitxor(self, rhs: bool) -> Self::Output {
        Literal(self.0 ^ rhs as usize)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_complement() {
            write!(f, "!{}", self.node())
        } else {
            write!(f, "{}", self.node())
        }
    }
}
