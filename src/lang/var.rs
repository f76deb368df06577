use std::fmt;

/// A single-character variable identifier.
///
/// Identifiers are one byte wide, so every possible identifier has a slot in
/// the [`VariableTable`](super::state::VariableTable). The parser only produces
/// ASCII letters, but hosts may bind any byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(u8);

impl Var {
    /// Number of distinct identifiers.
    pub const COUNT: usize = 256;

    pub const fn from_byte(byte: u8) -> Self {
        Var(byte)
    }

    /// Returns the identifier for an ASCII character, or `None` for anything
    /// wider than a byte.
    pub fn new(ch: char) -> Option<Self> {
        u8::try_from(ch).ok().map(Var)
    }

    pub const fn byte(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterates over every identifier in slot order.
    pub fn all() -> impl Iterator<Item = Var> {
        (0..=u8::MAX).map(Var)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 as char)
    }
}
