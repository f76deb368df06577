use std::fmt;

/// Runtime value in the mathc language.
///
/// A 64-bit float is the only scalar type; there are no booleans, strings or
/// lists.
pub type Value = f64;

/// Longest numeric literal the parser accepts by default.
pub const MAX_NUMBER_LEN: usize = 32;

/// Formats a value using mathc surface syntax.
///
/// The output always re-parses to the same value: plain decimal notation when
/// it fits in a literal, exponent notation otherwise. Non-finite values have no
/// literal form and are written as the division that produces them.
pub fn write_value(f: &mut fmt::Formatter<'_>, value: Value) -> fmt::Result {
    if value.is_nan() {
        return write!(f, "(sub (div 1 0) (div 1 0))");
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return write!(f, "(div {}1 0)", sign);
    }

    let plain = value.to_string();
    if plain.len() <= MAX_NUMBER_LEN {
        write!(f, "{}", plain)
    } else {
        write!(f, "{:e}", value)
    }
}

/// Display adapter for [`write_value`].
#[derive(Debug, Clone, Copy)]
pub struct Surface(pub Value);

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self.0)
    }
}
