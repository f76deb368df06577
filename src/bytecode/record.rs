use crate::lang::builtin::{BinaryFn, Reduction, UnaryFn};
use crate::lang::value::Value;

// =============================================================================
// RECORD - one entry of a compiled buffer
// =============================================================================

/// A fixed-arity native function called by a [`Kind::Call`] record.
#[derive(Debug, Clone, Copy)]
pub enum Native {
    Unary(UnaryFn),
    Binary(BinaryFn),
}

impl Native {
    pub fn arity(self) -> usize {
        match self {
            Native::Unary(_) => 1,
            Native::Binary(_) => 2,
        }
    }
}

/// A self-describing entry of a compiled buffer.
///
/// `size` counts this record plus every record of its arguments, which are
/// laid out immediately after it. Advancing a cursor by `size` skips the whole
/// subtree, so the buffer is walked without any external index.
#[derive(Debug, Clone, Copy)]
pub struct Record {
    pub size: usize,
    pub kind: Kind,
}

#[derive(Debug, Clone, Copy)]
pub enum Kind {
    /// Inline literal.
    Value(Value),

    /// Read of a shared register cell. `None` until the program is linked.
    Lookup { cell: Option<usize> },

    /// Variadic reduction over the next `argc` argument subtrees.
    Builtin { op: Reduction, argc: usize },

    /// Native function applied to the next `native.arity()` argument subtrees.
    Call { token: &'static str, native: Native },
}

impl Record {
    /// Size of a record with no arguments.
    pub const LEAF_SIZE: usize = 1;

    pub fn value(value: Value) -> Self {
        Record {
            size: Self::LEAF_SIZE,
            kind: Kind::Value(value),
        }
    }

    /// An unresolved variable read.
    pub fn placeholder() -> Self {
        Record {
            size: Self::LEAF_SIZE,
            kind: Kind::Lookup { cell: None },
        }
    }

    /// Number of argument subtrees following this record.
    pub fn argc(&self) -> usize {
        match self.kind {
            Kind::Value(_) | Kind::Lookup { .. } => 0,
            Kind::Builtin { argc, .. } => argc,
            Kind::Call { native, .. } => native.arity(),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self.kind {
            Kind::Value(_) => "VALUE",
            Kind::Lookup { .. } => "LOOKUP",
            Kind::Builtin { .. } => "BUILTIN",
            Kind::Call { .. } => "CALL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_records() {
        let value = Record::value(2.0);
        assert_eq!(value.size, 1);
        assert_eq!(value.argc(), 0);
        assert_eq!(value.tag(), "VALUE");

        let lookup = Record::placeholder();
        assert!(matches!(lookup.kind, Kind::Lookup { cell: None }));
        assert_eq!(lookup.tag(), "LOOKUP");
    }

    #[test]
    fn test_argc() {
        let builtin = Record {
            size: 4,
            kind: Kind::Builtin {
                op: Reduction::Add,
                argc: 3,
            },
        };
        assert_eq!(builtin.argc(), 3);

        let call = Record {
            size: 3,
            kind: Kind::Call {
                token: "pow",
                native: Native::Binary(f64::powf),
            },
        };
        assert_eq!(call.argc(), 2);
        assert_eq!(call.tag(), "CALL");
    }
}
