use thiserror::Error;

use crate::lang::var::Var;

/// Failure while evaluating an expression tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A variable was read before anything was bound to it.
    #[error("variable is undefined: {var} ({})", .var.byte())]
    UndefinedVariable { var: Var },

    /// A fixed-arity builtin received the wrong number of arguments.
    #[error("invalid number of arguments ({actual}) for function '{function}', expected {expected}")]
    ArityMismatch {
        function: &'static str,
        expected: usize,
        actual: usize,
    },
}
