use thiserror::Error;

use crate::runtime::eval_error::EvalError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A builtin with no compiled form, such as a host-supplied custom
    /// function that could not be folded away.
    #[error("compile error: unrecognized builtin '{0}'")]
    UnrecognizedBuiltin(&'static str),

    /// A fixed-arity native call with the wrong number of arguments.
    #[error("compile error: '{function}' call requires {expected} argument(s), have {actual}")]
    ArityMismatch {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Evaluating a constant subtree ahead of time failed.
    #[error("compile error while evaluating constexpr: {0}")]
    Constexpr(#[from] EvalError),
}
