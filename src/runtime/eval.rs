//! Evaluator over the `Expr` sum type, dispatching with `match`.

use crate::lang::node::Expr;
use crate::lang::state::VariableTable;
use crate::lang::value::Value;
use crate::runtime::eval_error::EvalError;

/// Evaluates `expr` against `table`.
///
/// Call arguments are evaluated left to right and the first error is
/// returned unchanged.
pub fn evaluate(expr: &Expr, table: &VariableTable) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(lit) => Ok(lit.value),
        Expr::Variable(v) => table.read(v.var),
        Expr::Call(call) => {
            let args = call
                .args
                .iter()
                .map(|arg| evaluate(arg, table))
                .collect::<Result<Vec<_>, _>>()?;
            call.builtin.call(&args)
        }
    }
}

pub fn is_constant(expr: &Expr, table: &VariableTable) -> bool {
    match expr {
        Expr::Literal(_) => true,
        Expr::Variable(v) => table.is_constant(v.var),
        Expr::Call(call) => call.args.iter().all(|arg| is_constant(arg, table)),
    }
}
