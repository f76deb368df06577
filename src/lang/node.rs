use std::fmt;

use super::builtin::Builtin;
use super::state::VariableTable;
use super::value::{Value, write_value};
use super::var::Var;
use crate::runtime::eval_error::EvalError;

/// Abstract Syntax Tree node for the mathc language.
///
/// `Display` renders the node back to prefix surface syntax; parsing that text
/// yields an equivalent tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A fixed number, e.g. `2.5`.
    Literal(Literal),

    /// A read of a variable table slot, e.g. `x`.
    Variable(Variable),

    /// A builtin applied to argument expressions, e.g. `(add 1 x)`.
    ///
    /// The call owns its arguments.
    Call(Call),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Literal {
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    pub var: Var,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub builtin: Builtin,
    pub args: Vec<Expr>,
}

impl Expr {
    pub fn literal(value: Value) -> Self {
        Expr::Literal(Literal { value })
    }

    pub fn variable(var: Var) -> Self {
        Expr::Variable(Variable { var })
    }

    pub fn call(builtin: Builtin, args: Vec<Expr>) -> Self {
        Expr::Call(Call { builtin, args })
    }

    /// Evaluates the tree against `table`.
    ///
    /// Dispatches through the exhaustive `match` evaluator, or through the
    /// `dyn ExprNode` table when built with the `dyn-dispatch` feature.
    pub fn evaluate(&self, table: &VariableTable) -> Result<Value, EvalError> {
        #[cfg(feature = "dyn-dispatch")]
        {
            crate::runtime::eval_dyn::evaluate(self, table)
        }
        #[cfg(not(feature = "dyn-dispatch"))]
        {
            crate::runtime::eval::evaluate(self, table)
        }
    }

    /// True if the tree can be evaluated once, ahead of time: it reads no
    /// variables other than constant slots.
    pub fn is_constant(&self, table: &VariableTable) -> bool {
        #[cfg(feature = "dyn-dispatch")]
        {
            self.as_node().is_constant(table)
        }
        #[cfg(not(feature = "dyn-dispatch"))]
        {
            crate::runtime::eval::is_constant(self, table)
        }
    }

    /// Every variable read by the tree, in source order, with repeats.
    pub fn variables(&self) -> Vec<Var> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, out: &mut Vec<Var>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Variable(v) => out.push(v.var),
            Expr::Call(call) => {
                for arg in &call.args {
                    arg.collect_variables(out);
                }
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => fmt::Display::fmt(lit, f),
            Expr::Variable(var) => fmt::Display::fmt(var, f),
            Expr::Call(call) => fmt::Display::fmt(call, f),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self.value)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.var)
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.builtin.token)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, ")")
    }
}
