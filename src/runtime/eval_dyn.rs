//! Evaluator that dispatches through a per-variant capability table.
//!
//! Each node kind implements [`ExprNode`]; `Expr::as_node` selects the
//! implementation by tag and every later step, recursion included, goes
//! through the trait object.

use std::fmt;

use crate::bytecode::compile::{Compiled, Compiler};
use crate::bytecode::compile_error::CompileError;
use crate::lang::node::{Call, Expr, Literal, Variable};
use crate::lang::state::VariableTable;
use crate::lang::value::Value;
use crate::runtime::eval_error::EvalError;

/// Everything the engine can do with a single node.
pub trait ExprNode {
    fn evaluate(&self, table: &VariableTable) -> Result<Value, EvalError>;

    fn is_constant(&self, table: &VariableTable) -> bool;

    /// Writes the node in prefix surface syntax.
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn compile(&self, compiler: &Compiler<'_>) -> Result<Compiled, CompileError>;
}

impl Expr {
    pub fn as_node(&self) -> &dyn ExprNode {
        match self {
            Expr::Literal(lit) => lit,
            Expr::Variable(var) => var,
            Expr::Call(call) => call,
        }
    }
}

impl ExprNode for Literal {
    fn evaluate(&self, _table: &VariableTable) -> Result<Value, EvalError> {
        Ok(self.value)
    }

    fn is_constant(&self, _table: &VariableTable) -> bool {
        true
    }

    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }

    fn compile(&self, compiler: &Compiler<'_>) -> Result<Compiled, CompileError> {
        compiler.compile_literal(self)
    }
}

impl ExprNode for Variable {
    fn evaluate(&self, table: &VariableTable) -> Result<Value, EvalError> {
        table.read(self.var)
    }

    fn is_constant(&self, table: &VariableTable) -> bool {
        table.is_constant(self.var)
    }

    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }

    fn compile(&self, compiler: &Compiler<'_>) -> Result<Compiled, CompileError> {
        compiler.compile_variable(self)
    }
}

impl ExprNode for Call {
    fn evaluate(&self, table: &VariableTable) -> Result<Value, EvalError> {
        let args = self
            .args
            .iter()
            .map(|arg| arg.as_node().evaluate(table))
            .collect::<Result<Vec<_>, _>>()?;
        self.builtin.call(&args)
    }

    fn is_constant(&self, table: &VariableTable) -> bool {
        self.args.iter().all(|arg| arg.as_node().is_constant(table))
    }

    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.builtin.token)?;
        for arg in &self.args {
            write!(f, " ")?;
            arg.as_node().print(f)?;
        }
        write!(f, ")")
    }

    fn compile(&self, compiler: &Compiler<'_>) -> Result<Compiled, CompileError> {
        compiler.compile_call(self)
    }
}

/// Evaluates `expr` against `table` through the capability table.
pub fn evaluate(expr: &Expr, table: &VariableTable) -> Result<Value, EvalError> {
    expr.as_node().evaluate(table)
}

/// Display adapter for [`ExprNode::print`].
pub struct Printed<'a>(pub &'a dyn ExprNode);

impl fmt::Display for Printed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.print(f)
    }
}
