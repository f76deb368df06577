//! A small prefix-notation math language.
//!
//! Text is parsed into an [`Expr`] tree, which can be evaluated directly
//! against a [`VariableTable`] or compiled into a flat [`Program`] whose
//! variable registers may be rewritten between executions.
//!
//! ```text
//! (add 1 (mul x 2) (sin P))
//! ```

pub mod bytecode;
pub mod frontend;
pub mod lang;
pub mod runtime;

use thiserror::Error;

pub use bytecode::{CompileError, Compiler, CompilerConfig, Linker, Program, Register};
pub use frontend::parser::{Parser, ParserConfig};
pub use frontend::parser_error::{ParseError, ParseErrorKind};
pub use lang::builtin::{Builtin, Registry};
pub use lang::node::Expr;
pub use lang::state::VariableTable;
pub use lang::value::Value;
pub use lang::var::Var;
pub use runtime::eval_error::EvalError;

/// Any failure of the parse, evaluate and compile pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Parses `text` against the standard builtin registry.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    Parser::new(text).parse()
}

/// Evaluates `expr` through the tree walker selected by the `dyn-dispatch`
/// feature.
pub fn evaluate(expr: &Expr, table: &VariableTable) -> Result<Value, EvalError> {
    expr.evaluate(table)
}

/// Compiles and links `expr`.
///
/// Constant slots of `table` are folded into the program; registers of the
/// other variables start at their current binding, or zero when unbound.
pub fn compile(expr: &Expr, table: &VariableTable) -> Result<Program, CompileError> {
    let compiled = Compiler::new(table).compile(expr)?;
    Ok(Linker::seeded(table).link(compiled))
}
