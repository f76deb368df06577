//! Tree-walking evaluation.
//!
//! Two evaluators implement the same contract: [`eval`] inspects the
//! [`Expr`](crate::lang::node::Expr) sum type with an exhaustive `match`, and
//! [`eval_dyn`] routes every node through the [`ExprNode`](eval_dyn::ExprNode)
//! capability table. They must agree bit for bit; the `dyn-dispatch` feature
//! picks which one backs `Expr::evaluate`.

pub mod eval;
pub mod eval_dyn;
pub mod eval_error;
