//! # mathc language model
//!
//! This module defines the data the rest of the crate works on: the numeric
//! [`Value`](value::Value), single-character identifiers, the caller-owned
//! variable table, the builtin registry and the expression tree produced by
//! the parser.
//!
//! ## Surface syntax
//!
//! - Calls are written in prefix form: `(add 1 2 x)`.
//! - Numbers are decimal literals with an optional sign: `-2.5`, `1e3`.
//! - Variables are single ASCII letters: `x`, `P`.

pub mod builtin;
pub mod node;
pub mod state;
pub mod value;
pub mod var;
