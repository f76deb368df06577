//! Ahead-of-time compilation to a flat record buffer.
//!
//! [`compile`] lowers an expression tree into a contiguous buffer of
//! self-sized [`Record`]s plus a relocation list of variable reads,
//! [`link`] allocates registers and resolves those reads, and
//! [`program`] walks the linked buffer.

pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod link;
pub mod program;
pub mod record;

pub use compile::{Compiled, Compiler, CompilerConfig, VariableOffsets};
pub use compile_error::CompileError;
pub use link::Linker;
pub use program::{Program, Register};
pub use record::{Kind, Native, Record};
