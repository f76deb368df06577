use std::fmt::Write;

use crate::bytecode::program::{Program, Register};
use crate::bytecode::record::{Kind, Native, Record};
use crate::lang::value::Surface;

/// Renders a linked program: its register file, then its record buffer.
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();

    out.push_str("════════════════════════════════════════\n");
    out.push_str(" program\n");
    let _ = writeln!(out, " {} records", program.len());
    out.push_str("════════════════════════════════════════\n");

    for (var, register) in program.registers() {
        let value = program.get(var).unwrap_or(f64::NAN);
        match register {
            Register::Shared(cell) => {
                let _ = writeln!(out, "  {}  cell[{}]    = {}", var, cell, Surface(value));
            }
            Register::Inline(index) => {
                let _ = writeln!(out, "  {}  inline@{:04} = {}", var, index, Surface(value));
            }
        }
    }

    out.push_str(&disassemble_records(program.code()));
    out
}

/// Renders a record buffer, indenting arguments under their call.
///
/// Works on linked and unlinked buffers alike; unresolved lookups print as
/// `LOOKUP ?`.
pub fn disassemble_records(code: &[Record]) -> String {
    let mut out = String::new();
    let mut at = 0;
    while at < code.len() {
        at += write_record(&mut out, code, at, 0);
    }
    out
}

/// Writes the subtree rooted at `at` and returns its size.
fn write_record(out: &mut String, code: &[Record], at: usize, depth: usize) -> usize {
    let record = &code[at];
    let prefix = "  ".repeat(depth);
    let _ = write!(out, "{:04} [{:>3}] {}{:<12}", at, record.size, prefix, record.tag());

    match record.kind {
        Kind::Value(value) => {
            let _ = writeln!(out, "{}", Surface(value));
        }
        Kind::Lookup { cell: Some(cell) } => {
            let _ = writeln!(out, "cell[{}]", cell);
        }
        Kind::Lookup { cell: None } => {
            let _ = writeln!(out, "?");
        }
        Kind::Builtin { op, argc } => {
            let _ = writeln!(out, "{} ; argc={}", op.token(), argc);
        }
        Kind::Call { token, native } => {
            let shape = match native {
                Native::Unary(_) => "unary",
                Native::Binary(_) => "binary",
            };
            let _ = writeln!(out, "{} ; {}", token, shape);
        }
    }

    let mut cursor = at + Record::LEAF_SIZE;
    for _ in 0..record.argc() {
        if cursor >= code.len() {
            let _ = writeln!(out, "     !!    truncated buffer");
            return code.len() - at;
        }
        cursor += write_record(out, code, cursor, depth + 1);
    }
    record.size.max(cursor - at)
}
