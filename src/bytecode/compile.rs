use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bytecode::compile_error::CompileError;
use crate::bytecode::record::{Kind, Native, Record};
use crate::lang::builtin::Function;
use crate::lang::node::{Call, Expr, Literal, Variable};
use crate::lang::state::VariableTable;
use crate::lang::value::Value;
use crate::lang::var::Var;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Evaluate constant subtrees at compile time. Constant variables are
    /// always read from the table, even with folding off.
    pub fold_constants: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            fold_constants: true,
        }
    }
}

/// A variable read that still has to be resolved by the linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableOffset {
    pub var: Var,
    /// Index of the placeholder record, relative to the buffer it belongs to.
    pub offset: usize,
}

/// Relocation list of a compiled buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableOffsets {
    entries: Vec<VariableOffset>,
}

impl VariableOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single read of `var` at the start of its buffer.
    pub fn single(var: Var) -> Self {
        VariableOffsets {
            entries: vec![VariableOffset { var, offset: 0 }],
        }
    }

    /// Moves every entry by `by` records, for a buffer placed at that index
    /// inside its parent.
    pub fn shift(&mut self, by: usize) {
        for entry in &mut self.entries {
            entry.offset += by;
        }
    }

    /// Appends the entries of `other`, which must already be shifted.
    pub fn merge(&mut self, other: VariableOffsets) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableOffset> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of reads per identifier.
    pub fn uses(&self) -> [usize; Var::COUNT] {
        let mut uses = [0; Var::COUNT];
        for entry in &self.entries {
            uses[entry.var.index()] += 1;
        }
        uses
    }
}

/// Output of the compiler: an unlinked buffer and its relocations.
///
/// The buffer is never empty; its first record is the root.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub(crate) code: Vec<Record>,
    pub(crate) offsets: VariableOffsets,
}

impl Compiled {
    fn constant(value: Value) -> Self {
        Compiled {
            code: vec![Record::value(value)],
            offsets: VariableOffsets::new(),
        }
    }

    fn lookup(var: Var) -> Self {
        Compiled {
            code: vec![Record::placeholder()],
            offsets: VariableOffsets::single(var),
        }
    }

    pub fn code(&self) -> &[Record] {
        &self.code
    }

    pub fn offsets(&self) -> &VariableOffsets {
        &self.offsets
    }

    /// Size of the root record, which spans the whole buffer.
    pub fn size(&self) -> usize {
        self.code[0].size
    }
}

/// Lowers expression trees into flat record buffers.
///
/// The variable table is only read: constant slots are folded into the
/// output, every other variable becomes a placeholder listed in the
/// relocation offsets.
pub struct Compiler<'t> {
    table: &'t VariableTable,
    config: CompilerConfig,
}

impl<'t> Compiler<'t> {
    pub fn new(table: &'t VariableTable) -> Self {
        Self::with_config(table, CompilerConfig::default())
    }

    pub fn with_config(table: &'t VariableTable, config: CompilerConfig) -> Self {
        Compiler { table, config }
    }

    pub fn compile(&self, expr: &Expr) -> Result<Compiled, CompileError> {
        if self.config.fold_constants && expr.is_constant(self.table) {
            let value = expr.evaluate(self.table)?;
            debug!(expr = %expr, value, "folded constant expression");
            return Ok(Compiled::constant(value));
        }

        #[cfg(feature = "dyn-dispatch")]
        {
            expr.as_node().compile(self)
        }
        #[cfg(not(feature = "dyn-dispatch"))]
        {
            match expr {
                Expr::Literal(lit) => self.compile_literal(lit),
                Expr::Variable(var) => self.compile_variable(var),
                Expr::Call(call) => self.compile_call(call),
            }
        }
    }

    pub fn compile_literal(&self, lit: &Literal) -> Result<Compiled, CompileError> {
        Ok(Compiled::constant(lit.value))
    }

    pub fn compile_variable(&self, variable: &Variable) -> Result<Compiled, CompileError> {
        let var = variable.var;
        if self.table.is_constant(var) {
            let value = self.table.read(var)?;
            return Ok(Compiled::constant(value));
        }

        trace!(%var, "emitting lookup");
        Ok(Compiled::lookup(var))
    }

    /// Lowers a call into a header record followed by its arguments.
    ///
    /// A leading run of constant arguments of `add` and `mul` is merged into
    /// one value, so `(add 1 2 x)` runs as `(add 3 x)`. Later constants stay
    /// in place to keep the left-to-right order of the reduction.
    pub fn compile_call(&self, call: &Call) -> Result<Compiled, CompileError> {
        let token = call.builtin.token;

        match call.builtin.function {
            Function::Reduce(op) => {
                let mut children = Vec::with_capacity(call.args.len());
                let mut rest = call.args.as_slice();

                if self.config.fold_constants && op.is_associative() {
                    let leading = call
                        .args
                        .iter()
                        .take_while(|arg| arg.is_constant(self.table))
                        .count();

                    if leading >= 2 {
                        let values = call.args[..leading]
                            .iter()
                            .map(|arg| arg.evaluate(self.table))
                            .collect::<Result<Vec<_>, _>>()?;
                        let folded = op.reduce(values);
                        debug!(token, merged = leading, value = folded, "folded leading constant arguments");
                        children.push(Compiled::constant(folded));
                        rest = &call.args[leading..];
                    }
                }

                for arg in rest {
                    children.push(self.compile(arg)?);
                }
                let argc = children.len();
                Ok(assemble(Kind::Builtin { op, argc }, children))
            }

            Function::Unary(f) => self.compile_native(call, Native::Unary(f)),
            Function::Binary(f) => self.compile_native(call, Native::Binary(f)),
            Function::Custom(_) => Err(CompileError::UnrecognizedBuiltin(token)),
        }
    }

    fn compile_native(&self, call: &Call, native: Native) -> Result<Compiled, CompileError> {
        let token = call.builtin.token;
        let expected = native.arity();
        if call.args.len() != expected {
            return Err(CompileError::ArityMismatch {
                function: token,
                expected,
                actual: call.args.len(),
            });
        }

        let children = call
            .args
            .iter()
            .map(|arg| self.compile(arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assemble(Kind::Call { token, native }, children))
    }
}

/// Concatenates argument buffers after a header record, shifting and merging
/// their relocations.
fn assemble(kind: Kind, children: Vec<Compiled>) -> Compiled {
    let expected_size = Record::LEAF_SIZE + children.iter().map(Compiled::size).sum::<usize>();

    let mut code = vec![Record {
        size: Record::LEAF_SIZE,
        kind,
    }];
    let mut offsets = VariableOffsets::new();

    for child in children {
        let mut child_offsets = child.offsets;
        child_offsets.shift(code.len());
        offsets.merge(child_offsets);
        code.extend(child.code);
    }

    code[0].size = code.len();
    debug_assert_eq!(code[0].size, expected_size, "record size does not cover its arguments");

    Compiled { code, offsets }
}
