use crate::bytecode::compile::Compiled;
use crate::bytecode::link::Linker;
use crate::bytecode::record::{Kind, Native, Record};
use crate::lang::value::Value;
use crate::lang::var::Var;

/// Where a variable's value lives in a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Index into the shared cells, read by every lookup of the variable.
    Shared(usize),
    /// Index of the inline value record of a single-use variable.
    Inline(usize),
}

/// A linked, executable buffer together with its register file.
///
/// Built once, executed any number of times. Registers may be written
/// between executions without recompiling.
#[derive(Debug, Clone)]
pub struct Program {
    pub(crate) code: Vec<Record>,
    pub(crate) cells: Vec<Value>,
    pub(crate) cell_vars: Vec<Var>,
    pub(crate) registers: [Option<Register>; Var::COUNT],
}

impl Program {
    /// Links `compiled` with every register starting at zero.
    pub fn build(compiled: Compiled) -> Program {
        Linker::new().link(compiled)
    }

    pub fn execute(&self) -> Value {
        self.eval_at(0)
    }

    fn eval_at(&self, at: usize) -> Value {
        let record = &self.code[at];
        match record.kind {
            Kind::Value(value) => value,
            Kind::Lookup { cell: Some(cell) } => self.cells[cell],
            Kind::Lookup { cell: None } => {
                debug_assert!(false, "unresolved lookup at {}", at);
                Value::NAN
            }
            Kind::Builtin { op, argc } => op.reduce(self.args(at, argc)),
            Kind::Call { native, .. } => {
                let first = at + Record::LEAF_SIZE;
                match native {
                    Native::Unary(f) => f(self.eval_at(first)),
                    Native::Binary(f) => {
                        let second = first + self.code[first].size;
                        f(self.eval_at(first), self.eval_at(second))
                    }
                }
            }
        }
    }

    fn args(&self, at: usize, argc: usize) -> Args<'_> {
        Args {
            program: self,
            cursor: at + Record::LEAF_SIZE,
            remaining: argc,
        }
    }

    /// The writable value cell of `var`, if the program reads it.
    pub fn register_for(&mut self, var: Var) -> Option<&mut Value> {
        match self.registers[var.index()]? {
            Register::Shared(cell) => self.cells.get_mut(cell),
            Register::Inline(index) => match &mut self.code[index].kind {
                Kind::Value(value) => Some(value),
                _ => None,
            },
        }
    }

    pub fn register(&self, var: Var) -> Option<Register> {
        self.registers[var.index()]
    }

    pub fn get(&self, var: Var) -> Option<Value> {
        match self.register(var)? {
            Register::Shared(cell) => self.cells.get(cell).copied(),
            Register::Inline(index) => match self.code[index].kind {
                Kind::Value(value) => Some(value),
                _ => None,
            },
        }
    }

    /// Writes `value` into the register of `var`. Returns false when the
    /// program does not read `var`.
    pub fn set(&mut self, var: Var, value: Value) -> bool {
        match self.register_for(var) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Every variable with a register, in identifier order.
    pub fn registers(&self) -> impl Iterator<Item = (Var, Register)> + '_ {
        Var::all().filter_map(|var| self.register(var).map(|register| (var, register)))
    }

    pub fn code(&self) -> &[Record] {
        &self.code
    }

    /// Variable owning shared cell `cell`.
    pub fn cell_var(&self, cell: usize) -> Option<Var> {
        self.cell_vars.get(cell).copied()
    }

    /// Number of records in the buffer.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// Values of consecutive argument subtrees, found by skipping each by size.
struct Args<'p> {
    program: &'p Program,
    cursor: usize,
    remaining: usize,
}

impl Iterator for Args<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.program.eval_at(self.cursor);
        self.cursor += self.program.code[self.cursor].size;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
