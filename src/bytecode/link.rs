use tracing::debug;

use crate::bytecode::compile::Compiled;
use crate::bytecode::program::{Program, Register};
use crate::bytecode::record::Kind;
use crate::lang::state::VariableTable;
use crate::lang::value::Value;
use crate::lang::var::Var;

/// Turns a [`Compiled`] buffer into an executable [`Program`].
///
/// A variable read two or more times gets one shared cell that every lookup
/// site points at. A variable read once is rewritten in place into an inline
/// value, and its register points at that record.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linker<'t> {
    seed: Option<&'t VariableTable>,
}

impl<'t> Linker<'t> {
    /// Registers start at zero.
    pub fn new() -> Self {
        Linker { seed: None }
    }

    /// Registers start at the values bound in `table`, zero where unbound.
    pub fn seeded(table: &'t VariableTable) -> Self {
        Linker { seed: Some(table) }
    }

    fn initial(&self, var: Var) -> Value {
        self.seed.and_then(|table| table.get(var)).unwrap_or(0.0)
    }

    pub fn link(&self, compiled: Compiled) -> Program {
        let Compiled { mut code, offsets } = compiled;
        let uses = offsets.uses();

        let mut cells: Vec<Value> = Vec::new();
        let mut cell_vars: Vec<Var> = Vec::new();
        let mut registers: [Option<Register>; Var::COUNT] = [None; Var::COUNT];

        for entry in offsets.iter() {
            let var = entry.var;
            let record = &mut code[entry.offset];
            debug_assert!(
                matches!(record.kind, Kind::Lookup { cell: None }),
                "relocation at {} does not point at a placeholder",
                entry.offset
            );

            if uses[var.index()] == 1 {
                let value = self.initial(var);
                record.kind = Kind::Value(value);
                registers[var.index()] = Some(Register::Inline(entry.offset));
                debug!(%var, offset = entry.offset, value, "inlined single-use variable");
                continue;
            }

            let cell = match registers[var.index()] {
                Some(Register::Shared(cell)) => cell,
                _ => {
                    let cell = cells.len();
                    let value = self.initial(var);
                    cells.push(value);
                    cell_vars.push(var);
                    registers[var.index()] = Some(Register::Shared(cell));
                    debug!(%var, cell, uses = uses[var.index()], value, "allocated shared register");
                    cell
                }
            };
            record.kind = Kind::Lookup { cell: Some(cell) };
        }

        debug_assert!(
            !code
                .iter()
                .any(|record| matches!(record.kind, Kind::Lookup { cell: None })),
            "unresolved lookup after linking"
        );

        let program = Program {
            code,
            cells,
            cell_vars,
            registers,
        };
        debug!(
            records = program.len(),
            shared = program.cells.len(),
            registers = program.registers().count(),
            "built program"
        );
        program
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile::Compiler;
    use crate::frontend::parser::Parser;

    fn compile(source: &str) -> Compiled {
        let table = VariableTable::new();
        let expr = Parser::new(source).parse().expect("parse should succeed");
        Compiler::new(&table)
            .compile(&expr)
            .expect("compile should succeed")
    }

    fn var(ch: char) -> Var {
        Var::new(ch).unwrap()
    }

    #[test]
    fn test_single_use_is_inlined() {
        let program = Linker::new().link(compile("(add x 1)"));
        // 0 add, 1 x, 2 literal
        assert!(matches!(program.code()[1].kind, Kind::Value(v) if v == 0.0));
        assert_eq!(program.register(var('x')), Some(Register::Inline(1)));
        assert!(program.cells.is_empty());
    }

    #[test]
    fn test_repeated_use_shares_one_cell() {
        let program = Linker::new().link(compile("(add x (mul x y) x)"));
        assert_eq!(program.register(var('x')), Some(Register::Shared(0)));
        assert_eq!(program.cells.len(), 1);
        assert_eq!(program.cell_vars, vec![var('x')]);

        let lookups = program
            .code()
            .iter()
            .filter(|r| matches!(r.kind, Kind::Lookup { cell: Some(0) }))
            .count();
        assert_eq!(lookups, 3);
        assert!(matches!(program.register(var('y')), Some(Register::Inline(_))));
    }

    #[test]
    fn test_cells_in_first_use_order() {
        let program = Linker::new().link(compile("(add b a b a)"));
        assert_eq!(program.cell_vars, vec![var('b'), var('a')]);
        assert_eq!(program.register(var('a')), Some(Register::Shared(1)));
    }

    #[test]
    fn test_seeded_initial_values() {
        let mut table = VariableTable::new();
        table.bind(var('x'), 2.0);
        table.bind(var('y'), 3.0);

        let program = Linker::seeded(&table).link(compile("(add x x y z)"));
        assert_eq!(program.get(var('x')), Some(2.0));
        assert_eq!(program.get(var('y')), Some(3.0));
        assert_eq!(program.get(var('z')), Some(0.0));
        assert_eq!(program.execute(), 7.0);
    }

    #[test]
    fn test_constant_program_has_no_registers() {
        let program = Linker::new().link(compile("(mul 2 P)"));
        assert_eq!(program.len(), 1);
        assert_eq!(program.registers().count(), 0);
    }
}
