use std::f64::consts;

use crate::lang::{value::Value, var::Var};
use crate::runtime::eval_error::EvalError;

/// One entry of the [`VariableTable`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Slot {
    /// A value has been bound.
    pub occupied: bool,
    /// Reads may be folded by the compiler. Implies `occupied`.
    pub constant: bool,
    pub value: Value,
}

/// Fixed-capacity variable bindings, one slot per possible identifier.
///
/// The table is owned by the caller and only borrowed by the evaluator and
/// the compiler. Slots marked constant are baked into compiled programs, so
/// rebinding one afterwards is not visible to a program that was compiled
/// before the change.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableTable {
    slots: [Slot; Var::COUNT],
}

impl VariableTable {
    /// Identifier pre-bound to π.
    pub const PI: Var = Var::from_byte(b'P');
    /// Identifier pre-bound to Euler's number.
    pub const E: Var = Var::from_byte(b'E');

    /// Creates a table with `P` and `E` bound as constants.
    pub fn new() -> Self {
        let mut table = Self::empty();
        table.define_constant(Self::PI, consts::PI);
        table.define_constant(Self::E, consts::E);
        table
    }

    /// Creates a table with no bindings at all.
    pub fn empty() -> Self {
        VariableTable {
            slots: [Slot::default(); Var::COUNT],
        }
    }

    /// Binds `var` to `value`, keeping its constant flag.
    pub fn bind(&mut self, var: Var, value: Value) {
        let slot = &mut self.slots[var.index()];
        slot.occupied = true;
        slot.value = value;
    }

    /// Binds `var` to `value` and marks it safe to fold.
    pub fn define_constant(&mut self, var: Var, value: Value) {
        self.slots[var.index()] = Slot {
            occupied: true,
            constant: true,
            value,
        };
    }

    /// Removes the binding for `var`, constant or not.
    pub fn unbind(&mut self, var: Var) {
        self.slots[var.index()] = Slot::default();
    }

    pub fn slot(&self, var: Var) -> &Slot {
        &self.slots[var.index()]
    }

    pub fn get(&self, var: Var) -> Option<Value> {
        let slot = self.slot(var);
        slot.occupied.then_some(slot.value)
    }

    pub fn is_constant(&self, var: Var) -> bool {
        self.slot(var).constant
    }

    /// Reads `var` for evaluation.
    pub fn read(&self, var: Var) -> Result<Value, EvalError> {
        self.get(var).ok_or(EvalError::UndefinedVariable { var })
    }
}

impl Default for VariableTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(ch: char) -> Var {
        Var::new(ch).unwrap()
    }

    #[test]
    fn test_new_seeds_constants() {
        let table = VariableTable::new();
        assert_eq!(table.get(VariableTable::PI), Some(consts::PI));
        assert_eq!(table.get(VariableTable::E), Some(consts::E));
        assert!(table.is_constant(VariableTable::PI));
        assert!(table.is_constant(VariableTable::E));
    }

    #[test]
    fn test_empty_has_no_bindings() {
        let table = VariableTable::empty();
        assert!(Var::all().all(|v| table.get(v).is_none()));
    }

    #[test]
    fn test_bind_is_not_constant() {
        let mut table = VariableTable::new();
        table.bind(var('x'), 5.2);
        assert_eq!(table.get(var('x')), Some(5.2));
        assert!(!table.is_constant(var('x')));
    }

    #[test]
    fn test_rebinding_constant_keeps_flag() {
        let mut table = VariableTable::new();
        table.bind(VariableTable::PI, 3.0);
        assert_eq!(table.get(VariableTable::PI), Some(3.0));
        assert!(table.is_constant(VariableTable::PI));
    }

    #[test]
    fn test_unbind_clears_constant() {
        let mut table = VariableTable::new();
        table.unbind(VariableTable::E);
        let slot = table.slot(VariableTable::E);
        assert!(!slot.occupied);
        assert!(!slot.constant);
    }

    #[test]
    fn test_constant_implies_occupied() {
        let mut table = VariableTable::new();
        table.define_constant(var('k'), 2.0);
        table.bind(var('x'), 1.0);
        table.unbind(var('x'));
        for v in Var::all() {
            let slot = table.slot(v);
            assert!(!slot.constant || slot.occupied, "slot {} violates invariant", v);
        }
    }

    #[test]
    fn test_read_undefined_names_variable() {
        let table = VariableTable::new();
        let err = table.read(var('q')).unwrap_err();
        assert_eq!(err, EvalError::UndefinedVariable { var: var('q') });
        assert!(err.to_string().contains('q'));
    }
}
