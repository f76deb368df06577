//! End-to-end scenarios over the public API.

use mathc::bytecode::disasm::disassemble;
use mathc::lang::builtin::Builtin;
use mathc::{
    CompileError, Error, EvalError, ParseErrorKind, Parser, Program, Register, Registry, Value,
    Var, VariableTable,
};
use pretty_assertions::assert_eq;

fn var(ch: char) -> Var {
    Var::new(ch).unwrap()
}

fn eval_str(source: &str, table: &VariableTable) -> Result<Value, Error> {
    let expr = mathc::parse(source)?;
    Ok(mathc::evaluate(&expr, table)?)
}

fn compile_str(source: &str, table: &VariableTable) -> Result<Program, Error> {
    let expr = mathc::parse(source)?;
    Ok(mathc::compile(&expr, table)?)
}

#[test]
fn test_reference_results() {
    let table = VariableTable::new();
    for (source, expected) in [
        ("(add 1 2)", 3.0),
        ("(sub 10 3 2)", 5.0),
        ("(div 8 2 2)", 2.0),
        ("(max 1 5 3)", 5.0),
        ("(avg 2 4 6)", 4.0),
    ] {
        assert_eq!(eval_str(source, &table).unwrap(), expected, "{}", source);
        assert_eq!(compile_str(source, &table).unwrap().execute(), expected, "{}", source);
    }
}

#[test]
fn test_undefined_variable_is_named() {
    let table = VariableTable::new();
    let err = eval_str("(sqrt x)", &table).unwrap_err();
    assert_eq!(err, Error::Eval(EvalError::UndefinedVariable { var: var('x') }));
    assert!(err.to_string().contains("x"));
}

#[test]
fn test_arity_mismatch_reports_counts() {
    let table = VariableTable::new();
    assert_eq!(
        eval_str("(sqrt 1 2)", &table).unwrap_err(),
        Error::Eval(EvalError::ArityMismatch {
            function: "sqrt",
            expected: 1,
            actual: 2
        })
    );
    assert_eq!(
        compile_str("(sqrt 1 2)", &table).unwrap_err(),
        Error::Compile(CompileError::Constexpr(EvalError::ArityMismatch {
            function: "sqrt",
            expected: 1,
            actual: 2
        }))
    );
}

#[test]
fn test_truncated_input_is_an_error() {
    for source in ["(add 1 (mul 2 3", "(add", "(", ""] {
        let err = mathc::parse(source).unwrap_err();
        assert!(
            matches!(
                err.kind,
                ParseErrorKind::UnterminatedCall | ParseErrorKind::UnterminatedInput
            ),
            "{}: {:?}",
            source,
            err
        );
    }
}

#[test]
fn test_sweep_single_input_without_recompiling() {
    let table = VariableTable::new();
    let mut program = compile_str("(mul (sin x) 2)", &table).unwrap();
    assert!(matches!(program.register(var('x')), Some(Register::Inline(_))));

    for step in 0..10 {
        let x = step as Value * 0.1;
        *program.register_for(var('x')).unwrap() = x;
        assert_eq!(program.execute(), x.sin() * 2.0);
    }
}

#[test]
fn test_shared_register_feeds_every_site() {
    let mut table = VariableTable::new();
    table.bind(var('t'), 1.0);
    let mut program = compile_str("(add (mul t t) (neg t) (cos t))", &table).unwrap();
    assert_eq!(program.register(var('t')), Some(Register::Shared(0)));

    let t: Value = 3.0;
    assert!(program.set(var('t'), t));
    let expected = t * t - t + t.cos();
    assert!((program.execute() - expected).abs() < 1e-12);
}

#[test]
fn test_constant_slot_is_baked_in() {
    let mut table = VariableTable::new();
    table.define_constant(var('k'), 2.0);
    let program = compile_str("(mul k x)", &table).unwrap();

    table.define_constant(var('k'), 100.0);
    assert_eq!(program.register(var('k')), None);

    let mut program = program;
    program.set(var('x'), 3.0);
    assert_eq!(program.execute(), 6.0);
}

#[test]
fn test_registers_seeded_from_bindings() {
    let mut table = VariableTable::new();
    table.bind(var('x'), 5.2);
    let program = compile_str("(add x 1)", &table).unwrap();
    assert_eq!(program.get(var('x')), Some(5.2));
    assert_eq!(program.execute(), 6.2);
}

#[test]
fn test_custom_builtin_evaluates_but_does_not_compile() {
    fn hyp(args: &[Value]) -> Result<Value, EvalError> {
        Ok(args.iter().map(|a| a * a).sum::<Value>().sqrt())
    }

    let registry = Registry::standard().clone().with(Builtin::custom("hyp", hyp));
    let mut table = VariableTable::new();
    table.bind(var('a'), 3.0);
    table.bind(var('b'), 4.0);

    let expr = Parser::with_registry("(hyp a b)", &registry).parse().unwrap();
    assert_eq!(mathc::evaluate(&expr, &table), Ok(5.0));
    assert_eq!(
        mathc::compile(&expr, &table).unwrap_err(),
        CompileError::UnrecognizedBuiltin("hyp")
    );

    // Unknown to the standard registry.
    let err = mathc::parse("(hyp a b)").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnknownFunction("hyp".to_string()));
}

#[test]
fn test_printed_form_reparses() {
    let table = VariableTable::new();
    let expr = mathc::parse("(add  1.50 (mul P  2)\t(div 1 0) )").unwrap();
    let printed = expr.to_string();
    assert_eq!(printed, "(add 1.5 (mul P 2) (div 1 0))");

    let reparsed = mathc::parse(&printed).unwrap();
    assert_eq!(reparsed, expr);
    assert_eq!(
        mathc::evaluate(&reparsed, &table),
        mathc::evaluate(&expr, &table)
    );
}

#[test]
fn test_disassembly_of_linked_program() {
    let table = VariableTable::new();
    let program = compile_str("(add 1 2 x (mul x y))", &table).unwrap();
    let listing = disassemble(&program);

    assert!(listing.contains("BUILTIN     add ; argc=3"));
    assert!(listing.contains("VALUE       3"));
    assert!(listing.contains("x  cell[0]"));
    assert!(listing.contains("y  inline@"));
}
