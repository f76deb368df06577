use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser as ClapParser;
use mathc::bytecode::disasm::disassemble;
use mathc::{Compiler, CompilerConfig, Linker, Parser, Value, Var, VariableTable};
use tracing::{debug, info};

/// mathc - parse, evaluate and compile prefix math expressions
#[derive(ClapParser, Debug)]
#[command(name = "mathc")]
#[command(about = "Evaluate and compile prefix math expressions", long_about = None)]
struct Args {
    /// Bind a variable before evaluating, as `name=value`
    #[arg(long = "bind", value_name = "VAR=VALUE", value_parser = parse_binding, default_value = "x=5.2")]
    bindings: Vec<(Var, Value)>,

    /// Write a register of the compiled program before executing it
    #[arg(long = "poke", value_name = "VAR=VALUE", value_parser = parse_binding)]
    pokes: Vec<(Var, Value)>,

    /// Print the disassembled program
    #[arg(long)]
    disasm: bool,

    /// Lower constant subtrees structurally instead of folding them
    #[arg(long)]
    no_fold: bool,

    /// Expression to run (if not provided, reads from stdin)
    expression: Option<String>,
}

fn parse_binding(arg: &str) -> Result<(Var, Value), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected VAR=VALUE, got '{}'", arg))?;

    let mut chars = name.trim().chars();
    let var = match (chars.next(), chars.next()) {
        (Some(ch), None) => Var::new(ch).ok_or_else(|| format!("not a one-byte name: '{}'", ch))?,
        _ => return Err(format!("variable names are one character, got '{}'", name)),
    };
    let value = value
        .trim()
        .parse::<Value>()
        .map_err(|e| format!("bad value '{}': {}", value, e))?;
    Ok((var, value))
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_source(args: &Args) -> io::Result<String> {
    match &args.expression {
        Some(expression) => Ok(expression.clone()),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source.trim_end().to_string())
        }
    }
}

fn run(args: &Args, source: &str) -> Result<(), mathc::Error> {
    let expr = Parser::new(source).parse()?;
    println!("Expression:  {}", expr);

    let mut table = VariableTable::new();
    for &(var, value) in &args.bindings {
        table.bind(var, value);
    }

    match expr.evaluate(&table) {
        Ok(value) => println!("Evaluated:   {}", value),
        Err(e) => println!("Evaluated:   {}", e),
    }

    let config = CompilerConfig {
        fold_constants: !args.no_fold,
    };
    let compiled = Compiler::with_config(&table, config).compile(&expr)?;
    let mut program = Linker::seeded(&table).link(compiled);
    info!(records = program.len(), "compiled");

    for &(var, value) in &args.pokes {
        if program.set(var, value) {
            debug!(%var, value, "poked register");
        } else {
            eprintln!("warning: no register for '{}'", var);
        }
    }

    if args.disasm {
        print!("{}", disassemble(&program));
    }

    println!("Compiled:    {}", program.execute());
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let source = match read_source(&args) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read expression: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
