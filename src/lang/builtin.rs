//! Builtin functions and the registry the parser resolves call names against.

use std::fmt;
use std::sync::LazyLock;

use crate::lang::value::Value;
use crate::runtime::eval_error::EvalError;

pub type UnaryFn = fn(Value) -> Value;
pub type BinaryFn = fn(Value, Value) -> Value;
pub type CustomFn = fn(&[Value]) -> Result<Value, EvalError>;

/// Variadic arithmetic reductions.
///
/// These double as the opcodes of compiled builtin records, so the tree
/// walker and the flat-buffer interpreter share one implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reduction {
    /// Sum.
    Add,
    /// Negated sum: `0 - a - b - ...`.
    Neg,
    /// First minus the rest; negation for one argument.
    Sub,
    /// Product.
    Mul,
    /// Reciprocal product: `1 / a / b / ...`.
    Inv,
    /// First divided by the rest; reciprocal for one argument.
    Div,
    Max,
    Min,
    /// Arithmetic mean.
    Avg,
}

impl Reduction {
    pub fn token(self) -> &'static str {
        match self {
            Reduction::Add => "add",
            Reduction::Neg => "neg",
            Reduction::Sub => "sub",
            Reduction::Mul => "mul",
            Reduction::Inv => "inv",
            Reduction::Div => "div",
            Reduction::Max => "max",
            Reduction::Min => "min",
            Reduction::Avg => "avg",
        }
    }

    /// True for reductions whose arguments may be regrouped, which lets the
    /// compiler merge constant arguments of a partly constant call.
    pub fn is_associative(self) -> bool {
        matches!(self, Reduction::Add | Reduction::Mul)
    }

    /// Folds the arguments left to right. With no arguments, `mul`, `inv` and
    /// `div` yield 1 and everything else yields 0.
    pub fn reduce<I>(self, args: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        let mut args = args.into_iter();
        match self {
            Reduction::Add => args.fold(0.0, |acc, a| acc + a),
            Reduction::Neg => args.fold(0.0, |acc, a| acc - a),
            Reduction::Mul => args.fold(1.0, |acc, a| acc * a),
            Reduction::Inv => args.fold(1.0, |acc, a| acc / a),
            Reduction::Sub => match args.next() {
                None => 0.0,
                Some(first) => match args.next() {
                    None => 0.0 - first,
                    Some(second) => args.fold(first - second, |acc, a| acc - a),
                },
            },
            Reduction::Div => match args.next() {
                None => 1.0,
                Some(first) => match args.next() {
                    None => 1.0 / first,
                    Some(second) => args.fold(first / second, |acc, a| acc / a),
                },
            },
            Reduction::Max => match args.next() {
                None => 0.0,
                Some(first) => args.fold(first, |acc, a| if a > acc { a } else { acc }),
            },
            Reduction::Min => match args.next() {
                None => 0.0,
                Some(first) => args.fold(first, |acc, a| if a < acc { a } else { acc }),
            },
            Reduction::Avg => {
                let (sum, count) = args.fold((0.0, 0usize), |(sum, n), a| (sum + a, n + 1));
                if count == 0 { 0.0 } else { sum / count as Value }
            }
        }
    }
}

/// How a builtin computes its result.
#[derive(Clone, Copy)]
pub enum Function {
    Reduce(Reduction),
    /// Native function of exactly one argument.
    Unary(UnaryFn),
    /// Native function of exactly two arguments.
    Binary(BinaryFn),
    /// Host-supplied function. Evaluates in the tree walker only.
    Custom(CustomFn),
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Reduce(r) => write!(f, "Reduce({:?})", r),
            Function::Unary(_) => write!(f, "Unary"),
            Function::Binary(_) => write!(f, "Binary"),
            Function::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// A named operation callable from expressions.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    /// Name used in call syntax.
    pub token: &'static str,
    pub function: Function,
}

impl Builtin {
    pub const fn reduce(token: &'static str, reduction: Reduction) -> Self {
        Builtin {
            token,
            function: Function::Reduce(reduction),
        }
    }

    pub const fn unary(token: &'static str, f: UnaryFn) -> Self {
        Builtin {
            token,
            function: Function::Unary(f),
        }
    }

    pub const fn binary(token: &'static str, f: BinaryFn) -> Self {
        Builtin {
            token,
            function: Function::Binary(f),
        }
    }

    pub const fn custom(token: &'static str, f: CustomFn) -> Self {
        Builtin {
            token,
            function: Function::Custom(f),
        }
    }

    /// Required argument count, if the builtin is not variadic.
    pub fn arity(&self) -> Option<usize> {
        match self.function {
            Function::Unary(_) => Some(1),
            Function::Binary(_) => Some(2),
            Function::Reduce(_) | Function::Custom(_) => None,
        }
    }

    /// Applies the builtin to already evaluated arguments.
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        if let Some(expected) = self.arity() {
            if args.len() != expected {
                return Err(EvalError::ArityMismatch {
                    function: self.token,
                    expected,
                    actual: args.len(),
                });
            }
        }

        match self.function {
            Function::Reduce(r) => Ok(r.reduce(args.iter().copied())),
            Function::Unary(f) => Ok(f(args[0])),
            Function::Binary(f) => Ok(f(args[0], args[1])),
            Function::Custom(f) => f(args),
        }
    }
}

/// Builtins are identified by their token.
impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

fn fmod(x: Value, y: Value) -> Value {
    x % y
}

fn log_base(x: Value, base: Value) -> Value {
    x.ln() / base.ln()
}

/// Rounds half up, so `(round -2.5)` is -2.
fn round_half_up(x: Value) -> Value {
    (x + 0.5).floor()
}

const STANDARD_BUILTINS: &[Builtin] = &[
    // basic
    Builtin::reduce("add", Reduction::Add),
    Builtin::reduce("neg", Reduction::Neg),
    Builtin::reduce("sub", Reduction::Sub),
    Builtin::reduce("mul", Reduction::Mul),
    Builtin::reduce("inv", Reduction::Inv),
    Builtin::reduce("div", Reduction::Div),
    Builtin::binary("pow", f64::powf),
    Builtin::binary("mod", fmod),
    Builtin::unary("sqrt", f64::sqrt),
    Builtin::unary("loge", f64::ln),
    Builtin::unary("log10", f64::log10),
    Builtin::binary("log", log_base),
    Builtin::unary("ceil", f64::ceil),
    Builtin::unary("floor", f64::floor),
    Builtin::unary("round", round_half_up),
    Builtin::unary("abs", f64::abs),
    Builtin::reduce("max", Reduction::Max),
    Builtin::reduce("min", Reduction::Min),
    Builtin::reduce("avg", Reduction::Avg),
    // trig
    Builtin::unary("sin", f64::sin),
    Builtin::unary("cos", f64::cos),
    Builtin::unary("tan", f64::tan),
    Builtin::unary("sinh", f64::sinh),
    Builtin::unary("cosh", f64::cosh),
    Builtin::unary("tanh", f64::tanh),
    Builtin::unary("asin", f64::asin),
    Builtin::unary("acos", f64::acos),
    Builtin::unary("atan", f64::atan),
    Builtin::binary("atan2", f64::atan2),
];

static STANDARD: LazyLock<Registry> = LazyLock::new(|| Registry {
    builtins: STANDARD_BUILTINS.to_vec(),
});

/// Table of builtins the parser resolves call names against.
#[derive(Debug, Clone)]
pub struct Registry {
    builtins: Vec<Builtin>,
}

impl Registry {
    /// The process-wide standard registry.
    pub fn standard() -> &'static Registry {
        &STANDARD
    }

    /// Adds `builtin`, replacing any entry with the same token.
    pub fn with(mut self, builtin: Builtin) -> Self {
        match self.builtins.iter_mut().find(|b| b.token == builtin.token) {
            Some(existing) => *existing = builtin,
            None => self.builtins.push(builtin),
        }
        self
    }

    pub fn lookup(&self, token: &str) -> Option<&Builtin> {
        self.builtins.iter().find(|b| b.token == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Builtin> {
        self.builtins.iter()
    }

    pub fn len(&self) -> usize {
        self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builtins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn std_builtin(token: &str) -> Builtin {
        *Registry::standard().lookup(token).unwrap()
    }

    fn call(token: &str, args: &[Value]) -> Value {
        std_builtin(token).call(args).unwrap()
    }

    #[test]
    fn test_add_and_mul() {
        assert_eq!(call("add", &[1.0, 2.0]), 3.0);
        assert_eq!(call("add", &[]), 0.0);
        assert_eq!(call("mul", &[2.0, 3.0, 4.0]), 24.0);
        assert_eq!(call("mul", &[]), 1.0);
    }

    #[test]
    fn test_sub() {
        assert_eq!(call("sub", &[10.0, 3.0, 2.0]), 5.0);
        assert_eq!(call("sub", &[4.0]), -4.0);
        assert_eq!(call("sub", &[]), 0.0);
    }

    #[test]
    fn test_neg_is_negated_sum() {
        assert_eq!(call("neg", &[1.0, 2.0]), -3.0);
        assert_eq!(call("neg", &[]), 0.0);
    }

    #[test]
    fn test_div() {
        assert_eq!(call("div", &[8.0, 2.0, 2.0]), 2.0);
        assert_eq!(call("div", &[4.0]), 0.25);
        assert_eq!(call("div", &[]), 1.0);
    }

    #[test]
    fn test_inv_is_reciprocal_product() {
        assert_eq!(call("inv", &[2.0, 4.0]), 0.125);
        assert_eq!(call("inv", &[]), 1.0);
    }

    #[test]
    fn test_max_min_avg() {
        assert_eq!(call("max", &[1.0, 5.0, 3.0]), 5.0);
        assert_eq!(call("min", &[4.0, -1.0, 3.0]), -1.0);
        assert_eq!(call("avg", &[2.0, 4.0, 6.0]), 4.0);
        assert_eq!(call("max", &[]), 0.0);
        assert_eq!(call("min", &[]), 0.0);
        assert_eq!(call("avg", &[]), 0.0);
    }

    #[test]
    fn test_native_wrappers() {
        assert_eq!(call("sqrt", &[9.0]), 3.0);
        assert_eq!(call("pow", &[2.0, 10.0]), 1024.0);
        assert_eq!(call("mod", &[7.0, 3.0]), 1.0);
        assert_eq!(call("round", &[2.5]), 3.0);
        assert_eq!(call("round", &[-2.5]), -2.0);
        assert!((call("log", &[8.0, 2.0]) - 3.0).abs() < 1e-12);
        assert!((call("atan2", &[1.0, 1.0]) - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_unary_arity_mismatch() {
        let err = std_builtin("sqrt").call(&[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            EvalError::ArityMismatch {
                function: "sqrt",
                expected: 1,
                actual: 2
            }
        );
        assert!(err.to_string().contains("sqrt"));
    }

    #[test]
    fn test_binary_arity_mismatch() {
        let err = std_builtin("pow").call(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            EvalError::ArityMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_standard_registry_tokens_are_unique() {
        let registry = Registry::standard();
        for b in registry.iter() {
            assert_eq!(registry.iter().filter(|o| o.token == b.token).count(), 1);
        }
        assert_eq!(registry.len(), 29);
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(Registry::standard().lookup("frobnicate").is_none());
    }

    #[test]
    fn test_with_adds_and_replaces() {
        fn hyp(args: &[Value]) -> Result<Value, EvalError> {
            Ok(args.iter().map(|a| a * a).sum::<Value>().sqrt())
        }

        let registry = Registry::standard()
            .clone()
            .with(Builtin::custom("hyp", hyp))
            .with(Builtin::unary("abs", |x| x));

        assert_eq!(registry.len(), 30);
        assert_eq!(registry.lookup("hyp").unwrap().call(&[3.0, 4.0]).unwrap(), 5.0);
        assert_eq!(registry.lookup("abs").unwrap().call(&[-1.0]).unwrap(), -1.0);
    }
}
