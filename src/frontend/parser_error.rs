use thiserror::Error;

/// A parsing error with source location.
///
/// `position` is the 0-based byte offset of the token that failed, or the end
/// of input for errors caused by running out of text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{position}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("failed to parse '{0}' as a number")]
    MalformedNumber(String),

    #[error("number too long, max is {max} characters")]
    NumberTooLong { max: usize },

    #[error("EOF while parsing call")]
    UnterminatedCall,

    #[error("call function name too long, max is {max} characters")]
    CallNameTooLong { max: usize },

    #[error("function '{0}' not defined")]
    UnknownFunction(String),

    #[error("too many arguments, max is {max}")]
    TooManyArguments { max: usize },

    #[error("unexpected end of input, expected an expression")]
    UnterminatedInput,

    #[error("unrecognized token '{0}'")]
    UnrecognizedToken(String),
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: usize) -> Self {
        ParseError { kind, position }
    }
}
