use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::frontend::parser_error::{ParseError, ParseErrorKind};
use crate::lang::builtin::Registry;
use crate::lang::node::Expr;
use crate::lang::value::MAX_NUMBER_LEN;
use crate::lang::var::Var;

/// Limits enforced while parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Longest accepted call name.
    pub max_name_len: usize,
    /// Most arguments a single call may take.
    pub max_args: usize,
    /// Longest accepted numeric literal.
    pub max_number_len: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_name_len: 16,
            max_args: 32,
            max_number_len: MAX_NUMBER_LEN,
        }
    }
}

/// Recursive-descent parser for mathc prefix expressions.
///
/// Grammar:
///
/// ```text
/// expr     ::= call | number | variable
/// call     ::= "(" name (" " expr)* ")"
/// number   ::= [+-]? decimal, e.g. `-2.5`, `1e3`
/// variable ::= single ASCII letter
/// ```
///
/// Call names are resolved against a [`Registry`] while parsing, so an unknown
/// function is a parse error and the resulting tree is fully resolved.
///
/// Nesting depth is not limited; very deep input can exhaust the stack.
pub struct Parser<'a> {
    source: &'a str,
    pos: usize,
    registry: &'a Registry,
    config: ParserConfig,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `source` using the standard registry.
    pub fn new(source: &'a str) -> Self {
        Self::with_registry(source, Registry::standard())
    }

    pub fn with_registry(source: &'a str, registry: &'a Registry) -> Self {
        Parser {
            source,
            pos: 0,
            registry,
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the current byte without consuming it.
    fn current(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(b) if b.is_ascii_whitespace()) {
            self.advance();
        }
    }

    fn error(&self, kind: ParseErrorKind, position: usize) -> ParseError {
        ParseError::new(kind, position)
    }

    /// True at a byte that may follow a complete number or variable.
    fn at_delimiter(&self) -> bool {
        match self.current() {
            None => true,
            Some(b) => b == b')' || b.is_ascii_whitespace(),
        }
    }

    /// Consumes bytes up to the next delimiter and returns them.
    fn rest_of_token(&mut self, start: usize) -> &'a str {
        while !self.at_delimiter() {
            self.advance();
        }
        let source = self.source;
        &source[start..self.pos]
    }

    /// Parses a complete expression. Only whitespace may follow it.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        if self.current().is_none() {
            return Err(self.error(ParseErrorKind::UnterminatedInput, self.pos));
        }

        let expr = self.parse_expr()?;

        self.skip_whitespace();
        if self.current().is_some() {
            let start = self.pos;
            let token = self.trailing_token(start);
            return Err(self.error(ParseErrorKind::UnrecognizedToken(token), start));
        }

        Ok(expr)
    }

    fn trailing_token(&mut self, start: usize) -> String {
        if self.current() == Some(b')') || self.current() == Some(b'(') {
            self.advance();
            return self.source[start..self.pos].to_string();
        }
        self.rest_of_token(start).to_string()
    }

    /// Parses one expression starting at a non-whitespace byte.
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        match self.current() {
            Some(b'(') => {
                self.advance();
                self.parse_call()
            }
            Some(b) if b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.') => {
                self.parse_number()
            }
            Some(b) if b.is_ascii_alphabetic() => self.parse_variable(),
            Some(_) => {
                let start = self.pos;
                let token = self.source[start..]
                    .chars()
                    .next()
                    .map(String::from)
                    .unwrap_or_default();
                Err(self.error(ParseErrorKind::UnrecognizedToken(token), start))
            }
            None => Err(self.error(ParseErrorKind::UnterminatedInput, self.pos)),
        }
    }

    /// Parses a call after its opening parenthesis:
    ///
    /// ```text
    /// name arg* ")"
    /// ```
    fn parse_call(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;

        match self.current() {
            None => return Err(self.error(ParseErrorKind::UnterminatedInput, start)),
            Some(b) if b == b')' || b.is_ascii_whitespace() => {
                let token = (b as char).to_string();
                return Err(self.error(ParseErrorKind::UnrecognizedToken(token), start));
            }
            Some(_) => {}
        }

        while let Some(b) = self.current() {
            if b == b')' || b == b'(' || b.is_ascii_whitespace() {
                break;
            }
            if self.pos - start == self.config.max_name_len {
                return Err(self.error(
                    ParseErrorKind::CallNameTooLong {
                        max: self.config.max_name_len,
                    },
                    start,
                ));
            }
            self.advance();
        }

        if self.current().is_none() {
            return Err(self.error(ParseErrorKind::UnterminatedCall, self.pos));
        }

        let name = &self.source[start..self.pos];
        let builtin = *self
            .registry
            .lookup(name)
            .ok_or_else(|| self.error(ParseErrorKind::UnknownFunction(name.to_string()), start))?;

        let mut args = Vec::new();
        loop {
            self.skip_whitespace();
            match self.current() {
                None => return Err(self.error(ParseErrorKind::UnterminatedCall, self.pos)),
                Some(b')') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    if args.len() == self.config.max_args {
                        return Err(self.error(
                            ParseErrorKind::TooManyArguments {
                                max: self.config.max_args,
                            },
                            self.pos,
                        ));
                    }
                    args.push(self.parse_expr()?);
                }
            }
        }

        trace!(token = builtin.token, argc = args.len(), "parsed call");
        Ok(Expr::call(builtin, args))
    }

    fn parse_number(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;

        while let Some(b) = self.current() {
            if !(b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E')) {
                break;
            }
            if self.pos - start == self.config.max_number_len {
                return Err(self.error(
                    ParseErrorKind::NumberTooLong {
                        max: self.config.max_number_len,
                    },
                    start,
                ));
            }
            self.advance();
        }

        if !self.at_delimiter() {
            let text = self.rest_of_token(start);
            return Err(self.error(ParseErrorKind::MalformedNumber(text.to_string()), start));
        }

        let text = &self.source[start..self.pos];
        text.parse::<f64>()
            .map(Expr::literal)
            .map_err(|_| self.error(ParseErrorKind::MalformedNumber(text.to_string()), start))
    }

    fn parse_variable(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        let byte = self.current().unwrap_or_default();
        self.advance();

        if !self.at_delimiter() {
            let text = self.rest_of_token(start);
            return Err(self.error(ParseErrorKind::UnrecognizedToken(text.to_string()), start));
        }

        Ok(Expr::variable(Var::from_byte(byte)))
    }
}
