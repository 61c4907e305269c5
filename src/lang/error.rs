//! Error types raised while parsing and evaluating calculator input
//!
//! Both kinds are fatal to the statement that raised them. The session runtime additionally
//! discards all variables when it sees either one.

use std::fmt;

use crate::lang::ast::Identifier;
use crate::lang::functions::Function;

/// Malformed token sequence
#[derive(Debug, PartialEq, Clone)]
pub struct SyntaxError {
    message: String,
}

impl SyntaxError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Syntax error: {}", self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// Failure while walking an expression tree
#[derive(Debug, PartialEq, Clone)]
pub enum EvalError {
    /// Variable read before any assignment to it
    UndefinedVariable(Identifier),
    /// Right hand side of `/` was exactly zero
    DivisionByZero,
    /// Argument outside the domain of a built-in function
    DomainError(String),
    /// Built-in called with the wrong number of arguments
    UnknownFunction { name: Function, args: usize },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UndefinedVariable(ident) => write!(f, "Undefined variable: {}", ident),
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::DomainError(msg) => write!(f, "{}", msg),
            EvalError::UnknownFunction { name, args } => write!(
                f,
                "Unknown function or wrong number of arguments: {} (called with {}, takes {})",
                name,
                args,
                name.arity()
            ),
        }
    }
}

impl std::error::Error for EvalError {}

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    Syntax(SyntaxError),
    Eval(EvalError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax(e) => write!(f, "{}", e),
            Error::Eval(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<SyntaxError> for Error {
    fn from(e: SyntaxError) -> Self {
        Error::Syntax(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}

#[test]
fn test_messages() {
    let data = vec![
        (
            Error::from(SyntaxError::new("expected ')'")),
            "Syntax error: expected ')'",
        ),
        (
            Error::from(EvalError::UndefinedVariable(Identifier("z".to_string()))),
            "Undefined variable: z",
        ),
        (Error::from(EvalError::DivisionByZero), "Division by zero"),
        (
            Error::from(EvalError::UnknownFunction {
                name: Function::Pow,
                args: 1,
            }),
            "Unknown function or wrong number of arguments: pow (called with 1, takes 2)",
        ),
    ];

    for (err, expected) in data {
        assert_eq!(err.to_string(), expected);
    }
}
