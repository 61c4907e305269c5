use std::convert::TryFrom;
use std::fmt;

use anyhow::{bail, Error, Result};
use lazy_static::lazy_static;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Function {
    Pow,
    Log,
    Sin,
    Sqrt,
    Abs,
}

impl Function {
    /// Number of arguments the function must be called with
    pub fn arity(&self) -> usize {
        match self {
            Function::Pow => 2,
            Function::Log | Function::Sin | Function::Sqrt | Function::Abs => 1,
        }
    }
}

impl TryFrom<&str> for Function {
    type Error = Error;

    fn try_from(f: &str) -> Result<Self> {
        Ok(match f {
            "pow" => Self::Pow,
            "log" => Self::Log,
            "sin" => Self::Sin,
            "sqrt" => Self::Sqrt,
            "abs" => Self::Abs,
            _ => bail!("Unknown function: {}", f),
        })
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Pow => write!(f, "pow"),
            Function::Log => write!(f, "log"),
            Function::Sin => write!(f, "sin"),
            Function::Sqrt => write!(f, "sqrt"),
            Function::Abs => write!(f, "abs"),
        }
    }
}

lazy_static! {
    pub static ref FUNCTIONS: Vec<Function> = vec![
        Function::Pow,
        Function::Log,
        Function::Sin,
        Function::Sqrt,
        Function::Abs,
    ];
}

#[test]
fn test_function_names() {
    for func in &*FUNCTIONS {
        let name = func.to_string();
        assert_eq!(Function::try_from(name.as_str()).unwrap(), *func);
    }

    for name in &["", "Pow", "cos", "sqrt_", "x"] {
        assert!(Function::try_from(*name).is_err());
    }
}

#[test]
fn test_arity() {
    assert_eq!(Function::Pow.arity(), 2);
    assert_eq!(Function::Sqrt.arity(), 1);
    assert_eq!(Function::Log.arity(), 1);
}
