//! Single binary operation mode: `<number> <operator> <number>`
//!
//! There are no variables, functions or statement sequences here. In exchange the comparison
//! operators are available and produce booleans.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};

use crate::lang::eval::round10;
use crate::lang::runtime::{is_quit, EvalResult};

#[derive(Debug, PartialEq)]
pub enum SimpleValue {
    Number(f64),
    Boolean(bool),
}

impl fmt::Display for SimpleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleValue::Number(n) => write!(f, "{}", n),
            SimpleValue::Boolean(b) => {
                write!(f, "{}", if *b { "true" } else { "false" })
            }
        }
    }
}

fn parse_number(s: &str) -> Result<f64> {
    f64::from_str(s).map_err(|_| anyhow!("Invalid numbers in expression"))
}

pub fn calculate(expr: &str) -> Result<SimpleValue> {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    if parts.len() != 3 {
        bail!("Invalid expression format. Expected: 'num_left operator num_right'");
    }

    let lhs = parse_number(parts[0])?;
    let op = parts[1];
    let rhs = parse_number(parts[2])?;

    let val = match op {
        "+" => SimpleValue::Number(round10(lhs + rhs)),
        "-" => SimpleValue::Number(round10(lhs - rhs)),
        "*" => SimpleValue::Number(round10(lhs * rhs)),
        "/" => {
            if rhs == 0.0 {
                bail!("Division by zero");
            }

            SimpleValue::Number(round10(lhs / rhs))
        }
        "<" => SimpleValue::Boolean(lhs < rhs),
        ">" => SimpleValue::Boolean(lhs > rhs),
        "<=" => SimpleValue::Boolean(lhs <= rhs),
        ">=" => SimpleValue::Boolean(lhs >= rhs),
        "!=" => SimpleValue::Boolean(lhs != rhs),
        "==" => SimpleValue::Boolean(lhs == rhs),
        _ => bail!("Unsupported operator: {}", op),
    };

    Ok(val)
}

/// Line-at-a-time driver for simple mode
///
/// Holds no state between lines besides the output sink.
pub struct SimpleRuntime<'a> {
    sink: &'a mut dyn Write,
}

impl<'a> SimpleRuntime<'a> {
    pub fn new(sink: &'a mut dyn Write) -> Self {
        Self { sink }
    }

    pub fn eval(&mut self, input: &str) -> EvalResult {
        if is_quit(input.trim()) {
            return EvalResult::Quit;
        }

        let val = match calculate(input) {
            Ok(v) => v,
            Err(e) => return EvalResult::Err(e.to_string()),
        };

        match writeln!(self.sink, "Result: {}", val) {
            Ok(_) => EvalResult::Ok,
            Err(e) => EvalResult::Err(e.to_string()),
        }
    }
}

#[test]
fn test_calculate() {
    let tests = vec![
        ("1 + 2", SimpleValue::Number(3.0)),
        ("0.1 + 0.2", SimpleValue::Number(0.3)),
        ("10 - 2.5", SimpleValue::Number(7.5)),
        ("  3 * 4  ", SimpleValue::Number(12.0)),
        ("1 / 3", SimpleValue::Number(0.3333333333)),
        ("-2 * 3", SimpleValue::Number(-6.0)),
        ("1 < 2", SimpleValue::Boolean(true)),
        ("2 > 2", SimpleValue::Boolean(false)),
        ("2 >= 2", SimpleValue::Boolean(true)),
        ("3 <= 2", SimpleValue::Boolean(false)),
        ("1 != 1", SimpleValue::Boolean(false)),
        ("1.0 == 1", SimpleValue::Boolean(true)),
    ];

    for (input, expected) in tests {
        assert_eq!(calculate(input).unwrap(), expected, "input: {}", input);
    }
}

#[test]
fn test_calculate_errors() {
    let tests = vec![
        ("1 / 0", "Division by zero"),
        ("1 +", "Invalid expression format"),
        ("1+2", "Invalid expression format"),
        ("1 + 2 + 3", "Invalid expression format"),
        ("a + 2", "Invalid numbers in expression"),
        ("1 % 2", "Unsupported operator: %"),
    ];

    for (input, expected) in tests {
        match calculate(input) {
            Ok(v) => panic!("{:?} evaluated to {}", input, v),
            Err(e) => assert!(e.to_string().starts_with(expected), "{}: {}", input, e),
        }
    }
}

#[test]
fn test_display() {
    assert_eq!(SimpleValue::Number(2.5).to_string(), "2.5");
    assert_eq!(SimpleValue::Boolean(true).to_string(), "true");
}

#[test]
fn test_simple_runtime() {
    let mut output = Vec::new();
    {
        let mut runtime = SimpleRuntime::new(&mut output);
        for input in &["2 * 3", "1 < 2", "x = 1"] {
            let _ = runtime.eval(input);
        }

        match runtime.eval("q") {
            EvalResult::Quit => (),
            _ => panic!("q should quit"),
        }
    }

    assert_eq!(
        String::from_utf8(output).expect("Output not utf-8"),
        "Result: 6\nResult: true\n"
    );
}
