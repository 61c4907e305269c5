use std::io::Write;

use log::{debug, info};

use crate::lang::error::Error;
use crate::lang::eval::eval_expr;
use crate::lang::functions::FUNCTIONS;
use crate::lang::parse::parse;
use crate::lang::variables::Variables;

/// Separates independent statements on one line of input
pub const STATEMENT_DELIMITER: char = ';';

pub enum EvalResult {
    Ok,
    Quit,
    Err(String),
}

/// Split raw input into trimmed, non-empty statements
pub fn split_statements(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(STATEMENT_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// `q` or `quit`, in any case
pub fn is_quit(cmd: &str) -> bool {
    cmd.eq_ignore_ascii_case("q") || cmd.eq_ignore_ascii_case("quit")
}

/// A calculator session
///
/// Variables persist across calls to `eval` until any statement fails. A failure clears every
/// variable in the session, including ones assigned earlier on the same line, so a partially
/// applied line is never observable.
pub struct Runtime<'a> {
    sink: &'a mut dyn Write,
    variables: Variables,
}

impl<'a> Runtime<'a> {
    /// Create a new `Runtime` instance
    ///
    /// `sink` is where results and variable listings are written
    pub fn new(sink: &'a mut dyn Write) -> Self {
        Self {
            sink,
            variables: Variables::new(),
        }
    }

    #[cfg(test)]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Run each statement against a working copy, committing only when it succeeds
    ///
    /// Returns the value of the last statement, if there was one
    fn eval_statements(&mut self, input: &str) -> Result<Option<f64>, Error> {
        let mut last = None;

        for stmt in split_statements(input) {
            let mut working = self.variables.snapshot();

            let expr = parse(stmt)?;
            debug!("parsed: {}", expr);

            let val = eval_expr(&expr, &mut working)?;
            self.variables.commit(working);
            last = Some(val);
        }

        Ok(last)
    }

    fn report(&mut self, last: Option<f64>) -> std::io::Result<()> {
        if !self.variables.is_empty() {
            for (ident, val) in self.variables.iter() {
                writeln!(self.sink, "{} = {}", ident, val)?;
            }
        } else if let Some(val) = last {
            writeln!(self.sink, "Result: {}", val)?;
        }

        Ok(())
    }

    fn print_help(&mut self) -> std::io::Result<()> {
        let funcs = FUNCTIONS
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<String>>()
            .join(", ");

        let mut s = String::new();
        s += "Operators:\t+ - * / ( )\n";
        s += &format!("Functions:\t{}\n", funcs);
        s += "Assignment:\tname = expression\n";
        s += &format!(
            "Separate multiple statements with '{}'\n",
            STATEMENT_DELIMITER
        );
        s += "help\t\tPrint help\n";
        s += "q, quit\t\tExit calculator\n";

        write!(self.sink, "{}", s)
    }

    pub fn eval(&mut self, input: &str) -> EvalResult {
        let cmd = input.trim();
        if is_quit(cmd) {
            return EvalResult::Quit;
        }
        if cmd == "help" {
            return match self.print_help() {
                Ok(_) => EvalResult::Ok,
                Err(e) => EvalResult::Err(e.to_string()),
            };
        }

        let last = match self.eval_statements(input) {
            Ok(v) => v,
            Err(e) => {
                info!(
                    "Discarding {} variable(s) after error: {}",
                    self.variables.len(),
                    e
                );
                self.variables.clear();
                return EvalResult::Err(e.to_string());
            }
        };

        match self.report(last) {
            Ok(_) => EvalResult::Ok,
            Err(e) => EvalResult::Err(e.to_string()),
        }
    }
}

#[cfg(test)]
fn expect_ok(runtime: &mut Runtime, input: &str) {
    match runtime.eval(input) {
        EvalResult::Ok => (),
        EvalResult::Quit => panic!("{:?} quit the session", input),
        EvalResult::Err(e) => panic!("{:?} failed: {}", input, e),
    }
}

#[cfg(test)]
fn expect_err(runtime: &mut Runtime, input: &str) -> String {
    match runtime.eval(input) {
        EvalResult::Err(e) => e,
        _ => panic!("{:?} should have failed", input),
    }
}

#[test]
fn test_split_statements() {
    let data = vec![
        ("x = 5; y = x * 2", vec!["x = 5", "y = x * 2"]),
        ("  1 ;; ; 2;", vec!["1", "2"]),
        ("", vec![]),
        (" ; ", vec![]),
    ];

    for (input, expected) in data {
        assert_eq!(split_statements(input).collect::<Vec<&str>>(), expected);
    }
}

#[test]
fn test_result() {
    let tests = vec![
        ("2 + 3 * 4", "Result: 14\n"),
        ("(2 + 3) * 4", "Result: 20\n"),
        ("10 - 2 - 3", "Result: 5\n"),
        ("0.1 + 0.2", "Result: 0.3\n"),
        ("pow(2, 3)", "Result: 8\n"),
        ("sqrt(0)", "Result: 0\n"),
        ("5 / 2", "Result: 2.5\n"),
        ("1; 2; 3", "Result: 3\n"),
        ("", ""),
        (" ;; ", ""),
    ];

    for (input, expected) in tests {
        let mut output = Vec::new();
        let mut runtime = Runtime::new(&mut output);
        expect_ok(&mut runtime, input);
        assert_eq!(
            String::from_utf8(output).expect("Output not utf-8"),
            expected
        );
    }
}

#[test]
fn test_variables_listed() {
    let tests = vec![
        ("x = 5; y = x * 2", "x = 5\ny = 10\n"),
        ("zz = 1; a = 2; m = a + zz", "a = 2\nm = 3\nzz = 1\n"),
        ("x = 1; x = x + 1; x * 100", "x = 2\n"),
        ("B = 1; a = 2", "B = 1\na = 2\n"),
    ];

    for (input, expected) in tests {
        let mut output = Vec::new();
        let mut runtime = Runtime::new(&mut output);
        expect_ok(&mut runtime, input);
        assert_eq!(
            String::from_utf8(output).expect("Output not utf-8"),
            expected
        );
    }
}

#[test]
fn test_session_persists() {
    let mut output = Vec::new();
    {
        let mut runtime = Runtime::new(&mut output);
        expect_ok(&mut runtime, "x = 5");
        expect_ok(&mut runtime, "y = x * 2");
        expect_ok(&mut runtime, "x + y");
    }

    assert_eq!(
        String::from_utf8(output).expect("Output not utf-8"),
        "x = 5\nx = 5\ny = 10\nx = 5\ny = 10\n"
    );
}

#[test]
fn test_failure_clears_session() {
    let mut output = Vec::new();
    let mut runtime = Runtime::new(&mut output);

    expect_ok(&mut runtime, "a = 7");
    let err = expect_err(&mut runtime, "x = 1; y = 1/0; z = 2");
    assert_eq!(err, "Division by zero");
    assert!(runtime.variables().is_empty());

    expect_ok(&mut runtime, "b = 3");
    let err = expect_err(&mut runtime, "c = (1");
    assert!(err.starts_with("Syntax error:"), "{}", err);
    assert!(runtime.variables().is_empty());

    let err = expect_err(&mut runtime, "z + 1");
    assert_eq!(err, "Undefined variable: z");

    let err = expect_err(&mut runtime, "sqrt(0 - 1)");
    assert_eq!(err, "Square root of negative number");

    let err = expect_err(&mut runtime, "log(0)");
    assert_eq!(err, "Logarithm of non-positive number");

    let err = expect_err(&mut runtime, "pow(2)");
    assert!(
        err.starts_with("Unknown function or wrong number of arguments: pow"),
        "{}",
        err
    );
}

#[test]
fn test_idempotent() {
    let inputs = vec!["x = 5; y = x * 2", "2 + 3 * 4", "a = sin(1); b = abs(a - 2)"];

    for input in inputs {
        let mut first = Vec::new();
        let mut second = Vec::new();
        expect_ok(&mut Runtime::new(&mut first), input);
        expect_ok(&mut Runtime::new(&mut second), input);
        assert_eq!(first, second);
    }
}

#[test]
fn test_quit_and_help() {
    let mut output = Vec::new();
    let mut runtime = Runtime::new(&mut output);

    for input in &["q", "Q", " quit ", "QUIT"] {
        match runtime.eval(input) {
            EvalResult::Quit => (),
            _ => panic!("{:?} should quit", input),
        }
    }

    expect_ok(&mut runtime, "help");
    let output = String::from_utf8(output).expect("Output not utf-8");
    assert!(output.contains("pow, log, sin, sqrt, abs"));
}

#[test]
fn test_deep_nesting_clears_session() {
    let mut output = Vec::new();
    let mut runtime = Runtime::new(&mut output);

    let inputs = vec![
        format!("x = {}1{}", "(".repeat(200_000), ")".repeat(200_000)),
        format!("x = 1{}", " + 1".repeat(200_000)),
    ];

    for input in inputs {
        expect_ok(&mut runtime, "a = 7");
        let err = expect_err(&mut runtime, &input);
        assert_eq!(err, "Syntax error: expression nested too deeply");
        assert!(runtime.variables().is_empty());
    }

    expect_ok(&mut runtime, "1 / 2048");
    expect_ok(&mut runtime, "3 / 2048");
    drop(runtime);

    assert_eq!(
        String::from_utf8(output).expect("Output not utf-8"),
        "a = 7\na = 7\nResult: 0.0004882812\nResult: 0.0014648438\n"
    );
}
