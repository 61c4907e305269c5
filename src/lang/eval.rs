use crate::lang::ast::*;
use crate::lang::error::EvalError;
use crate::lang::functions::Function;
use crate::lang::variables::Variables;

type Result<T> = std::result::Result<T, EvalError>;

/// Every f64 at or above this magnitude is an integer
const EXACT_INTEGER_LIMIT: f64 = 9007199254740992.0;

/// Round to 10 decimal places to hide binary floating point noise (eg. `0.1 + 0.2`)
///
/// Rounds the exact decimal value of `val`, half to even, so `1 / 2048` gives `0.0004882812`.
/// Non-finite values and values too large to carry a fraction pass through untouched.
pub fn round10(val: f64) -> f64 {
    if !val.is_finite() || val.abs() >= EXACT_INTEGER_LIMIT {
        return val;
    }

    format!("{:.10}", val).parse::<f64>().unwrap_or(val)
}

fn eval_binop(
    op: BinaryOperator,
    lhs: &Expression,
    rhs: &Expression,
    vars: &mut Variables,
) -> Result<f64> {
    let lhs_val = eval_expr(lhs, vars)?;
    let rhs_val = eval_expr(rhs, vars)?;

    let res = match op {
        BinaryOperator::Plus => lhs_val + rhs_val,
        BinaryOperator::Minus => lhs_val - rhs_val,
        BinaryOperator::Multiply => lhs_val * rhs_val,
        BinaryOperator::Divide => {
            if rhs_val == 0.0 {
                return Err(EvalError::DivisionByZero);
            }

            lhs_val / rhs_val
        }
    };

    Ok(round10(res))
}

fn eval_function(func: Function, args: &[Expression], vars: &mut Variables) -> Result<f64> {
    if args.len() != func.arity() {
        return Err(EvalError::UnknownFunction {
            name: func,
            args: args.len(),
        });
    }

    let mut vals = Vec::with_capacity(args.len());
    for arg in args {
        vals.push(eval_expr(arg, vars)?);
    }

    let res = match func {
        Function::Pow => {
            let (base, exp) = (vals[0], vals[1]);
            let res = base.powf(exp);
            if res.is_nan() {
                return Err(EvalError::DomainError(format!(
                    "Math domain error: pow({}, {})",
                    base, exp
                )));
            }
            if res.is_infinite() && base.is_finite() && exp.is_finite() {
                return Err(EvalError::DomainError(format!(
                    "Math range error: pow({}, {})",
                    base, exp
                )));
            }

            res
        }
        Function::Log => {
            if vals[0] <= 0.0 {
                return Err(EvalError::DomainError(
                    "Logarithm of non-positive number".to_string(),
                ));
            }

            vals[0].ln()
        }
        Function::Sin => vals[0].sin(),
        Function::Sqrt => {
            if vals[0] < 0.0 {
                return Err(EvalError::DomainError(
                    "Square root of negative number".to_string(),
                ));
            }

            vals[0].sqrt()
        }
        Function::Abs => vals[0].abs(),
    };

    Ok(round10(res))
}

/// Evaluate `expr` against `vars`
///
/// Assignments write straight into `vars`. Callers that need rollback should pass a working
/// copy (see `Variables::snapshot`).
pub fn eval_expr(expr: &Expression, vars: &mut Variables) -> Result<f64> {
    match expr {
        Expression::Number(n) => Ok(*n),
        Expression::Variable(ident) => vars
            .get(ident)
            .ok_or_else(|| EvalError::UndefinedVariable(ident.clone())),
        Expression::BinaryExpression(op, lhs, rhs) => eval_binop(*op, lhs, rhs, vars),
        Expression::FunctionCall(func, args) => eval_function(*func, args, vars),
        Expression::Assignment(ident, value) => {
            let val = eval_expr(value, vars)?;
            vars.insert(ident.clone(), val);

            Ok(val)
        }
    }
}

#[cfg(test)]
fn eval_str(input: &str, vars: &mut Variables) -> Result<f64> {
    let expr = crate::lang::parse::parse(input).expect("Failed to parse");
    eval_expr(&expr, vars)
}

#[test]
fn test_arithmetic() {
    let tests = vec![
        ("2 + 3 * 4", 14.0),
        ("(2 + 3) * 4", 20.0),
        ("10 - 2 - 3", 5.0),
        ("64 / 4 / 2", 8.0),
        ("0.1 + 0.2", 0.3),
        ("1 / 3", 0.3333333333),
        ("2 / 3", 0.6666666667),
        ("1 / 2048", 0.0004882812),
        ("3 / 2048", 0.0014648438),
        (".5 * 4", 2.0),
        ("7", 7.0),
    ];

    for (input, expected) in tests {
        let mut vars = Variables::new();
        assert_eq!(eval_str(input, &mut vars), Ok(expected), "input: {}", input);
    }
}

#[test]
fn test_functions() {
    let tests = vec![
        ("pow(2, 3)", 8.0),
        ("pow(4, 0.5)", 2.0),
        ("sqrt(0)", 0.0),
        ("sqrt(16)", 4.0),
        ("sqrt(2)", 1.4142135624),
        ("log(1)", 0.0),
        ("sin(0)", 0.0),
        ("sin(1)", 0.8414709848),
        ("abs(0 - 3.5)", 3.5),
        ("pow(sqrt(9), abs(2 - 4))", 9.0),
    ];

    for (input, expected) in tests {
        let mut vars = Variables::new();
        assert_eq!(eval_str(input, &mut vars), Ok(expected), "input: {}", input);
    }
}

#[test]
fn test_errors() {
    let tests = vec![
        ("5 / 0", EvalError::DivisionByZero),
        ("1 / (2 - 2)", EvalError::DivisionByZero),
        (
            "z + 1",
            EvalError::UndefinedVariable(Identifier("z".to_string())),
        ),
        (
            "sqrt(0 - 1)",
            EvalError::DomainError("Square root of negative number".to_string()),
        ),
        (
            "log(0)",
            EvalError::DomainError("Logarithm of non-positive number".to_string()),
        ),
        (
            "pow(2)",
            EvalError::UnknownFunction {
                name: Function::Pow,
                args: 1,
            },
        ),
        (
            "sin(1, 2)",
            EvalError::UnknownFunction {
                name: Function::Sin,
                args: 2,
            },
        ),
    ];

    for (input, expected) in tests {
        let mut vars = Variables::new();
        assert_eq!(eval_str(input, &mut vars), Err(expected), "input: {}", input);
    }
}

#[test]
fn test_pow_domain() {
    for input in &["pow(0 - 8, 0.5)", "pow(0, 0 - 1)", "pow(10, 400)"] {
        let mut vars = Variables::new();
        match eval_str(input, &mut vars) {
            Err(EvalError::DomainError(_)) => (),
            res => panic!("{}: expected domain error, got {:?}", input, res),
        }
    }
}

#[test]
fn test_variables() {
    let mut vars = Variables::new();
    assert_eq!(eval_str("x = 5", &mut vars), Ok(5.0));
    assert_eq!(eval_str("y = x * 2", &mut vars), Ok(10.0));
    assert_eq!(eval_str("x + y", &mut vars), Ok(15.0));
    assert_eq!(vars.get(&Identifier("y".to_string())), Some(10.0));

    // Nested assignments land in the environment in left-to-right order
    assert_eq!(eval_str("(a = 2) * (b = a + 1)", &mut vars), Ok(6.0));
    assert_eq!(vars.get(&Identifier("b".to_string())), Some(3.0));

    // Case sensitive
    assert_eq!(
        eval_str("X", &mut vars),
        Err(EvalError::UndefinedVariable(Identifier("X".to_string())))
    );
}

#[test]
fn test_round10() {
    assert_eq!(round10(0.1 + 0.2), 0.3);
    assert_eq!(round10(1.00000000004), 1.0);
    assert_eq!(round10(1.00000000006), 1.0000000001);
    assert_eq!(round10(0.00048828125), 0.0004882812);
    assert_eq!(round10(0.0 - 0.00048828125), -0.0004882812);
    assert_eq!(round10(0.00146484375), 0.0014648438);
    assert_eq!(round10(1e300), 1e300);
    assert_eq!(round10(123456789.123), 123456789.123);
    assert!(round10(f64::INFINITY).is_infinite());
}
