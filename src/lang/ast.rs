use std::fmt;

use crate::lang::functions::Function;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BinaryOperator {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

impl BinaryOperator {
    pub fn op_str(&self) -> &str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        }
    }
}

#[derive(Debug, PartialEq, Hash, PartialOrd, Ord, Eq, Clone)]
pub struct Identifier(pub String);

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every node owns its children; there is no sharing between subtrees.
#[derive(Debug, PartialEq)]
pub enum Expression {
    Number(f64),
    Variable(Identifier),
    /// (operator, lhs, rhs)
    BinaryExpression(BinaryOperator, Box<Expression>, Box<Expression>),
    /// (function, arguments)
    FunctionCall(Function, Vec<Expression>),
    /// (variable, value)
    Assignment(Identifier, Box<Expression>),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number(n) => write!(f, "{}", n),
            Expression::Variable(ident) => write!(f, "{}", ident),
            Expression::BinaryExpression(op, lhs, rhs) => {
                write!(f, "({} {} {})", lhs, op.op_str(), rhs)
            }
            Expression::FunctionCall(func, args) => {
                write!(f, "{}(", func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::Assignment(ident, value) => write!(f, "{} = {}", ident, value),
        }
    }
}

#[test]
fn test_display() {
    let expr = Expression::Assignment(
        Identifier("y".to_string()),
        Box::new(Expression::BinaryExpression(
            BinaryOperator::Multiply,
            Box::new(Expression::Variable(Identifier("x".to_string()))),
            Box::new(Expression::FunctionCall(
                Function::Pow,
                vec![Expression::Number(2.0), Expression::Number(0.5)],
            )),
        )),
    );

    assert_eq!(expr.to_string(), "y = (x * pow(2, 0.5))");
}
