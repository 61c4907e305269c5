//! Recursive descent parser for a single calculator statement.
//!
//! Grammar, lowest precedence first:
//!
//!     statement <- IDENT '=' term | term
//!     term      <- factor (('+' | '-') factor)*
//!     factor    <- primary (('*' | '/') primary)*
//!     primary   <- NUMBER | FUNCTION '(' args ')' | '(' statement ')' | IDENT
//!     args      <- statement (',' statement)*
//!
//! Developer notes:
//!
//! * Assignment is recognized with a single token of lookahead: an identifier directly followed
//!   by `=`. Since `statement` is re-entered for parenthesized expressions and function
//!   arguments, `(x = 2) * 3` is legal while `1 + x = 2` is not.
//!
//! * Function names are reserved. A function name that isn't followed by `(` is an error rather
//!   than a variable reference.
//!
//! * The parser insists on consuming every token. `2 + 3 4` is rejected instead of quietly
//!   evaluating to 5.
//!
//! * Both parenthesis nesting and the height of the resulting tree are capped. Input past
//!   either limit is a syntax error rather than a stack overflow further down the line.

use std::convert::TryFrom;

use crate::lang::ast::*;
use crate::lang::error::SyntaxError;
use crate::lang::functions::Function;
use crate::lang::token::{tokenize, Token};

type Result<T> = std::result::Result<T, SyntaxError>;

/// Deepest allowed `(`/argument nesting. Each level costs several parser stack frames.
const MAX_NESTING: usize = 256;

/// Tallest expression tree the parser will build. Evaluating, printing and dropping a tree all
/// recurse once per level, so this bounds their stack use as well.
const MAX_HEIGHT: usize = 1024;

fn too_deep() -> SyntaxError {
    SyntaxError::new("expression nested too deeply")
}

/// An expression along with the height of its tree
struct Node {
    expr: Expression,
    height: usize,
}

impl Node {
    fn leaf(expr: Expression) -> Self {
        Self { expr, height: 1 }
    }

    fn new(expr: Expression, height: usize) -> Result<Self> {
        if height > MAX_HEIGHT {
            return Err(too_deep());
        }

        Ok(Self { expr, height })
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    nesting: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            nesting: 0,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + n)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }

        tok
    }

    /// Consume `expected` or fail with a message naming what was wanted
    fn expect(&mut self, expected: &Token, context: &str) -> Result<()> {
        match self.next() {
            Some(tok) if tok == expected => Ok(()),
            Some(tok) => Err(SyntaxError::new(format!(
                "expected {} {}, found {}",
                expected, context, tok
            ))),
            None => Err(SyntaxError::new(format!(
                "expected {} {}, found end of input",
                expected, context
            ))),
        }
    }

    fn statement(&mut self) -> Result<Node> {
        if self.nesting >= MAX_NESTING {
            return Err(too_deep());
        }

        self.nesting += 1;
        let node = self.assignment_or_term();
        self.nesting -= 1;

        node
    }

    fn assignment_or_term(&mut self) -> Result<Node> {
        if let (Some(Token::Ident(name)), Some(Token::Equals)) = (self.peek(), self.peek_nth(1)) {
            self.pos += 2;
            let value = self.term()?;
            return Node::new(
                Expression::Assignment(Identifier(name.clone()), Box::new(value.expr)),
                value.height + 1,
            );
        }

        self.term()
    }

    fn term(&mut self) -> Result<Node> {
        let mut lhs = self.factor()?;

        // NB: fold left so `10 - 2 - 3` groups as `(10 - 2) - 3`
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOperator::Plus,
                Some(Token::Minus) => BinaryOperator::Minus,
                _ => break,
            };
            self.pos += 1;

            let rhs = self.factor()?;
            lhs = Node::new(
                Expression::BinaryExpression(op, Box::new(lhs.expr), Box::new(rhs.expr)),
                lhs.height.max(rhs.height) + 1,
            )?;
        }

        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Node> {
        let mut lhs = self.primary()?;

        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOperator::Multiply,
                Some(Token::Slash) => BinaryOperator::Divide,
                _ => break,
            };
            self.pos += 1;

            let rhs = self.primary()?;
            lhs = Node::new(
                Expression::BinaryExpression(op, Box::new(lhs.expr), Box::new(rhs.expr)),
                lhs.height.max(rhs.height) + 1,
            )?;
        }

        Ok(lhs)
    }

    fn primary(&mut self) -> Result<Node> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Node::leaf(Expression::Number(*n))),
            Some(Token::LParen) => {
                let node = self.statement()?;
                self.expect(&Token::RParen, "to close '('")?;
                Ok(node)
            }
            Some(Token::Ident(name)) => match Function::try_from(name.as_str()) {
                Ok(func) => self.function_call(func),
                Err(_) => Ok(Node::leaf(Expression::Variable(Identifier(name.clone())))),
            },
            Some(tok) => Err(SyntaxError::new(format!("unexpected {}", tok))),
            None => Err(SyntaxError::new("unexpected end of input")),
        }
    }

    fn function_call(&mut self, func: Function) -> Result<Node> {
        self.expect(&Token::LParen, &format!("after function {}", func))?;

        let first = self.statement()?;
        let mut height = first.height;
        let mut args = vec![first.expr];
        loop {
            match self.next() {
                Some(Token::RParen) => break,
                Some(Token::Comma) => {
                    let arg = self.statement()?;
                    height = height.max(arg.height);
                    args.push(arg.expr);
                }
                Some(tok) => {
                    return Err(SyntaxError::new(format!(
                        "expected ',' or ')' in arguments to {}, found {}",
                        func, tok
                    )))
                }
                None => {
                    return Err(SyntaxError::new(format!(
                        "expected ')' to close arguments to {}, found end of input",
                        func
                    )))
                }
            }
        }

        Node::new(Expression::FunctionCall(func, args), height + 1)
    }
}

/// Parse a complete token sequence into one statement
pub fn parse_tokens(tokens: &[Token]) -> Result<Expression> {
    let mut parser = Parser::new(tokens);
    let node = parser.statement()?;

    if let Some(tok) = parser.peek() {
        return Err(SyntaxError::new(format!(
            "unexpected {} after end of expression",
            tok
        )));
    }

    Ok(node.expr)
}

pub fn parse(input: &str) -> Result<Expression> {
    let tokens = tokenize(input)?;
    parse_tokens(&tokens)
}

#[cfg(test)]
fn assert_parses_to(data: Vec<(&str, &str)>) {
    for (input, expected) in data {
        match parse(input) {
            Ok(expr) => assert_eq!(expr.to_string(), expected, "input: {}", input),
            Err(e) => panic!("failed to parse {:?}: {}", input, e),
        }
    }
}

#[test]
fn test_primary() {
    assert_eq!(parse("5"), Ok(Expression::Number(5.0)));
    assert_eq!(
        parse("abc"),
        Ok(Expression::Variable(Identifier("abc".to_string())))
    );
    assert_eq!(
        parse("sqrt(4)"),
        Ok(Expression::FunctionCall(
            Function::Sqrt,
            vec![Expression::Number(4.0)]
        ))
    );
    assert_eq!(parse("((7))"), Ok(Expression::Number(7.0)));
}

#[test]
fn test_precedence() {
    assert_parses_to(vec![
        ("2 + 3 * 4", "(2 + (3 * 4))"),
        ("(2 + 3) * 4", "((2 + 3) * 4)"),
        ("2 * 3 + 4", "((2 * 3) + 4)"),
        ("8 / 2 - 1", "((8 / 2) - 1)"),
        ("a + b / c - d", "((a + (b / c)) - d)"),
    ]);
}

#[test]
fn test_left_associativity() {
    assert_parses_to(vec![
        ("10 - 2 - 3", "((10 - 2) - 3)"),
        ("1 + 2 + 3 + 4", "(((1 + 2) + 3) + 4)"),
        ("64 / 4 / 2", "((64 / 4) / 2)"),
        ("2 * 3 / 4 * 5", "(((2 * 3) / 4) * 5)"),
    ]);
}

#[test]
fn test_function_call() {
    assert_parses_to(vec![
        ("pow(2, 3)", "pow(2, 3)"),
        ("pow(2)", "pow(2)"),
        ("abs(1, 2, 3)", "abs(1, 2, 3)"),
        ("sin(x + 1) * 2", "(sin((x + 1)) * 2)"),
        ("log(pow(x, 2))", "log(pow(x, 2))"),
        ("pow(y = 2, 3)", "pow(y = 2, 3)"),
    ]);
}

#[test]
fn test_assignment() {
    assert_parses_to(vec![
        ("x = 5", "x = 5"),
        ("y = x * 2", "y = (x * 2)"),
        ("(x = 2) * 3", "(x = 2 * 3)"),
        ("_a1 = .5", "_a1 = 0.5"),
    ]);

    assert_eq!(
        parse("x = 1"),
        Ok(Expression::Assignment(
            Identifier("x".to_string()),
            Box::new(Expression::Number(1.0))
        ))
    );
}

#[test]
fn test_syntax_errors() {
    let data = vec![
        "",
        "(",
        "(1 + 2",
        "1 +",
        "* 2",
        ")",
        "pow 2",
        "pow(2; 3)",
        "pow(2, 3",
        "sqrt",
        "x = ",
        "1 + x = 2",
        "x = y = 3",
        "2 + 3 4",
        "foo(1)",
        "5 = 3",
        "1, 2",
        "$",
    ];

    for input in data {
        assert!(parse(input).is_err(), "{:?} should not parse", input);
    }
}

#[test]
fn test_error_messages() {
    let data = vec![
        ("(1 + 2", "expected ')' to close '(', found end of input"),
        ("pow 2", "expected '(' after function pow, found number 2"),
        (
            "pow(2; 3)",
            "expected ',' or ')' in arguments to pow, found ';'",
        ),
        ("1 +", "unexpected end of input"),
        ("* 2", "unexpected '*'"),
        ("2 + 3 4", "unexpected number 4 after end of expression"),
        (
            "foo(1)",
            "unexpected '(' after end of expression",
        ),
    ];

    for (input, expected) in data {
        match parse(input) {
            Err(e) => assert_eq!(e.to_string(), format!("Syntax error: {}", expected)),
            Ok(expr) => panic!("{:?} parsed as {}", input, expr),
        }
    }
}

#[test]
fn test_nesting_limit() {
    let shallow = format!("{}1{}", "(".repeat(MAX_NESTING - 1), ")".repeat(MAX_NESTING - 1));
    assert_eq!(parse(&shallow), Ok(Expression::Number(1.0)));

    let data = vec![
        format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING)),
        format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000)),
        format!("{}1{}", "sqrt(".repeat(100_000), ")".repeat(100_000)),
        format!("{}1", "(x = ".repeat(100_000)),
    ];

    for input in data {
        match parse(&input) {
            Err(e) => assert_eq!(e.to_string(), "Syntax error: expression nested too deeply"),
            Ok(_) => panic!("deeply nested input of {} bytes parsed", input.len()),
        }
    }
}

#[test]
fn test_height_limit() {
    let tall = format!("1{}", " + 1".repeat(MAX_HEIGHT - 1));
    assert!(parse(&tall).is_ok());

    let data = vec![
        format!("1{}", " + 1".repeat(MAX_HEIGHT)),
        format!("1{}", " * 2".repeat(200_000)),
        format!("1{}", " - 2 / 3".repeat(100_000)),
    ];

    for input in data {
        match parse(&input) {
            Err(e) => assert_eq!(e.to_string(), "Syntax error: expression nested too deeply"),
            Ok(_) => panic!("tall expression of {} bytes parsed", input.len()),
        }
    }
}
