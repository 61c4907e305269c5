//! Lexical analysis for calculator input.
//!
//! The lexer is a small set of PEG rules over characters. At every position the rules are tried
//! in order: single character symbols, identifiers, then numbers. Any character none of them
//! accept is consumed and thrown away (this is how whitespace disappears too), so lexing never
//! fails on odd input. Garbage shows up later as a syntax error in the parser instead.

use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

use log::info;
use pom::parser::{any, end, is_a, one_of, sym, Parser};

use crate::lang::error::SyntaxError;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Equals,
    Comma,
    Semicolon,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Equals => write!(f, "'='"),
            Token::Comma => write!(f, "','"),
            Token::Semicolon => write!(f, "';'"),
        }
    }
}

fn symbol<'a>() -> Parser<'a, char, Token> {
    sym('+').map(|_| Token::Plus)
        | sym('-').map(|_| Token::Minus)
        | sym('*').map(|_| Token::Star)
        | sym('/').map(|_| Token::Slash)
        | sym('(').map(|_| Token::LParen)
        | sym(')').map(|_| Token::RParen)
        | sym('=').map(|_| Token::Equals)
        | sym(',').map(|_| Token::Comma)
        | sym(';').map(|_| Token::Semicolon)
}

fn ident<'a>() -> Parser<'a, char, Token> {
    (is_a(|c: char| c.is_ascii_alphabetic() || c == '_')
        + is_a(|c: char| c.is_ascii_alphanumeric() || c == '_').repeat(0..))
    .collect()
    .map(String::from_iter)
    .map(Token::Ident)
}

fn digit<'a>() -> Parser<'a, char, char> {
    one_of("0123456789")
}

/// `\d*\.\d+` or `\d+`
///
/// NB: the fractional form must be tried first, otherwise `1.5` lexes as `1` and `.5`
fn number<'a>() -> Parser<'a, char, Token> {
    let fraction = digit().repeat(0..) + sym('.') + digit().repeat(1..);
    let integer = digit().repeat(1..);

    (fraction.collect() | integer.collect())
        .map(String::from_iter)
        .convert(|s| f64::from_str(&s))
        .map(Token::Number)
}

fn token<'a>() -> Parser<'a, char, Token> {
    symbol() | ident() | number()
}

/// Swallow one character that starts no token
fn skipped<'a>() -> Parser<'a, char, Option<Token>> {
    any().map(|c: char| -> Option<Token> {
        if !c.is_whitespace() {
            info!("Ignoring unrecognized character: {:?}", c);
        }

        None
    })
}

fn tokens<'a>() -> Parser<'a, char, Vec<Token>> {
    (token().map(Some) | skipped())
        .repeat(0..)
        .map(|tokens| tokens.into_iter().flatten().collect())
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    let input: Vec<char> = input.chars().collect();
    let lexer = tokens() - end();

    lexer
        .parse(&input)
        .map_err(|e| SyntaxError::new(format!("unable to tokenize input: {}", e)))
}

#[cfg(test)]
fn ident_tok(s: &str) -> Token {
    Token::Ident(s.to_string())
}

#[test]
fn test_number() {
    let data = vec![
        ("5", 5.0),
        ("42", 42.0),
        ("3.25", 3.25),
        (".5", 0.5),
        ("007", 7.0),
        ("0.1", 0.1),
    ];

    for (input, expected) in data {
        assert_eq!(tokenize(input), Ok(vec![Token::Number(expected)]));
    }
}

#[test]
fn test_ident() {
    let data = vec!["x", "_", "_tmp", "abc123", "Var_2", "sqrt"];

    for input in data {
        assert_eq!(tokenize(input), Ok(vec![ident_tok(input)]));
    }
}

#[test]
fn test_symbols() {
    assert_eq!(
        tokenize("+-*/()=,;"),
        Ok(vec![
            Token::Plus,
            Token::Minus,
            Token::Star,
            Token::Slash,
            Token::LParen,
            Token::RParen,
            Token::Equals,
            Token::Comma,
            Token::Semicolon,
        ])
    );
}

#[test]
fn test_expression() {
    assert_eq!(
        tokenize("x = pow(2, y1) * .5"),
        Ok(vec![
            ident_tok("x"),
            Token::Equals,
            ident_tok("pow"),
            Token::LParen,
            Token::Number(2.0),
            Token::Comma,
            ident_tok("y1"),
            Token::RParen,
            Token::Star,
            Token::Number(0.5),
        ])
    );
}

#[test]
fn test_whitespace_ignored() {
    let data = vec![
        ("1+2", "  1 \t+\n 2  "),
        ("abs(x)", "abs ( x )"),
        ("a=b", " a = b"),
    ];

    for (input, baseline) in data {
        assert_eq!(tokenize(input), tokenize(baseline));
    }
}

#[test]
fn test_adjacent_tokens() {
    let data = vec![
        ("2x", vec![Token::Number(2.0), ident_tok("x")]),
        ("1.2.3", vec![Token::Number(1.2), Token::Number(0.3)]),
        ("x2.5", vec![ident_tok("x2"), Token::Number(0.5)]),
    ];

    for (input, expected) in data {
        assert_eq!(tokenize(input), Ok(expected));
    }
}

#[test]
fn test_unrecognized_dropped() {
    let data = vec![
        ("", vec![]),
        ("   ", vec![]),
        ("$#@!", vec![]),
        ("5.", vec![Token::Number(5.0)]),
        (".", vec![]),
        ("3 % 2", vec![Token::Number(3.0), Token::Number(2.0)]),
        ("1 ^ x", vec![Token::Number(1.0), ident_tok("x")]),
    ];

    for (input, expected) in data {
        assert_eq!(tokenize(input), Ok(expected));
    }
}
