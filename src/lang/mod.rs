pub mod ast;
pub mod error;
pub mod eval;
pub mod functions;
pub mod parse;
pub mod runtime;
pub mod simple;
pub mod token;
pub mod variables;
