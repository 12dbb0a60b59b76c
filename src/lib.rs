//! Rox: a tree-walking interpreter for a small Lox-style scripting language.
//!
//! Source flows through [`scanner`] → [`parser`] → [`resolver`] →
//! [`interpreter`]; [`pipeline`] strings the phases together.

pub mod ast;
pub mod ast_printer;
pub mod diagnostic;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod object;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;
