//! The end-to-end path from source text to execution.  Each phase collects
//! every error it can before the next phase is refused.

use log::info;

use crate::ast::Stmt;
use crate::error::{LoxError, Warning};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;
use crate::value::Value;

/// Tokenizes `source`, reporting every lexical error rather than the first.
pub fn scan(source: &str) -> Result<Vec<Token>, Vec<LoxError>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for item in Scanner::new(source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    info!(
        "Scanned {} token(s), {} error(s)",
        tokens.len(),
        errors.len()
    );

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, Vec<LoxError>> {
    Parser::new(tokens).parse()
}

/// Runs the resolver over `statements`, filling `interpreter`'s resolution
/// table.  Static errors come back as the `Err` list.
pub fn resolve(
    statements: &[Stmt],
    interpreter: &mut Interpreter,
) -> Result<Vec<Warning>, Vec<LoxError>> {
    let mut resolver = Resolver::new(interpreter);
    let errors = resolver.resolve(statements);

    if errors.is_empty() {
        Ok(resolver.into_warnings())
    } else {
        Err(errors.into_iter().map(LoxError::from).collect())
    }
}

/// scan → parse a single expression → resolve → evaluate.  Static errors
/// stop the expression from being evaluated, just as they stop a program.
pub fn evaluate(source: &str, interpreter: &mut Interpreter) -> Result<Value, Vec<LoxError>> {
    let tokens = scan(source)?;
    let expr = Parser::new(tokens).parse_expression()?;

    let errors = Resolver::new(interpreter).resolve_expression(&expr);
    if !errors.is_empty() {
        return Err(errors.into_iter().map(LoxError::from).collect());
    }

    interpreter
        .evaluate(&expr)
        .map_err(|e| vec![LoxError::from(e)])
}

/// scan → parse → resolve → interpret.  Evaluation never starts if an
/// earlier phase failed; warnings are handed back for display.
pub fn run(source: &str, interpreter: &mut Interpreter) -> Result<Vec<Warning>, Vec<LoxError>> {
    let tokens = scan(source)?;
    let statements = parse(tokens)?;
    let warnings = resolve(&statements, interpreter)?;

    interpreter
        .interpret(&statements)
        .map_err(|e| vec![LoxError::from(e)])?;

    Ok(warnings)
}
