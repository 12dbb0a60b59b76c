//! Centralised error hierarchy for the **Rox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) must convert their
//! internal failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! Three families live side by side:
//!
//! * [`LoxError`] – the umbrella type returned by the front end and pipeline.
//! * [`StaticError`] / [`Warning`] – produced by the resolver pass.  Errors block
//!   evaluation, warnings are advisory.
//! * [`RuntimeError`] – the single fatal error that aborts evaluation.
//!
//! The module **does not** print diagnostics itself

use std::io;
use thiserror::Error;

use log::info;

use crate::token::Token;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source position information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,

        /// 1‑based column where the error occurred.
        column: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error at '{lexeme}': {message}")]
    Parse {
        message: String,
        lexeme: String,
        line: usize,
        column: usize,
    },

    /// Static‑analysis failure reported by the resolver.
    #[error(transparent)]
    Static(#[from] StaticError),

    /// Runtime evaluation error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, column: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex {
            message,
            line,
            column,
        }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        let lexeme = if token.lexeme.is_empty() {
            "end".to_string()
        } else {
            token.lexeme.clone()
        };

        LoxError::Parse {
            message,
            lexeme,
            line: token.line,
            column: token.column,
        }
    }

    /// Source position `(line, column)` of the error, when it has one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            LoxError::Lex { line, column, .. } | LoxError::Parse { line, column, .. } => {
                Some((*line, *column))
            }
            LoxError::Static(e) => Some((e.token.line, e.token.column)),
            LoxError::Runtime(e) => Some((e.token.line, e.token.column)),
            LoxError::Io(_) | LoxError::Utf8(_) => None,
        }
    }

    /// Process exit status for this failure family (sysexits convention).
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Lex { .. } | LoxError::Parse { .. } | LoxError::Static(_) => 65,
            LoxError::Runtime(_) => 70,
            LoxError::Io(_) | LoxError::Utf8(_) => 74,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

// ─────────────────────────────────────────────────────────────────────────────
// Resolver diagnostics
// ─────────────────────────────────────────────────────────────────────────────

/// What a [`StaticError`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticErrorKind {
    /// A name declared twice in the same local scope.
    DuplicateDeclaration,
    /// A local read inside its own initializer (`var a = a;`).
    SelfReferentialInitializer,
    /// `return` at the top level.
    ReturnOutsideFunction,
    /// `return <value>;` inside `init`.
    ValueFromInitializer,
    /// `break` with no enclosing loop in the same function.
    BreakOutsideLoop,
    /// `this` with no enclosing class.
    ThisOutsideClass,
}

/// A resolution error.  Any of these prevents evaluation.
#[derive(Debug, Clone, Error)]
#[error("[line {}] Error at '{}': {}", .token.line, .token.lexeme, .message)]
pub struct StaticError {
    pub kind: StaticErrorKind,
    pub token: Token,
    pub message: String,
}

impl StaticError {
    pub fn new<S: Into<String>>(kind: StaticErrorKind, token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Static error: kind={:?}, line={}, msg={}",
            kind, token.line, message
        );

        StaticError {
            kind,
            token: token.clone(),
            message,
        }
    }
}

/// What a [`Warning`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    UnusedVariable,
    UnreachableCode,
}

/// Advisory resolver finding; never blocks evaluation.
#[derive(Debug, Clone, Error)]
#[error("[line {}] Warning: {}", .token.line, .message)]
pub struct Warning {
    pub kind: WarningKind,
    pub token: Token,
    pub message: String,
}

impl Warning {
    pub fn new<S: Into<String>>(kind: WarningKind, token: &Token, msg: S) -> Self {
        Warning {
            kind,
            token: token.clone(),
            message: msg.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime errors
// ─────────────────────────────────────────────────────────────────────────────

/// What a [`RuntimeError`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UndefinedVariable,
    UndefinedProperty,
    TypeMismatch,
    DivisionByZero,
    NotCallable,
    ArityMismatch,
    /// The output sink rejected a `print`.
    Io,
}

/// Fatal evaluation error: the first one aborts the program.
#[derive(Debug, Clone, Error)]
#[error("[line {}] Runtime error: {}", .token.line, .message)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new<S: Into<String>>(kind: RuntimeErrorKind, token: &Token, msg: S) -> Self {
        RuntimeError {
            kind,
            token: token.clone(),
            message: msg.into(),
        }
    }

    pub fn type_mismatch<S: Into<String>>(token: &Token, msg: S) -> Self {
        Self::new(RuntimeErrorKind::TypeMismatch, token, msg)
    }

    pub fn undefined_variable(name: &Token) -> Self {
        Self::new(
            RuntimeErrorKind::UndefinedVariable,
            name,
            format!("Undefined variable '{}'.", name.lexeme),
        )
    }
}
