#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::ast::Stmt;
use rox::error::{LoxError, RuntimeErrorKind, StaticErrorKind, Warning};
use rox::interpreter::Interpreter;
use rox::pipeline;

/// In-memory `print` sink that stays readable after the interpreter takes
/// ownership of its clone.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn interpreter() -> (Interpreter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let interpreter = Interpreter::with_output(Box::new(buffer.clone()));
    (interpreter, buffer)
}

/// Runs `source` through the whole pipeline, returning printed output and
/// the pipeline result.
pub fn run(source: &str) -> (String, Result<Vec<Warning>, Vec<LoxError>>) {
    let (mut interpreter, buffer) = interpreter();
    let result = pipeline::run(source, &mut interpreter);
    (buffer.contents(), result)
}

/// Runs `source` and returns its output, panicking on any error.
pub fn run_ok(source: &str) -> String {
    let (output, result) = run(source);
    if let Err(errors) = result {
        panic!("program failed: {:?}\noutput so far:\n{}", errors, output);
    }
    output
}

/// Runs `source` expecting a runtime error; returns output and error kind.
pub fn run_runtime_error(source: &str) -> (String, RuntimeErrorKind) {
    let (output, result) = run(source);
    match result {
        Err(errors) => match errors.as_slice() {
            [LoxError::Runtime(e)] => (output, e.kind),
            other => panic!("expected one runtime error, got {:?}", other),
        },
        Ok(_) => panic!("expected a runtime error, program succeeded with:\n{}", output),
    }
}

/// Runs `source` expecting static errors; returns their kinds in order.
pub fn static_error_kinds(source: &str) -> Vec<StaticErrorKind> {
    let (output, result) = run(source);
    assert_eq!(output, "", "static errors must prevent evaluation");

    match result {
        Err(errors) => errors
            .iter()
            .map(|e| match e {
                LoxError::Static(e) => e.kind,
                other => panic!("expected static error, got {:?}", other),
            })
            .collect(),
        Ok(_) => panic!("expected static errors, program succeeded"),
    }
}

pub fn parse_program(source: &str) -> Vec<Stmt> {
    let tokens = pipeline::scan(source).expect("scan failed");
    pipeline::parse(tokens).expect("parse failed")
}
