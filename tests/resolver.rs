mod common;

use pretty_assertions::assert_eq;

use rox::ast::{Expr, ExprId, Stmt};
use rox::error::{StaticErrorKind, WarningKind};
use rox::interpreter::Interpreter;
use rox::resolver::Resolver;

use StaticErrorKind::*;

fn resolve(source: &str) -> (Vec<Stmt>, Interpreter) {
    let stmts = common::parse_program(source);
    let (mut interpreter, _) = common::interpreter();

    let errors = Resolver::new(&mut interpreter).resolve(&stmts);
    assert!(errors.is_empty(), "unexpected static errors: {:?}", errors);

    (stmts, interpreter)
}

fn variable_id(expr: &Expr) -> ExprId {
    match expr {
        Expr::Variable { id, .. } | Expr::Assign { id, .. } | Expr::This { id, .. } => *id,
        other => panic!("not a reference: {:?}", other),
    }
}

#[test]
fn self_referential_initializer_is_rejected() {
    assert_eq!(
        common::static_error_kinds("{ var a = a; }"),
        vec![SelfReferentialInitializer]
    );
}

#[test]
fn global_initializer_may_mention_its_own_name() {
    let (_, result) = common::run("var a = 1; var a = a + 1; print a;");
    assert!(result.is_ok());
}

#[test]
fn duplicate_local_declaration() {
    assert_eq!(
        common::static_error_kinds("{ var a = 1; var a = 2; print a; }"),
        vec![DuplicateDeclaration]
    );
    assert_eq!(
        common::static_error_kinds("fun f(a, a) { return a; }"),
        vec![DuplicateDeclaration]
    );
}

#[test]
fn return_rules() {
    assert_eq!(common::static_error_kinds("return 1;"), vec![ReturnOutsideFunction]);
    assert_eq!(
        common::static_error_kinds("class A { init() { return 1; } }"),
        vec![ValueFromInitializer]
    );

    let (_, result) = common::run("class A { init() { return; } } A();");
    assert!(result.is_ok());
}

#[test]
fn break_rules() {
    assert_eq!(common::static_error_kinds("break;"), vec![BreakOutsideLoop]);
    assert_eq!(
        common::static_error_kinds("while (true) { fun f() { break; } f(); }"),
        vec![BreakOutsideLoop]
    );
    assert_eq!(
        common::static_error_kinds("while (true) { var g = fun () { break; }; g(); }"),
        vec![BreakOutsideLoop]
    );
}

#[test]
fn this_rules() {
    assert_eq!(common::static_error_kinds("print this;"), vec![ThisOutsideClass]);
    assert_eq!(
        common::static_error_kinds("fun f() { return this; }"),
        vec![ThisOutsideClass]
    );
}

#[test]
fn all_errors_in_one_pass() {
    assert_eq!(
        common::static_error_kinds("break;\nreturn;\n{ var x = x; }\nprint this;"),
        vec![
            BreakOutsideLoop,
            ReturnOutsideFunction,
            SelfReferentialInitializer,
            ThisOutsideClass
        ]
    );
}

#[test]
fn depths_count_scopes_walked() {
    let (stmts, interpreter) = resolve("var g = 1; { var a = 1; { print a; print g; } }");

    let Stmt::Block(outer) = &stmts[1] else { panic!("expected block") };
    let Stmt::Block(inner) = &outer[1] else { panic!("expected block") };
    let Stmt::Print { value: local, .. } = &inner[0] else { panic!("expected print") };
    let Stmt::Print { value: global, .. } = &inner[1] else { panic!("expected print") };

    assert_eq!(interpreter.resolved_depth(variable_id(local)), Some(1));
    assert_eq!(interpreter.resolved_depth(variable_id(global)), None);
}

#[test]
fn assignment_is_keyed_by_its_own_node() {
    let (stmts, interpreter) = resolve("{ var a = 1; a = 2; print a; }");

    let Stmt::Block(body) = &stmts[0] else { panic!("expected block") };
    let Stmt::Expression(assign) = &body[1] else { panic!("expected expression") };

    assert_eq!(interpreter.resolved_depth(variable_id(assign)), Some(0));
    assert_eq!(interpreter.locals().len(), 2);
}

#[test]
fn this_resolves_to_the_class_scope() {
    let (stmts, interpreter) = resolve("class A { m() { return this; } }");

    let Stmt::Class { methods, .. } = &stmts[0] else { panic!("expected class") };
    let Stmt::Return { value: Some(this), .. } = &methods[0].body[0] else {
        panic!("expected return")
    };

    assert_eq!(interpreter.resolved_depth(variable_id(this)), Some(1));
}

#[test]
fn closures_see_the_declaring_scope() {
    let (stmts, interpreter) = resolve("fun outer(n) { fun inner() { return n; } return inner; }");

    let Stmt::Function(outer) = &stmts[0] else { panic!("expected function") };
    let Stmt::Function(inner) = &outer.body[0] else { panic!("expected function") };
    let Stmt::Return { value: Some(n), .. } = &inner.body[0] else { panic!("expected return") };

    assert_eq!(interpreter.resolved_depth(variable_id(n)), Some(1));
}

#[test]
fn resolving_twice_yields_the_same_table() {
    let stmts = common::parse_program(
        "var a = 1; { var b = a; fun f(x) { return x + b; } print f(b); }",
    );
    let (mut interpreter, _) = common::interpreter();

    assert!(Resolver::new(&mut interpreter).resolve(&stmts).is_empty());
    let first = interpreter.locals().clone();

    assert!(Resolver::new(&mut interpreter).resolve(&stmts).is_empty());
    assert_eq!(interpreter.locals(), &first);
}

#[test]
fn unused_locals_are_warned_in_source_order() {
    let stmts = common::parse_program("{ var b = 1; var a = 2; var used = 3; print used; }");
    let (mut interpreter, _) = common::interpreter();

    let mut resolver = Resolver::new(&mut interpreter);
    assert!(resolver.resolve(&stmts).is_empty());

    let warnings: Vec<_> = resolver
        .warnings()
        .iter()
        .map(|w| (w.kind, w.token.lexeme.as_str()))
        .collect();

    assert_eq!(
        warnings,
        vec![
            (WarningKind::UnusedVariable, "b"),
            (WarningKind::UnusedVariable, "a"),
        ]
    );
}

#[test]
fn code_after_return_is_flagged_but_still_runs_the_program() {
    let (output, result) = common::run("fun f() { return 1; print 2; } print f();");

    let warnings = result.expect("warnings must not block evaluation");
    assert_eq!(output, "1\n");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::UnreachableCode);
}

#[test]
fn used_parameters_produce_no_warnings() {
    let (_, result) = common::run("fun id(x) { return x; } print id(1);");
    assert_eq!(result.expect("program should run").len(), 0);
}
