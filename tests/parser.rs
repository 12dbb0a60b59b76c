mod common;

use pretty_assertions::assert_eq;

use rox::ast::{Expr, Stmt};
use rox::ast_printer::AstPrinter;
use rox::error::LoxError;
use rox::parser::Parser;
use rox::pipeline;

fn printed(source: &str) -> String {
    AstPrinter::print_program(&common::parse_program(source))
}

fn parse_errors(source: &str) -> Vec<String> {
    let tokens = pipeline::scan(source).expect("scan failed");
    match pipeline::parse(tokens) {
        Ok(stmts) => panic!("expected parse errors, got {:?}", stmts),
        Err(errors) => errors.iter().map(LoxError::to_string).collect(),
    }
}

#[test]
fn precedence_and_grouping() {
    assert_eq!(printed("1 + 2 * 3;"), "(; (+ 1.0 (* 2.0 3.0)))");
    assert_eq!(printed("(1 + 2) * -3;"), "(; (* (group (+ 1.0 2.0)) (- 3.0)))");
    assert_eq!(
        printed("a or b and !c == d;"),
        "(; (or a (and b (== (! c) d))))"
    );
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(printed("a = b = 1;"), "(; (= a (= b 1.0)))");
    assert_eq!(printed("obj.x = 2;"), "(; (= (. obj x) 2.0))");
}

#[test]
fn for_loop_desugars_into_while() {
    assert_eq!(
        printed("for (var i = 0; i < 3; i = i + 1) print i;"),
        "(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
    );
    assert_eq!(printed("for (;;) break;"), "(while true (break))");
}

#[test]
fn fun_followed_by_name_is_a_declaration() {
    assert_eq!(
        printed("fun add(a, b) { return a + b; }"),
        "(fun add (a b) (return (+ a b)))"
    );
    assert_eq!(
        printed("var f = fun (x) { print x; };"),
        "(var f (fun (x) (print x)))"
    );
    assert_eq!(printed("fun () {};"), "(; (fun ()))");
}

#[test]
fn class_with_methods_and_calls() {
    assert_eq!(
        printed("class A { init(x) { this.x = x; } get() { return this.x; } } A(1).get();"),
        "(class A (method init (x) (; (= (. this x) x))) (method get () (return (. this x))))\n\
         (; (call (. (call A 1.0) get)))"
    );
}

#[test]
fn control_flow_statements() {
    assert_eq!(
        printed("if (a) print 1; else { print 2; } while (b) break;"),
        "(if a (print 1.0) (block (print 2.0)))\n(while b (break))"
    );
    assert_eq!(printed("var x; return;"), "(var x)\n(return)");
}

#[test]
fn every_reference_gets_its_own_id() {
    let stmts = common::parse_program("a; a;");

    let ids: Vec<_> = stmts
        .iter()
        .map(|stmt| match stmt {
            Stmt::Expression(Expr::Variable { id, .. }) => *id,
            other => panic!("unexpected statement {:?}", other),
        })
        .collect();

    assert_ne!(ids[0], ids[1]);
}

#[test]
fn errors_are_collected_after_synchronizing() {
    let errors = parse_errors("var = 1;\nprint ;\nvar ok = 2;\nprint ok");

    assert_eq!(
        errors,
        vec![
            "[line 1] Error at '=': Expected variable name",
            "[line 2] Error at ';': Expected expression",
            "[line 4] Error at 'end': Expected ';' after value",
        ]
    );
}

#[test]
fn invalid_assignment_target_is_reported() {
    let errors = parse_errors("1 = 2;");
    assert_eq!(errors, vec!["[line 1] Error at '=': Invalid assignment target"]);
}

#[test]
fn too_many_parameters() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));

    let errors = parse_errors(&source);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].ends_with("Cannot have more than 255 parameters"));
}

#[test]
fn single_expression_mode() {
    let tokens = pipeline::scan("1 + 2").expect("scan failed");
    let expr = Parser::new(tokens).parse_expression().expect("parse failed");
    assert_eq!(AstPrinter::print(&expr), "(+ 1.0 2.0)");

    let tokens = pipeline::scan("1 2").expect("scan failed");
    assert!(Parser::new(tokens).parse_expression().is_err());
}
