use crate::ast::{Expr, LiteralValue, Stmt};
use crate::token::Token;

/// Converts an AST to the Crafting‑Interpreters parenthesised prefix form.
/// Statements use the same s‑expression style so whole programs can be dumped.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => s.clone(),

                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        // 3 → 3.0
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }
            },

            // ── grouping ────────────────────────────────────────────────
            Expr::Grouping(inner) => format!("(group {})", Self::print(inner)),

            // ── operators ───────────────────────────────────────────────
            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            // ── names ───────────────────────────────────────────────────
            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print(value))
            }

            Expr::This { .. } => "this".into(),

            // ── calls & objects ─────────────────────────────────────────
            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::Lambda(decl) => Self::function("fun", None, &decl.params, &decl.body),

            Expr::Get { object, name } => format!("(. {} {})", Self::print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(= (. {} {}) {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),
        }
    }

    pub fn print_stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", Self::print(expr)),

            Stmt::Print { value, .. } => format!("(print {})", Self::print(value)),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("(var {} {})", name.lexeme, Self::print(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => Self::list("block", statements),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch),
                    Self::print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                Self::print(condition),
                Self::print_stmt(body)
            ),

            Stmt::Break { .. } => "(break)".into(),

            Stmt::Function(decl) => {
                Self::function("fun", Some(&decl.name), &decl.params, &decl.body)
            }

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("(return {})", Self::print(value)),
                None => "(return)".into(),
            },

            Stmt::Class { name, methods } => {
                let mut s = format!("(class {}", name.lexeme);
                for method in methods {
                    s.push(' ');
                    s.push_str(&Self::function(
                        "method",
                        Some(&method.name),
                        &method.params,
                        &method.body,
                    ));
                }
                s.push(')');
                s
            }
        }
    }

    /// One statement per line, for dumping a whole program.
    pub fn print_program(statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(Self::print_stmt)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn function(tag: &str, name: Option<&Token>, params: &[Token], body: &[Stmt]) -> String {
        let mut s = format!("({}", tag);
        if let Some(name) = name {
            s.push(' ');
            s.push_str(&name.lexeme);
        }

        let params: Vec<&str> = params.iter().map(|p| p.lexeme.as_str()).collect();
        s.push_str(&format!(" ({})", params.join(" ")));

        for stmt in body {
            s.push(' ');
            s.push_str(&Self::print_stmt(stmt));
        }
        s.push(')');
        s
    }

    fn list(tag: &str, statements: &[Stmt]) -> String {
        let mut s = format!("({}", tag);
        for stmt in statements {
            s.push(' ');
            s.push_str(&Self::print_stmt(stmt));
        }
        s.push(')');
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn op(tt: TokenType, lexeme: &str) -> Token {
        Token::new(tt, lexeme, 1, 1)
    }

    #[test]
    fn prints_nested_binary_in_prefix_form() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Unary {
                operator: op(TokenType::MINUS, "-"),
                right: Box::new(Expr::Literal(LiteralValue::Number(123.0))),
            }),
            operator: op(TokenType::STAR, "*"),
            right: Box::new(Expr::Grouping(Box::new(Expr::Literal(
                LiteralValue::Number(45.67),
            )))),
        };

        assert_eq!(AstPrinter::print(&expr), "(* (- 123.0) (group 45.67))");
    }

    #[test]
    fn prints_statements() {
        let stmt = Stmt::Var {
            name: op(TokenType::IDENTIFIER, "x"),
            initializer: Some(Expr::Literal(LiteralValue::Nil)),
        };

        assert_eq!(AstPrinter::print_stmt(&stmt), "(var x nil)");
        assert_eq!(
            AstPrinter::print_stmt(&Stmt::Block(vec![stmt])),
            "(block (var x nil))"
        );
    }
}
