use crate::ast::*;

/// Renders an expression in fully parenthesized prefix form, e.g.
/// `(* (- 123) (group 45.67))`. Operators are named, never evaluated.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut buf = String::new();
        buf.push('(');
        buf.push_str(name);
        for expr in exprs {
            buf.push(' ');
            buf.push_str(&expr.accept(self));
        }
        buf.push(')');
        buf
    }
}

impl Visitor for AstPrinter {
    type Output = String;

    fn visit_binary_expr(&mut self, expr: &BinaryExpr) -> String {
        self.parenthesize(&expr.operator.lexeme, &[&*expr.left, &*expr.right])
    }

    fn visit_grouping_expr(&mut self, expr: &GroupingExpr) -> String {
        self.parenthesize("group", &[&*expr.expression])
    }

    fn visit_literal_expr(&mut self, expr: &LiteralExpr) -> String {
        expr.value.to_string()
    }

    fn visit_unary_expr(&mut self, expr: &UnaryExpr) -> String {
        self.parenthesize(&expr.operator.lexeme, &[&*expr.right])
    }
}

pub fn print(expr: &Expr) -> String {
    AstPrinter.print(expr)
}

pub fn to_json(expr: &Expr) -> String {
    serde_json::to_string_pretty(expr).expect("AST should be serializable")
}
