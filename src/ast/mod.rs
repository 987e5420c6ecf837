pub mod expr;
pub mod printer;

use std::fmt;

use serde::Serialize;

pub use crate::scanner::token::Token;
use crate::scanner::token::Literal;
pub use expr::*;

/// Value held by a literal expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Nil => write!(f, "nil"),
        }
    }
}

impl From<Literal> for LiteralValue {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Number(n) => Self::Number(n),
            Literal::String(s) => Self::String(s),
        }
    }
}

impl From<Option<Literal>> for LiteralValue {
    fn from(literal: Option<Literal>) -> Self {
        literal.map_or(Self::Nil, Self::from)
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

// Shorthand constructors for building trees by hand.
impl Expr {
    pub fn binary(left: Expr, operator: Token, right: Expr) -> Self {
        debug_assert!(
            operator.kind.is_binary_operator(),
            "'{}' is not a binary operator",
            operator.lexeme
        );
        BinaryExpr::new(left, operator, right).into()
    }

    pub fn grouping(expression: Expr) -> Self {
        GroupingExpr::new(expression).into()
    }

    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        LiteralExpr::new(value.into()).into()
    }

    pub fn nil() -> Self {
        LiteralExpr::new(LiteralValue::Nil).into()
    }

    pub fn unary(operator: Token, right: Expr) -> Self {
        debug_assert!(
            operator.kind.is_unary_operator(),
            "'{}' is not a unary operator",
            operator.lexeme
        );
        UnaryExpr::new(operator, right).into()
    }
}
