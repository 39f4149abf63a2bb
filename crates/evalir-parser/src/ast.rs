use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position of a form. Offsets are bytes, line and column are 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprKind {
    Number(i64),
    String(String),
    Symbol(String),
    List(Vec<Expression>),
}

/// One node of the program tree.
///
/// Equality ignores the span so hand-built trees compare equal to parsed ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExprKind,
    #[serde(default)]
    pub span: Span,
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Expression {}

impl Expression {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn number(value: i64) -> Self {
        Self::new(ExprKind::Number(value), Span::default())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::new(ExprKind::String(text.into()), Span::default())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Symbol(name.into()), Span::default())
    }

    pub fn list(items: Vec<Expression>) -> Self {
        Self::new(ExprKind::List(items), Span::default())
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expression]> {
        match &self.kind {
            ExprKind::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_symbol(&self, name: &str) -> bool {
        self.as_symbol() == Some(name)
    }

    /// Head symbol of a non-empty list.
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_symbol()
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ExprKind::Number(_) => "number",
            ExprKind::String(_) => "string",
            ExprKind::Symbol(_) => "symbol",
            ExprKind::List(_) => "list",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number(n) => write!(f, "{}", n),
            ExprKind::String(s) => write!(f, "\"{}\"", s),
            ExprKind::Symbol(s) => write!(f, "{}", s),
            ExprKind::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}
