//! Directive statement nodes
//!
//! The statement tree produced by the directive parser. The HTML side never
//! looks inside an expression; it only carries it into the element tree.

use serde::Serialize;
use std::fmt;

/// An ordered sequence of statements
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    /// Create a program from statements
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Check if the program has no statements
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// A single directive-grammar statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    /// Literal text, possibly containing HTML markup
    Content(ContentStatement),
    /// Inline `{{expression}}`
    Mustache(MustacheStatement),
    /// `{{#name ...}}...{{/name}}`
    Block(BlockStatement),
}

/// Literal source text between directives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentStatement {
    pub value: String,
}

impl ContentStatement {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

/// Inline expression statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MustacheStatement {
    pub expression: Expression,
    /// `false` for `{{{expr}}}` and `{{& expr}}`
    pub escaped: bool,
}

impl MustacheStatement {
    /// Create an escaped mustache
    pub fn new(expression: Expression) -> Self {
        Self { expression, escaped: true }
    }

    /// Create an unescaped (triple-stash) mustache
    pub fn unescaped(expression: Expression) -> Self {
        Self { expression, escaped: false }
    }
}

impl fmt::Display for MustacheStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.escaped {
            write!(f, "{{{{{}}}}}", self.expression)
        } else {
            write!(f, "{{{{{{{}}}}}}}", self.expression)
        }
    }
}

/// Block statement with a nested program
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockStatement {
    pub expression: Expression,
    pub program: Program,
    /// Statements after `{{else}}`
    pub inverse: Option<Program>,
}

impl BlockStatement {
    pub fn new(expression: Expression, program: Program) -> Self {
        Self {
            expression,
            program,
            inverse: None,
        }
    }

    /// The helper name (`if`, `each`, ...)
    pub fn name(&self) -> &str {
        &self.expression.path
    }
}

/// A helper or path lookup with its arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub path: String,
    pub params: Vec<Param>,
    pub hash: Vec<(String, Param)>,
}

impl Expression {
    /// Create a bare path expression
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            hash: Vec::new(),
        }
    }

    /// Add a positional parameter
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Add a `key=value` pair
    pub fn with_hash(mut self, key: impl Into<String>, value: Param) -> Self {
        self.hash.push((key.into(), value));
        self
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        for (key, value) in &self.hash {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Expression argument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Param {
    Path(String),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Path(path) => f.write_str(path),
            Param::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Param::Number(n) => write!(f, "{}", n),
            Param::Boolean(b) => write!(f, "{}", b),
        }
    }
}
