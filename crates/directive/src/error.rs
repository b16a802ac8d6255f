//! Directive parsing error types

use std::fmt;
use thiserror::Error;

/// Directive parsing result type
pub type DirectiveResult<T> = Result<T, DirectiveError>;

/// Source location in a template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in characters)
    pub column: usize,
    /// Byte offset from start
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// Compute the location of a byte offset within `source`
    pub fn at(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column, offset }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Directive parsing errors
#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("Unclosed mustache at {location}")]
    UnclosedMustache {
        location: SourceLocation,
    },

    #[error("Empty expression at {location}")]
    EmptyExpression {
        location: SourceLocation,
    },

    #[error("Unterminated string at {location}")]
    UnterminatedString {
        location: SourceLocation,
    },

    #[error("Invalid expression: {message} at {location}")]
    InvalidExpression {
        message: String,
        location: SourceLocation,
    },

    #[error("Unexpected {{{{/{name}}}}} at {location}")]
    UnexpectedClose {
        name: String,
        location: SourceLocation,
    },

    #[error("{{{{#{expected}}}}} closed by {{{{/{found}}}}} at {location}")]
    MismatchedClose {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    #[error("Unclosed block {{{{#{name}}}}} opened at {location}")]
    UnclosedBlock {
        name: String,
        location: SourceLocation,
    },

    #[error("{{{{else}}}} outside of a block at {location}")]
    UnexpectedElse {
        location: SourceLocation,
    },

    #[error("Blocks nested deeper than {limit} levels at {location}")]
    NestingTooDeep {
        limit: usize,
        location: SourceLocation,
    },
}

impl DirectiveError {
    /// Get the source location of this error
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::UnclosedMustache { location } => *location,
            Self::EmptyExpression { location } => *location,
            Self::UnterminatedString { location } => *location,
            Self::InvalidExpression { location, .. } => *location,
            Self::UnexpectedClose { location, .. } => *location,
            Self::MismatchedClose { location, .. } => *location,
            Self::UnclosedBlock { location, .. } => *location,
            Self::UnexpectedElse { location } => *location,
            Self::NestingTooDeep { location, .. } => *location,
        }
    }

    pub fn invalid_expression(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::InvalidExpression { message: message.into(), location }
    }
}
