//! Template parsing error types

use thiserror::Error;

use weft_directive::DirectiveError;

use crate::tokenizer::State;

/// Template parsing result type
pub type HtmlResult<T> = Result<T, HtmlError>;

/// Template parsing errors
#[derive(Debug, Error)]
pub enum HtmlError {
    #[error("Unmatched close tag: expected </{expected}>, found </{found}> at depth {depth}")]
    UnmatchedCloseTag {
        expected: String,
        found: String,
        depth: usize,
    },

    #[error("Unexpected close tag </{found}> while {open} is open at depth {depth}")]
    UnexpectedCloseTag {
        found: String,
        open: String,
        depth: usize,
    },

    #[error("Unterminated structure: {open} is never closed (depth {depth})")]
    UnterminatedStructure {
        open: String,
        depth: usize,
    },

    #[error("Directive {directive} cannot appear in tokenizer state {state:?}")]
    MisplacedDirective {
        directive: String,
        state: State,
    },

    #[error("Nesting deeper than {limit} levels")]
    NestingTooDeep {
        limit: usize,
    },

    #[error(transparent)]
    Directive(#[from] DirectiveError),
}
