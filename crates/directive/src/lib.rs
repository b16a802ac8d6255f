//! Weft directive parser
//!
//! Splits a template source into literal content and `{{...}}` directives,
//! producing a `Program` of content, mustache and block statements.

mod error;
mod expression;
mod parser;

pub use error::{DirectiveError, DirectiveResult, SourceLocation};
pub use parser::{parse_directives, parse_directives_with_limit, MAX_NESTING};
