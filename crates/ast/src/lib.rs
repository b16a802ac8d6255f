//! Weft AST - template element tree
//!
//! Shared node types for the template pipeline: directive statements produced
//! by the directive parser, attribute fragments, and the merged element tree.

mod attribute;
mod node;
mod print;
mod query;
mod statement;

pub use attribute::{Attribute, Fragment};
pub use node::{BlockNode, Element, Node};
pub use print::pretty_print;
pub use query::Queryable;
pub use statement::{
    BlockStatement, ContentStatement, Expression, MustacheStatement, Param, Program, Statement,
};
