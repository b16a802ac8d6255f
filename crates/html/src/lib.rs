//! Weft HTML Parser
//!
//! Resumable HTML tokenizer and the merge engine that combines its tokens
//! with directive statements into one element tree.

mod error;
mod merge;
mod serialize;
mod token;
mod tokenizer;
mod tree_builder;

pub use error::{HtmlError, HtmlResult};
pub use merge::ElementStack;
pub use serialize::{
    generate, generate_attribute, generate_attributes, generate_tag, render, token_to_html,
    SerializeConfig, TagParts,
};
pub use token::{EndTag, StartTag, TagData, Token};
pub use tokenizer::{State, Tokenizer};
pub use tree_builder::{preprocess, ParserOptions, TemplateParser};

/// Tokenize a complete input, including its trailing text run
pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::tokenize(input)
}
