//! Markup serialization
//!
//! Renders tokens and element trees back to markup. Whitespace inside tags,
//! quote style and self-closing spacing are normalized.

use weft_ast::{Attribute, Fragment, MustacheStatement, Node};

use crate::token::Token;

/// The parts of a start tag handed to `generate_tag`
#[derive(Debug, Clone, Copy)]
pub struct TagParts<'a> {
    pub name: &'a str,
    pub attributes: &'a [Attribute],
    pub modifiers: &'a [MustacheStatement],
    pub self_closing: bool,
}

/// Rendering strategy for tags and attributes
#[derive(Clone, Copy)]
pub struct SerializeConfig {
    pub generate_tag: fn(&TagParts<'_>, &SerializeConfig) -> String,
    pub generate_attributes: fn(&[Attribute], &SerializeConfig) -> String,
    pub generate_attribute: fn(&Attribute) -> String,
}

impl SerializeConfig {
    pub const DEFAULT: SerializeConfig = SerializeConfig {
        generate_tag,
        generate_attributes,
        generate_attribute,
    };
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Render a start tag: attributes, then modifiers
pub fn generate_tag(tag: &TagParts<'_>, config: &SerializeConfig) -> String {
    let mut out = format!("<{}", tag.name);

    if !tag.attributes.is_empty() {
        out.push(' ');
        out.push_str(&(config.generate_attributes)(tag.attributes, config));
    }
    for modifier in tag.modifiers {
        out.push(' ');
        out.push_str(&modifier.to_string());
    }

    out.push_str(if tag.self_closing { "/>" } else { ">" });
    out
}

/// Render an attribute list separated by single spaces
pub fn generate_attributes(attributes: &[Attribute], config: &SerializeConfig) -> String {
    attributes
        .iter()
        .map(|attr| (config.generate_attribute)(attr))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one attribute; an empty value renders as the bare name
pub fn generate_attribute(attr: &Attribute) -> String {
    if attr.value.is_empty() {
        return attr.name.clone();
    }

    let mut value = String::new();
    for fragment in &attr.value {
        match fragment {
            Fragment::Text(text) => value.push_str(&text.replace('"', "\\\"")),
            Fragment::Mustache(mustache) => value.push_str(&mustache.to_string()),
        }
    }
    format!("{}=\"{}\"", attr.name, value)
}

/// Render a single token
pub fn token_to_html(token: &Token, config: &SerializeConfig) -> String {
    match token {
        Token::Text(text) => text.clone(),
        Token::Comment(text) => format!("<!--{}-->", text),
        Token::StartTag(tag) => (config.generate_tag)(
            &TagParts {
                name: tag.name(),
                attributes: tag.attributes(),
                modifiers: &tag.modifiers,
                self_closing: tag.self_closing,
            },
            config,
        ),
        Token::EndTag(tag) => format!("</{}>", tag.name()),
    }
}

/// Render a token stream
pub fn generate(tokens: &[Token], config: &SerializeConfig) -> String {
    tokens.iter().map(|token| token_to_html(token, config)).collect()
}

/// Render an element tree
pub fn render(nodes: &[Node], config: &SerializeConfig) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, config, &mut out);
    }
    out
}

fn render_node(node: &Node, config: &SerializeConfig, out: &mut String) {
    match node {
        Node::Element(element) => {
            let parts = TagParts {
                name: &element.tag_name,
                attributes: &element.attributes,
                modifiers: &element.modifiers,
                self_closing: element.self_closing,
            };
            out.push_str(&(config.generate_tag)(&parts, config));
            if element.self_closing {
                return;
            }
            for child in &element.children {
                render_node(child, config, out);
            }
            out.push_str(&format!("</{}>", element.tag_name));
        }
        Node::Block(block) => {
            out.push_str(&format!("{{{{#{}}}}}", block.expression));
            for child in &block.children {
                render_node(child, config, out);
            }
            if let Some(inverse) = &block.inverse {
                out.push_str("{{else}}");
                for child in inverse {
                    render_node(child, config, out);
                }
            }
            out.push_str(&format!("{{{{/{}}}}}", block.name()));
        }
        Node::Text(text) => out.push_str(text),
        Node::Comment(text) => out.push_str(&format!("<!--{}-->", text)),
        Node::Mustache(mustache) => out.push_str(&mustache.to_string()),
    }
}
