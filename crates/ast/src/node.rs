//! Element tree nodes

use serde::Serialize;

use crate::attribute::Attribute;
use crate::statement::{Expression, MustacheStatement};

/// A node in the merged template tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    /// HTML element
    Element(Element),
    /// Block helper scope wrapping its children
    Block(BlockNode),
    /// Text content
    Text(String),
    /// HTML comment
    Comment(String),
    /// Inline expression in content position
    Mustache(MustacheStatement),
}

impl Node {
    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Check if this is a block node
    pub fn is_block(&self) -> bool {
        matches!(self, Node::Block(_))
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Check if this is a comment node
    pub fn is_comment(&self) -> bool {
        matches!(self, Node::Comment(_))
    }

    /// Get element data if this is an element
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(elem) => Some(elem),
            _ => None,
        }
    }

    /// Get block data if this is a block
    pub fn as_block(&self) -> Option<&BlockNode> {
        match self {
            Node::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the expression if this is a mustache
    pub fn as_mustache(&self) -> Option<&MustacheStatement> {
        match self {
            Node::Mustache(mustache) => Some(mustache),
            _ => None,
        }
    }

    /// Get the tag name if this is an element
    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|e| e.tag_name.as_str())
    }

    /// Child nodes; for blocks this is the main program's children only
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(elem) => &elem.children,
            Node::Block(block) => &block.children,
            _ => &[],
        }
    }
}

/// Element-specific data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    /// Tag name (lowercase)
    pub tag_name: String,
    pub attributes: Vec<Attribute>,
    /// Directives applied to the tag itself
    pub modifiers: Vec<MustacheStatement>,
    pub children: Vec<Node>,
    /// Written as `<tag/>` in the source
    pub self_closing: bool,
}

impl Element {
    /// Create a new element with the given tag name
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            modifiers: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Get an attribute by name
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        let name = name.to_ascii_lowercase();
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Check if an attribute is present
    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }
}

/// Block-scoped node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockNode {
    pub expression: Expression,
    pub children: Vec<Node>,
    /// Children of the `{{else}}` branch
    pub inverse: Option<Vec<Node>>,
}

impl BlockNode {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            children: Vec::new(),
            inverse: None,
        }
    }

    /// The helper name (`if`, `each`, ...)
    pub fn name(&self) -> &str {
        &self.expression.path
    }
}
