//! HTML tokens
//!
//! Start and end tags share `TagData`; only start tags carry the
//! self-closing flag and tag-level modifiers.

use smallvec::SmallVec;

use weft_ast::{Attribute, Element, MustacheStatement};

/// An HTML token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Run of character data
    Text(String),
    /// Comment
    Comment(String),
    /// Start tag
    StartTag(StartTag),
    /// End tag
    EndTag(EndTag),
}

impl Token {
    /// Name and attributes if this is a tag
    pub fn tag(&self) -> Option<&TagData> {
        match self {
            Token::StartTag(tag) => Some(&tag.data),
            Token::EndTag(tag) => Some(&tag.data),
            _ => None,
        }
    }

    /// Mutable name and attributes if this is a tag
    pub fn tag_mut(&mut self) -> Option<&mut TagData> {
        match self {
            Token::StartTag(tag) => Some(&mut tag.data),
            Token::EndTag(tag) => Some(&mut tag.data),
            _ => None,
        }
    }

    /// Short description for diagnostics, e.g. `<div` or `<!--`
    pub fn describe(&self) -> String {
        match self {
            Token::Text(_) => "#text".to_string(),
            Token::Comment(_) => "<!--".to_string(),
            Token::StartTag(tag) => format!("<{}", tag.name()),
            Token::EndTag(tag) => format!("</{}", tag.name()),
        }
    }
}

/// Tag name and attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagData {
    /// Tag name (lowercase)
    pub name: String,
    pub attributes: SmallVec<[Attribute; 4]>,
}

impl TagData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attributes: SmallVec::new(),
        }
    }

    pub fn add_to_tag_name(&mut self, c: char) {
        self.name.push(c.to_ascii_lowercase());
    }

    /// Start a new attribute whose name begins with `c`
    pub fn start_attribute(&mut self, c: char) {
        self.attributes.push(Attribute::new(c.to_ascii_lowercase().to_string()));
    }

    pub fn add_to_attribute_name(&mut self, c: char) {
        if let Some(attr) = self.attributes.last_mut() {
            attr.name.push(c.to_ascii_lowercase());
        }
    }

    /// Append a literal character to the current attribute's value
    pub fn add_to_attribute_value(&mut self, c: char) {
        if let Some(attr) = self.attributes.last_mut() {
            attr.push_char(c);
        }
    }

    /// Append a directive fragment to the current attribute's value
    ///
    /// Returns `false` if no attribute has been started.
    pub fn add_directive_to_attribute_value(&mut self, mustache: MustacheStatement) -> bool {
        match self.attributes.last_mut() {
            Some(attr) => {
                attr.push_directive(mustache);
                true
            }
            None => false,
        }
    }

    /// The attribute currently being built
    pub fn current_attribute(&self) -> Option<&Attribute> {
        self.attributes.last()
    }
}

/// Start tag token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartTag {
    pub data: TagData,
    pub self_closing: bool,
    /// Directives applied to the tag itself
    pub modifiers: Vec<MustacheStatement>,
}

impl StartTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            data: TagData::new(name),
            self_closing: false,
            modifiers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.data.attributes
    }

    pub fn add_modifier(&mut self, mustache: MustacheStatement) {
        self.modifiers.push(mustache);
    }

    /// Convert into an element with no children
    pub fn into_element(self) -> Element {
        let mut element = Element::new(self.data.name);
        element.attributes = self.data.attributes.into_vec();
        element.modifiers = self.modifiers;
        element.self_closing = self.self_closing;
        element
    }
}

/// End tag token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndTag {
    pub data: TagData,
}

impl EndTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            data: TagData::new(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }
}
