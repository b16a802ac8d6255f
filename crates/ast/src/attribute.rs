//! Attribute values made of literal and directive fragments

use serde::Serialize;

use crate::statement::MustacheStatement;

/// One piece of an attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Fragment {
    Text(String),
    Mustache(MustacheStatement),
}

impl Fragment {
    /// Get the literal text if this is a text fragment
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Fragment::Text(text) => Some(text),
            Fragment::Mustache(_) => None,
        }
    }
}

/// A name with an ordered fragment value
///
/// An empty value is a bare attribute such as `disabled`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: Vec<Fragment>,
}

impl Attribute {
    /// Create an attribute with no value
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Vec::new(),
        }
    }

    /// Create an attribute with a single literal value
    pub fn with_text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut attr = Self::new(name);
        attr.push_text(&value.into());
        attr
    }

    /// Append literal text, merging into a trailing text fragment
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Fragment::Text(last)) = self.value.last_mut() {
            last.push_str(text);
        } else {
            self.value.push(Fragment::Text(text.to_string()));
        }
    }

    /// Append a single literal character
    pub fn push_char(&mut self, c: char) {
        if let Some(Fragment::Text(last)) = self.value.last_mut() {
            last.push(c);
        } else {
            self.value.push(Fragment::Text(c.to_string()));
        }
    }

    /// Append a directive fragment; never merged with neighbours
    pub fn push_directive(&mut self, mustache: MustacheStatement) {
        self.value.push(Fragment::Mustache(mustache));
    }

    /// Check if the value contains any directive fragment
    pub fn is_dynamic(&self) -> bool {
        self.value.iter().any(|f| matches!(f, Fragment::Mustache(_)))
    }

    /// The value as plain text, if it has no directive fragments
    pub fn static_value(&self) -> Option<String> {
        if self.is_dynamic() {
            return None;
        }
        Some(self.value.iter().filter_map(Fragment::as_text).collect())
    }
}
