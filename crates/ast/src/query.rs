//! Tree query helpers (elements by tag name, blocks by name, text content)

use crate::node::{BlockNode, Element, Node};

/// Trait for querying a template tree
pub trait Queryable {
    /// Find elements by tag name, in document order
    fn elements_by_tag_name(&self, tag_name: &str) -> Vec<&Element>;

    /// Find block nodes by helper name, in document order
    fn blocks_by_name(&self, name: &str) -> Vec<&BlockNode>;

    /// Concatenated text of all descendant text nodes
    fn text_content(&self) -> String;
}

impl Queryable for [Node] {
    fn elements_by_tag_name(&self, tag_name: &str) -> Vec<&Element> {
        let tag_lower = tag_name.to_ascii_lowercase();
        let mut result = Vec::new();
        for node in self {
            collect_descendants(node, &mut result);
        }
        result
            .into_iter()
            .filter_map(Node::as_element)
            .filter(|elem| elem.tag_name == tag_lower)
            .collect()
    }

    fn blocks_by_name(&self, name: &str) -> Vec<&BlockNode> {
        let mut result = Vec::new();
        for node in self {
            collect_descendants(node, &mut result);
        }
        result
            .into_iter()
            .filter_map(Node::as_block)
            .filter(|block| block.name() == name)
            .collect()
    }

    fn text_content(&self) -> String {
        let mut result = String::new();
        for node in self {
            collect_text(node, &mut result);
        }
        result
    }
}

impl Queryable for Vec<Node> {
    fn elements_by_tag_name(&self, tag_name: &str) -> Vec<&Element> {
        self.as_slice().elements_by_tag_name(tag_name)
    }

    fn blocks_by_name(&self, name: &str) -> Vec<&BlockNode> {
        self.as_slice().blocks_by_name(name)
    }

    fn text_content(&self) -> String {
        self.as_slice().text_content()
    }
}

/// Depth-first, node before its children; block inverses follow the main branch
fn collect_descendants<'a>(node: &'a Node, result: &mut Vec<&'a Node>) {
    result.push(node);
    for child in node.children() {
        collect_descendants(child, result);
    }
    if let Node::Block(BlockNode { inverse: Some(inverse), .. }) = node {
        for child in inverse {
            collect_descendants(child, result);
        }
    }
}

fn collect_text(node: &Node, result: &mut String) {
    match node {
        Node::Text(text) => result.push_str(text),
        _ => {
            for child in node.children() {
                collect_text(child, result);
            }
        }
    }
}
