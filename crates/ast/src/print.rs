//! Debug printer for template trees

use crate::attribute::{Attribute, Fragment};
use crate::node::Node;

/// Pretty print a tree for debugging
pub fn pretty_print(nodes: &[Node]) -> String {
    let mut output = String::from("#fragment\n");
    for node in nodes {
        print_node(node, 1, &mut output);
    }
    output
}

fn print_node(node: &Node, depth: usize, output: &mut String) {
    let indent = "  ".repeat(depth);

    match node {
        Node::Element(elem) => {
            let mut parts: Vec<String> = elem.attributes.iter().map(print_attribute).collect();
            parts.extend(elem.modifiers.iter().map(|m| m.to_string()));
            let attrs_str = if parts.is_empty() {
                String::new()
            } else {
                format!(" {}", parts.join(" "))
            };
            let close = if elem.self_closing { "/>" } else { ">" };
            output.push_str(&format!("{}<{}{}{}\n", indent, elem.tag_name, attrs_str, close));
            for child in &elem.children {
                print_node(child, depth + 1, output);
            }
        }
        Node::Block(block) => {
            output.push_str(&format!("{}{{{{#{}}}}}\n", indent, block.expression));
            for child in &block.children {
                print_node(child, depth + 1, output);
            }
            if let Some(inverse) = &block.inverse {
                output.push_str(&format!("{}{{{{else}}}}\n", indent));
                for child in inverse {
                    print_node(child, depth + 1, output);
                }
            }
        }
        Node::Text(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                output.push_str(&format!("{}#text: {:?}\n", indent, trimmed));
            }
        }
        Node::Comment(text) => {
            output.push_str(&format!("{}<!-- {} -->\n", indent, text.trim()));
        }
        Node::Mustache(mustache) => {
            output.push_str(&format!("{}{}\n", indent, mustache));
        }
    }
}

fn print_attribute(attr: &Attribute) -> String {
    if attr.value.is_empty() {
        return attr.name.clone();
    }
    let value: String = attr
        .value
        .iter()
        .map(|fragment| match fragment {
            Fragment::Text(text) => text.clone(),
            Fragment::Mustache(mustache) => mustache.to_string(),
        })
        .collect();
    format!("{}={:?}", attr.name, value)
}
