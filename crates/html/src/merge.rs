//! Merge engine
//!
//! Routes lexed tokens and directive statements onto the stack of open
//! nodes. Tokens always arrive complete, so they are routed by kind alone.
//! Directives arrive while the tokenizer may be anywhere inside a tag, so
//! they are routed by the tokenizer's state:
//!
//! - `Data`: content (inline mustache child, or a block scope)
//! - tag name / between attributes: tag-level modifier
//! - attribute value: value fragment
//! - comment: folded into the comment text

use log::trace;

use weft_ast::{BlockNode, BlockStatement, Element, MustacheStatement, Node};

use crate::error::{HtmlError, HtmlResult};
use crate::tokenizer::{State, Tokenizer};
use crate::token::Token;

/// An open node
#[derive(Debug)]
enum Entry {
    /// The document fragment; always at the bottom
    Root(Vec<Node>),
    Element(Element),
    Block { node: BlockNode, in_inverse: bool },
}

impl Entry {
    fn append(&mut self, child: Node) {
        let children = match self {
            Entry::Root(children) => children,
            Entry::Element(element) => &mut element.children,
            Entry::Block { node, in_inverse: false } => &mut node.children,
            Entry::Block { node, in_inverse: true } => node.inverse.get_or_insert_with(Vec::new),
        };

        // A stray `<` ends a text run early; the tree keeps one text node
        if let (Node::Text(text), Some(Node::Text(last))) = (&child, children.last_mut()) {
            last.push_str(text);
            return;
        }
        children.push(child);
    }

    /// How the node reads in diagnostics
    fn describe(&self) -> String {
        match self {
            Entry::Root(_) => "#fragment".to_string(),
            Entry::Element(element) => format!("<{}>", element.tag_name),
            Entry::Block { node, .. } => format!("{{{{#{}}}}}", node.name()),
        }
    }
}

/// Stack of open elements and blocks
#[derive(Debug)]
pub struct ElementStack {
    entries: Vec<Entry>,
    max_depth: usize,
}

impl ElementStack {
    /// Create a stack holding only the root
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: vec![Entry::Root(Vec::new())],
            max_depth,
        }
    }

    /// Number of open nodes above the root
    pub fn depth(&self) -> usize {
        self.entries.len() - 1
    }

    fn top_mut(&mut self) -> &mut Entry {
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    fn push(&mut self, entry: Entry) -> HtmlResult<()> {
        if self.depth() >= self.max_depth {
            return Err(HtmlError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    fn append_child(&mut self, child: Node) {
        self.top_mut().append(child);
    }

    /// Merge a token completed by the tokenizer
    pub fn merge_token(&mut self, token: Token) -> HtmlResult<()> {
        trace!("Merging token {} at depth {}", token.describe(), self.depth());

        match token {
            Token::Text(text) => self.append_child(Node::Text(text)),
            Token::Comment(text) => self.append_child(Node::Comment(text)),
            Token::StartTag(tag) => {
                let element = tag.into_element();
                if element.self_closing {
                    self.append_child(Node::Element(element));
                } else {
                    self.push(Entry::Element(element))?;
                }
            }
            Token::EndTag(tag) => self.close_element(tag.name())?,
        }
        Ok(())
    }

    fn close_element(&mut self, name: &str) -> HtmlResult<()> {
        let depth = self.depth();
        match self.entries.last() {
            Some(Entry::Element(open)) if open.tag_name.eq_ignore_ascii_case(name) => {}
            Some(Entry::Element(open)) => {
                return Err(HtmlError::UnmatchedCloseTag {
                    expected: open.tag_name.clone(),
                    found: name.to_string(),
                    depth,
                })
            }
            Some(other) => {
                return Err(HtmlError::UnexpectedCloseTag {
                    found: name.to_string(),
                    open: other.describe(),
                    depth,
                })
            }
            None => {
                return Err(HtmlError::UnexpectedCloseTag {
                    found: name.to_string(),
                    open: "nothing".to_string(),
                    depth,
                })
            }
        }

        if let Some(Entry::Element(element)) = self.entries.pop() {
            self.append_child(Node::Element(element));
        }
        Ok(())
    }

    /// Merge the tokenizer's pending text run, if any
    ///
    /// Must run before any directive so the directive is not swallowed by
    /// the surrounding text.
    pub fn flush_text(&mut self, tokenizer: &mut Tokenizer) -> HtmlResult<()> {
        match tokenizer.take_text_run() {
            Some(token) => self.merge_token(token),
            None => Ok(()),
        }
    }

    /// Merge an inline mustache according to where the tokenizer is
    pub fn merge_mustache(
        &mut self,
        tokenizer: &mut Tokenizer,
        mustache: &MustacheStatement,
    ) -> HtmlResult<()> {
        self.flush_text(tokenizer)?;

        let state = tokenizer.state();
        trace!("Merging {} in state {:?}", mustache, state);

        match state {
            State::Data => {
                self.append_child(Node::Mustache(mustache.clone()));
                Ok(())
            }
            State::TagName
            | State::BeforeAttributeName
            | State::AttributeName
            | State::AfterAttributeValueQuoted
            | State::SelfClosingStartTag => match tokenizer.pending_mut() {
                Some(Token::StartTag(tag)) => {
                    tag.add_modifier(mustache.clone());
                    Ok(())
                }
                _ => Err(misplaced(mustache.to_string(), state)),
            },
            State::BeforeAttributeValue
            | State::AttributeValueDoubleQuoted
            | State::AttributeValueSingleQuoted
            | State::AttributeValueUnquoted => {
                let added = match tokenizer.pending_mut() {
                    Some(Token::StartTag(tag)) => {
                        tag.data.add_directive_to_attribute_value(mustache.clone())
                    }
                    _ => false,
                };
                if !added {
                    return Err(misplaced(mustache.to_string(), state));
                }
                tokenizer.continue_unquoted_value();
                Ok(())
            }
            State::CommentStart
            | State::CommentStartDash
            | State::Comment
            | State::CommentEndDash
            | State::CommentEnd => {
                if tokenizer.fold_into_comment(&mustache.to_string()) {
                    Ok(())
                } else {
                    Err(misplaced(mustache.to_string(), state))
                }
            }
            State::TagOpen | State::EndTagOpen | State::MarkupDeclaration => {
                Err(misplaced(mustache.to_string(), state))
            }
        }
    }

    /// Open a block scope; only valid in content position
    pub fn enter_block(
        &mut self,
        tokenizer: &mut Tokenizer,
        block: &BlockStatement,
    ) -> HtmlResult<()> {
        self.flush_text(tokenizer)?;

        let state = tokenizer.state();
        if state != State::Data {
            return Err(misplaced(format!("{{{{#{}}}}}", block.expression), state));
        }

        self.push(Entry::Block {
            node: BlockNode::new(block.expression.clone()),
            in_inverse: false,
        })
    }

    /// Finish one of a block's programs
    ///
    /// The trailing text run belongs to the block, and no tag may remain
    /// half-lexed across the block boundary.
    pub fn close_program(&mut self, tokenizer: &mut Tokenizer) -> HtmlResult<()> {
        self.flush_text(tokenizer)?;
        if tokenizer.state() != State::Data {
            return Err(HtmlError::UnterminatedStructure {
                open: describe_pending(tokenizer),
                depth: self.depth(),
            });
        }
        Ok(())
    }

    /// Route further children of the current block to its inverse
    pub fn start_inverse(&mut self) -> HtmlResult<()> {
        let depth = self.depth();
        match self.top_mut() {
            Entry::Block { node, in_inverse } => {
                node.inverse = Some(Vec::new());
                *in_inverse = true;
                Ok(())
            }
            other => Err(HtmlError::UnterminatedStructure {
                open: other.describe(),
                depth,
            }),
        }
    }

    /// Pop the current block and attach it to its parent
    pub fn leave_block(&mut self) -> HtmlResult<()> {
        match self.entries.last() {
            Some(Entry::Block { .. }) => {}
            Some(other) => {
                return Err(HtmlError::UnterminatedStructure {
                    open: other.describe(),
                    depth: self.depth(),
                })
            }
            None => return Ok(()),
        }

        if let Some(Entry::Block { node, .. }) = self.entries.pop() {
            self.append_child(Node::Block(node));
        }
        Ok(())
    }

    /// End of input: drain the stack into the root's children
    ///
    /// A pending tag or comment, or anything left open, is an error. Stray
    /// markup that never formed a token (a trailing `<`) is dropped.
    pub fn finish(mut self, tokenizer: &mut Tokenizer) -> HtmlResult<Vec<Node>> {
        if let Some(token) = tokenizer.flush_at_end() {
            self.merge_token(token)?;
        }
        if tokenizer.pending().is_some() {
            return Err(HtmlError::UnterminatedStructure {
                open: describe_pending(tokenizer),
                depth: self.depth(),
            });
        }
        if self.depth() > 0 {
            return Err(HtmlError::UnterminatedStructure {
                open: self.top_mut().describe(),
                depth: self.depth(),
            });
        }

        match self.entries.pop() {
            Some(Entry::Root(children)) => Ok(children),
            _ => Ok(Vec::new()),
        }
    }
}

fn describe_pending(tokenizer: &Tokenizer) -> String {
    match tokenizer.pending() {
        Some(token) => token.describe(),
        None => "<".to_string(),
    }
}

fn misplaced(directive: String, state: State) -> HtmlError {
    HtmlError::MisplacedDirective { directive, state }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ast::{Attribute, Expression, Fragment, Program};

    fn mustache(path: &str) -> MustacheStatement {
        MustacheStatement::new(Expression::path(path))
    }

    fn feed(stack: &mut ElementStack, tokenizer: &mut Tokenizer, text: &str) {
        for token in tokenizer.feed(text) {
            stack.merge_token(token).unwrap();
        }
    }

    #[test]
    fn test_nested_elements() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        feed(&mut stack, &mut tokenizer, "<div><p>hi</p></div>");

        let nodes = stack.finish(&mut tokenizer).unwrap();
        assert_eq!(nodes.len(), 1);
        let div = nodes[0].as_element().unwrap();
        assert_eq!(div.tag_name, "div");
        let p = div.children[0].as_element().unwrap();
        assert_eq!(p.children, vec![Node::Text("hi".into())]);
    }

    #[test]
    fn test_self_closing_is_not_pushed() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        feed(&mut stack, &mut tokenizer, "<div><img src=\"x\"/>");

        assert_eq!(stack.depth(), 1);
        let Entry::Element(div) = stack.top_mut() else {
            panic!("Expected div on top");
        };
        assert_eq!(div.children.len(), 1);
        assert_eq!(div.children[0].tag_name(), Some("img"));
    }

    #[test]
    fn test_unmatched_close_tag() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        let mut result = Ok(());
        for token in tokenizer.feed("<div><span></div>") {
            result = result.and_then(|_| stack.merge_token(token));
        }

        match result {
            Err(HtmlError::UnmatchedCloseTag { expected, found, depth }) => {
                assert_eq!(expected, "span");
                assert_eq!(found, "div");
                assert_eq!(depth, 2);
            }
            other => panic!("Expected UnmatchedCloseTag, got {:?}", other),
        }
    }

    #[test]
    fn test_close_tag_at_root() {
        let mut stack = ElementStack::new(16);
        let err = stack
            .merge_token(Token::EndTag(crate::token::EndTag::new("p")))
            .unwrap_err();
        assert!(matches!(err, HtmlError::UnexpectedCloseTag { ref open, .. } if open == "#fragment"));
    }

    #[test]
    fn test_mustache_routing() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();

        feed(&mut stack, &mut tokenizer, "<div ");
        stack.merge_mustache(&mut tokenizer, &mustache("action")).unwrap();
        feed(&mut stack, &mut tokenizer, " class=\"a ");
        stack.merge_mustache(&mut tokenizer, &mustache("b")).unwrap();
        feed(&mut stack, &mut tokenizer, "\">Hello, ");
        stack.merge_mustache(&mut tokenizer, &mustache("name")).unwrap();
        feed(&mut stack, &mut tokenizer, "!</div>");

        let nodes = stack.finish(&mut tokenizer).unwrap();
        let div = nodes[0].as_element().unwrap();
        assert_eq!(div.modifiers, vec![mustache("action")]);
        assert_eq!(
            div.attributes,
            vec![Attribute {
                name: "class".into(),
                value: vec![Fragment::Text("a ".into()), Fragment::Mustache(mustache("b"))],
            }]
        );
        assert_eq!(
            div.children,
            vec![
                Node::Text("Hello, ".into()),
                Node::Mustache(mustache("name")),
                Node::Text("!".into()),
            ]
        );
    }

    #[test]
    fn test_directive_right_after_equals_is_unquoted_value() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();

        feed(&mut stack, &mut tokenizer, "<a href=");
        stack.merge_mustache(&mut tokenizer, &mustache("url")).unwrap();
        assert_eq!(tokenizer.state(), State::AttributeValueUnquoted);
        feed(&mut stack, &mut tokenizer, " target=_blank></a>");

        let nodes = stack.finish(&mut tokenizer).unwrap();
        let a = nodes[0].as_element().unwrap();
        assert_eq!(a.attributes.len(), 2);
        assert_eq!(a.attributes[0].value, vec![Fragment::Mustache(mustache("url"))]);
        assert_eq!(a.attributes[1], Attribute::with_text("target", "_blank"));
    }

    #[test]
    fn test_mustache_in_comment() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();

        feed(&mut stack, &mut tokenizer, "<!-- by ");
        stack.merge_mustache(&mut tokenizer, &mustache("author")).unwrap();
        feed(&mut stack, &mut tokenizer, " -->");

        let nodes = stack.finish(&mut tokenizer).unwrap();
        assert_eq!(nodes, vec![Node::Comment(" by {{author}} ".into())]);
    }

    #[test]
    fn test_stray_less_than_stays_in_one_text_node() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        feed(&mut stack, &mut tokenizer, "<p>a <= b");
        feed(&mut stack, &mut tokenizer, " or 1<2</p>");

        let nodes = stack.finish(&mut tokenizer).unwrap();
        let p = nodes[0].as_element().unwrap();
        assert_eq!(p.children, vec![Node::Text("a <= b or 1<2".into())]);
    }

    #[test]
    fn test_modifier_right_after_tag_name() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();

        feed(&mut stack, &mut tokenizer, "<div");
        assert_eq!(tokenizer.state(), State::TagName);
        stack.merge_mustache(&mut tokenizer, &mustache("x")).unwrap();
        feed(&mut stack, &mut tokenizer, "></div>");

        let nodes = stack.finish(&mut tokenizer).unwrap();
        let div = nodes[0].as_element().unwrap();
        assert_eq!(div.tag_name, "div");
        assert_eq!(div.modifiers, vec![mustache("x")]);
        assert!(div.attributes.is_empty());
    }

    #[test]
    fn test_modifier_after_self_closing_slash() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();

        feed(&mut stack, &mut tokenizer, "<br/");
        assert_eq!(tokenizer.state(), State::SelfClosingStartTag);
        stack.merge_mustache(&mut tokenizer, &mustache("x")).unwrap();
        feed(&mut stack, &mut tokenizer, ">");

        let nodes = stack.finish(&mut tokenizer).unwrap();
        let br = nodes[0].as_element().unwrap();
        assert!(br.self_closing);
        assert_eq!(br.modifiers, vec![mustache("x")]);
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_misplaced_mustache() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        feed(&mut stack, &mut tokenizer, "<");

        let err = stack.merge_mustache(&mut tokenizer, &mustache("tag")).unwrap_err();
        assert!(matches!(err, HtmlError::MisplacedDirective { state: State::TagOpen, .. }));
    }

    #[test]
    fn test_modifier_on_end_tag_is_misplaced() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        feed(&mut stack, &mut tokenizer, "<p></p ");

        let err = stack.merge_mustache(&mut tokenizer, &mustache("x")).unwrap_err();
        assert!(matches!(err, HtmlError::MisplacedDirective { .. }));
    }

    #[test]
    fn test_block_scope() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        let block = BlockStatement::new(Expression::path("if"), Program::default());

        feed(&mut stack, &mut tokenizer, "before ");
        stack.enter_block(&mut tokenizer, &block).unwrap();
        feed(&mut stack, &mut tokenizer, "<b>y</b>tail");
        stack.close_program(&mut tokenizer).unwrap();
        stack.start_inverse().unwrap();
        feed(&mut stack, &mut tokenizer, "no");
        stack.close_program(&mut tokenizer).unwrap();
        stack.leave_block().unwrap();

        let nodes = stack.finish(&mut tokenizer).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0], Node::Text("before ".into()));
        let block = nodes[1].as_block().unwrap();
        assert_eq!(block.name(), "if");
        assert_eq!(block.children.len(), 2);
        assert_eq!(block.children[0].tag_name(), Some("b"));
        assert_eq!(block.children[1], Node::Text("tail".into()));
        assert_eq!(block.inverse, Some(vec![Node::Text("no".into())]));
    }

    #[test]
    fn test_block_inside_tag_is_misplaced() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        let block = BlockStatement::new(Expression::path("if"), Program::default());

        feed(&mut stack, &mut tokenizer, "<div ");
        let err = stack.enter_block(&mut tokenizer, &block).unwrap_err();
        assert!(matches!(
            err,
            HtmlError::MisplacedDirective { state: State::BeforeAttributeName, .. }
        ));
    }

    #[test]
    fn test_leave_block_with_open_element() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        let block = BlockStatement::new(Expression::path("if"), Program::default());

        stack.enter_block(&mut tokenizer, &block).unwrap();
        feed(&mut stack, &mut tokenizer, "<div>");
        stack.close_program(&mut tokenizer).unwrap();
        let err = stack.leave_block().unwrap_err();
        assert!(matches!(err, HtmlError::UnterminatedStructure { ref open, .. } if open == "<div>"));
    }

    #[test]
    fn test_tag_spanning_block_boundary() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        let block = BlockStatement::new(Expression::path("if"), Program::default());

        stack.enter_block(&mut tokenizer, &block).unwrap();
        feed(&mut stack, &mut tokenizer, "<div");
        let err = stack.close_program(&mut tokenizer).unwrap_err();
        assert!(matches!(err, HtmlError::UnterminatedStructure { ref open, .. } if open == "<div"));
    }

    #[test]
    fn test_finish_with_open_element() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        feed(&mut stack, &mut tokenizer, "<div>text");

        let err = stack.finish(&mut tokenizer).unwrap_err();
        assert!(matches!(
            err,
            HtmlError::UnterminatedStructure { ref open, depth: 1 } if open == "<div>"
        ));
    }

    #[test]
    fn test_finish_drops_trailing_less_than() {
        let mut stack = ElementStack::new(16);
        let mut tokenizer = Tokenizer::new();
        feed(&mut stack, &mut tokenizer, "a <");

        let nodes = stack.finish(&mut tokenizer).unwrap();
        assert_eq!(nodes, vec![Node::Text("a ".into())]);
    }

    #[test]
    fn test_depth_limit() {
        let mut stack = ElementStack::new(2);
        let mut tokenizer = Tokenizer::new();
        let mut result = Ok(());
        for token in tokenizer.feed("<a><b><c>") {
            result = result.and_then(|_| stack.merge_token(token));
        }
        assert!(matches!(result, Err(HtmlError::NestingTooDeep { limit: 2 })));
    }
}
