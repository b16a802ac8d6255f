//! Template Tree Builder
//!
//! Walks a directive program top to bottom. Literal content is fed to the
//! tokenizer; mustaches and blocks go straight to the merge engine.

use log::{debug, trace};

use weft_ast::{BlockStatement, MustacheStatement, Node, Program, Statement};
use weft_directive::{parse_directives, MAX_NESTING};

use crate::error::HtmlResult;
use crate::merge::ElementStack;
use crate::tokenizer::Tokenizer;

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum number of nested elements and blocks
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_NESTING,
        }
    }
}

/// Template parser that builds an element tree
pub struct TemplateParser {
    tokenizer: Tokenizer,
    stack: ElementStack,
}

impl TemplateParser {
    /// Create a parser with default options
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            stack: ElementStack::new(options.max_depth),
        }
    }

    /// Build the element tree for a directive program
    pub fn parse(mut self, program: &Program) -> HtmlResult<Vec<Node>> {
        self.program(program)?;
        let nodes = self.stack.finish(&mut self.tokenizer)?;
        debug!("Built {} root nodes", nodes.len());
        Ok(nodes)
    }

    fn program(&mut self, program: &Program) -> HtmlResult<()> {
        for statement in &program.statements {
            self.statement(statement)?;
        }
        Ok(())
    }

    fn statement(&mut self, statement: &Statement) -> HtmlResult<()> {
        match statement {
            Statement::Content(content) => self.content(&content.value),
            Statement::Mustache(mustache) => self.mustache(mustache),
            Statement::Block(block) => self.block(block),
        }
    }

    fn content(&mut self, text: &str) -> HtmlResult<()> {
        for token in self.tokenizer.feed(text) {
            trace!("Token: {:?}", token);
            self.stack.merge_token(token)?;
        }
        Ok(())
    }

    fn mustache(&mut self, mustache: &MustacheStatement) -> HtmlResult<()> {
        self.stack.merge_mustache(&mut self.tokenizer, mustache)
    }

    fn block(&mut self, block: &BlockStatement) -> HtmlResult<()> {
        self.stack.enter_block(&mut self.tokenizer, block)?;
        debug!("Entering block {} at depth {}", block.name(), self.stack.depth());

        self.program(&block.program)?;
        self.stack.close_program(&mut self.tokenizer)?;

        if let Some(inverse) = &block.inverse {
            self.stack.start_inverse()?;
            self.program(inverse)?;
            self.stack.close_program(&mut self.tokenizer)?;
        }

        self.stack.leave_block()
    }
}

impl Default for TemplateParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse template source into an element tree in one call
pub fn preprocess(source: &str) -> HtmlResult<Vec<Node>> {
    let program = parse_directives(source)?;
    TemplateParser::new().parse(&program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ast::{Attribute, Expression, Fragment, Param, Queryable};

    use crate::error::HtmlError;
    use crate::tokenizer::State;

    fn mustache(path: &str) -> MustacheStatement {
        MustacheStatement::new(Expression::path(path))
    }

    #[test]
    fn test_plain_html() {
        let nodes = preprocess("<div><p>hi</p></div>").unwrap();

        assert_eq!(nodes.len(), 1);
        let div = nodes[0].as_element().unwrap();
        assert_eq!(div.tag_name, "div");
        assert_eq!(div.children.len(), 1);
        let p = div.children[0].as_element().unwrap();
        assert_eq!(p.tag_name, "p");
        assert_eq!(p.children, vec![Node::Text("hi".into())]);
    }

    #[test]
    fn test_sibling_elements() {
        let nodes = preprocess("<ul><li>a</li><li>b</li></ul>").unwrap();
        let ul = nodes[0].as_element().unwrap();
        assert_eq!(ul.children.len(), 2);
        assert_eq!(nodes.text_content(), "ab");
    }

    #[test]
    fn test_attribute_fragments() {
        let nodes = preprocess(r#"<a href="/u/{{id}}/edit">x</a>"#).unwrap();
        let a = nodes[0].as_element().unwrap();
        assert_eq!(
            a.get_attribute("href").unwrap().value,
            vec![
                Fragment::Text("/u/".into()),
                Fragment::Mustache(mustache("id")),
                Fragment::Text("/edit".into()),
            ]
        );
    }

    #[test]
    fn test_adjacent_directives_in_attribute() {
        let nodes = preprocess(r#"<p class="{{a}}{{b}}"></p>"#).unwrap();
        let p = nodes[0].as_element().unwrap();
        assert_eq!(
            p.attributes[0].value,
            vec![Fragment::Mustache(mustache("a")), Fragment::Mustache(mustache("b"))]
        );
    }

    #[test]
    fn test_modifier_placement() {
        let nodes = preprocess(r#"<div {{bind-class}} class="x"></div>"#).unwrap();
        let div = nodes[0].as_element().unwrap();

        assert_eq!(div.modifiers, vec![mustache("bind-class")]);
        assert_eq!(div.attributes, vec![Attribute::with_text("class", "x")]);
        assert!(div.children.is_empty());
    }

    #[test]
    fn test_modifier_with_params() {
        let nodes = preprocess(r#"<button {{action "save" model}}>Save</button>"#).unwrap();
        let button = nodes[0].as_element().unwrap();
        assert_eq!(button.modifiers.len(), 1);
        assert_eq!(
            button.modifiers[0].expression.params,
            vec![Param::String("save".into()), Param::Path("model".into())]
        );
    }

    #[test]
    fn test_self_closing() {
        let nodes = preprocess(r#"<p><img src="x"/>after</p>"#).unwrap();
        let p = nodes[0].as_element().unwrap();
        assert_eq!(p.children.len(), 2);
        let img = p.children[0].as_element().unwrap();
        assert!(img.self_closing);
        assert!(img.children.is_empty());
        assert_eq!(p.children[1], Node::Text("after".into()));
    }

    #[test]
    fn test_text_before_mustache() {
        let nodes = preprocess("<p>Hello, {{name}}!</p>").unwrap();
        let p = nodes[0].as_element().unwrap();
        assert_eq!(
            p.children,
            vec![
                Node::Text("Hello, ".into()),
                Node::Mustache(mustache("name")),
                Node::Text("!".into()),
            ]
        );
    }

    #[test]
    fn test_stray_less_than_in_text() {
        assert_eq!(preprocess("a <= b").unwrap(), vec![Node::Text("a <= b".into())]);

        let nodes = preprocess("<p>x<1 and y<2</p>").unwrap();
        let p = nodes[0].as_element().unwrap();
        assert_eq!(p.children, vec![Node::Text("x<1 and y<2".into())]);
    }

    #[test]
    fn test_mustache_in_comment() {
        let nodes = preprocess("<!-- {{x}} -->").unwrap();
        assert_eq!(nodes, vec![Node::Comment(" {{x}} ".into())]);
    }

    #[test]
    fn test_unmatched_close_tag() {
        let err = preprocess("<div><span></div>").unwrap_err();
        match err {
            HtmlError::UnmatchedCloseTag { expected, found, .. } => {
                assert_eq!(expected, "span");
                assert_eq!(found, "div");
            }
            other => panic!("Expected UnmatchedCloseTag, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_element() {
        let err = preprocess("<div>").unwrap_err();
        assert!(matches!(err, HtmlError::UnterminatedStructure { depth: 1, .. }));
    }

    #[test]
    fn test_unterminated_tag() {
        let err = preprocess("<div class=\"x").unwrap_err();
        assert!(matches!(err, HtmlError::UnterminatedStructure { ref open, .. } if open == "<div"));
    }

    #[test]
    fn test_unterminated_block() {
        // The directive parser catches the missing `{{/if}}`
        let err = preprocess("{{#if x}}<b>y</b>").unwrap_err();
        assert!(matches!(err, HtmlError::Directive(_)));

        let mut block = BlockStatement::new(Expression::path("if"), Program::default());
        block.program = Program::new(vec![Statement::Content(weft_ast::ContentStatement::new(
            "<b>",
        ))]);
        let program = Program::new(vec![Statement::Block(block)]);
        let err = TemplateParser::new().parse(&program).unwrap_err();
        assert!(matches!(err, HtmlError::UnterminatedStructure { ref open, .. } if open == "<b>"));
    }

    #[test]
    fn test_block_scoping() {
        let nodes = preprocess("{{#if x}}<b>y</b>{{/if}}").unwrap();

        assert_eq!(nodes.len(), 1);
        let block = nodes[0].as_block().unwrap();
        assert_eq!(block.name(), "if");
        assert_eq!(block.expression.params, vec![Param::Path("x".into())]);
        assert_eq!(block.children.len(), 1);
        let b = block.children[0].as_element().unwrap();
        assert_eq!(b.children, vec![Node::Text("y".into())]);
        assert!(block.inverse.is_none());
    }

    #[test]
    fn test_block_inverse() {
        let nodes =
            preprocess("<ul>{{#each items}}<li>{{name}}</li>{{else}}<li>none</li>{{/each}}</ul>")
                .unwrap();

        let ul = nodes[0].as_element().unwrap();
        let block = ul.children[0].as_block().unwrap();
        assert_eq!(block.children.len(), 1);
        let inverse = block.inverse.as_ref().unwrap();
        assert_eq!(inverse.len(), 1);
        assert_eq!(inverse.text_content(), "none");
        assert_eq!(nodes.blocks_by_name("each").len(), 1);
        assert_eq!(nodes.elements_by_tag_name("li").len(), 2);
    }

    #[test]
    fn test_element_cannot_span_block() {
        let err = preprocess("{{#if x}}<b>{{/if}}</b>").unwrap_err();
        assert!(matches!(err, HtmlError::UnterminatedStructure { .. }));
    }

    #[test]
    fn test_block_inside_tag() {
        let err = preprocess("<div {{#if x}}a{{/if}}></div>").unwrap_err();
        assert!(matches!(
            err,
            HtmlError::MisplacedDirective { state: State::BeforeAttributeName, .. }
        ));
    }

    #[test]
    fn test_tag_split_across_block() {
        let err = preprocess("{{#if x}}<div{{/if}}>").unwrap_err();
        assert!(matches!(err, HtmlError::UnterminatedStructure { .. }));
    }

    #[test]
    fn test_depth_limit() {
        let source = "<div>".repeat(10);
        let program = parse_directives(&source).unwrap();
        let err = TemplateParser::with_options(ParserOptions { max_depth: 4 })
            .parse(&program)
            .unwrap_err();
        assert!(matches!(err, HtmlError::NestingTooDeep { limit: 4 }));
    }

    #[test]
    fn test_nested_blocks_count_toward_depth() {
        let program = parse_directives("{{#a}}{{#b}}{{#c}}x{{/c}}{{/b}}{{/a}}").unwrap();
        assert!(TemplateParser::with_options(ParserOptions { max_depth: 3 })
            .parse(&program)
            .is_ok());
        assert!(matches!(
            TemplateParser::with_options(ParserOptions { max_depth: 2 }).parse(&program),
            Err(HtmlError::NestingTooDeep { limit: 2 })
        ));
    }

    #[test]
    fn test_deeply_nested_blocks() {
        let depth = 20_000;
        let source = "{{#a}}".repeat(depth) + &"{{/a}}".repeat(depth);
        let err = preprocess(&source).unwrap_err();
        assert!(matches!(
            err,
            HtmlError::Directive(weft_directive::DirectiveError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_directive_error_passes_through() {
        let err = preprocess("<p>{{name</p>").unwrap_err();
        assert!(matches!(err, HtmlError::Directive(_)));
    }

    #[test]
    fn test_trailing_text() {
        let nodes = preprocess("<br/>tail").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1], Node::Text("tail".into()));
    }
}
