//! Directive parser
//!
//! Walks the source once, cutting it into literal content and `{{...}}`
//! windows. Open blocks are kept on an explicit frame stack so nesting depth
//! never grows the call stack.

use log::debug;

use weft_ast::{BlockStatement, ContentStatement, Expression, MustacheStatement, Program, Statement};

use crate::error::{DirectiveError, DirectiveResult, SourceLocation};
use crate::expression::parse_expression;

/// Deepest block nesting `parse_directives` accepts
pub const MAX_NESTING: usize = 512;

/// An open `{{#block}}` waiting for its `{{/block}}`
struct Frame {
    expression: Expression,
    location: SourceLocation,
    program: Vec<Statement>,
    inverse: Option<Vec<Statement>>,
}

impl Frame {
    fn new(expression: Expression, location: SourceLocation) -> Self {
        Self {
            expression,
            location,
            program: Vec::new(),
            inverse: None,
        }
    }

    /// Statements are appended to the inverse once `{{else}}` was seen
    fn target(&mut self) -> &mut Vec<Statement> {
        match &mut self.inverse {
            Some(inverse) => inverse,
            None => &mut self.program,
        }
    }
}

/// The text between a pair of delimiters
#[derive(Debug, Clone, Copy)]
struct Window<'a> {
    body: &'a str,
    location: SourceLocation,
    /// Byte offset just past the closing delimiter
    end: usize,
    triple: bool,
    trim_left: bool,
    trim_right: bool,
}

/// Parse a template source into a directive program
pub fn parse_directives(source: &str) -> DirectiveResult<Program> {
    parse_directives_with_limit(source, MAX_NESTING)
}

/// Parse a template source, rejecting blocks nested deeper than `max_depth`
pub fn parse_directives_with_limit(source: &str, max_depth: usize) -> DirectiveResult<Program> {
    let mut root: Vec<Statement> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut cursor = 0usize;
    let mut trim_next = false;

    while cursor < source.len() {
        let Some(found) = source[cursor..].find("{{") else {
            let mut text = &source[cursor..];
            if trim_next {
                text = text.trim_start();
            }
            push_content(current_target(&mut root, &mut frames), text);
            break;
        };
        let open = cursor + found;
        let window = read_window(source, open)?;

        let mut text = &source[cursor..open];
        if trim_next {
            text = text.trim_start();
        }
        if window.trim_left {
            text = text.trim_end();
        }
        push_content(current_target(&mut root, &mut frames), text);

        trim_next = window.trim_right;
        cursor = window.end;

        handle_window(window, &mut root, &mut frames, max_depth)?;
    }

    if let Some(frame) = frames.last() {
        return Err(DirectiveError::UnclosedBlock {
            name: frame.expression.path.clone(),
            location: frame.location,
        });
    }

    debug!("Parsed {} top-level directive statements", root.len());
    Ok(Program::new(root))
}

fn handle_window(
    window: Window<'_>,
    root: &mut Vec<Statement>,
    frames: &mut Vec<Frame>,
    max_depth: usize,
) -> DirectiveResult<()> {
    let body = window.body.trim();
    let location = window.location;

    if window.triple {
        let expression = parse_expression(body, location)?;
        let mustache = MustacheStatement::unescaped(expression);
        current_target(root, frames).push(Statement::Mustache(mustache));
        return Ok(());
    }

    if body.starts_with('!') {
        return Ok(());
    }

    if let Some(rest) = body.strip_prefix('#') {
        let expression = parse_expression(rest, location)?;
        return open_block(frames, Frame::new(expression, location), max_depth);
    }

    if let Some(rest) = body.strip_prefix('^') {
        if rest.trim().is_empty() {
            return start_inverse(frames, location);
        }
        // `{{^name}}` is a block whose content is all inverse
        let expression = parse_expression(rest, location)?;
        let mut frame = Frame::new(expression, location);
        frame.inverse = Some(Vec::new());
        return open_block(frames, frame, max_depth);
    }

    if let Some(rest) = body.strip_prefix('/') {
        return close_block(rest.trim(), location, root, frames);
    }

    if body == "else" {
        return start_inverse(frames, location);
    }
    if body.starts_with("else ") {
        return Err(DirectiveError::invalid_expression(
            "chained else is not supported",
            location,
        ));
    }

    if body.starts_with('>') {
        return Err(DirectiveError::invalid_expression(
            "partials are not supported",
            location,
        ));
    }

    let mustache = match body.strip_prefix('&') {
        Some(rest) => MustacheStatement::unescaped(parse_expression(rest, location)?),
        None => MustacheStatement::new(parse_expression(body, location)?),
    };
    current_target(root, frames).push(Statement::Mustache(mustache));
    Ok(())
}

fn open_block(frames: &mut Vec<Frame>, frame: Frame, max_depth: usize) -> DirectiveResult<()> {
    if frames.len() >= max_depth {
        return Err(DirectiveError::NestingTooDeep {
            limit: max_depth,
            location: frame.location,
        });
    }
    frames.push(frame);
    Ok(())
}

fn start_inverse(frames: &mut [Frame], location: SourceLocation) -> DirectiveResult<()> {
    match frames.last_mut() {
        Some(frame) if frame.inverse.is_none() => {
            frame.inverse = Some(Vec::new());
            Ok(())
        }
        _ => Err(DirectiveError::UnexpectedElse { location }),
    }
}

fn close_block(
    name: &str,
    location: SourceLocation,
    root: &mut Vec<Statement>,
    frames: &mut Vec<Frame>,
) -> DirectiveResult<()> {
    let Some(frame) = frames.pop() else {
        return Err(DirectiveError::UnexpectedClose {
            name: name.to_string(),
            location,
        });
    };

    if frame.expression.path != name {
        return Err(DirectiveError::MismatchedClose {
            expected: frame.expression.path,
            found: name.to_string(),
            location,
        });
    }

    let block = BlockStatement {
        expression: frame.expression,
        program: Program::new(frame.program),
        inverse: frame.inverse.map(Program::new),
    };
    current_target(root, frames).push(Statement::Block(block));
    Ok(())
}

fn current_target<'a>(root: &'a mut Vec<Statement>, frames: &'a mut [Frame]) -> &'a mut Vec<Statement> {
    match frames.last_mut() {
        Some(frame) => frame.target(),
        None => root,
    }
}

/// Adjacent content (split by a dropped comment) is merged
fn push_content(target: &mut Vec<Statement>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Statement::Content(last)) = target.last_mut() {
        last.value.push_str(text);
    } else {
        target.push(Statement::Content(ContentStatement::new(text)));
    }
}

/// Find the closing delimiter for the directive opening at `open`
fn read_window(source: &str, open: usize) -> DirectiveResult<Window<'_>> {
    let location = SourceLocation::at(source, open);
    let triple = source[open..].starts_with("{{{");
    let mut inner_start = open + if triple { 3 } else { 2 };

    let trim_left = source[inner_start..].starts_with('~');
    if trim_left {
        inner_start += 1;
    }

    let long_comment = !triple && source[inner_start..].starts_with("!--");
    let closer = if triple { "}}}" } else { "}}" };

    let close_at = if long_comment {
        let search_from = inner_start + 3;
        let plain = source[search_from..].find("--}}").map(|i| i + 2);
        let trimmed = source[search_from..].find("--~}}").map(|i| i + 3);
        plain.into_iter().chain(trimmed).min().map(|i| search_from + i)
    } else {
        source[inner_start..].find(closer).map(|i| inner_start + i)
    };
    let Some(close_at) = close_at else {
        return Err(DirectiveError::UnclosedMustache { location });
    };

    let mut inner_end = close_at;
    let trim_right = inner_end > inner_start && source[..inner_end].ends_with('~');
    if trim_right {
        inner_end -= 1;
    }

    Ok(Window {
        body: &source[inner_start..inner_end],
        location,
        end: close_at + closer.len(),
        triple,
        trim_left,
        trim_right,
    })
}
