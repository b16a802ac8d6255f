//! HTML Tokenizer
//!
//! A resumable state machine over an append-only character buffer. Input may
//! arrive in several chunks (the literal text between directives); the state
//! and the token under construction survive between calls to `feed`.

use crate::token::{EndTag, StartTag, TagData, Token};

/// Tokenizer state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Data,
    TagOpen,
    EndTagOpen,
    MarkupDeclaration,
    CommentStart,
    CommentStartDash,
    Comment,
    CommentEndDash,
    CommentEnd,
    TagName,
    BeforeAttributeName,
    AttributeName,
    BeforeAttributeValue,
    AttributeValueDoubleQuoted,
    AttributeValueSingleQuoted,
    AttributeValueUnquoted,
    AfterAttributeValueQuoted,
    SelfClosingStartTag,
}

impl State {
    /// Inside a start or end tag, after its name has begun
    pub fn is_in_tag(self) -> bool {
        matches!(
            self,
            State::TagName
                | State::BeforeAttributeName
                | State::AttributeName
                | State::BeforeAttributeValue
                | State::AttributeValueDoubleQuoted
                | State::AttributeValueSingleQuoted
                | State::AttributeValueUnquoted
                | State::AfterAttributeValueQuoted
                | State::SelfClosingStartTag
        )
    }

    /// Inside an attribute value, or right after its `=`
    pub fn is_in_attribute_value(self) -> bool {
        matches!(
            self,
            State::BeforeAttributeValue
                | State::AttributeValueDoubleQuoted
                | State::AttributeValueSingleQuoted
                | State::AttributeValueUnquoted
        )
    }

    pub fn is_in_comment(self) -> bool {
        matches!(
            self,
            State::CommentStart
                | State::CommentStartDash
                | State::Comment
                | State::CommentEndDash
                | State::CommentEnd
        )
    }
}

/// Resumable HTML tokenizer
#[derive(Debug)]
pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    state: State,
    /// Token being built
    token: Option<Token>,
    /// Tokens completed during the current `feed`
    emitted: Vec<Token>,
}

impl Tokenizer {
    /// Create a tokenizer with an empty buffer
    pub fn new() -> Self {
        Self {
            input: Vec::new(),
            pos: 0,
            state: State::Data,
            token: None,
            emitted: Vec::new(),
        }
    }

    /// Tokenize a complete input in one call
    ///
    /// A trailing text run is included; an unterminated tag or comment is
    /// dropped.
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut tokenizer = Self::new();
        let mut tokens = tokenizer.feed(input);
        tokens.extend(tokenizer.flush_at_end());
        tokens
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// The token under construction, if any
    pub fn pending(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Mutable access to the token under construction
    pub fn pending_mut(&mut self) -> Option<&mut Token> {
        self.token.as_mut()
    }

    /// Append `text` to the buffer and lex as far as possible
    ///
    /// Returns the tokens completed by this chunk.
    pub fn feed(&mut self, text: &str) -> Vec<Token> {
        self.input.extend(text.chars());

        while self.pos < self.input.len() {
            if !self.step() {
                break;
            }
        }

        std::mem::take(&mut self.emitted)
    }

    /// Hand off the pending text run, if the lexer is in `Data`
    pub fn take_text_run(&mut self) -> Option<Token> {
        if self.state != State::Data {
            return None;
        }
        match self.token {
            Some(Token::Text(_)) => self.token.take(),
            _ => None,
        }
    }

    /// End of input: the trailing text run, if any
    ///
    /// Tags and comments still open are left pending for the caller to
    /// report.
    pub fn flush_at_end(&mut self) -> Option<Token> {
        self.take_text_run()
    }

    /// Continue an attribute value as unquoted
    ///
    /// Used after a directive fragment lands right after `=`, so the next
    /// whitespace ends the value instead of being skipped.
    pub(crate) fn continue_unquoted_value(&mut self) {
        if self.state == State::BeforeAttributeValue {
            self.state = State::AttributeValueUnquoted;
        }
    }

    /// Fold literal text into the pending comment
    ///
    /// Dashes held back by the comment-end states are written out first so
    /// the text keeps its source order.
    pub(crate) fn fold_into_comment(&mut self, text: &str) -> bool {
        let held = match self.state {
            State::CommentStartDash | State::CommentEndDash => "-",
            State::CommentEnd => "--",
            State::CommentStart | State::Comment => "",
            _ => return false,
        };
        match &mut self.token {
            Some(Token::Comment(comment)) => {
                comment.push_str(held);
                comment.push_str(text);
                self.state = State::Comment;
                true
            }
            _ => false,
        }
    }

    /// Peek at the current character without consuming
    fn current_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    /// Peek `n` characters past the current one
    fn peek_char(&self, n: usize) -> Option<char> {
        self.input.get(self.pos + n).copied()
    }

    /// Consume and return the current character
    fn consume(&mut self) -> Option<char> {
        let c = self.current_char()?;
        self.pos += 1;
        Some(c)
    }

    /// Step back so the last character is read again
    fn reconsume(&mut self) {
        self.pos -= 1;
    }

    /// Execute one step of the state machine
    ///
    /// Returns `false` when more input is needed before progress can be made.
    fn step(&mut self) -> bool {
        // `<!-` needs to see the next character before deciding
        if self.state == State::MarkupDeclaration
            && self.current_char() == Some('-')
            && self.peek_char(1).is_none()
        {
            return false;
        }

        let Some(c) = self.consume() else {
            return false;
        };

        match self.state {
            State::Data => self.data_state(c),
            State::TagOpen => self.tag_open_state(c),
            State::EndTagOpen => self.end_tag_open_state(c),
            State::MarkupDeclaration => self.markup_declaration_state(c),
            State::CommentStart => self.comment_start_state(c),
            State::CommentStartDash => self.comment_start_dash_state(c),
            State::Comment => self.comment_state(c),
            State::CommentEndDash => self.comment_end_dash_state(c),
            State::CommentEnd => self.comment_end_state(c),
            State::TagName => self.tag_name_state(c),
            State::BeforeAttributeName => self.before_attribute_name_state(c),
            State::AttributeName => self.attribute_name_state(c),
            State::BeforeAttributeValue => self.before_attribute_value_state(c),
            State::AttributeValueDoubleQuoted => self.attribute_value_quoted_state(c, '"'),
            State::AttributeValueSingleQuoted => self.attribute_value_quoted_state(c, '\''),
            State::AttributeValueUnquoted => self.attribute_value_unquoted_state(c),
            State::AfterAttributeValueQuoted => self.after_attribute_value_quoted_state(c),
            State::SelfClosingStartTag => self.self_closing_start_tag_state(c),
        }
        true
    }

    /// Hand off the text run and start a tag
    fn emit_data(&mut self) {
        if let Some(token) = self.token.take() {
            self.emitted.push(token);
        }
        self.state = State::TagOpen;
    }

    /// Emit the finished tag or comment
    fn emit_token(&mut self) {
        if let Some(token) = self.token.take() {
            self.emitted.push(token);
        }
        self.state = State::Data;
    }

    fn add_data(&mut self, c: char) {
        match &mut self.token {
            Some(Token::Text(text)) => text.push(c),
            _ => self.token = Some(Token::Text(c.to_string())),
        }
    }

    fn add_to_comment(&mut self, s: &str) {
        if let Some(Token::Comment(comment)) = &mut self.token {
            comment.push_str(s);
        }
    }

    fn tag_mut(&mut self) -> Option<&mut TagData> {
        self.token.as_mut().and_then(Token::tag_mut)
    }

    // State implementations

    fn data_state(&mut self, c: char) {
        match c {
            '<' => self.emit_data(),
            c => self.add_data(c),
        }
    }

    fn tag_open_state(&mut self, c: char) {
        match c {
            '!' => self.state = State::MarkupDeclaration,
            '/' => self.state = State::EndTagOpen,
            c if is_space(c) => {}
            c if c.is_ascii_alphabetic() => {
                self.token = Some(Token::StartTag(StartTag::new(c.to_string())));
                self.state = State::TagName;
            }
            _ => {
                // Not a tag after all: keep the `<` as text
                self.add_data('<');
                self.reconsume();
                self.state = State::Data;
            }
        }
    }

    fn end_tag_open_state(&mut self, c: char) {
        match c {
            c if c.is_ascii_alphabetic() => {
                self.token = Some(Token::EndTag(EndTag::new(c.to_string())));
                self.state = State::TagName;
            }
            '>' => self.state = State::Data,
            _ => {}
        }
    }

    fn markup_declaration_state(&mut self, c: char) {
        match c {
            '-' if self.current_char() == Some('-') => {
                self.pos += 1;
                self.token = Some(Token::Comment(String::new()));
                self.state = State::CommentStart;
            }
            '>' => self.state = State::Data,
            _ => {}
        }
    }

    fn comment_start_state(&mut self, c: char) {
        match c {
            '-' => self.state = State::CommentStartDash,
            '>' => self.emit_token(),
            c => {
                self.add_to_comment(c.encode_utf8(&mut [0; 4]));
                self.state = State::Comment;
            }
        }
    }

    fn comment_start_dash_state(&mut self, c: char) {
        match c {
            '-' => self.state = State::CommentEnd,
            '>' => self.emit_token(),
            c => {
                self.add_to_comment("-");
                self.add_to_comment(c.encode_utf8(&mut [0; 4]));
                self.state = State::Comment;
            }
        }
    }

    fn comment_state(&mut self, c: char) {
        match c {
            '-' => self.state = State::CommentEndDash,
            c => self.add_to_comment(c.encode_utf8(&mut [0; 4])),
        }
    }

    fn comment_end_dash_state(&mut self, c: char) {
        match c {
            '-' => self.state = State::CommentEnd,
            c => {
                self.add_to_comment("-");
                self.add_to_comment(c.encode_utf8(&mut [0; 4]));
                self.state = State::Comment;
            }
        }
    }

    fn comment_end_state(&mut self, c: char) {
        match c {
            '>' => self.emit_token(),
            '-' => self.add_to_comment("-"),
            c => {
                self.add_to_comment("--");
                self.add_to_comment(c.encode_utf8(&mut [0; 4]));
                self.state = State::Comment;
            }
        }
    }

    fn tag_name_state(&mut self, c: char) {
        match c {
            c if is_space(c) => self.state = State::BeforeAttributeName,
            '/' => self.state = State::SelfClosingStartTag,
            '>' => self.emit_token(),
            c => {
                if let Some(tag) = self.tag_mut() {
                    tag.add_to_tag_name(c);
                }
            }
        }
    }

    fn before_attribute_name_state(&mut self, c: char) {
        match c {
            c if is_space(c) => {}
            '/' => self.state = State::SelfClosingStartTag,
            '>' => self.emit_token(),
            c => {
                if let Some(tag) = self.tag_mut() {
                    tag.start_attribute(c);
                }
                self.state = State::AttributeName;
            }
        }
    }

    fn attribute_name_state(&mut self, c: char) {
        match c {
            // No separate after-attribute-name state
            c if is_space(c) => self.state = State::BeforeAttributeName,
            '/' => self.state = State::SelfClosingStartTag,
            '=' => self.state = State::BeforeAttributeValue,
            '>' => self.emit_token(),
            c => {
                if let Some(tag) = self.tag_mut() {
                    tag.add_to_attribute_name(c);
                }
            }
        }
    }

    fn before_attribute_value_state(&mut self, c: char) {
        match c {
            c if is_space(c) => {}
            '"' => self.state = State::AttributeValueDoubleQuoted,
            '\'' => self.state = State::AttributeValueSingleQuoted,
            '>' => self.emit_token(),
            c => {
                if let Some(tag) = self.tag_mut() {
                    tag.add_to_attribute_value(c);
                }
                self.state = State::AttributeValueUnquoted;
            }
        }
    }

    fn attribute_value_quoted_state(&mut self, c: char, quote: char) {
        if c == quote {
            self.state = State::AfterAttributeValueQuoted;
        } else if let Some(tag) = self.tag_mut() {
            tag.add_to_attribute_value(c);
        }
    }

    fn attribute_value_unquoted_state(&mut self, c: char) {
        match c {
            c if is_space(c) => self.state = State::BeforeAttributeName,
            '>' => self.emit_token(),
            c => {
                if let Some(tag) = self.tag_mut() {
                    tag.add_to_attribute_value(c);
                }
            }
        }
    }

    fn after_attribute_value_quoted_state(&mut self, c: char) {
        match c {
            c if is_space(c) => self.state = State::BeforeAttributeName,
            '/' => self.state = State::SelfClosingStartTag,
            '>' => self.emit_token(),
            _ => {
                self.reconsume();
                self.state = State::BeforeAttributeName;
            }
        }
    }

    fn self_closing_start_tag_state(&mut self, c: char) {
        match c {
            '>' => {
                if let Some(Token::StartTag(tag)) = &mut self.token {
                    tag.self_closing = true;
                }
                self.emit_token();
            }
            _ => {
                self.reconsume();
                self.state = State::BeforeAttributeName;
            }
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}
