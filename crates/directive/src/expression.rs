//! Expression parsing
//!
//! Parses the inside of a directive (`path param key=value ...`) into an
//! `Expression`. Words are separated by whitespace; quoted strings may
//! contain whitespace and backslash-escaped quotes.

use std::iter::Peekable;
use std::str::Chars;

use weft_ast::{Expression, Param};

use crate::error::{DirectiveError, DirectiveResult, SourceLocation};

/// A word before classification
enum Raw {
    Bare(String),
    Quoted(String),
}

struct Word {
    key: Option<String>,
    value: Raw,
}

/// Parse a directive body into an expression
pub(crate) fn parse_expression(body: &str, location: SourceLocation) -> DirectiveResult<Expression> {
    let mut chars = body.chars().peekable();
    let mut words = Vec::new();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }
        words.push(read_word(&mut chars, location)?);
    }

    let mut words = words.into_iter();
    let mut expression = match words.next() {
        Some(Word { key: None, value: Raw::Bare(path) }) => Expression::path(path),
        Some(_) => {
            return Err(DirectiveError::invalid_expression(
                "expression must start with a path",
                location,
            ))
        }
        None => return Err(DirectiveError::EmptyExpression { location }),
    };

    for word in words {
        match word.key {
            Some(key) => expression.hash.push((key, to_param(word.value))),
            None if !expression.hash.is_empty() => {
                return Err(DirectiveError::invalid_expression(
                    "positional parameter after hash argument",
                    location,
                ))
            }
            None => expression.params.push(to_param(word.value)),
        }
    }

    Ok(expression)
}

fn read_word(chars: &mut Peekable<Chars<'_>>, location: SourceLocation) -> DirectiveResult<Word> {
    if let Some(quote) = chars.next_if(|&c| is_quote(c)) {
        let value = read_quoted(chars, quote, location)?;
        return Ok(Word { key: None, value: Raw::Quoted(value) });
    }

    let mut bare = String::new();
    while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
        if c == '=' {
            if bare.is_empty() {
                return Err(DirectiveError::invalid_expression("missing hash key", location));
            }
            let value = read_hash_value(chars, location)?;
            return Ok(Word { key: Some(bare), value });
        }
        bare.push(c);
    }
    Ok(Word { key: None, value: Raw::Bare(bare) })
}

fn read_hash_value(chars: &mut Peekable<Chars<'_>>, location: SourceLocation) -> DirectiveResult<Raw> {
    if let Some(quote) = chars.next_if(|&c| is_quote(c)) {
        return Ok(Raw::Quoted(read_quoted(chars, quote, location)?));
    }

    let mut bare = String::new();
    while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
        bare.push(c);
    }
    if bare.is_empty() {
        return Err(DirectiveError::invalid_expression("missing hash value", location));
    }
    Ok(Raw::Bare(bare))
}

fn read_quoted(
    chars: &mut Peekable<Chars<'_>>,
    quote: char,
    location: SourceLocation,
) -> DirectiveResult<String> {
    let mut value = String::new();
    loop {
        match chars.next() {
            Some('\\') => match chars.next() {
                Some(c) if c == quote || c == '\\' => value.push(c),
                Some(c) => {
                    value.push('\\');
                    value.push(c);
                }
                None => return Err(DirectiveError::UnterminatedString { location }),
            },
            Some(c) if c == quote => return Ok(value),
            Some(c) => value.push(c),
            None => return Err(DirectiveError::UnterminatedString { location }),
        }
    }
}

fn to_param(raw: Raw) -> Param {
    match raw {
        Raw::Quoted(s) => Param::String(s),
        Raw::Bare(s) => match s.as_str() {
            "true" => Param::Boolean(true),
            "false" => Param::Boolean(false),
            _ if looks_numeric(&s) => match s.parse::<f64>() {
                Ok(n) => Param::Number(n),
                Err(_) => Param::Path(s),
            },
            _ => Param::Path(s),
        },
    }
}

fn looks_numeric(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    digits.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}
