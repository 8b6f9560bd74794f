//! secrets::literal
//!
//! Literal parsing for environment-supplied secret blobs.
//!
//! # Grammar
//!
//! Secret blobs are written by upstream tooling as Python-style literals,
//! not JSON: single-quoted strings, `True`/`False`/`None`, tuples, and
//! trailing commas all occur. The strict parser accepts:
//!
//! - mappings `{key: value, ...}` (keys must be strings, numbers, or booleans)
//! - sequences `[a, b]`, tuples `(a, b)` / `(a,)`, and sets `{a, b}`; sets
//!   become sequences with duplicates dropped, in first-seen order
//! - strings quoted with `'` or `"`, with the usual backslash escapes;
//!   adjacent strings are concatenated
//! - string prefixes `b`, `r`, `u`, `br`, `rb` (any case). Bytes literals
//!   become strings; `r` disables escape processing
//! - integers and floats, with optional sign, underscores, and exponent
//! - `True`, `False`, `None`
//!
//! Not accepted: floats that overflow to infinity (`1e999`), `inf`/`nan`
//! spellings, and complex numbers. A mapping value cannot hold them.
//!
//! [`parse_permissive`] falls back to the raw text as a single string when
//! strict parsing fails, because some producers emit bare unquoted values.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use taskshim::secrets::literal::{parse, parse_permissive};
//!
//! let value = parse("{'user': 'etl', 'port': 5432, 'ssl': True}").unwrap();
//! assert_eq!(value, json!({"user": "etl", "port": 5432, "ssl": true}));
//!
//! assert_eq!(parse_permissive("hunter2"), json!("hunter2"));
//! ```

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Error from strict literal parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid literal at offset {offset}: {message}")]
pub struct LiteralError {
    /// Byte offset into the input
    pub offset: usize,
    /// What went wrong
    pub message: String,
}

/// Strictly parse a literal.
///
/// The entire input (ignoring surrounding whitespace) must be one literal.
pub fn parse(input: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser::new(input);
    let value = parser.value()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

/// Parse a literal, falling back to the raw input as a string.
pub fn parse_permissive(input: &str) -> Value {
    parse(input).unwrap_or_else(|_| Value::String(input.to_string()))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.braces(),
            Some('[') => self.sequence(),
            Some('(') => self.tuple(),
            Some('\'') | Some('"') => self.strings().map(Value::String),
            Some(_) if self.string_prefix().is_some() => self.strings().map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.keyword(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// `{}` and `{k: v, ...}` are mappings; `{a, ...}` is a set.
    fn braces(&mut self) -> Result<Value, LiteralError> {
        self.bump();
        self.skip_ws();
        if self.eat('}') {
            return Ok(Value::Object(Map::new()));
        }
        let first_offset = self.pos;
        let first = self.value()?;
        self.skip_ws();
        if self.peek() == Some(':') {
            self.mapping(first, first_offset)
        } else {
            self.set(first)
        }
    }

    fn set(&mut self, first: Value) -> Result<Value, LiteralError> {
        let mut rest = Vec::new();
        if !self.eat('}') {
            if !self.eat(',') {
                return Err(self.error("expected ',' or '}' in set"));
            }
            rest = self.items('}')?.0;
        }

        let mut items: Vec<Value> = Vec::with_capacity(rest.len() + 1);
        for item in std::iter::once(first).chain(rest) {
            if !items.contains(&item) {
                items.push(item);
            }
        }
        Ok(Value::Array(items))
    }

    /// Continue a mapping whose first key has been read.
    fn mapping(&mut self, first_key: Value, first_offset: usize) -> Result<Value, LiteralError> {
        let mut map = Map::new();
        let mut pending = Some((first_key, first_offset));
        loop {
            let (raw_key, key_offset) = match pending.take() {
                Some(first) => first,
                None => {
                    self.skip_ws();
                    if self.eat('}') {
                        return Ok(Value::Object(map));
                    }
                    let offset = self.pos;
                    (self.value()?, offset)
                }
            };
            let key = match raw_key {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(true) => "True".to_string(),
                Value::Bool(false) => "False".to_string(),
                _ => {
                    return Err(LiteralError {
                        offset: key_offset,
                        message: "mapping keys must be strings, numbers, or booleans".into(),
                    })
                }
            };
            self.skip_ws();
            if !self.eat(':') {
                return Err(self.error("expected ':' after mapping key"));
            }
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            if !self.eat(',') {
                return Err(self.error("expected ',' or '}' in mapping"));
            }
        }
    }

    fn sequence(&mut self) -> Result<Value, LiteralError> {
        self.bump();
        let (items, _) = self.items(']')?;
        Ok(Value::Array(items))
    }

    /// `(x)` is just `x`; `(x,)` and `(x, y)` are sequences.
    fn tuple(&mut self) -> Result<Value, LiteralError> {
        self.bump();
        let (mut items, trailing_comma) = self.items(')')?;
        if items.len() == 1 && !trailing_comma {
            return Ok(items.remove(0));
        }
        Ok(Value::Array(items))
    }

    /// Comma-separated values up to `close`. Reports whether a trailing comma was seen.
    fn items(&mut self, close: char) -> Result<(Vec<Value>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok((items, trailing_comma));
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.eat(close) {
                return Ok((items, false));
            }
            if !self.eat(',') {
                return Err(self.error(format!("expected ',' or '{}'", close)));
            }
            trailing_comma = true;
        }
    }

    /// Length of a string prefix (`b`, `r`, `u`, `br`, `rb`) directly
    /// followed by a quote, and whether it makes the string raw.
    fn string_prefix(&self) -> Option<(usize, bool)> {
        let rest = &self.src[self.pos..];
        let prefix_len = rest
            .chars()
            .take_while(|c| matches!(c, 'b' | 'B' | 'r' | 'R' | 'u' | 'U'))
            .count();
        if !matches!(rest[prefix_len..].chars().next(), Some('\'') | Some('"')) {
            return None;
        }
        let prefix = rest[..prefix_len].to_ascii_lowercase();
        match prefix.as_str() {
            "" | "b" | "u" => Some((prefix_len, false)),
            "r" | "br" | "rb" => Some((prefix_len, true)),
            _ => None,
        }
    }

    /// One or more adjacent quoted strings, concatenated.
    fn strings(&mut self) -> Result<String, LiteralError> {
        let mut out = self.string()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            if self.string_prefix().is_some() {
                out.push_str(&self.string()?);
            } else {
                self.pos = save;
                return Ok(out);
            }
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let (prefix_len, raw) = self
            .string_prefix()
            .ok_or_else(|| self.error("expected string"))?;
        self.pos += prefix_len;
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\n') => return Err(self.error("newline in string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') if raw => {
                    // A raw string keeps the backslash; an escaped quote does not end it
                    out.push('\\');
                    match self.bump() {
                        Some(c) => out.push(c),
                        None => return Err(self.error("unterminated string")),
                    }
                }
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        match self.bump() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some('x') => out.push(self.hex_char(2)?),
            Some('u') => out.push(self.hex_char(4)?),
            Some('U') => out.push(self.hex_char(8)?),
            // Unknown escapes are kept verbatim, backslash included
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => return Err(self.error("unterminated string")),
        }
        Ok(())
    }

    fn hex_char(&mut self, digits: usize) -> Result<char, LiteralError> {
        let start = self.pos;
        let end = start + digits;
        let hex = self
            .src
            .get(start..end)
            .ok_or_else(|| self.error("truncated escape sequence"))?;
        let code =
            u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid escape sequence"))?;
        let c = char::from_u32(code).ok_or_else(|| self.error("invalid code point"))?;
        self.pos = end;
        Ok(c)
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let mut negative = false;
        while let Some(sign) = self.peek().filter(|c| *c == '-' || *c == '+') {
            if sign == '-' {
                negative = !negative;
            }
            self.bump();
            self.skip_ws();
        }

        let body_start = self.pos;
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some('+') | Some('-')) {
                        self.bump();
                    }
                    continue;
                }
                _ => break,
            }
            self.bump();
        }

        let body: String = self.src[body_start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        if body.is_empty() || body == "." {
            self.pos = start;
            return Err(self.error("invalid number"));
        }
        let text = if negative {
            format!("-{}", body)
        } else {
            body
        };

        let number = if is_float {
            text.parse::<f64>().ok().and_then(Number::from_f64)
        } else if let Ok(i) = text.parse::<i64>() {
            Some(Number::from(i))
        } else if let Ok(u) = text.parse::<u64>() {
            Some(Number::from(u))
        } else {
            // Integers beyond 64 bits degrade to floats
            text.parse::<f64>().ok().and_then(Number::from_f64)
        };

        number.map(Value::Number).ok_or_else(|| LiteralError {
            offset: start,
            message: format!("invalid number '{}'", text),
        })
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        match &self.src[start..self.pos] {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            word => Err(LiteralError {
                offset: start,
                message: format!("unknown name '{}'", word),
            }),
        }
    }
}
