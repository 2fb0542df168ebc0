//! Source-position index for JSON text
//!
//! Maps every JSON Pointer in a document to where its key and value sit in the
//! original text, so diagnostics raised against the value tree can be turned
//! into editor markers. Positions are 0-based; columns count characters.
//!
//! A column is one Unicode scalar value, and a tab advances it by one. Tools
//! that count UTF-16 code units or expand tabs to four columns will place
//! markers further right on lines holding astral characters or tabs.
//!
//! The value tree itself comes from serde_json. This scanner only records
//! positions and is lenient about anything serde_json already rejected.
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use crate::pointer::{child, index};
use std::collections::HashMap;
use thiserror::Error;

/// A 0-based line/column position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Source extents recorded for one pointer
///
/// Object members have key extents; array elements and the root do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceEntry {
    pub key: Option<Position>,
    pub key_end: Option<Position>,
    pub value: Position,
    pub value_end: Position,
}

/// A 1-indexed marker range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    /// Range used when the document has no recorded positions at all
    pub const DOCUMENT_START: Span = Span {
        start_line: 1,
        start_column: 1,
        end_line: 1,
        end_column: 2,
    };
}

/// Errors raised while scanning text that is not well-formed JSON
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Unexpected end of input")]
    UnexpectedEnd,

    #[error("Unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedChar { ch: char, line: usize, column: usize },
}

/// Pointer to source position index
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    entries: HashMap<String, SourceEntry>,
}

impl SourceMap {
    /// Scan `text` and record positions for every value in it
    pub fn parse(text: &str) -> Result<Self, ScanError> {
        let mut scanner = Scanner::new(text);
        scanner.value(String::new(), None)?;
        Ok(Self {
            entries: scanner.entries,
        })
    }

    pub fn get(&self, pointer: &str) -> Option<&SourceEntry> {
        self.entries.get(pointer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Marker range for a pointer
    ///
    /// Looks up `pointer`, then `fallback`, then the document root. The range
    /// covers the member key when there is one, the value otherwise.
    pub fn span(&self, pointer: &str, fallback: &str) -> Span {
        let entry = self
            .get(pointer)
            .or_else(|| self.get(fallback))
            .or_else(|| self.get(""));

        match entry {
            Some(entry) => {
                let start = entry.key.unwrap_or(entry.value);
                let end = entry.key_end.unwrap_or(entry.value_end);
                Span {
                    start_line: start.line + 1,
                    start_column: start.column + 1,
                    end_line: end.line + 1,
                    end_column: end.column + 1,
                }
            }
            None => Span::DOCUMENT_START,
        }
    }
}

struct Scanner {
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    entries: HashMap<String, SourceEntry>,
}

impl Scanner {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            position: 0,
            line: 0,
            column: 0,
            entries: HashMap::new(),
        }
    }

    fn here(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.bump();
        }
    }

    fn unexpected(&self, ch: char) -> ScanError {
        ScanError::UnexpectedChar {
            ch,
            line: self.line + 1,
            column: self.column + 1,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ScanError> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.bump();
                Ok(())
            }
            Some(ch) => Err(self.unexpected(ch)),
            None => Err(ScanError::UnexpectedEnd),
        }
    }

    fn value(&mut self, pointer: String, key: Option<(Position, Position)>) -> Result<(), ScanError> {
        self.skip_whitespace();
        let start = self.here();

        match self.peek() {
            Some('{') => self.object(&pointer)?,
            Some('[') => self.array(&pointer)?,
            Some('"') => {
                self.string()?;
            }
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.number(),
            Some(ch) if ch.is_ascii_alphabetic() => self.literal(),
            Some(ch) => return Err(self.unexpected(ch)),
            None => return Err(ScanError::UnexpectedEnd),
        }

        let end = self.here();
        self.entries.insert(
            pointer,
            SourceEntry {
                key: key.map(|(k, _)| k),
                key_end: key.map(|(_, k)| k),
                value: start,
                value_end: end,
            },
        );
        Ok(())
    }

    fn object(&mut self, pointer: &str) -> Result<(), ScanError> {
        self.expect('{')?;
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(());
        }

        loop {
            self.skip_whitespace();
            let key_start = self.here();
            let name = self.string()?;
            let key_end = self.here();

            self.skip_whitespace();
            self.expect(':')?;
            self.value(child(pointer, &name), Some((key_start, key_end)))?;

            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(()),
                Some(ch) => return Err(self.unexpected(ch)),
                None => return Err(ScanError::UnexpectedEnd),
            }
        }
    }

    fn array(&mut self, pointer: &str) -> Result<(), ScanError> {
        self.expect('[')?;
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(());
        }

        let mut i = 0;
        loop {
            self.value(index(pointer, i), None)?;
            i += 1;

            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(()),
                Some(ch) => return Err(self.unexpected(ch)),
                None => return Err(ScanError::UnexpectedEnd),
            }
        }
    }

    /// Scan a string literal and return its decoded contents
    fn string(&mut self) -> Result<String, ScanError> {
        self.expect('"')?;
        let mut out = String::new();

        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('b') => out.push('\u{8}'),
                    Some('f') => out.push('\u{c}'),
                    Some('u') => {
                        let ch = self.unicode_escape()?;
                        out.push(ch);
                    }
                    Some(other) => out.push(other),
                    None => return Err(ScanError::UnexpectedEnd),
                },
                Some(ch) => out.push(ch),
                None => return Err(ScanError::UnexpectedEnd),
            }
        }
    }

    fn hex4(&mut self) -> Result<u32, ScanError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let ch = self.bump().ok_or(ScanError::UnexpectedEnd)?;
            let digit = ch.to_digit(16).ok_or_else(|| self.unexpected(ch))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Decode the digits after `\u`, joining surrogate pairs
    fn unicode_escape(&mut self) -> Result<char, ScanError> {
        let high = self.hex4()?;
        if (0xD800..0xDC00).contains(&high)
            && self.chars.get(self.position) == Some(&'\\')
            && self.chars.get(self.position + 1) == Some(&'u')
        {
            self.bump();
            self.bump();
            let low = self.hex4()?;
            if (0xDC00..0xE000).contains(&low) {
                let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return Ok(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            return Ok(char::REPLACEMENT_CHARACTER);
        }
        Ok(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn number(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | 'e' | 'E')) {
            self.bump();
        }
    }

    fn literal(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_ascii_alphabetic()) {
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = "{\n  \"type\": \"object\",\n  \"properties\": {\n    \"a/b\": { \"type\": \"string\" }\n  },\n  \"enum\": [1, \"x\"]\n}";

    #[test]
    fn test_root_entry_has_no_key() {
        let map = SourceMap::parse(DOC).unwrap();
        let root = map.get("").unwrap();
        assert_eq!(root.key, None);
        assert_eq!(root.value, Position { line: 0, column: 0 });
        assert_eq!(root.value_end, Position { line: 6, column: 1 });
    }

    #[test]
    fn test_member_key_extents() {
        let map = SourceMap::parse(DOC).unwrap();
        let entry = map.get("/type").unwrap();
        assert_eq!(entry.key, Some(Position { line: 1, column: 2 }));
        assert_eq!(entry.key_end, Some(Position { line: 1, column: 8 }));
        assert_eq!(entry.value, Position { line: 1, column: 10 });
        assert_eq!(entry.value_end, Position { line: 1, column: 18 });
    }

    #[test]
    fn test_escaped_pointer_and_array_elements() {
        let map = SourceMap::parse(DOC).unwrap();
        assert!(map.get("/properties/a~1b").is_some());
        assert!(map.get("/properties/a~1b/type").is_some());

        let second = map.get("/enum/1").unwrap();
        assert_eq!(second.key, None);
        assert_eq!(second.value, Position { line: 5, column: 14 });
    }

    #[test]
    fn test_span_uses_key_then_fallback_then_root() {
        let map = SourceMap::parse(DOC).unwrap();

        let span = map.span("/type", "");
        assert_eq!((span.start_line, span.start_column), (2, 3));
        assert_eq!((span.end_line, span.end_column), (2, 9));

        let fallback = map.span("/properties/a~1b/format", "/properties/a~1b");
        assert_eq!((fallback.start_line, fallback.start_column), (4, 5));

        let root = map.span("/nope", "/also-nope");
        assert_eq!((root.start_line, root.start_column), (1, 1));
        assert_eq!((root.end_line, root.end_column), (7, 2));
    }

    #[test]
    fn test_empty_map_span() {
        let map = SourceMap::default();
        assert_eq!(map.span("/x", ""), Span::DOCUMENT_START);
    }

    #[test]
    fn test_unicode_keys_are_decoded() {
        let map = SourceMap::parse(r#"{"café": 1, "😀": 2}"#).unwrap();
        assert!(map.get("/café").is_some());
        let emoji = map.get("/😀").unwrap();
        assert_eq!(emoji.key, Some(Position { line: 0, column: 12 }));
    }

    #[test]
    fn test_tabs_and_astral_characters_are_one_column() {
        let map = SourceMap::parse("{\t\"a\": \"😀\", \"b\": 1}").unwrap();
        assert_eq!(map.get("/a").unwrap().key, Some(Position { line: 0, column: 2 }));
        assert_eq!(map.get("/b").unwrap().key, Some(Position { line: 0, column: 12 }));
    }

    #[test]
    fn test_truncated_input_is_an_error() {
        assert_eq!(SourceMap::parse("{\"a\": ").unwrap_err(), ScanError::UnexpectedEnd);
        assert!(SourceMap::parse("{\"a\" 1}").is_err());
    }
}
