use std::{str::Chars, sync::Arc};

use crate::ast::Position;

/// A cursor over the characters of a source file that tracks the position of each one.
///
/// Positions only ever move forward, except for a single character of lookback through
/// [`RuneSource::unread`].
#[derive(Debug, Clone)]
pub(crate) struct RuneSource<'a> {
    chars: Chars<'a>,
    current: Position,
    previous: Option<(Chars<'a>, Position)>,
}

impl<'a> RuneSource<'a> {
    pub fn new(source: &'a str, filename: Arc<str>) -> Self {
        RuneSource {
            chars: source.chars(),
            current: Position::new(filename),
            previous: None,
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    pub fn next(&mut self) -> Option<char> {
        let before = self.chars.clone();
        let ch = self.chars.next()?;
        self.previous = Some((before, self.current.clone()));

        self.current.offset += ch.len_utf8();
        if ch == '\n' {
            self.current.line += 1;
            self.current.column = 1;
        } else {
            self.current.column += 1;
        }
        Some(ch)
    }

    pub fn unread(&mut self) {
        debug_assert!(self.previous.is_some(), "only one character may be unread");
        if let Some((chars, position)) = self.previous.take() {
            self.chars = chars;
            self.current = position;
        }
    }

    /// The position of the next character to be read.
    pub fn position(&self) -> &Position {
        &self.current
    }

    /// Moves forward to the given byte offset, which must lie on a character boundary at or after
    /// the current position.
    pub fn advance_to(&mut self, offset: usize) -> Position {
        debug_assert!(offset >= self.current.offset, "source positions must move forward");
        while self.current.offset < offset && self.peek().is_some() {
            self.next();
        }
        self.current.clone()
    }

    /// Moves forward to the given byte offset and returns the position of the last character
    /// before it.
    pub fn advance_to_last_before(&mut self, offset: usize) -> Position {
        let start = self.current.offset;
        let end = self.advance_to(offset);
        if end.offset == start {
            return end;
        }

        self.unread();
        let last = self.current.clone();
        self.next();
        last
    }
}

/// Checks that the input is valid UTF-8, returning the offset of the first invalid byte if not.
pub(crate) fn decode(bytes: &[u8]) -> Result<&str, usize> {
    std::str::from_utf8(bytes).map_err(|err| err.valid_up_to())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str) -> RuneSource<'_> {
        RuneSource::new(text, "<input>".into())
    }

    #[test]
    fn tracks_lines_and_columns() {
        let mut src = source("ab\ncd");
        assert_eq!(src.next(), Some('a'));
        assert_eq!(src.next(), Some('b'));
        assert_eq!(src.position().column, 3);
        assert_eq!(src.next(), Some('\n'));
        assert_eq!(src.position().line, 2);
        assert_eq!(src.position().column, 1);
        assert_eq!(src.position().offset, 3);
        assert_eq!(src.next(), Some('c'));
        assert_eq!(src.position().column, 2);
    }

    #[test]
    fn peek_does_not_advance() {
        let mut src = source("xy");
        assert_eq!(src.peek(), Some('x'));
        assert_eq!(src.peek(), Some('x'));
        assert_eq!(src.next(), Some('x'));
        assert_eq!(src.peek(), Some('y'));
        assert_eq!(src.next(), Some('y'));
        assert_eq!(src.peek(), None);
        assert_eq!(src.next(), None);
    }

    #[test]
    fn unread_restores_position() {
        let mut src = source("a\nb");
        src.next();
        src.next();
        assert_eq!(src.position().line, 2);
        src.unread();
        assert_eq!(src.position().line, 1);
        assert_eq!(src.position().column, 2);
        assert_eq!(src.next(), Some('\n'));
    }

    #[test]
    fn crlf_is_one_line_break() {
        let mut src = source("a\r\nb");
        let pos = src.advance_to(3);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
        assert_eq!(src.next(), Some('b'));
    }

    #[test]
    fn multibyte_characters() {
        let mut src = source("é=1");
        src.next();
        assert_eq!(src.position().offset, 2);
        assert_eq!(src.position().column, 2);
    }

    #[test]
    fn last_character_before_offset() {
        let mut src = source("// ab\n");
        let last = src.advance_to_last_before(5);
        assert_eq!(last.offset, 4);
        assert_eq!(last.column, 5);
    }

    #[test]
    fn invalid_utf8() {
        assert_eq!(decode(b"abc"), Ok("abc"));
        assert_eq!(decode(b"ab\xffc"), Err(2));
    }
}
