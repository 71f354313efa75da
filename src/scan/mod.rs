//! A modal scanner over the raw token stream.
//!
//! The proto3 grammar reuses the same lexical shapes in different positions, so the caller picks
//! how the next token is interpreted. For example `-1` is a single literal when a constant is
//! expected, and `map` is a keyword at the start of a field but a plain identifier in a type name.

#[cfg(test)]
mod tests;

use std::{borrow::Cow, collections::VecDeque, fmt, ops::BitOr, sync::Arc};

use logos::{Lexer, Logos, Span};

use crate::{
    ast::{self, Position},
    error::ParseErrorKind,
    lex::Token,
    source::RuneSource,
};

/// Controls how the next token is interpreted. Modes may be combined with `|`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Mode(u8);

impl Mode {
    pub const DEFAULT: Mode = Mode(0);
    /// Reserved words become [`TokenKind::Keyword`].
    pub const KEYWORD: Mode = Mode(1 << 0);
    /// Adjacent string literals are concatenated.
    pub const STR_LIT: Mode = Mode(1 << 1);
    /// A sign joins the number after it, and `inf` and `nan` are floats.
    pub const NUMBER_LIT: Mode = Mode(1 << 2);
    /// Any literal, including `true` and `false`.
    pub const LIT: Mode = Mode(1 << 3);
    /// Comments are returned as tokens instead of being buffered.
    pub const COMMENT: Mode = Mode(1 << 4);

    pub fn intersects(self, other: Mode) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Mode {
    type Output = Mode;

    fn bitor(self, rhs: Mode) -> Mode {
        Mode(self.0 | rhs.0)
    }
}

macro_rules! keywords {
    ($($variant:ident => $text:literal,)*) => {
        /// A reserved word of the proto3 grammar.
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub(crate) enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            pub fn from_ident(ident: &str) -> Option<Keyword> {
                match ident {
                    $($text => Some(Keyword::$variant),)*
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    Syntax => "syntax",
    Import => "import",
    Weak => "weak",
    Public => "public",
    Package => "package",
    Option => "option",
    Message => "message",
    Enum => "enum",
    Service => "service",
    Rpc => "rpc",
    Returns => "returns",
    Stream => "stream",
    Oneof => "oneof",
    Map => "map",
    Reserved => "reserved",
    To => "to",
    Max => "max",
    Extensions => "extensions",
    Extend => "extend",
    Repeated => "repeated",
    Optional => "optional",
    Required => "required",
    AdditionalBindings => "additional_bindings",
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    IntLit,
    FloatLit,
    StrLit,
    BoolLit,
    Keyword(Keyword),
    Equals,
    Semicolon,
    Comma,
    Dot,
    Colon,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    LeftAngleBracket,
    RightAngleBracket,
    Minus,
    Plus,
    ForwardSlash,
    Comment,
    Illegal,
    Eof,
}

impl TokenKind {
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLit | TokenKind::FloatLit | TokenKind::StrLit | TokenKind::BoolLit
        )
    }
}

/// A token interpreted under a particular [`Mode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Scanned<'a> {
    pub kind: TokenKind,
    pub text: Cow<'a, str>,
    pub pos: Position,
    /// The position of the token's final character.
    pub last: Position,
    pub span: Span,
}

impl<'a> Scanned<'a> {
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn to_comment(&self) -> ast::Comment {
        ast::Comment {
            raw: self.text.clone().into_owned(),
            meta: ast::Meta::new(self.pos.clone(), self.last.clone()),
        }
    }
}

#[derive(Debug, Clone)]
struct RawToken<'a> {
    token: Result<Token<'a>, ()>,
    error: Option<ParseErrorKind>,
    span: Span,
    start: Position,
    last: Position,
}

impl<'a> RawToken<'a> {
    fn is_ok(&self) -> bool {
        self.token.is_ok() && self.error.is_none()
    }

    fn to_comment(&self, source: &'a str) -> ast::Comment {
        let raw = match self.token {
            Ok(Token::LineComment(text) | Token::BlockComment(text)) => text,
            _ => &source[self.span.clone()],
        };
        ast::Comment {
            raw: raw.to_owned(),
            meta: ast::Meta::new(self.start.clone(), self.last.clone()),
        }
    }
}

#[derive(Debug)]
struct Saved<'a> {
    cursor: usize,
    comment: Option<ast::Comment>,
    last: Option<Scanned<'a>>,
}

pub(crate) struct Scanner<'a> {
    source: &'a str,
    lexer: Lexer<'a, Token<'a>>,
    runes: RuneSource<'a>,
    raw: Vec<RawToken<'a>>,
    lexer_done: bool,
    cursor: usize,
    pending: VecDeque<ast::Comment>,
    saved: Option<Saved<'a>>,
    last: Option<Scanned<'a>>,
    error: Option<(ParseErrorKind, Position)>,
    debug: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, filename: Arc<str>, debug: bool) -> Self {
        Scanner {
            source,
            lexer: Token::lexer(source),
            runes: RuneSource::new(source, filename),
            raw: Vec::new(),
            lexer_done: false,
            cursor: 0,
            pending: VecDeque::new(),
            saved: None,
            last: None,
            error: None,
            debug,
        }
    }

    /// Reads the next token, interpreting it according to `mode`.
    ///
    /// Outside of [`Mode::COMMENT`], any comments before the token are moved to the pending
    /// comment buffer.
    pub fn scan(&mut self, mode: Mode) -> Scanned<'a> {
        let previous = self.last.clone();

        if mode.intersects(Mode::COMMENT) {
            if let Some(comment) = self.pending.pop_front() {
                let token = Scanned {
                    kind: TokenKind::Comment,
                    text: Cow::Owned(comment.raw.clone()),
                    pos: comment.meta.start.clone(),
                    last: comment.meta.last.clone(),
                    span: comment.meta.start.offset..comment.meta.start.offset + comment.raw.len(),
                };
                self.saved = Some(Saved {
                    cursor: self.cursor,
                    comment: Some(comment),
                    last: previous,
                });
                return self.finish(token);
            }
        }

        loop {
            let index = self.cursor;
            let raw = match self.raw_at(index) {
                Some(raw) => raw.clone(),
                None => {
                    self.saved = Some(Saved {
                        cursor: index,
                        comment: None,
                        last: previous,
                    });
                    let token = self.eof();
                    return self.finish(token);
                }
            };

            let is_comment = matches!(&raw.token, Ok(token) if token.is_comment());
            if is_comment && raw.is_ok() && !mode.intersects(Mode::COMMENT) {
                self.pending.push_back(raw.to_comment(self.source));
                self.cursor += 1;
                continue;
            }

            self.saved = Some(Saved {
                cursor: index,
                comment: None,
                last: previous,
            });
            self.cursor += 1;
            let token = self.interpret(raw, mode);
            return self.finish(token);
        }
    }

    /// Pushes back the last token read by [`Scanner::scan`].
    ///
    /// Only a single token may be pushed back. Comments buffered while reading it stay pending.
    pub fn unscan(&mut self) {
        debug_assert!(self.saved.is_some(), "only one token may be pushed back");
        if let Some(saved) = self.saved.take() {
            self.cursor = saved.cursor;
            if let Some(comment) = saved.comment {
                self.pending.push_front(comment);
            }
            self.last = saved.last;
        }
    }

    pub fn peek(&mut self, mode: Mode) -> Scanned<'a> {
        let token = self.scan(mode);
        self.unscan();
        token
    }

    pub fn next(&mut self) -> Scanned<'a> {
        self.scan(Mode::DEFAULT)
    }

    pub fn next_keyword(&mut self) -> Scanned<'a> {
        self.scan(Mode::KEYWORD)
    }

    pub fn next_str_lit(&mut self) -> Scanned<'a> {
        self.scan(Mode::STR_LIT)
    }

    pub fn next_number_lit(&mut self) -> Scanned<'a> {
        self.scan(Mode::NUMBER_LIT)
    }

    pub fn next_lit(&mut self) -> Scanned<'a> {
        self.scan(Mode::LIT)
    }

    pub fn next_comment(&mut self) -> Scanned<'a> {
        self.scan(Mode::COMMENT)
    }

    /// Moves every comment up to the next token into the pending buffer and drains it.
    pub fn take_comments(&mut self) -> Vec<ast::Comment> {
        let source = self.source;
        loop {
            let raw = match self.raw_at(self.cursor) {
                Some(raw) if raw.is_ok() && matches!(raw.token, Ok(t) if t.is_comment()) => {
                    raw.to_comment(source)
                }
                _ => break,
            };
            self.pending.push_back(raw);
            self.cursor += 1;
        }
        self.saved = None;
        self.pending.drain(..).collect()
    }

    /// Drops pending comments that start before the given offset.
    pub fn discard_pending_before(&mut self, offset: usize) {
        self.pending
            .retain(|comment| comment.meta.start.offset >= offset);
    }

    /// The position of the last token read.
    pub fn position(&self) -> Position {
        match &self.last {
            Some(token) => token.pos.clone(),
            None => self.runes.position().clone(),
        }
    }

    /// Reads `ident { "." ident }`.
    pub fn read_full_ident(&mut self, expected: &str) -> Result<(String, Scanned<'a>), ()> {
        let first = self.next();
        if first.kind != TokenKind::Ident {
            return self.unexpected(&first, expected);
        }

        let mut name = first.text.to_string();
        self.read_dotted_tail(&mut name)?;
        Ok((name, first))
    }

    /// Reads `[ "." ] { ident "." } ident`, the syntax of message and enum type references.
    pub fn read_message_type(&mut self, expected: &str) -> Result<(String, Scanned<'a>), ()> {
        let first = self.next();
        let mut name = String::new();
        match first.kind {
            TokenKind::Dot => {
                name.push('.');
                let ident = self.next();
                if ident.kind != TokenKind::Ident {
                    return self.unexpected(&ident, "an identifier");
                }
                name.push_str(&ident.text);
            }
            TokenKind::Ident => name.push_str(&first.text),
            _ => return self.unexpected(&first, expected),
        }

        self.read_dotted_tail(&mut name)?;
        Ok((name, first))
    }

    /// Reads `{ "." ident }`, appending to `name`.
    pub fn read_dotted_tail(&mut self, name: &mut String) -> Result<(), ()> {
        loop {
            let dot = self.next();
            if dot.kind != TokenKind::Dot {
                self.unscan();
                return Ok(());
            }

            let ident = self.next();
            if ident.kind != TokenKind::Ident {
                return self.unexpected(&ident, "an identifier");
            }
            name.push('.');
            name.push_str(&ident.text);
        }
    }

    /// Reads `fullIdent | intLit | floatLit | strLit | boolLit`, where numbers may be signed.
    ///
    /// Returns the constant as written along with its first token and the position of its last
    /// token.
    pub fn read_constant(
        &mut self,
        permissive: bool,
    ) -> Result<(String, Scanned<'a>, Position), ()> {
        let token = self.next_lit();
        match token.kind {
            kind if kind.is_literal() => {
                let last = token.pos.clone();
                Ok((token.text.to_string(), token, last))
            }
            TokenKind::Ident => {
                self.unscan();
                let (name, first) = self.read_full_ident("a constant")?;
                Ok((name, first, self.position()))
            }
            TokenKind::LeftBrace if !permissive => {
                self.add_error(
                    ParseErrorKind::PermissiveOnly {
                        span: token.span.clone(),
                    },
                    token.pos,
                );
                Err(())
            }
            _ => self.unexpected(&token, "a constant"),
        }
    }

    /// Records an error for an unexpected token, unless an earlier error is already recorded.
    pub fn unexpected<T>(&mut self, token: &Scanned<'a>, expected: &str) -> Result<T, ()> {
        match token.kind {
            TokenKind::Illegal => (),
            TokenKind::Eof => self.add_error(
                ParseErrorKind::UnexpectedEof {
                    expected: expected.to_owned(),
                    span: token.span.clone(),
                },
                token.pos.clone(),
            ),
            _ => self.add_error(
                ParseErrorKind::UnexpectedToken {
                    expected: expected.to_owned(),
                    found: token.text.to_string(),
                    span: token.span.clone(),
                },
                token.pos.clone(),
            ),
        }
        Err(())
    }

    pub fn add_error(&mut self, err: ParseErrorKind, pos: Position) {
        if self.error.is_none() {
            tracing::debug!(position = %pos, error = %err, "parse error");
            self.error = Some((err, pos));
        }
    }

    pub fn take_error(&mut self) -> Option<(ParseErrorKind, Position)> {
        self.error.take()
    }

    fn finish(&mut self, token: Scanned<'a>) -> Scanned<'a> {
        if self.debug {
            tracing::debug!(
                kind = ?token.kind,
                text = %token.text,
                position = %token.pos,
                "scanned token"
            );
        }
        self.last = Some(token.clone());
        token
    }

    fn eof(&mut self) -> Scanned<'a> {
        let len = self.source.len();
        let pos = self.runes.advance_to(len);
        Scanned {
            kind: TokenKind::Eof,
            text: Cow::Borrowed(""),
            last: pos.clone(),
            pos,
            span: len..len,
        }
    }

    fn interpret(&mut self, raw: RawToken<'a>, mode: Mode) -> Scanned<'a> {
        let source = self.source;
        let mut token = Scanned {
            kind: TokenKind::Illegal,
            text: Cow::Borrowed(&source[raw.span.clone()]),
            pos: raw.start.clone(),
            last: raw.last.clone(),
            span: raw.span.clone(),
        };

        if let Some(err) = &raw.error {
            let pos = self.error_position(err, &raw);
            self.add_error(err.clone(), pos);
            return token;
        }

        let value = match raw.token {
            Ok(value) => value,
            Err(()) => {
                self.add_error(
                    ParseErrorKind::InvalidToken {
                        span: raw.span.clone(),
                    },
                    raw.start,
                );
                return token;
            }
        };

        token.kind = match value {
            Token::Ident(ident) => {
                match Keyword::from_ident(ident) {
                    Some(keyword) if mode.intersects(Mode::KEYWORD) => TokenKind::Keyword(keyword),
                    _ if mode.intersects(Mode::LIT) && matches!(ident, "true" | "false") => {
                        TokenKind::BoolLit
                    }
                    _ if mode.intersects(Mode::NUMBER_LIT | Mode::LIT)
                        && matches!(ident, "inf" | "nan") =>
                    {
                        TokenKind::FloatLit
                    }
                    _ => TokenKind::Ident,
                }
            }
            Token::IntLiteral(_) => TokenKind::IntLit,
            Token::FloatLiteral(_) => TokenKind::FloatLit,
            Token::StringLiteral(_) => {
                if mode.intersects(Mode::STR_LIT | Mode::LIT) {
                    self.concat_strings(&mut token);
                }
                TokenKind::StrLit
            }
            Token::Minus | Token::Plus if mode.intersects(Mode::NUMBER_LIT | Mode::LIT) => {
                match self.join_sign(&mut token) {
                    Some(kind) => kind,
                    None if value == Token::Minus => TokenKind::Minus,
                    None => TokenKind::Plus,
                }
            }
            Token::Minus => TokenKind::Minus,
            Token::Plus => TokenKind::Plus,
            Token::Dot => TokenKind::Dot,
            Token::LeftParen => TokenKind::LeftParen,
            Token::RightParen => TokenKind::RightParen,
            Token::LeftBrace => TokenKind::LeftBrace,
            Token::RightBrace => TokenKind::RightBrace,
            Token::LeftBracket => TokenKind::LeftBracket,
            Token::RightBracket => TokenKind::RightBracket,
            Token::LeftAngleBracket => TokenKind::LeftAngleBracket,
            Token::RightAngleBracket => TokenKind::RightAngleBracket,
            Token::Comma => TokenKind::Comma,
            Token::Equals => TokenKind::Equals,
            Token::Colon => TokenKind::Colon,
            Token::Semicolon => TokenKind::Semicolon,
            Token::ForwardSlash => TokenKind::ForwardSlash,
            Token::LineComment(text) | Token::BlockComment(text) => {
                token.text = Cow::Borrowed(text);
                TokenKind::Comment
            }
        };
        token
    }

    /// Appends the bodies of any string literals directly following the current one.
    fn concat_strings(&mut self, token: &mut Scanned<'a>) {
        let quote = &token.text[..1];
        let mut joined: Option<String> = None;
        while let Some(next) = self.raw_at(self.cursor) {
            let body = match next.token {
                Ok(Token::StringLiteral(text)) if next.error.is_none() => &text[1..text.len() - 1],
                _ => break,
            };
            let span_end = next.span.end;
            let last = next.last.clone();

            let result = joined.get_or_insert_with(|| {
                let mut s = token.text[..token.text.len() - 1].to_owned();
                s.reserve(body.len() + 1);
                s
            });
            result.push_str(body);
            token.span.end = span_end;
            token.last = last;
            self.cursor += 1;
        }

        if let Some(mut joined) = joined {
            joined.push_str(quote);
            token.text = Cow::Owned(joined);
        }
    }

    /// Joins a sign with an immediately following number.
    fn join_sign(&mut self, token: &mut Scanned<'a>) -> Option<TokenKind> {
        let next = self.raw_at(self.cursor)?;
        if !next.is_ok() || next.span.start != token.span.end {
            return None;
        }
        let kind = match next.token {
            Ok(Token::IntLiteral(_)) => TokenKind::IntLit,
            Ok(value) if value.is_number() => TokenKind::FloatLit,
            _ => return None,
        };

        token.span.end = next.span.end;
        token.last = next.last.clone();
        let source = self.source;
        token.text = Cow::Borrowed(&source[token.span.clone()]);
        self.cursor += 1;
        Some(kind)
    }

    fn error_position(&self, err: &ParseErrorKind, raw: &RawToken<'a>) -> Position {
        if err.span().start == raw.span.start {
            return raw.start.clone();
        }
        // Errors inside a token are reported at the token's line, offset to the error.
        let mut pos = raw.start.clone();
        let prefix = &self.source[raw.span.start..err.span().start];
        for ch in prefix.chars() {
            pos.offset += ch.len_utf8();
            if ch == '\n' {
                pos.line += 1;
                pos.column = 1;
            } else {
                pos.column += 1;
            }
        }
        pos
    }

    fn raw_at(&mut self, index: usize) -> Option<&RawToken<'a>> {
        while self.raw.len() <= index && !self.lexer_done {
            self.lex_one();
        }
        self.raw.get(index)
    }

    fn lex_one(&mut self) {
        let token = match self.lexer.next() {
            Some(token) => token,
            None => {
                self.lexer_done = true;
                return;
            }
        };
        let span = self.lexer.span();
        let error = if self.lexer.extras.errors.is_empty() {
            None
        } else {
            let mut errors = std::mem::take(&mut self.lexer.extras.errors);
            Some(errors.remove(0))
        };

        let start = self.runes.advance_to(span.start);
        let last = self.runes.advance_to_last_before(span.end);
        self.raw.push(RawToken {
            token,
            error,
            span,
            start,
            last,
        });
    }
}

impl fmt::Debug for Scanner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("cursor", &self.cursor)
            .field("pending", &self.pending)
            .field("last", &self.last)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
