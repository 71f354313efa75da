use std::fmt;

use logos::Span;
use miette::{Diagnostic, NamedSource};
use thiserror::Error;

use crate::ast::Position;

/// An error that may occur while parsing a proto3 source file.
///
/// The parser stops at the first error, so a `ParseError` always describes a single problem.
#[derive(Error, Diagnostic)]
#[error("{}: {}", .position, .kind)]
#[diagnostic(forward(kind))]
pub struct ParseError {
    kind: Box<ParseErrorKind>,
    position: Position,
    #[source_code]
    source_code: NamedSource,
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub(crate) enum ParseErrorKind {
    #[error("invalid token")]
    InvalidToken {
        #[label("found here")]
        span: Span,
    },
    #[error("source is not valid utf-8")]
    InvalidUtf8 {
        #[label("invalid byte here")]
        span: Span,
    },
    #[error("unterminated string")]
    UnterminatedString {
        #[label("string starts here")]
        span: Span,
    },
    #[error("unterminated block comment")]
    UnterminatedComment {
        #[label("comment starts here")]
        span: Span,
    },
    #[error("invalid string escape")]
    InvalidStringEscape {
        #[label("defined here")]
        span: Span,
    },
    #[error("invalid string character")]
    InvalidStringCharacters {
        #[label("invalid characters")]
        span: Span,
    },
    #[error("invalid number literal")]
    #[diagnostic(help("octal literals may only contain the digits 0 to 7"))]
    InvalidNumber {
        #[label("defined here")]
        span: Span,
    },
    #[error("found '{found}', but expected {expected}")]
    UnexpectedToken {
        expected: String,
        found: String,
        #[label("found here")]
        span: Span,
    },
    #[error("found end of file, but expected {expected}")]
    UnexpectedEof {
        expected: String,
        #[label("file ends here")]
        span: Span,
    },
    #[error("found '{syntax}', but expected proto3")]
    #[diagnostic(help("only proto3 files are supported"))]
    UnknownSyntax {
        syntax: String,
        #[label("defined here")]
        span: Span,
    },
    #[error("a map field key type must be an integer, boolean or string")]
    InvalidMapKeyType {
        #[label("defined here")]
        span: Span,
    },
    #[error("{kind} fields are not allowed in a oneof")]
    InvalidOneofFieldKind {
        kind: &'static str,
        #[label("defined here")]
        span: Span,
    },
    #[error("failed to read source: {message}")]
    Io {
        message: String,
        #[label("reading stopped here")]
        span: Span,
    },
    #[error("message literal constants are only allowed in permissive mode")]
    #[diagnostic(help("enable permissive parsing to accept this constant"))]
    PermissiveOnly {
        #[label("literal starts here")]
        span: Span,
    },
}

impl ParseErrorKind {
    pub fn span(&self) -> Span {
        match self {
            ParseErrorKind::InvalidToken { span }
            | ParseErrorKind::InvalidUtf8 { span }
            | ParseErrorKind::UnterminatedString { span }
            | ParseErrorKind::UnterminatedComment { span }
            | ParseErrorKind::InvalidStringEscape { span }
            | ParseErrorKind::InvalidStringCharacters { span }
            | ParseErrorKind::InvalidNumber { span }
            | ParseErrorKind::UnexpectedToken { span, .. }
            | ParseErrorKind::UnexpectedEof { span, .. }
            | ParseErrorKind::UnknownSyntax { span, .. }
            | ParseErrorKind::InvalidMapKeyType { span }
            | ParseErrorKind::InvalidOneofFieldKind { span, .. }
            | ParseErrorKind::Io { span, .. }
            | ParseErrorKind::PermissiveOnly { span } => span.clone(),
        }
    }
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, position: Position, source: &str) -> Self {
        ParseError {
            source_code: NamedSource::new(position.filename.as_ref(), source.to_owned()),
            kind: Box::new(kind),
            position,
        }
    }

    /// Gets the location of the token that caused the error.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Gets the byte range of the source file that caused the error.
    pub fn span(&self) -> Span {
        self.kind.span()
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.position, self.kind)
    }
}
