//! Parsing of protobuf version 3 source files into a commented syntax tree.
//!
//! The tree keeps every declaration in source order together with its source range and the
//! comments written around it, which makes it suitable for documentation generators, linters
//! and formatters. Names are not resolved and option values are kept as written.
//!
//! # Examples
//!
//! ```
//! let file = proto3_parser::parse(r#"
//! syntax = "proto3";
//!
//! // A greeting.
//! message Hello {
//!     string name = 1; // who to greet
//! }
//! "#).unwrap();
//!
//! assert_eq!(file.body.len(), 1);
//! ```
#![warn(missing_debug_implementations, missing_docs)]
#![deny(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/proto3-parser/0.1.0/")]

pub mod ast;

mod error;
mod lex;
mod parse;
mod scan;
mod source;

use std::{io, sync::Arc};

pub use self::error::ParseError;
use self::{error::ParseErrorKind, parse::Parser};

/// Parses a proto3 source file using the default options.
///
/// # Examples
///
/// ```
/// let file = proto3_parser::parse("syntax = 'proto3'; package foo.bar;").unwrap();
/// assert_eq!(file.syntax.version, "proto3");
///
/// let err = proto3_parser::parse("syntax = 'proto2';").unwrap_err();
/// assert_eq!(err.to_string(), "<input>:1:10: found 'proto2', but expected proto3");
/// ```
pub fn parse(source: &str) -> Result<ast::Proto, ParseError> {
    ParseOptions::new().parse(source)
}

/// Options for parsing a proto3 source file.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub(crate) filename: Arc<str>,
    pub(crate) debug: bool,
    pub(crate) permissive: bool,
    pub(crate) body_including_comments: bool,
}

impl ParseOptions {
    /// Creates a new set of options, with all flags disabled.
    pub fn new() -> Self {
        ParseOptions::default()
    }

    /// Sets the file name used in positions and error messages. Defaults to `<input>`.
    pub fn filename(&mut self, filename: impl Into<String>) -> &mut Self {
        self.filename = filename.into().into();
        self
    }

    /// Emits a `DEBUG` level event for every token read.
    pub fn debug(&mut self, yes: bool) -> &mut Self {
        self.debug = yes;
        self
    }

    /// Accepts message literals as option values, as used by `go-proto-validators` field options
    /// and the `google.api.http` option.
    pub fn permissive(&mut self, yes: bool) -> &mut Self {
        self.permissive = yes;
        self
    }

    /// Keeps comments placed after the last declaration of a body as elements of that body,
    /// instead of dropping them.
    pub fn body_including_comments(&mut self, yes: bool) -> &mut Self {
        self.body_including_comments = yes;
        self
    }

    /// Parses a proto3 source file.
    ///
    /// Parsing stops at the first error.
    pub fn parse(&self, source: &str) -> Result<ast::Proto, ParseError> {
        tracing::trace!(filename = %self.filename, len = source.len(), "parsing file");

        let mut parser = Parser::new(source, self);
        let result = parser.parse_proto();
        match (result, parser.take_error()) {
            (Ok(file), None) => {
                tracing::trace!(
                    filename = %self.filename,
                    declarations = file.body.len(),
                    "parsed file"
                );
                Ok(file)
            }
            (_, Some((kind, position))) => Err(ParseError::new(kind, position, source)),
            (Err(()), None) => unreachable!("parser failed without recording an error"),
        }
    }

    /// Reads a proto3 source file from `reader` and parses it.
    ///
    /// The input must be valid UTF-8.
    pub fn parse_reader(&self, mut reader: impl io::Read) -> Result<ast::Proto, ParseError> {
        let mut bytes = Vec::new();
        if let Err(err) = reader.read_to_end(&mut bytes) {
            tracing::debug!(error = %err, "failed to read source");
            let kind = ParseErrorKind::Io {
                message: err.to_string(),
                span: 0..0,
            };
            return Err(ParseError::new(kind, self.position_at(&bytes, 0), ""));
        }

        match source::decode(&bytes) {
            Ok(source) => self.parse(source),
            Err(offset) => {
                let kind = ParseErrorKind::InvalidUtf8 {
                    span: offset..offset,
                };
                Err(ParseError::new(
                    kind,
                    self.position_at(&bytes, offset),
                    &String::from_utf8_lossy(&bytes),
                ))
            }
        }
    }

    fn position_at(&self, bytes: &[u8], offset: usize) -> ast::Position {
        let valid = String::from_utf8_lossy(&bytes[..offset]);
        let mut runes = source::RuneSource::new(&valid, self.filename.clone());
        runes.advance_to(valid.len());
        let mut position = runes.position().clone();
        position.offset = offset;
        position
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            filename: ast::DEFAULT_FILENAME.into(),
            debug: false,
            permissive: false,
            body_including_comments: false,
        }
    }
}
