//! Message literal constants, which protoc accepts for custom options but the proto3 language
//! grammar does not. These are only parsed in permissive mode.

use super::Parser;
use crate::{
    ast::{self, Meta, Position},
    scan::{Keyword, Mode, TokenKind},
};

impl<'a> Parser<'a> {
    /// Parses the value of a field option such as `(validator.field) = {int_gt: 0, length_lt: 5}`.
    ///
    /// The result is the literal with whitespace removed, so the example yields
    /// `{int_gt:0,length_lt:5}`. List values are written as `[a b]`.
    pub(super) fn parse_validator_constant(&mut self) -> Result<String, ()> {
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut constant = String::from("{");
        loop {
            let name = self.scanner.next();
            match name.kind {
                TokenKind::RightBrace => {
                    constant.push('}');
                    return Ok(constant);
                }
                TokenKind::Ident => constant.push_str(&name.text),
                _ => return self.scanner.unexpected(&name, "a field name or '}'"),
            }

            self.expect(TokenKind::Colon, "':'")?;
            constant.push(':');

            match self.scanner.peek(Mode::DEFAULT).kind {
                TokenKind::LeftBracket => constant.push_str(&self.parse_validator_list()?),
                TokenKind::LeftBrace => constant.push_str(&self.parse_validator_constant()?),
                _ => {
                    let (value, _, _) = self.scanner.read_constant(true)?;
                    constant.push_str(&value);
                }
            }

            let separator = self.scanner.next();
            match separator.kind {
                TokenKind::Comma => constant.push(','),
                TokenKind::RightBrace => {
                    constant.push('}');
                    return Ok(constant);
                }
                _ => self.scanner.unscan(),
            }
        }
    }

    /// `"[" [ strLit { [ "," ] strLit } ] "]"`
    fn parse_validator_list(&mut self) -> Result<String, ()> {
        self.expect(TokenKind::LeftBracket, "'['")?;

        let mut items = Vec::new();
        loop {
            let token = self.scanner.next_str_lit();
            match token.kind {
                TokenKind::RightBracket => break,
                TokenKind::StrLit => items.push(token.text.into_owned()),
                _ => return self.scanner.unexpected(&token, "a string literal or ']'"),
            }
            self.bump_if(TokenKind::Comma);
        }

        Ok(format!("[{}]", items.join(" ")))
    }

    /// Parses the body of an HTTP rule option such as
    /// `option (google.api.http) = { get: "/v1/foo" additional_bindings { post: "/v1/bar" } };`.
    ///
    /// Returns the endpoint along with the position of its closing brace.
    pub(super) fn parse_cloud_endpoint(&mut self) -> Result<(ast::CloudEndpoint, Position), ()> {
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut endpoint = ast::CloudEndpoint::default();
        loop {
            let token = self.scanner.next_keyword();
            match token.kind {
                TokenKind::RightBrace => return Ok((endpoint, token.pos)),
                TokenKind::Keyword(Keyword::AdditionalBindings) => {
                    let binding = self.parse_additional_binding(token.pos)?;
                    endpoint.additional_bindings.push(binding);
                }
                TokenKind::Ident | TokenKind::Keyword(_) => {
                    let field = self.parse_endpoint_field(token.text.into_owned(), token.pos)?;
                    endpoint.fields.push(field);
                }
                _ => return self.scanner.unexpected(&token, "a field name or '}'"),
            }

            let separator = self.scanner.next();
            match separator.kind {
                TokenKind::Comma => (),
                TokenKind::RightBrace => return Ok((endpoint, separator.pos)),
                _ => self.scanner.unscan(),
            }
        }
    }

    /// `name ":" ( constant | "{" ... "}" )`, after the name has been read.
    fn parse_endpoint_field(
        &mut self,
        name: String,
        start: Position,
    ) -> Result<ast::EndpointFieldOption, ()> {
        self.expect(TokenKind::Colon, "':'")?;

        let (constant, last) = if self.scanner.peek(Mode::DEFAULT).kind == TokenKind::LeftBrace {
            let (nested, last) = self.parse_cloud_endpoint()?;
            (nested.to_constant_string(), last)
        } else {
            let (constant, _, last) = self.scanner.read_constant(true)?;
            (constant, last)
        };

        Ok(ast::EndpointFieldOption {
            name,
            constant,
            meta: Meta::new(start, last),
        })
    }

    /// `additional_bindings [ ":" ] "{" { name ":" constant [ "," ] } "}"`, after the keyword
    /// has been read.
    fn parse_additional_binding(&mut self, start: Position) -> Result<ast::AdditionalBinding, ()> {
        self.bump_if(TokenKind::Colon);
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut fields = Vec::new();
        loop {
            let token = self.scanner.next();
            match token.kind {
                TokenKind::RightBrace => {
                    return Ok(ast::AdditionalBinding {
                        fields,
                        meta: Meta::new(start, token.pos),
                    })
                }
                TokenKind::Ident => {
                    let field = self.parse_endpoint_field(token.text.into_owned(), token.pos)?;
                    fields.push(field);
                }
                _ => return self.scanner.unexpected(&token, "a field name or '}'"),
            }
            self.bump_if(TokenKind::Comma);
        }
    }
}
