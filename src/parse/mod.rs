mod permissive;

use crate::{
    ast::{self, Meta},
    error::ParseErrorKind,
    scan::{Keyword, Mode, Scanned, Scanner, TokenKind},
    ParseOptions,
};

const MAP_KEY_TYPES: &[&str] = &[
    "int32", "int64", "uint32", "uint64", "sint32", "sint64", "fixed32", "fixed64", "sfixed32",
    "sfixed64", "bool", "string",
];

pub(crate) struct Parser<'a> {
    scanner: Scanner<'a>,
    permissive: bool,
    body_including_comments: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, options: &ParseOptions) -> Self {
        Parser {
            scanner: Scanner::new(source, options.filename.clone(), options.debug),
            permissive: options.permissive,
            body_including_comments: options.body_including_comments,
        }
    }

    pub fn take_error(&mut self) -> Option<(ParseErrorKind, ast::Position)> {
        self.scanner.take_error()
    }

    pub fn parse_proto(&mut self) -> Result<ast::Proto, ()> {
        let comments = self.scanner.take_comments();
        let first = self.scanner.peek(Mode::KEYWORD);
        let comments = leading_comments(comments, &first);
        let syntax = self.parse_syntax(comments)?;

        let mut body = Vec::new();
        loop {
            let comments = self.scanner.take_comments();
            let token = self.scanner.peek(Mode::KEYWORD);
            match token.kind {
                TokenKind::Eof => {
                    self.flush_comments(comments, &mut body, ast::ProtoElement::Comment);
                    break;
                }
                TokenKind::Semicolon => {
                    self.scanner.next();
                    continue;
                }
                _ => (),
            }

            let comments = leading_comments(comments, &token);
            let element = match token.kind {
                TokenKind::Keyword(Keyword::Import) => {
                    ast::ProtoElement::Import(self.parse_import(comments)?)
                }
                TokenKind::Keyword(Keyword::Package) => {
                    ast::ProtoElement::Package(self.parse_package(comments)?)
                }
                TokenKind::Keyword(Keyword::Option) => {
                    ast::ProtoElement::Option(self.parse_option(comments)?)
                }
                TokenKind::Keyword(Keyword::Message) => {
                    ast::ProtoElement::Message(self.parse_message(comments)?)
                }
                TokenKind::Keyword(Keyword::Enum) => {
                    ast::ProtoElement::Enum(self.parse_enum(comments)?)
                }
                TokenKind::Keyword(Keyword::Service) => {
                    ast::ProtoElement::Service(self.parse_service(comments)?)
                }
                TokenKind::Keyword(Keyword::Extend) => {
                    ast::ProtoElement::Extend(self.parse_extend(comments)?)
                }
                _ => {
                    return self.scanner.unexpected(
                        &token,
                        "'enum', 'extend', 'import', 'message', 'option', 'package', 'service' or ';'",
                    )
                }
            };
            body.push(element);
        }

        let last = match body.last() {
            Some(element) => element.meta().last.clone(),
            None => syntax.meta.last.clone(),
        };
        Ok(ast::Proto {
            meta: Meta::new(syntax.meta.start.clone(), last),
            syntax,
            body,
        })
    }

    /// `syntax = "proto3";`
    pub fn parse_syntax(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Syntax, ()> {
        let keyword = self.expect_keyword(Keyword::Syntax)?;
        self.expect(TokenKind::Equals, "'='")?;

        let version = self.scanner.next();
        if version.kind != TokenKind::StrLit {
            return self.scanner.unexpected(&version, "a string literal");
        }
        let unquoted = &version.text[1..version.text.len() - 1];
        if unquoted != "proto3" {
            self.scanner.add_error(
                ParseErrorKind::UnknownSyntax {
                    syntax: unquoted.to_owned(),
                    span: version.span.clone(),
                },
                version.pos.clone(),
            );
            return Err(());
        }

        let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
        let inline_comment = self.inline_comment(&semicolon);
        Ok(ast::Syntax {
            version: unquoted.to_owned(),
            comments,
            inline_comment,
            meta: Meta::new(keyword.pos, semicolon.pos),
        })
    }

    /// `import [ "weak" | "public" ] strLit ";"`
    pub fn parse_import(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Import, ()> {
        let keyword = self.expect_keyword(Keyword::Import)?;

        let mut token = self.scanner.scan(Mode::KEYWORD | Mode::STR_LIT);
        let kind = match token.kind {
            TokenKind::Keyword(Keyword::Weak) => Some(ast::ImportKind::Weak),
            TokenKind::Keyword(Keyword::Public) => Some(ast::ImportKind::Public),
            _ => None,
        };
        if kind.is_some() {
            token = self.scanner.next_str_lit();
        }
        if token.kind != TokenKind::StrLit {
            return self.scanner.unexpected(&token, "'weak', 'public' or a string literal");
        }

        let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
        let inline_comment = self.inline_comment(&semicolon);
        Ok(ast::Import {
            kind,
            location: token.text.into_owned(),
            comments,
            inline_comment,
            meta: Meta::new(keyword.pos, semicolon.pos),
        })
    }

    /// `package fullIdent ";"`
    pub fn parse_package(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Package, ()> {
        let keyword = self.expect_keyword(Keyword::Package)?;
        let (name, _) = self.scanner.read_full_ident("a package name")?;
        let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
        let inline_comment = self.inline_comment(&semicolon);
        Ok(ast::Package {
            name,
            comments,
            inline_comment,
            meta: Meta::new(keyword.pos, semicolon.pos),
        })
    }

    /// `option optionName "=" constant ";"`
    pub fn parse_option(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Option, ()> {
        let keyword = self.expect_keyword(Keyword::Option)?;
        let name = self.parse_option_name()?;
        self.expect(TokenKind::Equals, "'='")?;

        let (constant, endpoint) =
            if self.permissive && self.scanner.peek(Mode::DEFAULT).kind == TokenKind::LeftBrace {
                let (endpoint, _) = self.parse_cloud_endpoint()?;
                (String::new(), Some(endpoint))
            } else {
                let (constant, _, _) = self.scanner.read_constant(self.permissive)?;
                (constant, None)
            };

        let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
        let inline_comment = self.inline_comment(&semicolon);
        Ok(ast::Option {
            name,
            constant,
            endpoint,
            comments,
            inline_comment,
            meta: Meta::new(keyword.pos, semicolon.pos),
        })
    }

    /// `( ident | "(" fullIdent ")" ) { "." ident }`
    fn parse_option_name(&mut self) -> Result<String, ()> {
        let token = self.scanner.next();
        let mut name = match token.kind {
            TokenKind::Ident => token.text.into_owned(),
            TokenKind::LeftParen => {
                let (inner, _) = self.scanner.read_message_type("an extension name")?;
                self.expect(TokenKind::RightParen, "')'")?;
                format!("({})", inner)
            }
            _ => return self.scanner.unexpected(&token, "an identifier or '('"),
        };

        self.scanner.read_dotted_tail(&mut name)?;
        Ok(name)
    }

    /// `"[" fieldOption { "," fieldOption } "]"`, if present.
    fn parse_field_options(&mut self) -> Result<Vec<(String, String)>, ()> {
        if self.scanner.peek(Mode::DEFAULT).kind != TokenKind::LeftBracket {
            return Ok(Vec::new());
        }
        self.scanner.next();

        let mut options = Vec::new();
        loop {
            let name = self.parse_option_name()?;
            self.expect(TokenKind::Equals, "'='")?;

            let constant = if self.permissive
                && self.scanner.peek(Mode::DEFAULT).kind == TokenKind::LeftBrace
            {
                self.parse_validator_constant()?
            } else {
                let (constant, _, _) = self.scanner.read_constant(self.permissive)?;
                constant
            };
            options.push((name, constant));

            let token = self.scanner.next();
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::RightBracket => return Ok(options),
                _ => return self.scanner.unexpected(&token, "',' or ']'"),
            }
        }
    }

    /// `message ident "{" { messageBodyElement } "}"`
    pub fn parse_message(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Message, ()> {
        let keyword = self.expect_keyword(Keyword::Message)?;
        let name = self.expect_ident("a message name")?;
        let inline_comment_behind_left_curly = self.parse_left_brace()?;

        let mut body = Vec::new();
        let right = loop {
            let comments = self.scanner.take_comments();
            let token = self.scanner.peek(Mode::KEYWORD);
            match token.kind {
                TokenKind::RightBrace => {
                    self.flush_comments(comments, &mut body, ast::BodyElement::Comment);
                    break self.scanner.next();
                }
                TokenKind::Semicolon => {
                    self.scanner.next();
                    continue;
                }
                TokenKind::Eof | TokenKind::Illegal => {
                    return self.scanner.unexpected(&token, "a message element or '}'")
                }
                _ => (),
            }

            let comments = leading_comments(comments, &token);
            let element = match token.kind {
                TokenKind::Keyword(Keyword::Enum) => {
                    ast::BodyElement::Enum(self.parse_enum(comments)?)
                }
                TokenKind::Keyword(Keyword::Message) => {
                    ast::BodyElement::Message(self.parse_message(comments)?)
                }
                TokenKind::Keyword(Keyword::Option) => {
                    ast::BodyElement::Option(self.parse_option(comments)?)
                }
                TokenKind::Keyword(Keyword::Oneof) => {
                    ast::BodyElement::Oneof(self.parse_oneof(comments)?)
                }
                TokenKind::Keyword(Keyword::Map) => {
                    ast::BodyElement::MapField(self.parse_map_field(comments)?)
                }
                TokenKind::Keyword(Keyword::Reserved) => {
                    ast::BodyElement::Reserved(self.parse_reserved(comments)?)
                }
                TokenKind::Keyword(Keyword::Extend) => {
                    ast::BodyElement::Extend(self.parse_extend(comments)?)
                }
                _ => ast::BodyElement::Field(self.parse_field(comments)?),
            };
            body.push(element);
        };

        let inline_comment = self.inline_comment(&right);
        Ok(ast::Message {
            name,
            body,
            comments,
            inline_comment,
            inline_comment_behind_left_curly,
            meta: Meta::new(keyword.pos, right.pos),
        })
    }

    /// `[ "repeated" | "optional" ] type fieldName "=" fieldNumber [ "[" fieldOptions "]" ] ";"`
    pub fn parse_field(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Field, ()> {
        let first = self.scanner.next_keyword();
        let (repeated, optional) = match first.kind {
            TokenKind::Keyword(Keyword::Repeated) => (true, false),
            TokenKind::Keyword(Keyword::Optional) => (false, true),
            _ => {
                self.scanner.unscan();
                (false, false)
            }
        };

        let ty = self.parse_type()?;
        let name = self.expect_ident("a field name")?;
        self.expect(TokenKind::Equals, "'='")?;
        let number = self.parse_field_number()?;
        let options = self.parse_field_options()?;

        let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
        let inline_comment = self.inline_comment(&semicolon);
        Ok(ast::Field {
            repeated,
            optional,
            ty,
            name,
            number,
            options: options
                .into_iter()
                .map(|(name, constant)| ast::FieldOption { name, constant })
                .collect(),
            comments,
            inline_comment,
            meta: Meta::new(first.pos, semicolon.pos),
        })
    }

    /// `map "<" keyType "," type ">" mapName "=" fieldNumber [ "[" fieldOptions "]" ] ";"`
    pub fn parse_map_field(&mut self, comments: Vec<ast::Comment>) -> Result<ast::MapField, ()> {
        let keyword = self.expect_keyword(Keyword::Map)?;
        self.expect(TokenKind::LeftAngleBracket, "'<'")?;

        let key = self.scanner.next();
        match key.kind {
            TokenKind::Ident if MAP_KEY_TYPES.contains(&key.text.as_ref()) => (),
            TokenKind::Ident | TokenKind::Dot => {
                self.scanner.add_error(
                    ParseErrorKind::InvalidMapKeyType {
                        span: key.span.clone(),
                    },
                    key.pos,
                );
                return Err(());
            }
            _ => return self.scanner.unexpected(&key, "a map key type"),
        }

        self.expect(TokenKind::Comma, "','")?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::RightAngleBracket, "'>'")?;
        let name = self.expect_ident("a field name")?;
        self.expect(TokenKind::Equals, "'='")?;
        let number = self.parse_field_number()?;
        let options = self.parse_field_options()?;

        let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
        let inline_comment = self.inline_comment(&semicolon);
        Ok(ast::MapField {
            key_ty: key.text.into_owned(),
            ty,
            name,
            number,
            options: options
                .into_iter()
                .map(|(name, constant)| ast::FieldOption { name, constant })
                .collect(),
            comments,
            inline_comment,
            meta: Meta::new(keyword.pos, semicolon.pos),
        })
    }

    /// `oneof oneofName "{" { option | oneofField } "}"`
    pub fn parse_oneof(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Oneof, ()> {
        let keyword = self.expect_keyword(Keyword::Oneof)?;
        let name = self.expect_ident("a oneof name")?;
        let inline_comment_behind_left_curly = self.parse_left_brace()?;

        let mut body = Vec::new();
        let right = loop {
            let comments = self.scanner.take_comments();
            let token = self.scanner.peek(Mode::KEYWORD);
            let element = match token.kind {
                TokenKind::RightBrace => {
                    self.flush_comments(comments, &mut body, ast::OneofElement::Comment);
                    break self.scanner.next();
                }
                TokenKind::Semicolon => {
                    self.scanner.next();
                    continue;
                }
                TokenKind::Keyword(Keyword::Option) => {
                    ast::OneofElement::Option(self.parse_option(leading_comments(comments, &token))?)
                }
                TokenKind::Keyword(
                    label @ (Keyword::Repeated | Keyword::Optional | Keyword::Map),
                ) => {
                    self.scanner.add_error(
                        ParseErrorKind::InvalidOneofFieldKind {
                            kind: label.as_str(),
                            span: token.span.clone(),
                        },
                        token.pos,
                    );
                    return Err(());
                }
                TokenKind::Ident | TokenKind::Dot | TokenKind::Keyword(_) => {
                    ast::OneofElement::Field(
                        self.parse_oneof_field(leading_comments(comments, &token))?,
                    )
                }
                _ => return self.scanner.unexpected(&token, "a oneof field, 'option' or '}'"),
            };
            body.push(element);
        };

        let inline_comment = self.inline_comment(&right);
        Ok(ast::Oneof {
            name,
            body,
            comments,
            inline_comment,
            inline_comment_behind_left_curly,
            meta: Meta::new(keyword.pos, right.pos),
        })
    }

    /// `type fieldName "=" fieldNumber [ "[" fieldOptions "]" ] ";"`
    fn parse_oneof_field(&mut self, comments: Vec<ast::Comment>) -> Result<ast::OneofField, ()> {
        let start = self.scanner.peek(Mode::DEFAULT).pos;
        let ty = self.parse_type()?;
        let name = self.expect_ident("a field name")?;
        self.expect(TokenKind::Equals, "'='")?;
        let number = self.parse_field_number()?;
        let options = self.parse_field_options()?;

        let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
        let inline_comment = self.inline_comment(&semicolon);
        Ok(ast::OneofField {
            ty,
            name,
            number,
            options: options
                .into_iter()
                .map(|(name, constant)| ast::FieldOption { name, constant })
                .collect(),
            comments,
            inline_comment,
            meta: Meta::new(start, semicolon.pos),
        })
    }

    /// `enum enumName "{" { option | enumField | reserved } "}"`
    pub fn parse_enum(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Enum, ()> {
        let keyword = self.expect_keyword(Keyword::Enum)?;
        let name = self.expect_ident("an enum name")?;
        let inline_comment_behind_left_curly = self.parse_left_brace()?;

        let mut body = Vec::new();
        let right = loop {
            let comments = self.scanner.take_comments();
            let token = self.scanner.peek(Mode::KEYWORD);
            let element = match token.kind {
                TokenKind::RightBrace => {
                    self.flush_comments(comments, &mut body, ast::EnumElement::Comment);
                    break self.scanner.next();
                }
                TokenKind::Semicolon => {
                    self.scanner.next();
                    continue;
                }
                TokenKind::Keyword(Keyword::Option) => {
                    ast::EnumElement::Option(self.parse_option(leading_comments(comments, &token))?)
                }
                TokenKind::Keyword(Keyword::Reserved) => ast::EnumElement::Reserved(
                    self.parse_reserved(leading_comments(comments, &token))?,
                ),
                TokenKind::Ident | TokenKind::Keyword(_) => ast::EnumElement::Field(
                    self.parse_enum_field(leading_comments(comments, &token))?,
                ),
                _ => {
                    return self
                        .scanner
                        .unexpected(&token, "an enum value, 'option', 'reserved' or '}'")
                }
            };
            body.push(element);
        };

        let inline_comment = self.inline_comment(&right);
        Ok(ast::Enum {
            name,
            body,
            comments,
            inline_comment,
            inline_comment_behind_left_curly,
            meta: Meta::new(keyword.pos, right.pos),
        })
    }

    /// `ident "=" [ "-" ] intLit [ "[" enumValueOption { "," enumValueOption } "]" ] ";"`
    fn parse_enum_field(&mut self, comments: Vec<ast::Comment>) -> Result<ast::EnumField, ()> {
        let name = self.scanner.next();
        if name.kind != TokenKind::Ident {
            return self.scanner.unexpected(&name, "an enum value name");
        }
        self.expect(TokenKind::Equals, "'='")?;

        let number = self.scanner.next_number_lit();
        if number.kind != TokenKind::IntLit {
            return self.scanner.unexpected(&number, "an enum value number");
        }
        let options = self.parse_field_options()?;

        let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
        let inline_comment = self.inline_comment(&semicolon);
        Ok(ast::EnumField {
            name: name.text.into_owned(),
            number: number.text.into_owned(),
            options: options
                .into_iter()
                .map(|(name, constant)| ast::EnumValueOption { name, constant })
                .collect(),
            comments,
            inline_comment,
            meta: Meta::new(name.pos, semicolon.pos),
        })
    }

    /// `reserved ( ranges | fieldNames ) ";"`
    pub fn parse_reserved(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Reserved, ()> {
        let keyword = self.expect_keyword(Keyword::Reserved)?;

        let first = self.scanner.peek(Mode::STR_LIT);
        let kind = match first.kind {
            TokenKind::IntLit => ast::ReservedKind::Ranges(self.parse_reserved_ranges()?),
            TokenKind::StrLit => ast::ReservedKind::FieldNames(self.parse_reserved_names()?),
            _ => {
                return self
                    .scanner
                    .unexpected(&first, "a positive integer or a string literal")
            }
        };

        let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
        let inline_comment = self.inline_comment(&semicolon);
        Ok(ast::Reserved {
            kind,
            comments,
            inline_comment,
            meta: Meta::new(keyword.pos, semicolon.pos),
        })
    }

    /// `range { "," range }`, leaving the terminating `;` unread.
    fn parse_reserved_ranges(&mut self) -> Result<Vec<ast::Range>, ()> {
        let mut ranges = Vec::new();
        loop {
            let begin = self.scanner.next();
            if begin.kind != TokenKind::IntLit {
                return self.scanner.unexpected(&begin, "a positive integer");
            }

            let end = if self.scanner.peek(Mode::KEYWORD).is_keyword(Keyword::To) {
                self.scanner.next();
                let end = self.scanner.next_keyword();
                match end.kind {
                    TokenKind::IntLit => Some(ast::RangeEnd::Number(end.text.into_owned())),
                    TokenKind::Keyword(Keyword::Max) => Some(ast::RangeEnd::Max),
                    _ => return self.scanner.unexpected(&end, "an integer or 'max'"),
                }
            } else {
                None
            };
            ranges.push(ast::Range {
                begin: begin.text.into_owned(),
                end,
            });

            if !self.bump_if(TokenKind::Comma) {
                return Ok(ranges);
            }
        }
    }

    /// `strLit { "," strLit }`, leaving the terminating `;` unread.
    fn parse_reserved_names(&mut self) -> Result<Vec<String>, ()> {
        let mut names = Vec::new();
        loop {
            let name = self.scanner.next_str_lit();
            if name.kind != TokenKind::StrLit {
                return self.scanner.unexpected(&name, "a string literal");
            }
            names.push(name.text.into_owned());

            if !self.bump_if(TokenKind::Comma) {
                return Ok(names);
            }
        }
    }

    /// `extend messageType "{" { field } "}"`
    pub fn parse_extend(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Extend, ()> {
        let keyword = self.expect_keyword(Keyword::Extend)?;
        let (message_type, _) = self.scanner.read_message_type("a message type")?;
        let inline_comment_behind_left_curly = self.parse_left_brace()?;

        let mut body = Vec::new();
        let right = loop {
            let comments = self.scanner.take_comments();
            let token = self.scanner.peek(Mode::KEYWORD);
            match token.kind {
                TokenKind::RightBrace => {
                    self.flush_comments(comments, &mut body, ast::ExtendElement::Comment);
                    break self.scanner.next();
                }
                TokenKind::Semicolon => {
                    self.scanner.next();
                    continue;
                }
                TokenKind::Eof | TokenKind::Illegal => {
                    return self.scanner.unexpected(&token, "a field or '}'")
                }
                _ => {
                    let field = self.parse_field(leading_comments(comments, &token))?;
                    body.push(ast::ExtendElement::Field(field));
                }
            }
        };

        let inline_comment = self.inline_comment(&right);
        Ok(ast::Extend {
            message_type,
            body,
            comments,
            inline_comment,
            inline_comment_behind_left_curly,
            meta: Meta::new(keyword.pos, right.pos),
        })
    }

    /// `service serviceName "{" { option | rpc } "}"`
    pub fn parse_service(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Service, ()> {
        let keyword = self.expect_keyword(Keyword::Service)?;
        let name = self.expect_ident("a service name")?;
        let inline_comment_behind_left_curly = self.parse_left_brace()?;

        let mut body = Vec::new();
        let right = loop {
            let comments = self.scanner.take_comments();
            let token = self.scanner.peek(Mode::KEYWORD);
            let element = match token.kind {
                TokenKind::RightBrace => {
                    self.flush_comments(comments, &mut body, ast::ServiceElement::Comment);
                    break self.scanner.next();
                }
                TokenKind::Semicolon => {
                    self.scanner.next();
                    continue;
                }
                TokenKind::Keyword(Keyword::Option) => ast::ServiceElement::Option(
                    self.parse_option(leading_comments(comments, &token))?,
                ),
                TokenKind::Keyword(Keyword::Rpc) => {
                    ast::ServiceElement::Rpc(self.parse_rpc(leading_comments(comments, &token))?)
                }
                _ => return self.scanner.unexpected(&token, "'rpc', 'option' or '}'"),
            };
            body.push(element);
        };

        let inline_comment = self.inline_comment(&right);
        Ok(ast::Service {
            name,
            body,
            comments,
            inline_comment,
            inline_comment_behind_left_curly,
            meta: Meta::new(keyword.pos, right.pos),
        })
    }

    /// `rpc rpcName "(" [ "stream" ] messageType ")" "returns" "(" [ "stream" ] messageType ")"
    /// ( ( "{" { option } "}" ) | ";" )`
    pub fn parse_rpc(&mut self, comments: Vec<ast::Comment>) -> Result<ast::Rpc, ()> {
        let keyword = self.expect_keyword(Keyword::Rpc)?;
        let name = self.expect_ident("a method name")?;
        let request = self.parse_rpc_type()?;
        self.expect_keyword(Keyword::Returns)?;
        let response = self.parse_rpc_type()?;

        let mut body = Vec::new();
        let mut inline_comment_behind_left_curly = None;
        let terminator = self.scanner.next();
        let last = match terminator.kind {
            TokenKind::Semicolon => terminator,
            TokenKind::LeftBrace => {
                inline_comment_behind_left_curly = self.inline_comment(&terminator);
                loop {
                    let comments = self.scanner.take_comments();
                    let token = self.scanner.peek(Mode::KEYWORD);
                    match token.kind {
                        TokenKind::RightBrace => {
                            self.flush_comments(comments, &mut body, ast::RpcElement::Comment);
                            break self.scanner.next();
                        }
                        TokenKind::Semicolon => {
                            self.scanner.next();
                        }
                        TokenKind::Keyword(Keyword::Option) => {
                            let option = self.parse_option(leading_comments(comments, &token))?;
                            body.push(ast::RpcElement::Option(option));
                        }
                        _ => return self.scanner.unexpected(&token, "'option' or '}'"),
                    }
                }
            }
            _ => return self.scanner.unexpected(&terminator, "'{' or ';'"),
        };

        let inline_comment = self.inline_comment(&last);
        Ok(ast::Rpc {
            name,
            request,
            response,
            body,
            comments,
            inline_comment,
            inline_comment_behind_left_curly,
            meta: Meta::new(keyword.pos, last.pos),
        })
    }

    /// `"(" [ "stream" ] messageType ")"`
    fn parse_rpc_type(&mut self) -> Result<ast::RpcType, ()> {
        self.expect(TokenKind::LeftParen, "'('")?;

        let mut streaming = false;
        let message_type = if self.scanner.next_keyword().is_keyword(Keyword::Stream) {
            if self.scanner.peek(Mode::DEFAULT).kind == TokenKind::RightParen {
                Keyword::Stream.as_str().to_owned()
            } else {
                streaming = true;
                self.scanner.read_message_type("a message type")?.0
            }
        } else {
            self.scanner.unscan();
            self.scanner.read_message_type("a message type")?.0
        };

        self.expect(TokenKind::RightParen, "')'")?;
        Ok(ast::RpcType {
            streaming,
            message_type,
        })
    }

    /// A scalar type name or a message or enum type reference.
    fn parse_type(&mut self) -> Result<String, ()> {
        let (ty, _) = self.scanner.read_message_type("a type")?;
        Ok(ty)
    }

    fn parse_field_number(&mut self) -> Result<String, ()> {
        let number = self.scanner.next();
        if number.kind != TokenKind::IntLit {
            return self.scanner.unexpected(&number, "a field number");
        }
        Ok(number.text.into_owned())
    }

    /// Reads `{` and the comment on the same line after it, if any.
    fn parse_left_brace(&mut self) -> Result<Option<ast::Comment>, ()> {
        let left = self.expect(TokenKind::LeftBrace, "'{'")?;
        Ok(self.inline_comment(&left))
    }

    /// Returns the comment directly after `terminator` on the same line, if any.
    ///
    /// Comments still pending from inside the declaration are dropped.
    fn inline_comment(&mut self, terminator: &Scanned<'a>) -> Option<ast::Comment> {
        self.scanner.discard_pending_before(terminator.span.end);

        let token = self.scanner.next_comment();
        if token.kind == TokenKind::Comment && token.pos.line == terminator.pos.line {
            Some(token.to_comment())
        } else {
            self.scanner.unscan();
            None
        }
    }

    fn flush_comments<E>(
        &self,
        comments: Vec<ast::Comment>,
        body: &mut Vec<E>,
        f: impl Fn(ast::Comment) -> E,
    ) {
        if self.body_including_comments {
            body.extend(comments.into_iter().map(f));
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Scanned<'a>, ()> {
        let token = self.scanner.next();
        if token.kind == kind {
            Ok(token)
        } else {
            self.scanner.unexpected(&token, expected)
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<Scanned<'a>, ()> {
        let token = self.scanner.next_keyword();
        if token.is_keyword(keyword) {
            Ok(token)
        } else {
            self.scanner.unexpected(&token, &format!("'{}'", keyword))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String, ()> {
        let token = self.scanner.next();
        if token.kind == TokenKind::Ident {
            Ok(token.text.into_owned())
        } else {
            self.scanner.unexpected(&token, expected)
        }
    }

    fn bump_if(&mut self, kind: TokenKind) -> bool {
        if self.scanner.next().kind == kind {
            true
        } else {
            self.scanner.unscan();
            false
        }
    }
}

/// Keeps the comments that end on a line before `token`.
fn leading_comments(comments: Vec<ast::Comment>, token: &Scanned) -> Vec<ast::Comment> {
    comments
        .into_iter()
        .filter(|comment| comment.meta.last.line < token.pos.line)
        .collect()
}
