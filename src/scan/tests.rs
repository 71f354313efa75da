use super::*;

fn scanner(source: &str) -> Scanner<'_> {
    Scanner::new(source, "<input>".into(), false)
}

#[test]
fn keywords_depend_on_mode() {
    let mut scanner = scanner("message message");

    let token = scanner.next_keyword();
    assert_eq!(token.kind, TokenKind::Keyword(Keyword::Message));
    let token = scanner.next();
    assert_eq!(token.kind, TokenKind::Ident);
    assert_eq!(token.text, "message");
    assert_eq!(scanner.next().kind, TokenKind::Eof);
}

#[test]
fn unscan_and_peek() {
    let mut scanner = scanner("foo = 1;");

    assert_eq!(scanner.peek(Mode::DEFAULT).text, "foo");
    assert_eq!(scanner.next().text, "foo");
    assert_eq!(scanner.next().kind, TokenKind::Equals);
    scanner.unscan();
    assert_eq!(scanner.next().kind, TokenKind::Equals);
    assert_eq!(scanner.next().kind, TokenKind::IntLit);
    assert_eq!(scanner.next().kind, TokenKind::Semicolon);
    assert_eq!(scanner.next().kind, TokenKind::Eof);
}

#[test]
fn positions() {
    let mut scanner = scanner("syntax = \"proto3\";\nmessage Foo {}");

    let token = scanner.next();
    assert_eq!(token.pos.offset, 0);
    assert_eq!((token.pos.line, token.pos.column), (1, 1));
    assert_eq!((token.last.line, token.last.column), (1, 6));

    scanner.next();
    let string = scanner.next_str_lit();
    assert_eq!(string.text, "\"proto3\"");
    assert_eq!(string.pos.offset, 9);
    assert_eq!(string.pos.column, 10);

    let semicolon = scanner.next();
    assert_eq!(semicolon.pos.offset, 17);
    assert_eq!(semicolon.pos.column, 18);

    let message = scanner.next_keyword();
    assert_eq!(message.pos.offset, 19);
    assert_eq!((message.pos.line, message.pos.column), (2, 1));
    assert_eq!(scanner.position(), message.pos);
}

#[test]
fn signed_numbers() {
    let mut scanner = scanner("-1 - 2 -inf +1.5");

    let token = scanner.next_number_lit();
    assert_eq!(token.kind, TokenKind::IntLit);
    assert_eq!(token.text, "-1");

    // The sign is only joined when it directly precedes the number.
    assert_eq!(scanner.next_number_lit().kind, TokenKind::Minus);
    assert_eq!(scanner.next_number_lit().text, "2");

    let token = scanner.next_number_lit();
    assert_eq!(token.kind, TokenKind::FloatLit);
    assert_eq!(token.text, "-inf");

    let token = scanner.next_lit();
    assert_eq!(token.kind, TokenKind::FloatLit);
    assert_eq!(token.text, "+1.5");
}

#[test]
fn signs_are_separate_by_default() {
    let mut scanner = scanner("-1");

    assert_eq!(scanner.next().kind, TokenKind::Minus);
    assert_eq!(scanner.next().kind, TokenKind::IntLit);
}

#[test]
fn bool_and_float_idents() {
    let mut scanner = scanner("true nan true");

    assert_eq!(scanner.next_lit().kind, TokenKind::BoolLit);
    assert_eq!(scanner.next_lit().kind, TokenKind::FloatLit);
    assert_eq!(scanner.next().kind, TokenKind::Ident);
}

#[test]
fn adjacent_strings() {
    let mut scanner = scanner("\"foo\" 'bar'\n\"baz\";");

    let token = scanner.next_str_lit();
    assert_eq!(token.kind, TokenKind::StrLit);
    assert_eq!(token.text, "\"foobarbaz\"");
    assert_eq!(token.span, 0..17);
    assert_eq!(token.last.line, 2);
    assert_eq!(scanner.next().kind, TokenKind::Semicolon);
}

#[test]
fn strings_are_not_joined_by_default() {
    let mut scanner = scanner("\"foo\" \"bar\"");

    assert_eq!(scanner.next().text, "\"foo\"");
    assert_eq!(scanner.next().text, "\"bar\"");
}

#[test]
fn comments_are_buffered() {
    let mut scanner = scanner("// one\n/* two */ foo // three\nbar");

    let token = scanner.next();
    assert_eq!(token.text, "foo");

    let comment = scanner.next_comment();
    assert_eq!(comment.kind, TokenKind::Comment);
    assert_eq!(comment.text, "// one");
    scanner.unscan();

    let comments = scanner.take_comments();
    let raw: Vec<_> = comments.iter().map(|c| c.raw.as_str()).collect();
    assert_eq!(raw, ["// one", "/* two */", "// three"]);

    assert_eq!(scanner.next().text, "bar");
}

#[test]
fn comment_positions() {
    let mut scanner = scanner("foo /* a\nb */");

    scanner.next();
    let comment = scanner.next_comment();
    assert_eq!(comment.kind, TokenKind::Comment);
    assert_eq!(comment.pos.offset, 4);
    assert_eq!((comment.last.line, comment.last.column), (2, 4));
}

#[test]
fn discard_pending() {
    let mut scanner = scanner("a /* x */ ; // y");

    scanner.next();
    let semicolon = scanner.next();
    assert_eq!(semicolon.kind, TokenKind::Semicolon);
    scanner.discard_pending_before(semicolon.span.end);

    let comment = scanner.next_comment();
    assert_eq!(comment.text, "// y");
}

#[test]
fn full_ident() {
    let mut scanner = scanner("foo.bar.baz;");

    let (name, first) = scanner.read_full_ident("a name").unwrap();
    assert_eq!(name, "foo.bar.baz");
    assert_eq!(first.text, "foo");
    assert_eq!(scanner.next().kind, TokenKind::Semicolon);
}

#[test]
fn message_type() {
    let mut scanner = scanner(".foo.Bar baz");

    let (name, _) = scanner.read_message_type("a type").unwrap();
    assert_eq!(name, ".foo.Bar");
    assert_eq!(scanner.next().text, "baz");
}

#[test]
fn message_type_missing_ident() {
    let mut scanner = scanner("foo.;");

    assert!(scanner.read_message_type("a type").is_err());
    let (err, pos) = scanner.take_error().unwrap();
    assert_eq!(
        err,
        ParseErrorKind::UnexpectedToken {
            expected: "an identifier".to_owned(),
            found: ";".to_owned(),
            span: 4..5,
        }
    );
    assert_eq!(pos.column, 5);
}

#[test]
fn constants() {
    let mut scanner = scanner("-5 \"a\" \"b\" true foo.bar 1.5e3");

    let (constant, _, _) = scanner.read_constant(false).unwrap();
    assert_eq!(constant, "-5");
    let (constant, _, _) = scanner.read_constant(false).unwrap();
    assert_eq!(constant, "\"ab\"");
    let (constant, _, _) = scanner.read_constant(false).unwrap();
    assert_eq!(constant, "true");
    let (constant, first, last) = scanner.read_constant(false).unwrap();
    assert_eq!(constant, "foo.bar");
    assert_eq!(first.pos.offset, 16);
    assert_eq!(last.offset, 20);
    let (constant, _, _) = scanner.read_constant(false).unwrap();
    assert_eq!(constant, "1.5e3");
}

#[test]
fn message_literal_requires_permissive() {
    let mut scanner = scanner("{ a: 1 }");

    assert!(scanner.read_constant(false).is_err());
    assert_eq!(
        scanner.take_error().unwrap().0,
        ParseErrorKind::PermissiveOnly { span: 0..1 }
    );
}

#[test]
fn first_error_wins() {
    let mut scanner = scanner("@ #");

    assert_eq!(scanner.next().kind, TokenKind::Illegal);
    assert_eq!(scanner.next().kind, TokenKind::Illegal);
    assert_eq!(
        scanner.take_error().unwrap().0,
        ParseErrorKind::InvalidToken { span: 0..1 }
    );
}

#[test]
fn unexpected_eof() {
    let mut scanner = scanner("foo\n");

    scanner.next();
    let eof = scanner.next();
    assert_eq!(eof.kind, TokenKind::Eof);
    assert!(scanner.unexpected::<()>(&eof, "';'").is_err());

    let (err, pos) = scanner.take_error().unwrap();
    assert_eq!(
        err,
        ParseErrorKind::UnexpectedEof {
            expected: "';'".to_owned(),
            span: 4..4,
        }
    );
    assert_eq!((pos.line, pos.column), (2, 1));
}

#[test]
fn lexer_errors_are_positioned() {
    let mut scanner = scanner("foo \"bar\\q\"");

    scanner.next();
    assert_eq!(scanner.next().kind, TokenKind::Illegal);
    let (err, pos) = scanner.take_error().unwrap();
    assert!(matches!(err, ParseErrorKind::InvalidStringEscape { .. }));
    assert_eq!(pos.offset, 8);
    assert_eq!(pos.column, 9);
}
