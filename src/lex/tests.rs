use super::*;

#[test]
fn simple_tokens() {
    let source = r#"hell0 052 42 0x2A 5. 0.5 0.42e+2 2e-4 .2e+3 52e3 true
        false "hello \a\b\f\n\r\t\v\?\\\'\" \052 \x2a" 'hello 😀' _foo"#;
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("hell0")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::IntLiteral("052")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::IntLiteral("42")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::IntLiteral("0x2A")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::FloatLiteral("5.")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::FloatLiteral("0.5")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::FloatLiteral("0.42e+2")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::FloatLiteral("2e-4")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::FloatLiteral(".2e+3")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::FloatLiteral("52e3")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("true")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("false")));
    assert_eq!(
        lexer.next().unwrap(),
        Ok(Token::StringLiteral(
            r#""hello \a\b\f\n\r\t\v\?\\\'\" \052 \x2a""#
        ))
    );
    assert_eq!(
        lexer.next().unwrap(),
        Ok(Token::StringLiteral("'hello 😀'"))
    );
    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("_foo")));
    assert_eq!(lexer.next(), None);

    assert_eq!(lexer.extras.errors, vec![]);
}

#[test]
fn punctuation() {
    let source = ". - + ( ) { } [ ] < > , = : ; /";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next().unwrap(), Ok(Token::Dot));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Minus));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Plus));
    assert_eq!(lexer.next().unwrap(), Ok(Token::LeftParen));
    assert_eq!(lexer.next().unwrap(), Ok(Token::RightParen));
    assert_eq!(lexer.next().unwrap(), Ok(Token::LeftBrace));
    assert_eq!(lexer.next().unwrap(), Ok(Token::RightBrace));
    assert_eq!(lexer.next().unwrap(), Ok(Token::LeftBracket));
    assert_eq!(lexer.next().unwrap(), Ok(Token::RightBracket));
    assert_eq!(lexer.next().unwrap(), Ok(Token::LeftAngleBracket));
    assert_eq!(lexer.next().unwrap(), Ok(Token::RightAngleBracket));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Comma));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Equals));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Colon));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Semicolon));
    assert_eq!(lexer.next().unwrap(), Ok(Token::ForwardSlash));
    assert_eq!(lexer.next(), None);
}

#[test]
fn invalid_octal() {
    let source = "089 4";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next(), Some(Ok(Token::IntLiteral("089"))));
    assert_eq!(lexer.next(), Some(Ok(Token::IntLiteral("4"))));
    assert_eq!(lexer.next(), None);

    assert_eq!(
        lexer.extras.errors,
        vec![ParseErrorKind::InvalidNumber { span: 0..3 }]
    );
}

#[test]
fn line_comments() {
    let source = "foo // bar \r\n  // quz\nbar";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next(), Some(Ok(Token::Ident("foo"))));
    assert_eq!(lexer.next(), Some(Ok(Token::LineComment("// bar "))));
    assert_eq!(lexer.next(), Some(Ok(Token::LineComment("// quz"))));
    assert_eq!(lexer.next(), Some(Ok(Token::Ident("bar"))));
    assert_eq!(lexer.next(), None);
    assert_eq!(lexer.extras.errors, vec![]);
}

#[test]
fn block_comments() {
    let source = "foo /* bar\n * baz */ quz /**/";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next(), Some(Ok(Token::Ident("foo"))));
    assert_eq!(
        lexer.next(),
        Some(Ok(Token::BlockComment("/* bar\n * baz */")))
    );
    assert_eq!(lexer.next(), Some(Ok(Token::Ident("quz"))));
    assert_eq!(lexer.next(), Some(Ok(Token::BlockComment("/**/"))));
    assert_eq!(lexer.next(), None);
    assert_eq!(lexer.extras.errors, vec![]);
}

#[test]
fn unterminated_block_comment() {
    let source = "foo /* bar";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next(), Some(Ok(Token::Ident("foo"))));
    assert_eq!(lexer.next(), Some(Ok(Token::BlockComment("/* bar"))));
    assert_eq!(lexer.next(), None);
    assert_eq!(
        lexer.extras.errors,
        vec![ParseErrorKind::UnterminatedComment { span: 4..10 }]
    );
}

#[test]
fn string_unterminated() {
    let source = "\"hello \n foo";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next(), Some(Ok(Token::StringLiteral("\"hello "))));
    assert_eq!(
        lexer.extras.errors,
        vec![ParseErrorKind::UnterminatedString { span: 0..7 }]
    );
}

#[test]
fn string_unterminated_at_eof() {
    let source = "'hello";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next(), Some(Ok(Token::StringLiteral("'hello"))));
    assert_eq!(lexer.next(), None);
    assert_eq!(
        lexer.extras.errors,
        vec![ParseErrorKind::UnterminatedString { span: 0..6 }]
    );
}

#[test]
fn string_invalid_escape() {
    let source = r#""\m""#;
    let mut lexer = Token::lexer(source);

    lexer.next();
    assert!(matches!(
        lexer.extras.errors.as_slice(),
        [ParseErrorKind::InvalidStringEscape { span }] if span.start == 1
    ));
}

#[test]
fn string_mixed_quotes() {
    let source = r#""it's" 'say "hi"'"#;
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next(), Some(Ok(Token::StringLiteral(r#""it's""#))));
    assert_eq!(
        lexer.next(),
        Some(Ok(Token::StringLiteral(r#"'say "hi"'"#)))
    );
    assert_eq!(lexer.next(), None);
    assert_eq!(lexer.extras.errors, vec![]);
}

#[test]
fn invalid_token() {
    let source = "foo @ bar";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next(), Some(Ok(Token::Ident("foo"))));
    assert_eq!(lexer.next(), Some(Err(())));
    assert_eq!(lexer.span(), 4..5);
    assert_eq!(lexer.next(), Some(Ok(Token::Ident("bar"))));
}

#[test]
fn number_predicates() {
    assert!(Token::IntLiteral("1").is_number());
    assert!(Token::FloatLiteral("1.5").is_number());
    assert!(Token::Ident("inf").is_number());
    assert!(!Token::Ident("foo").is_number());
    assert!(Token::LineComment("// a").is_comment());
    assert!(!Token::Semicolon.is_comment());
}
