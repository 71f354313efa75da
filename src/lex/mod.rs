#[cfg(test)]
mod tests;

use logos::{Lexer, Logos};

use crate::error::ParseErrorKind;

/// A raw token, before any mode-dependent interpretation by the scanner.
///
/// Literals keep their source text: string literals are validated but not decoded, and include
/// their quotes.
#[derive(Debug, Clone, Copy, Logos, PartialEq, Eq)]
#[logos(extras = TokenExtras)]
#[logos(skip r"[\t\v\f\r\n ]+")]
#[logos(subpattern exponent = r"[eE][+\-]?[0-9]+")]
pub(crate) enum Token<'a> {
    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Ident(&'a str),
    #[regex("0[0-9]*", int)]
    #[regex("[1-9][0-9]*")]
    #[regex("0[xX][0-9A-Fa-f]+")]
    IntLiteral(&'a str),
    #[regex(r#"[0-9]+\.[0-9]*(?&exponent)?"#)]
    #[regex(r#"[0-9]+(?&exponent)"#)]
    #[regex(r#"\.[0-9]+(?&exponent)?"#)]
    FloatLiteral(&'a str),
    #[regex(r#"'|""#, string)]
    StringLiteral(&'a str),
    #[token(".")]
    Dot,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("<")]
    LeftAngleBracket,
    #[token(">")]
    RightAngleBracket,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("/")]
    ForwardSlash,
    #[regex(r#"//[^\n]*"#, line_comment)]
    LineComment(&'a str),
    #[token(r#"/*"#, block_comment)]
    BlockComment(&'a str),
}

impl Token<'_> {
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment(_) | Token::BlockComment(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Token::IntLiteral(_) | Token::FloatLiteral(_) | Token::Ident("inf" | "nan")
        )
    }
}

#[derive(Debug, Default)]
pub(crate) struct TokenExtras {
    pub errors: Vec<ParseErrorKind>,
}

/// Decimal and hex literals are fully described by their regexes. Octal literals share a prefix
/// with decimal ones, so a leading zero followed by `8` or `9` is rejected here.
fn int<'a>(lex: &mut Lexer<'a, Token<'a>>) -> &'a str {
    if lex.slice().bytes().any(|b| b == b'8' || b == b'9') {
        lex.extras
            .errors
            .push(ParseErrorKind::InvalidNumber { span: lex.span() });
    }
    lex.slice()
}

fn string<'a>(lex: &mut Lexer<'a, Token<'a>>) -> &'a str {
    #[derive(Logos)]
    #[logos(subpattern hex = r"[0-9A-Fa-f]")]
    enum Component {
        #[regex(r#"[^\x00\n\\'"]+"#)]
        Unescaped,
        #[regex(r#"['"]"#, |lex| lex.slice().as_bytes()[0])]
        Terminator(u8),
        #[regex(r#"\\[xX](?&hex)(?&hex)?"#)]
        #[regex(r#"\\[0-7][0-7]?[0-7]?"#)]
        #[regex(r#"\\[abfnrtv?\\'"]"#)]
        #[regex(r#"\\u(?&hex)(?&hex)(?&hex)(?&hex)"#)]
        #[regex(r#"\\U(?&hex)(?&hex)(?&hex)(?&hex)(?&hex)(?&hex)(?&hex)(?&hex)"#)]
        Escape,
    }

    let start = lex.span().start;
    let terminator = lex.slice().as_bytes()[0];
    let mut char_lexer = Component::lexer(lex.remainder());

    let len = loop {
        match char_lexer.next() {
            Some(Ok(Component::Terminator(t))) if t == terminator => break char_lexer.span().end,
            Some(Ok(Component::Unescaped | Component::Terminator(_) | Component::Escape)) => {}
            Some(Err(())) => {
                let err_start = lex.span().end + char_lexer.span().start;
                let err_end = lex.span().end + char_lexer.span().end;

                let err = if char_lexer.slice().contains('\n') {
                    ParseErrorKind::UnterminatedString {
                        span: start..err_start,
                    }
                } else if char_lexer.slice().starts_with('\\') {
                    ParseErrorKind::InvalidStringEscape {
                        span: err_start..err_end,
                    }
                } else {
                    ParseErrorKind::InvalidStringCharacters {
                        span: err_start..err_end,
                    }
                };
                lex.extras.errors.push(err);
                break char_lexer.span().start;
            }
            None => {
                lex.extras.errors.push(ParseErrorKind::UnterminatedString {
                    span: start..lex.source().len(),
                });
                break lex.remainder().len();
            }
        }
    };

    lex.bump(len);
    lex.slice()
}

fn line_comment<'a>(lex: &mut Lexer<'a, Token<'a>>) -> &'a str {
    lex.slice().trim_end_matches('\r')
}

fn block_comment<'a>(lex: &mut Lexer<'a, Token<'a>>) -> &'a str {
    match lex.remainder().find("*/") {
        Some(index) => lex.bump(index + 2),
        None => {
            lex.extras.errors.push(ParseErrorKind::UnterminatedComment {
                span: lex.span().start..lex.source().len(),
            });
            lex.bump(lex.remainder().len());
        }
    }
    lex.slice()
}
