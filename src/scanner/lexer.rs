use winnow::ascii::digit1;
use winnow::combinator::{alt, cut_err, delimited, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location};
use winnow::token::{any, one_of, rest, take_till, take_while};

use crate::error::{CompileError, ErrorSink};
use crate::scanner::token::{Literal, Span, Token, TokenKind, keyword_kind};

type Input<'a> = LocatingSlice<&'a str>;

/// Kind and literal value recognized for one lexeme. The lexeme text and
/// position are taken from the cursor by the caller.
type Lexeme = (TokenKind, Option<Literal>);

/// Skips whitespace and `//` comments, returning how many newlines were crossed.
fn trivia<'a>(input: &mut Input<'a>) -> ModalResult<usize> {
    let mut newlines = 0;
    loop {
        let ws: &str = take_while(0.., |c: char| matches!(c, ' ' | '\r' | '\t' | '\n'))
            .parse_next(input)?;
        newlines += ws.matches('\n').count();

        if input.starts_with("//") {
            take_till(0.., '\n').void().parse_next(input)?;
        } else if ws.is_empty() {
            break;
        }
    }
    Ok(newlines)
}

/// A missing closing quote cuts, so the caller can tell it apart from an
/// unrecognized character.
fn string_literal<'a>(input: &mut Input<'a>) -> ModalResult<Lexeme> {
    let body: &str = delimited('"', take_till(0.., '"'), cut_err('"')).parse_next(input)?;
    Ok((TokenKind::String, Some(Literal::String(body.to_string()))))
}

fn number_literal<'a>(input: &mut Input<'a>) -> ModalResult<Lexeme> {
    let value = (digit1, opt(('.', digit1)))
        .take()
        .try_map(str::parse::<f64>)
        .parse_next(input)?;
    Ok((TokenKind::Number, Some(Literal::Number(value))))
}

fn identifier_or_keyword<'a>(input: &mut Input<'a>) -> ModalResult<Lexeme> {
    let text: &str = (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)?;
    Ok((keyword_kind(text).unwrap_or(TokenKind::Identifier), None))
}

fn two_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Lexeme> {
    let kind = alt((
        "!=".value(TokenKind::BangEqual),
        "==".value(TokenKind::EqualEqual),
        ">=".value(TokenKind::GreaterEqual),
        "<=".value(TokenKind::LessEqual),
    ))
    .parse_next(input)?;
    Ok((kind, None))
}

fn single_char_kind(c: char) -> Option<TokenKind> {
    let kind = match c {
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Dot,
        '-' => TokenKind::Minus,
        '+' => TokenKind::Plus,
        ';' => TokenKind::Semicolon,
        '/' => TokenKind::Slash,
        '*' => TokenKind::Star,
        '!' => TokenKind::Bang,
        '=' => TokenKind::Equal,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        _ => return None,
    };
    Some(kind)
}

fn single_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Lexeme> {
    let kind = any.verify_map(single_char_kind).parse_next(input)?;
    Ok((kind, None))
}

fn lexeme<'a>(input: &mut Input<'a>) -> ModalResult<Lexeme> {
    alt((
        string_literal,
        number_literal,
        identifier_or_keyword,
        two_char_token,
        single_char_token,
    ))
    .parse_next(input)
}

/// Single-pass scanner state. `start` marks the beginning of the lexeme being
/// scanned, the input cursor is the current position, and `line` counts
/// newlines consumed so far.
pub struct Lexer<'a> {
    source: &'a str,
    input: Input<'a>,
    start: usize,
    line: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            input: LocatingSlice::new(source),
            start: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    /// Scan to the end of input. Lexical errors go to `sink`; the returned
    /// tokens always end with exactly one `Eof`.
    pub fn scan_tokens(mut self, sink: &mut impl ErrorSink) -> Vec<Token> {
        loop {
            match trivia.parse_next(&mut self.input) {
                Ok(newlines) => self.line += newlines,
                Err(_) => break,
            }
            if self.input.is_empty() {
                break;
            }
            self.start = self.current();
            self.scan_token(sink);
        }

        let eof_offset = self.source.len();
        self.tokens.push(Token::new(
            TokenKind::Eof,
            "",
            self.line,
            Span::new(eof_offset, 0),
        ));
        self.tokens
    }

    fn current(&self) -> usize {
        self.input.current_token_start()
    }

    fn scan_token(&mut self, sink: &mut impl ErrorSink) {
        let checkpoint = self.input.checkpoint();
        match lexeme.parse_next(&mut self.input) {
            Ok((kind, literal)) => self.add_token(kind, literal),
            Err(ErrMode::Cut(_)) => {
                // Unterminated string: the body runs to end of input.
                self.input.reset(&checkpoint);
                if let Ok(body) = rest::<_, ContextError>.parse_next(&mut self.input) {
                    self.line += body.matches('\n').count();
                    sink.report(CompileError::scan(
                        "unterminated string",
                        self.line,
                        Span::new(self.start, body.len()),
                    ));
                }
            }
            Err(_) => {
                self.input.reset(&checkpoint);
                if let Ok(c) = any::<_, ContextError>.parse_next(&mut self.input) {
                    sink.report(CompileError::scan(
                        format!("unexpected character '{c}'"),
                        self.line,
                        Span::new(self.start, c.len_utf8()),
                    ));
                }
            }
        }
    }

    fn add_token(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let end = self.current();
        let source = self.source;
        let text = &source[self.start..end];
        self.line += text.matches('\n').count();
        let token = Token::new(kind, text, self.line, Span::new(self.start, end - self.start));
        self.tokens.push(match literal {
            Some(literal) => token.with_literal(literal),
            None => token,
        });
    }
}

/// Scan all tokens from source, returning either a token list or scan errors.
pub fn scan_all(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    let mut errors: Vec<CompileError> = Vec::new();
    let tokens = Lexer::new(source).scan_tokens(&mut errors);
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn scan_ok(source: &str) -> Vec<Token> {
        scan_all(source).expect("scan should succeed")
    }

    fn scan_lossy(source: &str) -> (Vec<Token>, Vec<CompileError>) {
        let mut errors: Vec<CompileError> = Vec::new();
        let tokens = Lexer::new(source).scan_tokens(&mut errors);
        (tokens, errors)
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn single_char_tokens() {
        let tokens = scan_ok("(){},.-+;/*");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Semicolon,
                TokenKind::Slash,
                TokenKind::Star,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_tokens() {
        let tokens = scan_ok("!= == >= <=");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::BangEqual,
                TokenKind::EqualEqual,
                TokenKind::GreaterEqual,
                TokenKind::LessEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn single_then_equal() {
        let tokens = scan_ok("! = < >");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Bang,
                TokenKind::Equal,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn adjacent_operators_take_longest_match() {
        let tokens = scan_ok("!==");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::BangEqual, TokenKind::Equal, TokenKind::Eof]
        );
    }

    #[test]
    fn string_literal_keeps_quotes_in_lexeme() {
        let tokens = scan_ok("\"hello world\"");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "\"hello world\"");
        assert_eq!(
            tokens[0].literal,
            Some(Literal::String("hello world".to_string()))
        );
    }

    #[test]
    fn string_backslashes_are_not_escapes() {
        let tokens = scan_ok(r#""a\nb""#);
        assert_eq!(tokens[0].literal, Some(Literal::String(r"a\nb".to_string())));
    }

    #[test]
    fn multiline_string_advances_line() {
        let tokens = scan_ok("\"one\ntwo\"\nx");
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[0].literal, Some(Literal::String("one\ntwo".to_string())));
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].line, 3);
        assert_eq!(tokens[2].line, 3);
    }

    #[test]
    fn number_integer() {
        let tokens = scan_ok("42");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[0].literal, Some(Literal::Number(42.0)));
    }

    #[test]
    fn number_decimal() {
        let tokens = scan_ok("3.14");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "3.14");
        assert_eq!(tokens[0].literal, Some(Literal::Number(3.14)));
    }

    #[test]
    fn number_no_trailing_dot() {
        let tokens = scan_ok("42.foo");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn leading_dot_is_not_part_of_number() {
        let tokens = scan_ok(".5");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Dot, TokenKind::Number, TokenKind::Eof]
        );
        assert_eq!(tokens[1].lexeme, "5");
    }

    #[test]
    fn identifiers_and_keywords() {
        let tokens = scan_ok("var x = true");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::True,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn all_keywords() {
        let source =
            "and class else false fun for if nil or print return super this true var while";
        let tokens = scan_ok(source);
        let expected = vec![
            TokenKind::And,
            TokenKind::Class,
            TokenKind::Else,
            TokenKind::False,
            TokenKind::Fun,
            TokenKind::For,
            TokenKind::If,
            TokenKind::Nil,
            TokenKind::Or,
            TokenKind::Print,
            TokenKind::Return,
            TokenKind::Super,
            TokenKind::This,
            TokenKind::True,
            TokenKind::Var,
            TokenKind::While,
            TokenKind::Eof,
        ];
        assert_eq!(kinds(&tokens), expected);
    }

    #[rstest]
    #[case("ander")]
    #[case("_and")]
    #[case("And")]
    #[case("classy")]
    #[case("nil_")]
    #[case("x1")]
    fn keyword_prefixes_are_identifiers(#[case] source: &str) {
        let tokens = scan_ok(source);
        assert_eq!(kinds(&tokens), vec![TokenKind::Identifier, TokenKind::Eof]);
        assert_eq!(tokens[0].lexeme, source);
    }

    #[test]
    fn comments_ignored() {
        let tokens = scan_ok("var x // this is a comment\nvar y");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn comment_at_end_of_input() {
        let tokens = scan_ok("1 // trailing");
        assert_eq!(kinds(&tokens), vec![TokenKind::Number, TokenKind::Eof]);
        assert_eq!(tokens[1].line, 1);
    }

    #[test]
    fn spans_are_correct() {
        let tokens = scan_ok("var x = 42;");
        assert_eq!(tokens[0].span, Span::new(0, 3)); // var
        assert_eq!(tokens[1].span, Span::new(4, 1)); // x
        assert_eq!(tokens[2].span, Span::new(6, 1)); // =
        assert_eq!(tokens[3].span, Span::new(8, 2)); // 42
        assert_eq!(tokens[4].span, Span::new(10, 1)); // ;
        assert_eq!(tokens[5].span, Span::new(11, 0)); // EOF
    }

    #[test]
    fn lines_are_tracked() {
        let tokens = scan_ok("a\nb\r\n\n\tc");
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 4, 4]);
    }

    #[test]
    fn unexpected_character_error() {
        let result = scan_all("var x = @;");
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains('@'));
    }

    #[test]
    fn unexpected_character_is_skipped() {
        let (tokens, errors) = scan_lossy("1 # 2");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn non_ascii_character_is_one_error() {
        let (tokens, errors) = scan_lossy("é+");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "unexpected character 'é'");
        assert_eq!(kinds(&tokens), vec![TokenKind::Plus, TokenKind::Eof]);
        assert_eq!(tokens[0].span, Span::new(2, 1));
    }

    #[test]
    fn unterminated_string_error() {
        let (tokens, errors) = scan_lossy("\"unterminated");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "unterminated string");
        assert_eq!(kinds(&tokens), vec![TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_reports_final_line() {
        let (tokens, errors) = scan_lossy("x \"one\ntwo\nthree");
        assert_eq!(errors[0].line(), 3);
        assert_eq!(kinds(&tokens), vec![TokenKind::Identifier, TokenKind::Eof]);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn every_error_is_reported() {
        let (tokens, errors) = scan_lossy("@\n$ ok\n\"open");
        let lines: Vec<usize> = errors.iter().map(|e| e.line()).collect();
        assert_eq!(lines, vec![1, 2, 3]);
        assert_eq!(kinds(&tokens), vec![TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn multiline_program() {
        let source = "var x = 1;\nvar y = 2;\nprint x + y;";
        let tokens = scan_ok(source);
        assert_eq!(tokens.len(), 16); // 15 tokens + EOF
        assert_eq!(tokens[15].line, 3);
    }

    #[test]
    fn displayed_kinds_scan_back_to_themselves() {
        use strum::IntoEnumIterator;

        let spelled = TokenKind::iter().filter(|k| {
            !matches!(
                k,
                TokenKind::Identifier | TokenKind::String | TokenKind::Number | TokenKind::Eof
            )
        });
        for kind in spelled {
            let text = kind.to_string();
            let tokens = scan_ok(&text);
            assert_eq!(kinds(&tokens), vec![kind, TokenKind::Eof], "'{text}'");
            assert_eq!(tokens[0].lexeme, text);
        }
        assert_eq!(TokenKind::LeftBrace.to_string(), "{");
        assert_eq!(TokenKind::RightBrace.to_string(), "}");
        assert_eq!(Token::synthetic(TokenKind::LeftBrace, 1).lexeme, "{");
    }

    #[rstest]
    #[case("empty", "", &[TokenKind::Eof])]
    #[case("whitespace only", " \t\r\n ", &[TokenKind::Eof])]
    #[case("comment only", "// nothing here", &[TokenKind::Eof])]
    #[case(
        "slash is division",
        "4 / 2",
        &[TokenKind::Number, TokenKind::Slash, TokenKind::Number, TokenKind::Eof]
    )]
    #[case(
        "number then identifier",
        "1a",
        &[TokenKind::Number, TokenKind::Identifier, TokenKind::Eof]
    )]
    #[case(
        "trailing dot",
        "42.",
        &[TokenKind::Number, TokenKind::Dot, TokenKind::Eof]
    )]
    fn token_kind_cases(
        #[case] _label: &str,
        #[case] source: &str,
        #[case] expected: &[TokenKind],
    ) {
        let tokens = scan_ok(source);
        assert_eq!(kinds(&tokens), expected);
    }
}
