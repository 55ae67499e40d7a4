//! Lexer edge cases and error tests.

use craftr_dsl::{LexErrorKind, Lexer, TokenKind, tokenize};

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .expect("tokenize")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

// -----------------------------------------------------------
// Basic lexer behaviour.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    assert!(tokenize("").expect("tokenize").is_empty());
}

#[test]
fn lex_only_whitespace() {
    assert_eq!(
        kinds("   \t  \n\n  "),
        [TokenKind::Newline, TokenKind::Newline]
    );
}

#[test]
fn lex_comments_are_skipped() {
    assert_eq!(
        kinds("# comment 1\n# comment 2\nname"),
        [TokenKind::Newline, TokenKind::Newline, TokenKind::Name]
    );
}

#[test]
fn lex_carriage_return_is_whitespace() {
    assert_eq!(kinds("a\r\n"), [TokenKind::Name, TokenKind::Newline]);
}

#[test]
fn lex_header() {
    let tokens = tokenize("project \"demo\" v1.0.2\n").expect("tokenize");
    assert_eq!(tokens.len(), 4);
    assert!(tokens[0].is_name("project"));
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].text, "\"demo\"");
    assert_eq!(tokens[1].value, "demo");
    assert_eq!(tokens[2].kind, TokenKind::Version);
    assert_eq!(tokens[2].text, "v1.0.2");
    assert_eq!(tokens[2].value, "1.0.2");
    assert_eq!(tokens[3].kind, TokenKind::Newline);
}

#[test]
fn lex_single_quoted_string() {
    let tokens = tokenize("'say \"hi\"'").expect("tokenize");
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "say \"hi\"");
}

#[test]
fn lex_assignment() {
    assert_eq!(
        kinds("cxx.flags = x"),
        [
            TokenKind::Name,
            TokenKind::Dot,
            TokenKind::Name,
            TokenKind::Equals,
            TokenKind::Name
        ]
    );
}

#[test]
fn lex_incomplete_version_is_a_name() {
    assert_eq!(
        kinds("v1.2"),
        [TokenKind::Name, TokenKind::Dot, TokenKind::Number]
    );
}

#[test]
fn lex_number_then_name() {
    let tokens = tokenize("42abc").expect("tokenize");
    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].kind, TokenKind::Name);
    assert_eq!(tokens[1].value, "abc");
}

// -----------------------------------------------------------
// Positions.
// -----------------------------------------------------------

#[test]
fn lex_cursor_positions() {
    let tokens = tokenize("ab cd\n  ef").expect("tokenize");
    assert_eq!((tokens[1].cursor.line, tokens[1].cursor.column), (1, 3));
    assert_eq!(tokens[2].kind, TokenKind::Newline);
    assert_eq!(tokens[3].cursor.line, 2);
    assert_eq!(tokens[3].cursor.column, 2);
    assert_eq!(tokens[3].cursor.offset, 8);
}

#[test]
fn lex_column_counts_characters() {
    let tokens = tokenize("'é' x").expect("tokenize");
    assert_eq!(tokens[1].cursor.column, 4);
    assert_eq!(tokens[1].cursor.offset, 5);
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn lex_error_unknown_character() {
    let err = tokenize("a\n  @").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::Tokenization('@'));
    assert_eq!(err.cursor.line, 2);
    assert_eq!(err.cursor.column, 2);
    assert_eq!(err.to_string(), "unexpected character '@' at line 2, column 2");
}

#[test]
fn lex_error_unterminated_string() {
    let err = tokenize("name \"open").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::Tokenization('"'));
    assert_eq!(err.cursor.column, 5);
}

#[test]
fn lex_next_rejects_unexpected_kind() {
    let mut lexer = Lexer::new("=");
    let err = lexer.next(&[TokenKind::Name]).unwrap_err();
    assert!(matches!(
        err.kind,
        LexErrorKind::UnexpectedToken {
            found: TokenKind::Equals,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "unexpected token \"=\", expected \"name\" at line 1, column 0"
    );
}

// -----------------------------------------------------------
// Pull interface.
// -----------------------------------------------------------

#[test]
fn lex_accept_restores_on_mismatch() {
    let mut lexer = Lexer::new("a = 1");
    assert!(lexer.accept(TokenKind::Equals).expect("accept").is_none());
    let token = lexer.next(&[TokenKind::Name]).expect("next");
    assert_eq!(token.value, "a");
    assert!(lexer.accept(TokenKind::Equals).expect("accept").is_some());
}

#[test]
fn lex_peek_does_not_consume() {
    let mut lexer = Lexer::new("x y");
    assert_eq!(lexer.peek().expect("peek").value, "x");
    assert_eq!(lexer.next(&[]).expect("next").value, "x");
    assert_eq!(lexer.peek().expect("peek").value, "y");
}

#[test]
fn lex_eof_is_repeatable() {
    let mut lexer = Lexer::new("  # trailing");
    assert_eq!(lexer.next(&[]).expect("next").kind, TokenKind::Eof);
    assert_eq!(lexer.next(&[]).expect("next").kind, TokenKind::Eof);
}
