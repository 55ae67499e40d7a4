use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::scanner::Scanner;
use crate::token::{Cursor, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// No rule matches at the current position.
    Tokenization(char),
    /// A token was produced but its kind was not expected here.
    UnexpectedToken {
        found: TokenKind,
        text: String,
        expected: Vec<TokenKind>,
    },
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tokenization(ch) => write!(f, "unexpected character {ch:?}"),
            Self::UnexpectedToken {
                found, expected, ..
            } => {
                write!(f, "unexpected token \"{found}\"")?;
                if !expected.is_empty() {
                    write!(f, ", expected {}", join_kinds(expected))?;
                }
                Ok(())
            }
        }
    }
}

pub(crate) fn join_kinds(kinds: &[TokenKind]) -> String {
    kinds
        .iter()
        .map(|kind| format!("\"{kind}\""))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", cursor.line, cursor.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub cursor: Cursor,
}

#[derive(Debug)]
enum Pattern {
    Regex(Regex),
    Charset(&'static str),
    Keyword(&'static str),
}

/// One lexical rule: how to match, and the kind it produces.
#[derive(Debug)]
struct Rule {
    kind: TokenKind,
    pattern: Pattern,
}

impl Rule {
    fn regex(kind: TokenKind, pattern: &str) -> Self {
        let re = Regex::new(&format!("^(?:{pattern})")).expect("lexer rule regex is valid");
        Self {
            kind,
            pattern: Pattern::Regex(re),
        }
    }

    const fn charset(kind: TokenKind, chars: &'static str) -> Self {
        Self {
            kind,
            pattern: Pattern::Charset(chars),
        }
    }

    const fn keyword(kind: TokenKind, word: &'static str) -> Self {
        Self {
            kind,
            pattern: Pattern::Keyword(word),
        }
    }

    fn apply(&self, scanner: &mut Scanner<'_>) -> Option<(String, String)> {
        match &self.pattern {
            Pattern::Regex(re) => scanner.match_regex(re).map(|m| {
                let value = m.group(1).unwrap_or(m.text);
                (m.text.to_string(), value.to_string())
            }),
            Pattern::Charset(chars) => scanner
                .match_charset(chars)
                .map(|text| (text.to_string(), text.to_string())),
            Pattern::Keyword(word) => scanner
                .match_str(word)
                .map(|text| (text.to_string(), text.to_string())),
        }
    }
}

const DIGITS: &str = "0123456789";
const NAME_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

/// Build-file rules. Tried in order, first match wins: comments, strings,
/// and versions must precede the generic number and name runs.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::regex(TokenKind::Comment, "#.*"),
        Rule::regex(TokenKind::String, r#""([^"]*)""#),
        Rule::regex(TokenKind::String, "'([^']*)'"),
        Rule::regex(TokenKind::Version, r"v(\d+\.\d+\.\d+)"),
        Rule::charset(TokenKind::Number, DIGITS),
        Rule::charset(TokenKind::Name, NAME_CHARS),
        Rule::keyword(TokenKind::Equals, "="),
        Rule::keyword(TokenKind::Colon, ":"),
        Rule::keyword(TokenKind::Dot, "."),
        Rule::keyword(TokenKind::Newline, "\n"),
        Rule::charset(TokenKind::Whitespace, "\t \r"),
    ]
});

/// Tokenize a whole source string, dropping skip tokens.
///
/// The synthetic end-of-input token is not included.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next(&[])?;
        if token.kind == TokenKind::Eof {
            return Ok(tokens);
        }
        tokens.push(token);
    }
}

/// Pull-based lexer over a [`Scanner`].
///
/// The scanner stays reachable so the parser can capture raw expression
/// text and rewind past tokens it decides not to consume.
#[derive(Debug)]
pub struct Lexer<'a> {
    scanner: Scanner<'a>,
    rules: &'static [Rule],
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            scanner: Scanner::new(input),
            rules: RULES.as_slice(),
        }
    }

    #[must_use]
    pub const fn scanner(&self) -> &Scanner<'a> {
        &self.scanner
    }

    pub const fn scanner_mut(&mut self) -> &mut Scanner<'a> {
        &mut self.scanner
    }

    /// Read the next token; with a non-empty `expected`, fail unless its
    /// kind is listed.
    pub fn next(&mut self, expected: &[TokenKind]) -> Result<Token, LexError> {
        let token = self.read()?;
        if expected.is_empty() || expected.contains(&token.kind) {
            return Ok(token);
        }
        Err(LexError {
            cursor: token.cursor,
            kind: LexErrorKind::UnexpectedToken {
                found: token.kind,
                text: token.text,
                expected: expected.to_vec(),
            },
        })
    }

    /// Consume the next token only if it is of `kind`.
    pub fn accept(&mut self, kind: TokenKind) -> Result<Option<Token>, LexError> {
        let mark = self.scanner.mark();
        let token = self.read()?;
        if token.kind == kind {
            Ok(Some(token))
        } else {
            self.scanner.restore(mark);
            Ok(None)
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Token, LexError> {
        let mark = self.scanner.mark();
        let token = self.read();
        self.scanner.restore(mark);
        token
    }

    fn read(&mut self) -> Result<Token, LexError> {
        'outer: loop {
            let cursor = self.scanner.cursor();
            if self.scanner.is_eof() {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    value: String::new(),
                    cursor,
                });
            }
            for rule in self.rules {
                if let Some((text, value)) = rule.apply(&mut self.scanner) {
                    if rule.kind.is_skip() {
                        continue 'outer;
                    }
                    return Ok(Token {
                        kind: rule.kind,
                        text,
                        value,
                        cursor,
                    });
                }
            }
            let found = self.scanner.peek_char().unwrap_or('\0');
            return Err(LexError {
                kind: LexErrorKind::Tokenization(found),
                cursor,
            });
        }
    }
}
