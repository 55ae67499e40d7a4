use std::fmt;

/// Source position: byte offset, 1-based line, 0-based column.
///
/// Columns count characters from the start of the line, so leading
/// whitespace length and column agree for indentation checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    /// Cursor at the start of a text.
    #[must_use]
    pub const fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 0,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Comment (`# ...`), skipped.
    Comment,
    /// Double- or single-quoted string.
    String,
    /// Version literal (`v1.2.3`).
    Version,
    /// Run of digits.
    Number,
    /// Run of letters, digits, and underscores.
    Name,
    /// `=`
    Equals,
    /// `:`
    Colon,
    /// `.`
    Dot,
    /// A single newline character.
    Newline,
    /// Spaces and tabs, skipped.
    Whitespace,
    /// Synthetic end-of-input.
    Eof,
}

impl TokenKind {
    /// Kinds that the lexer consumes without emitting.
    #[must_use]
    pub const fn is_skip(self) -> bool {
        matches!(self, Self::Comment | Self::Whitespace)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Comment => "comment",
            Self::String => "string",
            Self::Version => "version",
            Self::Number => "number",
            Self::Name => "name",
            Self::Equals => "=",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::Newline => "nl",
            Self::Whitespace => "ws",
            Self::Eof => "eof",
        };
        f.write_str(name)
    }
}

/// A single token with its kind, text, and source location.
///
/// `text` is the full matched slice. `value` is the first capture group
/// for rules that have one (the inner text of a string, the numeric part
/// of a version) and the full match otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub value: String,
    pub cursor: Cursor,
}

impl Token {
    /// True for a `name` token spelled exactly `word`.
    #[must_use]
    pub fn is_name(&self, word: &str) -> bool {
        self.kind == TokenKind::Name && self.value == word
    }
}
