use std::fmt;
use std::io::SeekFrom;

use crate::ast::{
    Assignment, Dependency, Eval, Export, Node, OptionDecl, OptionType, Options, Pool, Project,
    Target,
};
use crate::lexer::{LexError, LexErrorKind, Lexer, join_kinds};
use crate::token::{Cursor, Token, TokenKind};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The file does not start with `project`.
    ExpectedProject,
    /// A top-level statement does not start at column 0.
    UnexpectedIndent,
    /// A statement is deeper than its block but not at the block's column.
    InconsistentIndent { expected: usize, found: usize },
    /// The same option is declared twice in one `options:` block.
    DuplicateOption(String),
    /// An option type other than `int`, `bool`, or `str`.
    UnknownOptionType(String),
    /// A keyword that is not legal in the current block.
    UnexpectedKeyword(String),
    /// A number that does not fit the target type.
    InvalidNumber(String),
    /// A block that must have at least one statement has none.
    EmptyBlock,
    /// A token of the wrong kind.
    UnexpectedToken {
        found: TokenKind,
        expected: Vec<TokenKind>,
    },
    /// No lexical rule matches.
    Tokenization(char),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedProject => write!(f, "expected keyword \"project\""),
            Self::UnexpectedIndent => write!(f, "unexpected indent"),
            Self::InconsistentIndent { expected, found } => write!(
                f,
                "inconsistent indent, expected column {expected}, got column {found}"
            ),
            Self::DuplicateOption(name) => write!(f, "duplicate option '{name}'"),
            Self::UnknownOptionType(name) => write!(
                f,
                "unknown option type '{name}', expected one of int, bool, str"
            ),
            Self::UnexpectedKeyword(word) => write!(f, "unexpected keyword \"{word}\""),
            Self::InvalidNumber(text) => write!(f, "invalid number '{text}'"),
            Self::EmptyBlock => write!(f, "expected at least one indented statement"),
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token \"{found}\"")?;
                if !expected.is_empty() {
                    write!(f, ", expected {}", join_kinds(expected))?;
                }
                Ok(())
            }
            Self::Tokenization(ch) => write!(f, "unexpected character {ch:?}"),
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {}, col {}: {kind}", cursor.line, cursor.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub cursor: Cursor,
}

impl ParseError {
    const fn new(kind: ParseErrorKind, cursor: Cursor) -> Self {
        Self { kind, cursor }
    }

    /// The message without location.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        let kind = match err.kind {
            LexErrorKind::Tokenization(ch) => ParseErrorKind::Tokenization(ch),
            LexErrorKind::UnexpectedToken {
                found, expected, ..
            } => ParseErrorKind::UnexpectedToken { found, expected },
        };
        Self::new(kind, err.cursor)
    }
}

/// Parse build-file source text into a [`Project`].
///
/// # Errors
///
/// Returns `ParseError` on lexical errors, tokens out of place, bad
/// indentation, duplicate options, or keywords used in the wrong block.
pub fn parse(source: &str) -> Result<Project, ParseError> {
    let project = Parser::new(source).parse_project()?;
    tracing::debug!(
        project = %project.name,
        version = %project.version,
        statements = project.children.len(),
        "parsed project"
    );
    Ok(project)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Project,
    Options,
    Eval,
    Pool,
    Export,
    Target,
    Dependency,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "project" => Self::Project,
            "options" => Self::Options,
            "eval" => Self::Eval,
            "pool" => Self::Pool,
            "export" => Self::Export,
            "target" => Self::Target,
            "dependency" => Self::Dependency,
            _ => return None,
        })
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Keywords that may start a statement in a given block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Keywords(u8);

impl Keywords {
    /// Dependency and export blocks: plain assignments only.
    const NONE: Self = Self(0);
    const TOP_LEVEL: Self = Self::NONE
        .with(Keyword::Options)
        .with(Keyword::Eval)
        .with(Keyword::Pool)
        .with(Keyword::Export)
        .with(Keyword::Target)
        .with(Keyword::Dependency);
    const TARGET: Self = Self::NONE
        .with(Keyword::Dependency)
        .with(Keyword::Eval)
        .with(Keyword::Export);

    const fn with(self, keyword: Keyword) -> Self {
        Self(self.0 | keyword.bit())
    }

    const fn contains(self, keyword: Keyword) -> bool {
        self.0 & keyword.bit() != 0
    }

    /// What an `export` prefix may be followed by.
    const fn exported(self) -> Self {
        Self(self.0 & (Keyword::Target.bit() | Keyword::Dependency.bit()))
    }
}

/// Where a statement is being parsed.
#[derive(Debug, Clone, Copy)]
struct Scope {
    keywords: Keywords,
    /// Column of the enclosing block's header; `None` at top level.
    parent_indent: Option<usize>,
    /// Cursor of a preceding `export` prefix, whose column already passed
    /// the checks.
    export: Option<Cursor>,
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
        }
    }

    fn parse_project(&mut self) -> Result<Project, ParseError> {
        self.skip_newlines()?;
        let token = self.lexer.next(&[TokenKind::Name])?;
        if !token.is_name("project") {
            return Err(ParseError::new(ParseErrorKind::ExpectedProject, token.cursor));
        }
        let name = self.lexer.next(&[TokenKind::String])?.value;
        let version = self
            .lexer
            .accept(TokenKind::Version)?
            .map_or_else(|| "1.0.0".to_string(), |token| token.value);
        self.lexer.next(&[TokenKind::Newline, TokenKind::Eof])?;
        let children = self.parse_block(Keywords::TOP_LEVEL, None)?;
        Ok(Project {
            loc: token.cursor,
            name,
            version,
            children,
        })
    }

    /// Parse statements until one starts at or left of `parent_indent`,
    /// or the input ends.
    fn parse_block(
        &mut self,
        keywords: Keywords,
        parent_indent: Option<usize>,
    ) -> Result<Vec<Node>, ParseError> {
        let scope = Scope {
            keywords,
            parent_indent,
            export: None,
        };
        let mut binding = None;
        let mut children = Vec::new();
        loop {
            self.skip_newlines()?;
            match self.parse_statement(scope, &mut binding)? {
                Some(node) => children.push(node),
                None => return Ok(children),
            }
        }
    }

    fn parse_assignments(&mut self, parent_indent: usize) -> Result<Vec<Assignment>, ParseError> {
        self.parse_block(Keywords::NONE, Some(parent_indent))?
            .into_iter()
            .map(|node| match node {
                Node::Assignment(assignment) => Ok(assignment),
                other => Err(ParseError::new(
                    ParseErrorKind::UnexpectedKeyword(keyword_of(&other).to_string()),
                    other.loc(),
                )),
            })
            .collect()
    }

    /// Parse one statement, or return `None` (with the scanner rewound)
    /// when the next statement belongs to an enclosing block.
    fn parse_statement(
        &mut self,
        scope: Scope,
        binding: &mut Option<usize>,
    ) -> Result<Option<Node>, ParseError> {
        let token = self.lexer.next(&[TokenKind::Name, TokenKind::Eof])?;
        if token.kind == TokenKind::Eof {
            return Ok(None);
        }
        let at = token.cursor;

        let loc = if let Some(export) = scope.export {
            export
        } else {
            match scope.parent_indent {
                None if at.column != 0 => {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedIndent, at));
                }
                Some(parent) if at.column <= parent => {
                    self.lexer.scanner_mut().restore(at);
                    return Ok(None);
                }
                _ => {}
            }
            match *binding {
                Some(expected) if expected != at.column => {
                    return Err(ParseError::new(
                        ParseErrorKind::InconsistentIndent {
                            expected,
                            found: at.column,
                        },
                        at,
                    ));
                }
                Some(_) => {}
                None => *binding = Some(at.column),
            }
            at
        };
        let column = loc.column;
        let exported = scope.export.is_some();

        let keyword = Keyword::from_word(&token.value);
        if keyword == Some(Keyword::Export) && scope.keywords.contains(Keyword::Export) {
            // `export:` opens a block; any other `export` prefixes the
            // statement that follows it on the same line.
            if self.lexer.peek()?.kind != TokenKind::Colon {
                let inner = Scope {
                    keywords: scope.keywords.exported(),
                    parent_indent: Some(column),
                    export: Some(loc),
                };
                return match self.parse_statement(inner, &mut None)? {
                    Some(node) => Ok(Some(node)),
                    None => Err(ParseError::new(
                        ParseErrorKind::UnexpectedToken {
                            found: TokenKind::Eof,
                            expected: vec![TokenKind::Name],
                        },
                        self.lexer.scanner().cursor(),
                    )),
                };
            }
        }

        let node = match keyword {
            Some(keyword) if scope.keywords.contains(keyword) => {
                self.parse_keyword(keyword, loc, column, exported)?
            }
            Some(_) => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedKeyword(token.value),
                    at,
                ));
            }
            None => Node::Assignment(self.parse_assignment(&token, loc, exported)?),
        };
        Ok(Some(node))
    }

    fn parse_keyword(
        &mut self,
        keyword: Keyword,
        loc: Cursor,
        column: usize,
        exported: bool,
    ) -> Result<Node, ParseError> {
        Ok(match keyword {
            Keyword::Options => Node::Options(self.parse_options(loc, column)?),
            Keyword::Eval => Node::Eval(self.parse_eval(loc, column)?),
            Keyword::Pool => Node::Pool(self.parse_pool(loc)?),
            Keyword::Target => Node::Target(self.parse_target(loc, column, exported)?),
            Keyword::Dependency => {
                Node::Dependency(self.parse_dependency(loc, column, exported)?)
            }
            Keyword::Export => Node::Export(self.parse_export(loc, column)?),
            Keyword::Project => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedKeyword("project".to_string()),
                    loc,
                ));
            }
        })
    }

    fn parse_assignment(
        &mut self,
        head: &Token,
        loc: Cursor,
        exported: bool,
    ) -> Result<Assignment, ParseError> {
        self.lexer.next(&[TokenKind::Dot])?;
        let property = self.lexer.next(&[TokenKind::Name])?;
        self.lexer.next(&[TokenKind::Equals])?;
        let expression = self.parse_expression(loc.column);
        self.end_statement()?;
        Ok(Assignment {
            loc,
            name: format!("{}.{}", head.value, property.value),
            expression,
            exported,
        })
    }

    fn parse_options(&mut self, loc: Cursor, column: usize) -> Result<Options, ParseError> {
        self.lexer.next(&[TokenKind::Colon])?;
        self.lexer.next(&[TokenKind::Newline])?;
        let mut options: Vec<OptionDecl> = Vec::new();
        let mut binding = None;
        loop {
            self.skip_newlines()?;
            let token = self.lexer.next(&[TokenKind::Name, TokenKind::Eof])?;
            if token.kind == TokenKind::Eof || token.cursor.column <= column {
                self.lexer.scanner_mut().restore(token.cursor);
                break;
            }
            match binding {
                Some(expected) if expected != token.cursor.column => {
                    return Err(ParseError::new(
                        ParseErrorKind::InconsistentIndent {
                            expected,
                            found: token.cursor.column,
                        },
                        token.cursor,
                    ));
                }
                _ => binding = Some(token.cursor.column),
            }
            let dtype = OptionType::from_name(&token.value).ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::UnknownOptionType(token.value.clone()),
                    token.cursor,
                )
            })?;
            let name = self.lexer.next(&[TokenKind::Name])?;
            if options.iter().any(|decl| decl.name == name.value) {
                return Err(ParseError::new(
                    ParseErrorKind::DuplicateOption(name.value),
                    name.cursor,
                ));
            }
            let default = if self.lexer.accept(TokenKind::Equals)?.is_some() {
                Some(self.parse_expression(token.cursor.column))
            } else {
                None
            };
            self.end_statement()?;
            options.push(OptionDecl {
                loc: token.cursor,
                name: name.value,
                dtype,
                default,
            });
        }
        if options.is_empty() {
            return Err(ParseError::new(
                ParseErrorKind::EmptyBlock,
                self.lexer.scanner().cursor(),
            ));
        }
        Ok(Options { loc, options })
    }

    fn parse_eval(&mut self, loc: Cursor, column: usize) -> Result<Eval, ParseError> {
        // Inline source need not be tokenizable, so the block colon is
        // matched on the raw text.
        let scanner = self.lexer.scanner_mut();
        let mark = scanner.mark();
        scanner.match_charset("\t ");
        if scanner.match_str(":").is_some() {
            self.lexer.next(&[TokenKind::Newline])?;
        } else {
            scanner.restore(mark);
        }
        let source = self.parse_expression(column);
        self.end_statement()?;
        Ok(Eval { loc, source })
    }

    fn parse_pool(&mut self, loc: Cursor) -> Result<Pool, ParseError> {
        let name = self.lexer.next(&[TokenKind::String])?.value;
        let depth = self.lexer.next(&[TokenKind::Number])?;
        let depth_value = depth.value.parse().map_err(|_| {
            ParseError::new(ParseErrorKind::InvalidNumber(depth.value.clone()), depth.cursor)
        })?;
        self.lexer.next(&[TokenKind::Newline, TokenKind::Eof])?;
        Ok(Pool {
            loc,
            name,
            depth: depth_value,
        })
    }

    fn parse_target(
        &mut self,
        loc: Cursor,
        column: usize,
        exported: bool,
    ) -> Result<Target, ParseError> {
        let name = self.lexer.next(&[TokenKind::String])?.value;
        self.lexer.next(&[TokenKind::Colon])?;
        self.lexer.next(&[TokenKind::Newline])?;
        let children = self.parse_block(Keywords::TARGET, Some(column))?;
        Ok(Target {
            loc,
            name,
            exported,
            children,
        })
    }

    fn parse_dependency(
        &mut self,
        loc: Cursor,
        column: usize,
        exported: bool,
    ) -> Result<Dependency, ParseError> {
        let name = self.lexer.next(&[TokenKind::String])?.value;
        let assignments = if self.lexer.accept(TokenKind::Colon)?.is_some() {
            self.lexer.next(&[TokenKind::Newline])?;
            self.parse_assignments(column)?
        } else {
            self.lexer.next(&[TokenKind::Newline, TokenKind::Eof])?;
            Vec::new()
        };
        Ok(Dependency {
            loc,
            name,
            exported,
            assignments,
        })
    }

    fn parse_export(&mut self, loc: Cursor, column: usize) -> Result<Export, ParseError> {
        self.lexer.next(&[TokenKind::Colon])?;
        self.lexer.next(&[TokenKind::Newline])?;
        let assignments = self.parse_assignments(column)?;
        Ok(Export { loc, assignments })
    }

    /// Capture raw expression text: the rest of the current line plus every
    /// following line indented deeper than `parent_indent`, dedented by
    /// their smallest margin.
    ///
    /// The newline ending the capture is left unread as the statement
    /// delimiter. If the capture started at a line start and took nothing,
    /// the scanner stays at that line start.
    fn parse_expression(&mut self, parent_indent: usize) -> String {
        let scanner = self.lexer.scanner_mut();
        let text = scanner.text();
        let first_line = if scanner.cursor().column == 0 {
            None
        } else {
            Some(scanner.read_line())
        };

        let mut lines = Vec::new();
        loop {
            let mark = scanner.mark();
            match scanner.match_charset("\t ") {
                Some(margin) if margin.len() > parent_indent => {
                    scanner.read_line();
                    lines.push(&text[mark.offset..scanner.cursor().offset]);
                }
                _ => {
                    scanner.restore(mark);
                    break;
                }
            }
        }

        let last = lines.last().copied().or(first_line);
        if last.is_some_and(|line| line.ends_with('\n')) {
            scanner.seek(SeekFrom::Current(-1));
        }

        let mut result = first_line.map_or_else(String::new, |line| line.trim_start().to_string());
        result.push_str(&dedent(&lines));
        result.truncate(result.trim_end().len());
        result
    }

    /// Consume the newline (or end of input) ending a statement, unless an
    /// empty expression block already left the scanner at a line start.
    fn end_statement(&mut self) -> Result<(), ParseError> {
        if self.lexer.scanner().cursor().column == 0 && !self.lexer.scanner().is_eof() {
            return Ok(());
        }
        self.lexer.next(&[TokenKind::Newline, TokenKind::Eof])?;
        Ok(())
    }

    fn skip_newlines(&mut self) -> Result<(), ParseError> {
        while self.lexer.accept(TokenKind::Newline)?.is_some() {}
        Ok(())
    }
}

/// Strip the smallest leading-whitespace run of the non-blank lines from
/// every line; whitespace-only lines become empty.
fn dedent(lines: &[&str]) -> String {
    let is_blank = |line: &str| line.trim().is_empty();
    let margin = lines
        .iter()
        .filter(|line| !is_blank(line))
        .map(|line| line.len() - line.trim_start_matches(['\t', ' ']).len())
        .min()
        .unwrap_or(0);
    let mut out = String::new();
    for line in lines {
        if is_blank(line) {
            if line.ends_with('\n') {
                out.push('\n');
            }
        } else {
            out.push_str(&line[margin..]);
        }
    }
    out
}

const fn keyword_of(node: &Node) -> &'static str {
    match node {
        Node::Options(_) => "options",
        Node::Eval(_) => "eval",
        Node::Pool(_) => "pool",
        Node::Target(_) => "target",
        Node::Assignment(_) => "assignment",
        Node::Export(_) => "export",
        Node::Dependency(_) => "dependency",
    }
}
