//! Position-tracking cursor over source text.
//!
//! All matching is anchored at the current position and a failed match
//! never moves it. Backtracking is explicit: take a [`Cursor`] with
//! [`Scanner::mark`] and hand it back to [`Scanner::restore`].

use std::io::SeekFrom;

use regex::Regex;

use crate::token::Cursor;

/// A successful anchored regex match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a> {
    pub text: &'a str,
    groups: Vec<Option<&'a str>>,
}

impl<'a> Match<'a> {
    /// Capture group `index`; group 0 is the whole match.
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&'a str> {
        if index == 0 {
            return Some(self.text);
        }
        self.groups.get(index - 1).copied().flatten()
    }
}

#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    cursor: Cursor,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self {
            text,
            cursor: Cursor::start(),
        }
    }

    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Snapshot of the current position for a later [`Scanner::restore`].
    #[must_use]
    pub const fn mark(&self) -> Cursor {
        self.cursor
    }

    pub const fn restore(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.cursor.offset >= self.text.len()
    }

    /// Unconsumed remainder of the text.
    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.text[self.cursor.offset..]
    }

    #[must_use]
    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Match `re` at the current position and consume it.
    ///
    /// Empty matches are treated as no match.
    pub fn match_regex(&mut self, re: &Regex) -> Option<Match<'a>> {
        let rest = self.rest();
        let caps = re.captures(rest)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 || whole.end() == 0 {
            return None;
        }
        let groups = caps
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str()))
            .collect();
        let text = &rest[..whole.end()];
        self.advance(text.len());
        Some(Match { text, groups })
    }

    /// Match an exact literal at the current position and consume it.
    pub fn match_str(&mut self, literal: &str) -> Option<&'a str> {
        let rest = self.rest();
        if literal.is_empty() || !rest.starts_with(literal) {
            return None;
        }
        let text = &rest[..literal.len()];
        self.advance(text.len());
        Some(text)
    }

    /// Consume the longest non-empty run of characters from `charset`.
    pub fn match_charset(&mut self, charset: &str) -> Option<&'a str> {
        let rest = self.rest();
        let len: usize = rest
            .chars()
            .take_while(|ch| charset.contains(*ch))
            .map(char::len_utf8)
            .sum();
        if len == 0 {
            return None;
        }
        let text = &rest[..len];
        self.advance(len);
        Some(text)
    }

    /// Consume up to and including the next newline, or to the end.
    pub fn read_line(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest.find('\n').map_or(rest.len(), |idx| idx + 1);
        let line = &rest[..len];
        self.advance(len);
        line
    }

    /// Move to an absolute or relative byte offset and return it.
    ///
    /// The target is clamped to the text and moved back onto a character
    /// boundary; line and column are recomputed.
    pub fn seek(&mut self, pos: SeekFrom) -> usize {
        let len = self.text.len();
        let target = match pos {
            SeekFrom::Start(offset) => usize::try_from(offset).unwrap_or(len),
            SeekFrom::Current(delta) => shift(self.cursor.offset, delta),
            SeekFrom::End(delta) => shift(len, delta),
        };
        let mut target = target.min(len);
        while !self.text.is_char_boundary(target) {
            target -= 1;
        }
        self.cursor = self.cursor_at(target);
        target
    }

    fn cursor_at(&self, offset: usize) -> Cursor {
        let before = &self.text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
        Cursor {
            offset,
            line,
            column: before[line_start..].chars().count(),
        }
    }

    fn advance(&mut self, len: usize) {
        let consumed = &self.text[self.cursor.offset..self.cursor.offset + len];
        for ch in consumed.chars() {
            if ch == '\n' {
                self.cursor.line += 1;
                self.cursor.column = 0;
            } else {
                self.cursor.column += 1;
            }
        }
        self.cursor.offset += len;
    }
}

fn shift(base: usize, delta: i64) -> usize {
    let magnitude = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
    if delta < 0 {
        base.saturating_sub(magnitude)
    } else {
        base.saturating_add(magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_match_does_not_advance() {
        let mut scanner = Scanner::new("abc");
        assert!(scanner.match_str("x").is_none());
        assert!(scanner.match_charset("0123456789").is_none());
        assert_eq!(scanner.cursor(), Cursor::start());
    }

    #[test]
    fn regex_is_anchored() {
        let re = Regex::new("b+").expect("valid regex");
        let mut scanner = Scanner::new("abb");
        assert!(scanner.match_regex(&re).is_none());
        scanner.match_str("a");
        let m = scanner.match_regex(&re).expect("should match");
        assert_eq!(m.text, "bb");
        assert!(scanner.is_eof());
    }

    #[test]
    fn regex_groups() {
        let re = Regex::new(r#"^"([^"]*)""#).expect("valid regex");
        let mut scanner = Scanner::new("\"demo\" rest");
        let m = scanner.match_regex(&re).expect("should match");
        assert_eq!(m.group(0), Some("\"demo\""));
        assert_eq!(m.group(1), Some("demo"));
        assert_eq!(m.group(2), None);
    }

    #[test]
    fn line_and_column_tracking() {
        let mut scanner = Scanner::new("ab\n  cd\n");
        assert_eq!(scanner.read_line(), "ab\n");
        assert_eq!(scanner.cursor().line, 2);
        assert_eq!(scanner.cursor().column, 0);
        scanner.match_charset(" ");
        assert_eq!(scanner.cursor().column, 2);
        assert_eq!(scanner.cursor().offset, 5);
    }

    #[test]
    fn mark_and_restore() {
        let mut scanner = Scanner::new("one two");
        let mark = scanner.mark();
        scanner.read_line();
        assert!(scanner.is_eof());
        scanner.restore(mark);
        assert_eq!(scanner.rest(), "one two");
    }

    #[test]
    fn seek_back_over_newline() {
        let mut scanner = Scanner::new("ab\ncd");
        scanner.read_line();
        assert_eq!(scanner.seek(SeekFrom::Current(-1)), 2);
        assert_eq!(scanner.cursor().line, 1);
        assert_eq!(scanner.cursor().column, 2);
        assert_eq!(scanner.peek_char(), Some('\n'));
    }

    #[test]
    fn seek_clamps() {
        let mut scanner = Scanner::new("ab");
        assert_eq!(scanner.seek(SeekFrom::Current(-10)), 0);
        assert_eq!(scanner.seek(SeekFrom::End(5)), 2);
        assert_eq!(scanner.seek(SeekFrom::Start(1)), 1);
    }

    #[test]
    fn read_line_at_end_without_newline() {
        let mut scanner = Scanner::new("tail");
        assert_eq!(scanner.read_line(), "tail");
        assert_eq!(scanner.read_line(), "");
    }
}
