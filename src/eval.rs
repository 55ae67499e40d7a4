//! The boundary to code evaluation, and a small bundled evaluator.
//!
//! Build files hand free-form code to an [`Evaluator`]: `eval` blocks run
//! as statements against the module namespace, option defaults are
//! evaluated as expressions. [`ExprEvaluator`] implements a deliberately
//! small language for this:
//!
//! ```text
//! statement  := name '=' expression          (one per line, '#' comments)
//! expression := term ('+' term)*
//! term       := int | 'true' | 'false' | 'none' | string | list | name | '(' expression ')'
//! list       := '[' (expression (',' expression)* ','?)? ']'
//! ```
//!
//! `True`, `False`, and `None` are accepted as spellings of the keywords.

use crate::interpreter::Namespace;
use crate::value::Value;

/// Error raised by an evaluator. `line` is 1-based within the source text
/// the evaluator was given.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct EvalError {
    pub line: usize,
    pub message: String,
}

/// Executes embedded code against a module namespace.
pub trait Evaluator {
    /// Run a statement block with read-write access to `namespace`.
    fn exec(&mut self, source: &str, namespace: &mut Namespace) -> Result<(), EvalError>;

    /// Evaluate a single expression.
    fn eval(&mut self, expression: &str, namespace: &Namespace) -> Result<Value, EvalError>;
}

impl<E: Evaluator + ?Sized> Evaluator for &mut E {
    fn exec(&mut self, source: &str, namespace: &mut Namespace) -> Result<(), EvalError> {
        (**self).exec(source, namespace)
    }

    fn eval(&mut self, expression: &str, namespace: &Namespace) -> Result<Value, EvalError> {
        (**self).eval(expression, namespace)
    }
}

/// Stateless evaluator for the restricted expression language.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprEvaluator;

impl Evaluator for ExprEvaluator {
    fn exec(&mut self, source: &str, namespace: &mut Namespace) -> Result<(), EvalError> {
        for (index, line) in source.lines().enumerate() {
            let lineno = index + 1;
            let statement = line.trim();
            if statement.is_empty() || statement.starts_with('#') {
                continue;
            }
            let (name, expression) = statement
                .split_once('=')
                .map(|(name, expr)| (name.trim(), expr))
                .filter(|(name, _)| is_identifier(name))
                .ok_or_else(|| EvalError {
                    line: lineno,
                    message: format!("expected `name = expression`, got {statement:?}"),
                })?;
            let value = ExprParser::new(expression, lineno, namespace).parse()?;
            namespace.set(name, value);
        }
        Ok(())
    }

    fn eval(&mut self, expression: &str, namespace: &Namespace) -> Result<Value, EvalError> {
        ExprParser::new(expression, 1, namespace).parse()
    }
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

struct ExprParser<'s, 'n> {
    src: &'s str,
    pos: usize,
    first_line: usize,
    namespace: &'n Namespace,
}

impl<'s, 'n> ExprParser<'s, 'n> {
    const fn new(src: &'s str, first_line: usize, namespace: &'n Namespace) -> Self {
        Self {
            src,
            pos: 0,
            first_line,
            namespace,
        }
    }

    fn parse(mut self) -> Result<Value, EvalError> {
        let value = self.expression()?;
        self.skip_whitespace();
        match self.peek() {
            None => Ok(value),
            Some(ch) => Err(self.error(format!("unexpected {ch:?} after expression"))),
        }
    }

    fn error(&self, message: String) -> EvalError {
        EvalError {
            line: self.first_line + self.src[..self.pos].matches('\n').count(),
            message,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expression(&mut self) -> Result<Value, EvalError> {
        let mut lhs = self.term()?;
        while self.eat('+') {
            let rhs = self.term()?;
            lhs = self.add(lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn add(&self, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
        match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(b)
                .map(Value::Int)
                .ok_or_else(|| self.error("integer overflow".to_string())),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (a, b) => Err(self.error(format!(
                "cannot add {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }

    fn term(&mut self) -> Result<Value, EvalError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("unexpected end of expression".to_string())),
            Some('(') => {
                self.bump();
                let value = self.expression()?;
                if !self.eat(')') {
                    return Err(self.error("expected ')'".to_string()));
                }
                Ok(value)
            }
            Some('[') => {
                self.bump();
                self.list()
            }
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.string(quote)
            }
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.integer(),
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.word(),
            Some(ch) => Err(self.error(format!("unexpected {ch:?}"))),
        }
    }

    fn list(&mut self) -> Result<Value, EvalError> {
        let mut items = Vec::new();
        loop {
            if self.eat(']') {
                return Ok(Value::List(items));
            }
            items.push(self.expression()?);
            if !self.eat(',') {
                if self.eat(']') {
                    return Ok(Value::List(items));
                }
                return Err(self.error("expected ',' or ']'".to_string()));
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<Value, EvalError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error("unterminated string".to_string()));
                }
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(ch @ ('\\' | '"' | '\'')) => out.push(ch),
                    Some(ch) => {
                        out.push('\\');
                        out.push(ch);
                    }
                    None => return Err(self.error("unterminated string".to_string())),
                },
                Some(ch) if ch == quote => return Ok(Value::Str(out)),
                Some(ch) => out.push(ch),
            }
        }
    }

    fn integer(&mut self) -> Result<Value, EvalError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.bump();
        }
        let text = &self.src[start..self.pos];
        text.parse()
            .map(Value::Int)
            .map_err(|_| self.error(format!("invalid integer {text:?}")))
    }

    fn word(&mut self) -> Result<Value, EvalError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "true" | "True" => Ok(Value::Bool(true)),
            "false" | "False" => Ok(Value::Bool(false)),
            "none" | "None" => Ok(Value::None),
            name => self
                .namespace
                .get(name)
                .cloned()
                .ok_or_else(|| self.error(format!("name '{name}' is not defined"))),
        }
    }
}
