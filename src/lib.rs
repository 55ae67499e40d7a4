//! Craftr build-file scanner, parser, formatter, and interpreter.
//!
//! A typed AST for Craftr's indentation-based build description language
//! with tools to parse build files from text, build them programmatically,
//! format them back to canonical syntax, and interpret them into a module
//! namespace.
//!
//! # Quick start
//!
//! ## Parse and re-format a build file
//!
//! ```
//! use craftr_dsl::{format, parse};
//!
//! let input = "project \"demo\" v1.0.0\noptions:\n  int jobs = 4\n";
//! let project = parse(input).unwrap();
//! assert_eq!(format(&project), input);
//! ```
//!
//! ## Interpret a project
//!
//! ```
//! use craftr_dsl::{Config, ExprEvaluator, Value, load_str};
//!
//! let source = "project \"demo\"\noptions:\n  bool flag = true\n";
//! let module = load_str(source, "BUILD.cr", &Config::new(), ExprEvaluator).unwrap();
//! assert_eq!(module.eval_namespace().get("flag"), Some(&Value::Bool(true)));
//! ```
//!
//! ## Build a project programmatically
//!
//! ```
//! use craftr_dsl::{Assignment, Dependency, Project, Target, format};
//!
//! let project = Project::new("app")
//!     .child(Target::new("main")
//!         .child(Dependency::new("lib").assign(Assignment::new("cxx.link", "true"))));
//!
//! assert!(format(&project).contains("  dependency \"lib\":\n"));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builder;
pub mod config;
pub mod eval;
pub mod formatter;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod value;

use std::path::Path;

pub use ast::{
    Assignment, Dependency, Eval, Export, Node, OptionDecl, OptionType, Options, Pool, Project,
    Target,
};
pub use config::{Config, ConfigError, Context};
pub use eval::{EvalError, Evaluator, ExprEvaluator};
pub use formatter::format;
pub use interpreter::{Interpreter, Module, Namespace, OptionError, RunError};
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize};
pub use parser::{ParseError, ParseErrorKind, parse};
pub use scanner::Scanner;
pub use token::{Cursor, Token, TokenKind};
pub use value::{AdaptError, Value, adapt};

/// Unified error type covering reading, parsing, and interpreting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The build file could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// An option or eval failure while interpreting.
    #[error("{0}")]
    Run(#[from] RunError),
}

/// Parse a build-file source string.
pub fn parse_str(input: &str) -> Result<Project, Error> {
    Ok(parse(input)?)
}

/// Parse and interpret a build-file source string. `filename` only
/// determines the module directory.
pub fn load_str<E: Evaluator>(
    input: &str,
    filename: impl AsRef<Path>,
    context: &dyn Context,
    evaluator: E,
) -> Result<Module, Error> {
    let project = parse(input)?;
    Ok(Interpreter::new(context, evaluator, filename).run(&project)?)
}

/// Read, parse, and interpret a build file.
pub fn load_file<E: Evaluator>(
    path: impl AsRef<Path>,
    context: &dyn Context,
    evaluator: E,
) -> Result<Module, Error> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path)?;
    load_str(&input, path, context, evaluator)
}
