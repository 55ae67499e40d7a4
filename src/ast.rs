use std::fmt;

use crate::token::Cursor;

/// Root of a parsed build file: `project "<name>" [vX.Y.Z]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub loc: Cursor,
    pub name: String,
    pub version: String,
    pub children: Vec<Node>,
}

/// Any statement below the project header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Options(Options),
    Eval(Eval),
    Pool(Pool),
    Target(Target),
    Assignment(Assignment),
    Export(Export),
    Dependency(Dependency),
}

impl Node {
    /// Cursor of the statement's leading token.
    #[must_use]
    pub const fn loc(&self) -> Cursor {
        match self {
            Self::Options(n) => n.loc,
            Self::Eval(n) => n.loc,
            Self::Pool(n) => n.loc,
            Self::Target(n) => n.loc,
            Self::Assignment(n) => n.loc,
            Self::Export(n) => n.loc,
            Self::Dependency(n) => n.loc,
        }
    }
}

/// Declared type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    Int,
    Bool,
    Str,
}

impl OptionType {
    pub const ALL: [Self; 3] = [Self::Int, Self::Bool, Self::Str];

    /// Look up a type by its keyword (`int`, `bool`, `str`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dtype| dtype.name() == name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Str => "str",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `options:` block. Declarations keep source order and names are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub loc: Cursor,
    pub options: Vec<OptionDecl>,
}

impl Options {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionDecl> {
        self.options.iter().find(|decl| decl.name == name)
    }
}

/// One `<dtype> <name> [= <expr>]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    pub loc: Cursor,
    pub name: String,
    pub dtype: OptionType,
    /// Unevaluated default expression; `None` makes the option required.
    pub default: Option<String>,
}

/// Embedded code block, handed verbatim to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eval {
    pub loc: Cursor,
    pub source: String,
}

/// `pool "<name>" <depth>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub loc: Cursor,
    pub name: String,
    pub depth: usize,
}

/// `target "<name>":` with dependency, eval, export, and assignment children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub loc: Cursor,
    pub name: String,
    pub exported: bool,
    pub children: Vec<Node>,
}

/// `scope.prop = <expression>`; the expression stays source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub loc: Cursor,
    pub name: String,
    pub expression: String,
    pub exported: bool,
}

impl Assignment {
    /// The part before the dot.
    #[must_use]
    pub fn scope(&self) -> &str {
        self.name.split_once('.').map_or(&self.name, |(scope, _)| scope)
    }

    /// The part after the dot.
    #[must_use]
    pub fn property(&self) -> &str {
        self.name.split_once('.').map_or("", |(_, prop)| prop)
    }
}

/// `export:` block of assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub loc: Cursor,
    pub assignments: Vec<Assignment>,
}

/// `dependency "<name>"`, optionally with a block of assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub loc: Cursor,
    pub name: String,
    pub exported: bool,
    pub assignments: Vec<Assignment>,
}
