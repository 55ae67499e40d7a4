//! Values bound in a module namespace, and option type coercion.

use std::fmt;

use crate::ast::OptionType;

/// A namespace value: the option types plus what the evaluator produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    None,
    Int(i64),
    Bool(bool),
    Str(String),
    List(Vec<Self>),
}

impl Value {
    /// Short type name used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Str(_) => "str",
            Self::List(_) => "list",
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Renders in the expression syntax the bundled evaluator reads back.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Coercion failure: the expected type and what was observed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, got {found}")]
pub struct AdaptError {
    pub expected: OptionType,
    pub found: String,
}

const TRUE_WORDS: [&str; 4] = ["1", "true", "on", "yes"];
const FALSE_WORDS: [&str; 4] = ["0", "false", "off", "no"];

/// Coerce a raw option value to its declared type.
///
/// | dtype | accepted |
/// |---|---|
/// | `int`  | integer, or a string of digits |
/// | `bool` | boolean, or one of `1 true on yes` / `0 false off no` (any case, trimmed) |
/// | `str`  | string |
pub fn adapt(dtype: OptionType, value: Value) -> Result<Value, AdaptError> {
    let rejected = |found: String| AdaptError {
        expected: dtype,
        found,
    };
    match (dtype, value) {
        (OptionType::Int, Value::Int(n)) => Ok(Value::Int(n)),
        (OptionType::Int, Value::Str(s)) => s
            .trim()
            .parse()
            .map(Value::Int)
            .map_err(|_| rejected(format!("str {s:?}"))),
        (OptionType::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
        (OptionType::Bool, Value::Str(s)) => {
            let word = s.trim().to_lowercase();
            if TRUE_WORDS.contains(&word.as_str()) {
                Ok(Value::Bool(true))
            } else if FALSE_WORDS.contains(&word.as_str()) {
                Ok(Value::Bool(false))
            } else {
                Err(rejected(format!("str {s:?}")))
            }
        }
        (OptionType::Str, Value::Str(s)) => Ok(Value::Str(s)),
        (_, other) => Err(rejected(other.type_name().to_string())),
    }
}
