//! Option values supplied from outside a build file.
//!
//! The interpreter asks a [`Context`] for every declared option before it
//! falls back to the declared default. [`Config`] is the stock context: a
//! flat `module.option = value` store that can be read from a file.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use crate::ast::OptionType;
use crate::value::{AdaptError, Value, adapt};

/// Source of externally supplied option values.
pub trait Context {
    /// Look up `module.option`. `None` means the option was not supplied.
    fn get_option(&self, module: &str, option: &str) -> Option<Value>;
}

impl<C: Context + ?Sized> Context for &C {
    fn get_option(&self, module: &str, option: &str) -> Option<Value> {
        (**self).get_option(module, option)
    }
}

/// A config value could not be read as the requested type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("config key '{key}': {source}")]
pub struct ConfigError {
    pub key: String,
    #[source]
    pub source: AdaptError,
}

/// Flat key/value configuration. Keys are `module.option`, values are kept
/// as raw strings and coerced when an option is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    entries: BTreeMap<String, String>,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key = value` lines. Lines starting with `#` are comments;
    /// lines without `=` are skipped with a warning.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut config = Self::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match split_entry(line) {
                Some((key, value)) => config.set(key, value),
                None => warn!(line = index + 1, text = line, "ignoring config line without '='"),
            }
        }
        config
    }

    /// Read and parse a config file.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Read a key as an integer.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        self.get_typed(key, OptionType::Int)
            .map(|value| value.and_then(|v| v.as_int()))
    }

    /// Read a key as a boolean, accepting the same words as option coercion.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.get_typed(key, OptionType::Bool)
            .map(|value| value.and_then(|v| v.as_bool()))
    }

    fn get_typed(&self, key: &str, dtype: OptionType) -> Result<Option<Value>, ConfigError> {
        self.get(key)
            .map(|raw| {
                adapt(dtype, Value::from(raw)).map_err(|source| ConfigError {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (key, value) in iter {
            config.set(key, value);
        }
        config
    }
}

impl Context for Config {
    fn get_option(&self, module: &str, option: &str) -> Option<Value> {
        self.get(&format!("{module}.{option}")).map(Value::from)
    }
}

/// Split `key = value` at the first `=`, trimming both sides. The key must
/// be non-empty.
#[must_use]
pub fn split_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    (!key.is_empty()).then(|| (key, value.trim()))
}
