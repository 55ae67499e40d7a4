//! Turns a parsed [`Project`] into a populated [`Module`].
//!
//! Options and eval blocks are processed in source order against one
//! namespace, so every statement sees the bindings made before it. Pools,
//! targets, dependencies, exports and bare assignments are structural data
//! for the caller and are not evaluated here.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ast::{Eval, Node, Options, Project};
use crate::config::Context;
use crate::eval::{EvalError, Evaluator};
use crate::value::{Value, adapt};

/// Insertion-ordered name to value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    entries: Vec<(String, Value)>,
}

impl Namespace {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Bind `name`, returning the previous value. Re-binding keeps the
    /// original position.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// A project materialized from a build file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: String,
    version: String,
    directory: PathBuf,
    namespace: Namespace,
}

impl Module {
    #[must_use]
    pub fn new(name: &str, version: &str, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            directory: directory.into(),
            namespace: Namespace::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Directory containing the build file.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub const fn eval_namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub const fn eval_namespace_mut(&mut self) -> &mut Namespace {
        &mut self.namespace
    }
}

/// An option could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    /// Not supplied by the context and declared without a default.
    #[error("missing required option {module}.{option}")]
    MissingRequired { module: String, option: String },
    /// The raw value did not coerce to the declared type.
    #[error("invalid option {module}.{option}: {message}")]
    Invalid {
        module: String,
        option: String,
        message: String,
    },
}

impl OptionError {
    #[must_use]
    pub fn module_name(&self) -> &str {
        match self {
            Self::MissingRequired { module, .. } | Self::Invalid { module, .. } => module,
        }
    }

    #[must_use]
    pub fn option_name(&self) -> &str {
        match self {
            Self::MissingRequired { option, .. } | Self::Invalid { option, .. } => option,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::MissingRequired { .. } => None,
            Self::Invalid { message, .. } => Some(message),
        }
    }
}

/// Failure while interpreting a project.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Option(#[from] OptionError),
    #[error("eval error at {}", .0)]
    Eval(#[from] EvalError),
}

/// Walks a project AST, resolving options and running eval blocks.
pub struct Interpreter<'c, E> {
    context: &'c dyn Context,
    evaluator: E,
    directory: PathBuf,
}

impl<'c, E: Evaluator> Interpreter<'c, E> {
    /// `filename` is the build file the project was parsed from; the
    /// module directory is its parent.
    pub fn new(context: &'c dyn Context, evaluator: E, filename: impl AsRef<Path>) -> Self {
        let directory = filename
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            context,
            evaluator,
            directory,
        }
    }

    /// Create the module and evaluate the project into it.
    pub fn run(&mut self, project: &Project) -> Result<Module, RunError> {
        let mut module = self.create_module(project);
        self.eval_module(project, &mut module)?;
        Ok(module)
    }

    #[must_use]
    pub fn create_module(&self, project: &Project) -> Module {
        Module::new(&project.name, &project.version, self.directory.clone())
    }

    /// Process top-level options and eval blocks in order. Stops at the
    /// first failure; bindings made before it stay in the namespace.
    pub fn eval_module(&mut self, project: &Project, module: &mut Module) -> Result<(), RunError> {
        for child in &project.children {
            match child {
                Node::Options(options) => self.resolve_options(options, module)?,
                Node::Eval(eval) => self.exec_eval(eval, module)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn exec_eval(&mut self, eval: &Eval, module: &mut Module) -> Result<(), EvalError> {
        debug!(module = module.name(), line = eval.loc.line, "running eval block");
        let source = format!("{}{}", line_padding(eval.loc.line), eval.source);
        self.evaluator.exec(&source, module.eval_namespace_mut())
    }

    fn resolve_options(&mut self, options: &Options, module: &mut Module) -> Result<(), RunError> {
        for decl in &options.options {
            let raw = match self.context.get_option(module.name(), &decl.name) {
                Some(value) => {
                    debug!(module = module.name(), option = %decl.name, from = "context", "resolving option");
                    value
                }
                None => {
                    let Some(default) = &decl.default else {
                        return Err(OptionError::MissingRequired {
                            module: module.name().to_string(),
                            option: decl.name.clone(),
                        }
                        .into());
                    };
                    debug!(module = module.name(), option = %decl.name, from = "default", "resolving option");
                    let source = format!("{}{}", line_padding(decl.loc.line), default);
                    self.evaluator.eval(&source, module.eval_namespace())?
                }
            };
            let value = adapt(decl.dtype, raw).map_err(|err| OptionError::Invalid {
                module: module.name().to_string(),
                option: decl.name.clone(),
                message: err.to_string(),
            })?;
            debug!(module = module.name(), option = %decl.name, value = %value, "option resolved");
            module.eval_namespace_mut().set(decl.name.clone(), value);
        }
        Ok(())
    }
}

fn line_padding(line: usize) -> String {
    "\n".repeat(line.saturating_sub(1))
}
