use crate::ast::{
    Assignment, Dependency, Eval, Export, Node, OptionDecl, OptionType, Options, Pool, Project,
    Target,
};
use crate::token::Cursor;

impl Project {
    /// Create a project with the default version `1.0.0`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            loc: Cursor::start(),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            children: Vec::new(),
        }
    }

    /// Set the version (`MAJOR.MINOR.PATCH`, without the leading `v`).
    #[must_use]
    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Append a top-level statement.
    #[must_use]
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }
}

impl Options {
    /// Create an empty options block.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loc: Cursor::start(),
            options: Vec::new(),
        }
    }

    /// Declare a required option.
    #[must_use]
    pub fn required(mut self, dtype: OptionType, name: &str) -> Self {
        self.options.push(OptionDecl {
            loc: Cursor::start(),
            name: name.to_string(),
            dtype,
            default: None,
        });
        self
    }

    /// Declare an option with a default expression.
    #[must_use]
    pub fn with_default(mut self, dtype: OptionType, name: &str, default: &str) -> Self {
        self.options.push(OptionDecl {
            loc: Cursor::start(),
            name: name.to_string(),
            dtype,
            default: Some(default.to_string()),
        });
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Eval {
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            loc: Cursor::start(),
            source: source.trim_end().to_string(),
        }
    }
}

impl Pool {
    #[must_use]
    pub fn new(name: &str, depth: usize) -> Self {
        Self {
            loc: Cursor::start(),
            name: name.to_string(),
            depth,
        }
    }
}

impl Target {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            loc: Cursor::start(),
            name: name.to_string(),
            exported: false,
            children: Vec::new(),
        }
    }

    /// Mark the target as exported.
    #[must_use]
    pub const fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    /// Append a child statement.
    #[must_use]
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }
}

impl Assignment {
    /// Create `name = expression`, where `name` is `scope.prop`.
    #[must_use]
    pub fn new(name: &str, expression: &str) -> Self {
        Self {
            loc: Cursor::start(),
            name: name.to_string(),
            expression: expression.trim_end().to_string(),
            exported: false,
        }
    }

    #[must_use]
    pub const fn exported(mut self) -> Self {
        self.exported = true;
        self
    }
}

impl Export {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loc: Cursor::start(),
            assignments: Vec::new(),
        }
    }

    #[must_use]
    pub fn assign(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }
}

impl Default for Export {
    fn default() -> Self {
        Self::new()
    }
}

impl Dependency {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            loc: Cursor::start(),
            name: name.to_string(),
            exported: false,
            assignments: Vec::new(),
        }
    }

    #[must_use]
    pub const fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    #[must_use]
    pub fn assign(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }
}

macro_rules! impl_into_node {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Node {
                fn from(node: $variant) -> Self {
                    Self::$variant(node)
                }
            }
        )*
    };
}

impl_into_node!(Options, Eval, Pool, Target, Assignment, Export, Dependency);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_defaults() {
        let project = Project::new("demo");
        assert_eq!(project.version, "1.0.0");
        assert!(project.children.is_empty());
    }

    #[test]
    fn nested_target() {
        let project = Project::new("demo").child(
            Target::new("main")
                .exported()
                .child(Dependency::new("lib").assign(Assignment::new("cxx.link", "True"))),
        );
        let Node::Target(target) = &project.children[0] else {
            panic!("expected target");
        };
        assert!(target.exported);
        let Node::Dependency(dep) = &target.children[0] else {
            panic!("expected dependency");
        };
        assert_eq!(dep.assignments[0].name, "cxx.link");
    }

    #[test]
    fn options_keep_order() {
        let opts = Options::new()
            .required(OptionType::Int, "jobs")
            .with_default(OptionType::Bool, "debug", "false");
        assert_eq!(opts.options[0].name, "jobs");
        assert_eq!(opts.get("debug").and_then(|o| o.default.as_deref()), Some("false"));
    }

    #[test]
    fn eval_strips_trailing_whitespace() {
        assert_eq!(Eval::new("x = 1\n\n  ").source, "x = 1");
    }
}
