//! Serializes a build-file AST back into canonical text.
//!
//! Two spaces of indentation per depth. Multi-line expressions are always
//! written as an indented block below their header so that re-parsing
//! yields the same text.

use std::fmt::Write as _;

use crate::ast::{Assignment, Dependency, Eval, Export, Node, Options, Pool, Project, Target};

const INDENT: &str = "  ";

/// Format a whole project.
#[must_use]
pub fn format(project: &Project) -> String {
    project.render()
}

impl Project {
    /// Render the header line and every child at depth 0.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "project {}", quote(&self.name));
        if !self.version.is_empty() {
            let _ = write!(out, " v{}", self.version);
        }
        out.push('\n');
        for child in &self.children {
            render_node(&mut out, child, 0);
        }
        out
    }
}

impl Node {
    /// Render this statement at the given block depth.
    #[must_use]
    pub fn render(&self, depth: usize) -> String {
        let mut out = String::new();
        render_node(&mut out, self, depth);
        out
    }
}

fn render_node(out: &mut String, node: &Node, depth: usize) {
    match node {
        Node::Options(options) => render_options(out, options, depth),
        Node::Eval(eval) => render_eval(out, eval, depth),
        Node::Pool(pool) => render_pool(out, pool, depth),
        Node::Target(target) => render_target(out, target, depth),
        Node::Assignment(assignment) => render_assignment(out, assignment, depth),
        Node::Export(export) => render_export(out, export, depth),
        Node::Dependency(dep) => render_dependency(out, dep, depth),
    }
}

fn indent(out: &mut String, depth: usize) {
    out.push_str(&INDENT.repeat(depth));
}

fn render_options(out: &mut String, options: &Options, depth: usize) {
    indent(out, depth);
    out.push_str("options:\n");
    for decl in &options.options {
        indent(out, depth + 1);
        let _ = write!(out, "{} {}", decl.dtype, decl.name);
        match &decl.default {
            Some(expr) => {
                out.push_str(" =");
                render_expression(out, expr, depth + 2);
            }
            None => out.push('\n'),
        }
    }
}

fn render_eval(out: &mut String, eval: &Eval, depth: usize) {
    indent(out, depth);
    if eval.source.contains('\n') {
        out.push_str("eval:\n");
        render_lines(out, &eval.source, depth + 1);
    } else if eval.source.is_empty() {
        out.push_str("eval\n");
    } else {
        let _ = writeln!(out, "eval {}", eval.source);
    }
}

fn render_pool(out: &mut String, pool: &Pool, depth: usize) {
    indent(out, depth);
    let _ = writeln!(out, "pool {} {}", quote(&pool.name), pool.depth);
}

fn render_target(out: &mut String, target: &Target, depth: usize) {
    indent(out, depth);
    if target.exported {
        out.push_str("export ");
    }
    let _ = writeln!(out, "target {}:", quote(&target.name));
    for child in &target.children {
        render_node(out, child, depth + 1);
    }
}

fn render_assignment(out: &mut String, assignment: &Assignment, depth: usize) {
    indent(out, depth);
    if assignment.exported {
        out.push_str("export ");
    }
    let _ = write!(out, "{} =", assignment.name);
    render_expression(out, &assignment.expression, depth + 1);
}

fn render_export(out: &mut String, export: &Export, depth: usize) {
    indent(out, depth);
    out.push_str("export:\n");
    for assignment in &export.assignments {
        render_assignment(out, assignment, depth + 1);
    }
}

fn render_dependency(out: &mut String, dep: &Dependency, depth: usize) {
    indent(out, depth);
    if dep.exported {
        out.push_str("export ");
    }
    let _ = write!(out, "dependency {}", quote(&dep.name));
    if dep.assignments.is_empty() {
        out.push('\n');
        return;
    }
    out.push_str(":\n");
    for assignment in &dep.assignments {
        render_assignment(out, assignment, depth + 1);
    }
}

/// Write an expression after its `=`: inline when it is one line,
/// otherwise as an indented block starting on the next line.
fn render_expression(out: &mut String, expression: &str, depth: usize) {
    let expression = expression.trim_end();
    if expression.is_empty() {
        out.push('\n');
    } else if expression.contains('\n') {
        out.push('\n');
        render_lines(out, expression, depth);
    } else {
        let _ = writeln!(out, " {expression}");
    }
}

/// Empty lines keep their indentation so they stay inside the block.
fn render_lines(out: &mut String, text: &str, depth: usize) {
    for line in text.split('\n') {
        indent(out, depth);
        out.push_str(line);
        out.push('\n');
    }
}

fn quote(text: &str) -> String {
    if text.contains('"') {
        format!("'{text}'")
    } else {
        format!("\"{text}\"")
    }
}
