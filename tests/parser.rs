//! Parser tests: statements, indentation, expression capture, and errors.

mod common;

use common::parse_ok;
use craftr_dsl::{Node, OptionType, ParseErrorKind, TokenKind, parse};

fn first_child(input: &str) -> Node {
    parse_ok(input)
        .children
        .into_iter()
        .next()
        .expect("at least one statement")
}

// -----------------------------------------------------------
// Header.
// -----------------------------------------------------------

#[test]
fn parse_header_only() {
    let project = parse_ok("project \"demo\" v0.9.12\n");
    assert_eq!(project.name, "demo");
    assert_eq!(project.version, "0.9.12");
    assert!(project.children.is_empty());
    assert_eq!((project.loc.line, project.loc.column), (1, 0));
}

#[test]
fn parse_header_without_version() {
    assert_eq!(parse_ok("project 'demo'\n").version, "1.0.0");
}

#[test]
fn parse_header_requires_string_name() {
    let err = parse("project demo\n").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            found: TokenKind::Name,
            expected: vec![TokenKind::String],
        }
    );
}

#[test]
fn parse_empty_input() {
    let err = parse("").unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            found: TokenKind::Eof,
            ..
        }
    ));
}

// -----------------------------------------------------------
// Options.
// -----------------------------------------------------------

#[test]
fn parse_options_keep_order_and_location() {
    let Node::Options(options) = first_child(
        "project \"p\"\noptions:\n    str prefix\n\n    int jobs = 4\n    bool debug = off\n",
    ) else {
        panic!("expected options");
    };
    let names: Vec<_> = options.options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["prefix", "jobs", "debug"]);
    assert_eq!(options.options[1].dtype, OptionType::Int);
    assert_eq!(options.options[1].loc.line, 5);
    assert_eq!(options.options[1].loc.column, 4);
    assert_eq!(options.get("debug").and_then(|o| o.default.as_deref()), Some("off"));
}

#[test]
fn parse_option_default_spanning_lines() {
    let Node::Options(options) =
        first_child("project \"p\"\noptions:\n  int a = 1 +\n    2\n  int b\n")
    else {
        panic!("expected options");
    };
    assert_eq!(options.options[0].default.as_deref(), Some("1 +\n2"));
    assert_eq!(options.options[1].name, "b");
}

#[test]
fn parse_duplicate_option_fails() {
    let err = parse("project \"p\"\noptions:\n  int a\n  str a\n").unwrap_err();
    assert!(err.to_string().contains("duplicate option"));
}

#[test]
fn parse_empty_options_fails() {
    let err = parse("project \"p\"\noptions:\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::EmptyBlock);
}

#[test]
fn parse_options_inconsistent_indent() {
    let err = parse("project \"p\"\noptions:\n  int a\n    int b\n").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::InconsistentIndent {
            expected: 2,
            found: 4
        }
    );
}

// -----------------------------------------------------------
// Blocks and indentation.
// -----------------------------------------------------------

#[test]
fn parse_target_dependency_assignment() {
    let Node::Target(target) = first_child("project \"p\"\ntarget \"t\":\n  dependency \"d\":\n    x.y = 1\n")
    else {
        panic!("expected target");
    };
    assert_eq!(target.name, "t");
    assert_eq!(target.children.len(), 1);
    let Node::Dependency(dep) = &target.children[0] else {
        panic!("expected dependency");
    };
    assert_eq!(dep.name, "d");
    assert_eq!(dep.assignments.len(), 1);
    assert_eq!(dep.assignments[0].name, "x.y");
    assert_eq!(dep.assignments[0].expression, "1");
}

#[test]
fn parse_dedent_returns_statement_to_outer_block() {
    let source = "\
project \"p\"
target \"a\":
    dependency \"d\":
        x.y = 1
    dependency \"e\"
pool \"link\" 1
";
    let project = parse_ok(source);
    assert_eq!(project.children.len(), 2);
    let Node::Target(target) = &project.children[0] else {
        panic!("expected target");
    };
    assert_eq!(target.children.len(), 2);
    assert!(matches!(project.children[1], Node::Pool(_)));
}

#[test]
fn parse_comments_between_statements() {
    let source = "\
project \"p\"
target \"t\":
  dependency \"a\"
# a note at column zero
  # an indented note
  dependency \"b\"
";
    let Node::Target(target) = first_child(source) else {
        panic!("expected target");
    };
    assert_eq!(target.children.len(), 2);
}

#[test]
fn parse_top_level_indent_fails() {
    let err = parse("project \"p\"\n  pool \"x\" 1\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedIndent);
    assert_eq!(err.cursor.line, 2);
}

#[test]
fn parse_sibling_indent_must_match() {
    let err = parse("project \"p\"\ntarget \"a\":\n    x.y = 1\n  x.z = 2\n").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::InconsistentIndent {
            expected: 4,
            found: 2
        }
    );
    assert_eq!(err.cursor.line, 4);
}

#[test]
fn parse_empty_target_is_allowed() {
    let project = parse_ok("project \"p\"\ntarget \"a\":\ntarget \"b\":\n");
    assert_eq!(project.children.len(), 2);
}

// -----------------------------------------------------------
// Export.
// -----------------------------------------------------------

#[test]
fn parse_export_prefix_on_assignment() {
    let Node::Assignment(assignment) = first_child("project \"p\"\nexport cxx.std = 'c++17'\n")
    else {
        panic!("expected assignment");
    };
    assert!(assignment.exported);
    assert_eq!(assignment.scope(), "cxx");
    assert_eq!(assignment.property(), "std");
    assert_eq!(assignment.expression, "'c++17'");
}

#[test]
fn parse_export_block_in_target() {
    let source = "\
project \"p\"
export target \"lib\":
  export:
    cxx.include = ['include']
    cxx.defines = []
";
    let Node::Target(target) = first_child(source) else {
        panic!("expected target");
    };
    assert!(target.exported);
    let Node::Export(export) = &target.children[0] else {
        panic!("expected export");
    };
    assert_eq!(export.assignments.len(), 2);
    assert!(!export.assignments[0].exported);
}

#[test]
fn parse_export_pool_is_rejected() {
    let err = parse("project \"p\"\nexport pool \"x\" 1\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedKeyword("pool".to_string()));
}

#[test]
fn parse_dangling_export_fails() {
    let err = parse("project \"p\"\nexport").unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            found: TokenKind::Eof,
            ..
        }
    ));
}

// -----------------------------------------------------------
// Expression capture.
// -----------------------------------------------------------

#[test]
fn parse_expression_dedent_keeps_relative_margin() {
    let Node::Assignment(assignment) = first_child("project \"p\"\nx.y =\n    first\n      second\n")
    else {
        panic!("expected assignment");
    };
    assert_eq!(assignment.expression, "first\n  second");
}

#[test]
fn parse_expression_continues_inline_start() {
    let Node::Assignment(assignment) =
        first_child("project \"p\"\ncxx.flags = [\n    '-O2',\n  ]\npool \"x\" 1\n")
    else {
        panic!("expected assignment");
    };
    assert_eq!(assignment.expression, "[\n  '-O2',\n]");
}

#[test]
fn parse_eval_block_with_whitespace_only_line() {
    let Node::Eval(eval) = first_child("project \"p\"\neval:\n    a = 1\n    \n    b = 2\n") else {
        panic!("expected eval");
    };
    assert_eq!(eval.source, "a = 1\n\nb = 2");
}

#[test]
fn parse_eval_block_at_end_without_newline() {
    let Node::Eval(eval) = first_child("project \"p\"\neval:\n  x = 1") else {
        panic!("expected eval");
    };
    assert_eq!(eval.source, "x = 1");
}

#[test]
fn parse_empty_eval_block_at_end() {
    let Node::Eval(eval) = first_child("project \"p\"\neval:\n") else {
        panic!("expected eval");
    };
    assert_eq!(eval.source, "");
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn parse_keyword_not_allowed_in_dependency() {
    let err = parse("project \"p\"\ndependency \"d\":\n  eval x = 1\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedKeyword("eval".to_string()));
}

#[test]
fn parse_missing_colon_after_target() {
    let err = parse("project \"p\"\ntarget \"t\"\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "line 2, col 10: unexpected token \"nl\", expected \":\""
    );
}

#[test]
fn parse_pool_depth_overflow() {
    let err = parse("project \"p\"\npool \"x\" 99999999999999999999999\n").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::InvalidNumber(_)));
}

#[test]
fn parse_assignment_needs_scope() {
    let err = parse("project \"p\"\nflag = 1\n").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            found: TokenKind::Equals,
            expected: vec![TokenKind::Dot],
        }
    );
}

#[test]
fn parse_tokenization_error_is_located() {
    let err = parse("project \"p\"\npool \"x\" $\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Tokenization('$'));
    assert_eq!((err.cursor.line, err.cursor.column), (2, 9));
}

#[test]
fn parse_inline_eval_with_untokenizable_start() {
    let Node::Eval(eval) = first_child("project \"p\"\neval [x] + (y)\n") else {
        panic!("expected eval");
    };
    assert_eq!(eval.source, "[x] + (y)");
}
