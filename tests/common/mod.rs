#![allow(dead_code)]

use craftr_dsl::{Project, format, parse};

pub fn parse_ok(input: &str) -> Project {
    parse(input).unwrap_or_else(|e| panic!("parse failed: {e}\n--- input ---\n{input}"))
}

/// Parse then format must reproduce `input` exactly.
pub fn roundtrip(input: &str) {
    let output = format(&parse_ok(input));
    assert_eq!(
        output, input,
        "round-trip mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}

/// Helper: format an AST, parse it back, and assert the re-parsed tree
/// formats to the same text.
pub fn assert_format_stable(original: &Project) {
    let formatted = format(original);
    let parsed = parse(&formatted).unwrap_or_else(|e| {
        panic!(
            "failed to re-parse formatted output: {e}\n\
             --- formatted ---\n{formatted}"
        )
    });
    assert_eq!(
        format(&parsed),
        formatted,
        "format not idempotent\n--- formatted ---\n{formatted}"
    );
    assert_eq!(original.name, parsed.name);
    assert_eq!(original.version, parsed.version);
    assert_eq!(original.children.len(), parsed.children.len());
}
