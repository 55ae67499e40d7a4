//! Parse a build file string and re-format it.

use craftr_dsl::Node;

fn main() {
    let input = "\
project \"demo\" v1.2.0
options:
    int   jobs = 4
    bool  debug
eval:
    greeting = 'hello'
export target \"main\":
    dependency \"lib\":
        cxx.link = true
";

    let project = craftr_dsl::parse_str(input).expect("parse failed");

    println!("Project: {} v{}", project.name, project.version);
    for child in &project.children {
        match child {
            Node::Options(options) => {
                for decl in &options.options {
                    println!("  Option: {} {} (line {})", decl.dtype, decl.name, decl.loc.line);
                }
            }
            Node::Eval(eval) => println!("  Eval block at line {}", eval.loc.line),
            Node::Target(target) => println!("  Target: {}", target.name),
            other => println!("  Statement at {}", other.loc()),
        }
    }

    let output = craftr_dsl::format(&project);
    println!("\nFormatted output:\n{output}");
}
