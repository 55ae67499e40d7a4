//! Demonstrate error handling for invalid build files and options.

use craftr_dsl::{Config, Error, ExprEvaluator, RunError, load_str};

fn report(source: &str, config: &Config) {
    match load_str(source, "BUILD.cr", config, ExprEvaluator) {
        Ok(module) => println!("Loaded {} (unexpected)", module.name()),
        Err(Error::Parse(e)) => {
            println!("Parse error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Location: line {}, column {}", e.cursor.line, e.cursor.column);
        }
        Err(Error::Run(RunError::Option(e))) => {
            println!("Option error: {e}");
            println!("  Option: {}.{}", e.module_name(), e.option_name());
        }
        Err(Error::Run(RunError::Eval(e))) => {
            println!("Eval error on line {}: {}", e.line, e.message);
        }
        Err(Error::Io(e)) => println!("I/O error: {e}"),
    }
}

fn main() {
    // Unterminated quoted string
    report("project \"demo\nfoo.bar = 1\n", &Config::new());
    println!();

    // Mismatched sibling indentation
    report("project \"demo\"\ntarget \"a\":\n    x.y = 1\n  x.z = 2\n", &Config::new());
    println!();

    // Required option without a value
    report("project \"demo\"\noptions:\n  int jobs\n", &Config::new());
    println!();

    // Value that does not coerce
    let config: Config = [("demo.jobs", "lots")].into_iter().collect();
    report("project \"demo\"\noptions:\n  int jobs\n", &config);
    println!();

    // Failure inside an eval block
    report("project \"demo\"\neval:\n  a = 1\n  b = a + 'x'\n", &Config::new());
}
