//! CLI tool to validate, format, and run Craftr build files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use craftr_dsl::config::split_entry;
use craftr_dsl::{Config, ExprEvaluator, Project};
use tracing_subscriber::EnvFilter;

/// craftr - Craftr build file tool
#[derive(Parser)]
#[command(name = "craftr")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check if build file(s) are valid
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Format build file(s) and print to stdout
    Fmt {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Only report whether each file is already formatted
        #[arg(long)]
        check: bool,
    },

    /// Interpret a build file and print its namespace
    Run {
        file: PathBuf,

        /// key=value file supplying option values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override an option, e.g. `-O main.debug=true`
        #[arg(short = 'O', value_name = "MODULE.OPTION=VALUE", value_parser = parse_override)]
        option: Vec<(String, String)>,
    },
}

fn parse_override(arg: &str) -> Result<(String, String), String> {
    split_entry(arg)
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected MODULE.OPTION=VALUE, got {arg:?}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let ok = match cli.command {
        Commands::Check { files } => for_each_file(&files, cmd_check),
        Commands::Fmt { files, check } => {
            for_each_file(&files, |path, project, content| cmd_fmt(path, project, content, check))
        }
        Commands::Run {
            file,
            config,
            option,
        } => cmd_run(&file, config.as_deref(), option),
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Read and parse every file, handing successes to `action`. Returns false
/// if any file failed.
fn for_each_file(files: &[PathBuf], mut action: impl FnMut(&Path, &Project, &str) -> bool) -> bool {
    let mut had_error = false;
    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                had_error = true;
                continue;
            }
        };
        match craftr_dsl::parse(&content) {
            Ok(project) => had_error |= !action(path, &project, &content),
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                had_error = true;
            }
        }
    }
    !had_error
}

fn cmd_check(path: &Path, project: &Project, _content: &str) -> bool {
    eprintln!(
        "{}: valid ({} statement(s))",
        path.display(),
        project.children.len()
    );
    true
}

fn cmd_fmt(path: &Path, project: &Project, content: &str, check: bool) -> bool {
    let formatted = craftr_dsl::format(project);
    if !check {
        print!("{formatted}");
        return true;
    }
    if formatted == content {
        eprintln!("{}: formatted", path.display());
        true
    } else {
        eprintln!("{}: not formatted", path.display());
        false
    }
}

fn cmd_run(file: &Path, config: Option<&Path>, overrides: Vec<(String, String)>) -> bool {
    let mut context = match config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                return false;
            }
        },
        None => Config::new(),
    };
    for (key, value) in overrides {
        context.set(key, value);
    }

    match craftr_dsl::load_file(file, &context, ExprEvaluator) {
        Ok(module) => {
            for (name, value) in module.eval_namespace().iter() {
                println!("{name} = {value}");
            }
            true
        }
        Err(e) => {
            eprintln!("{}: {e}", file.display());
            false
        }
    }
}
