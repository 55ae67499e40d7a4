//! Build a project programmatically, format it, and interpret it.

use craftr_dsl::{
    Assignment, Config, Dependency, Eval, ExprEvaluator, Export, Interpreter, OptionType, Options,
    Pool, Project, Target, format,
};

fn main() {
    let project = Project::new("app")
        .version("0.4.0")
        .child(
            Options::new()
                .required(OptionType::Str, "prefix")
                .with_default(OptionType::Bool, "debug", "false"),
        )
        .child(Eval::new("libdir = prefix + '/lib'"))
        .child(Pool::new("link", 2))
        .child(
            Target::new("main")
                .exported()
                .child(Dependency::new("core").assign(Assignment::new("cxx.link", "true")))
                .child(Export::new().assign(Assignment::new("cxx.include", "['include']"))),
        );

    println!("{}", format(&project));

    let mut config = Config::new();
    config.set("app.prefix", "/usr/local");
    let module = Interpreter::new(&config, ExprEvaluator, "app/BUILD.cr")
        .run(&project)
        .expect("interpretation failed");

    println!("Module {} in {}:", module.name(), module.directory().display());
    for (name, value) in module.eval_namespace().iter() {
        println!("  {name} = {value}");
    }
}
