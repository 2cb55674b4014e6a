mod cli;

use varinject::injector::{InjectorOptions, VariableInjector};
use varinject::value::Value;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("VARINJECT_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Inject(inject_cli) => inject(inject_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn inject(cli: cli::InjectCommand) -> anyhow::Result<()> {
    let model = varinject::files::load_model(&cli.model)?;
    let schema = varinject::schema::FolderSchema::load(&cli.injector.schema)?;

    let args = cli.injector;
    let options = InjectorOptions {
        injector_dir: args.injector_dir,
        injector_file_name: args.injector_file,
        keywords_dir: args.keywords_dir,
        keywords_file_name: args.keywords_file,
        variable_file: args.variable_file,
        sections: args.sections,
    };

    let outcome = VariableInjector::new(model, schema, options).inject_variables_keyword_file();
    match &outcome.variable_file {
        Some(path) => eprintln!(
            "{} variables written to {}",
            outcome.variables.len(),
            path.display()
        ),
        None => eprintln!("No variables injected"),
    }

    output(&cli.output, &outcome.model)?;
    Ok(())
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    let rendered = match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_string(value)?,
        cli::OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
    };

    match &output.output_file {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }

    Ok(())
}

/// (varinject-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;
    use varinject::keywords::{resolve_rule_files, InjectorDescriptor, KeywordMap};

    match cli.command {
        Rules(args) => {
            let options = InjectorOptions {
                injector_dir: args.injector_dir,
                injector_file_name: args.injector_file,
                keywords_dir: args.keywords_dir,
                keywords_file_name: args.keywords_file,
                ..Default::default()
            };

            let mut descriptor = InjectorDescriptor::load(&options.injector_file())?;
            let keyword_map = KeywordMap::load(&options.keywords_file())?;
            let variable_file = descriptor.take_variable_file();
            println!("variable file: {variable_file:?}");

            for rule_file in resolve_rule_files(&mut descriptor, &keyword_map, &options.rule_dir()) {
                match varinject::rules::RuleSet::load(&rule_file) {
                    Ok(rule_set) => {
                        if let Some(source) = &rule_set.source {
                            println!("{}", source.display());
                        }
                        println!("{:#?}", rule_set.rules);
                    }
                    Err(err) => println!("{}\n  unable to load: {err}", rule_file.display()),
                }
            }
        }
    }

    Ok(())
}
