//! varinject cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; varinject ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replace model values with property tokens and write a variable file
    Inject(InjectCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct InjectCommand {
    /// Model file (yaml or json)
    #[clap(short = 'm', long = "model")]
    pub model: PathBuf,

    #[clap(flatten)]
    pub injector: InjectorArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct InjectorArgs {
    /// Folder schema describing the model (yaml or json)
    #[clap(short = 's', long = "schema")]
    pub schema: PathBuf,

    /// Directory of the injector file and keyword rule files
    ///
    /// Defaults to $VARINJECT_HOME/lib
    #[clap(long = "injector-dir")]
    pub injector_dir: Option<PathBuf>,

    /// Name of the injector file
    #[clap(long = "injector-file")]
    pub injector_file: Option<String>,

    /// Directory of the keyword file
    #[clap(long = "keywords-dir")]
    pub keywords_dir: Option<PathBuf>,

    /// Name of the keyword file
    #[clap(long = "keywords-file")]
    pub keywords_file: Option<String>,

    /// Variable file, unless the injector file names one
    #[clap(short = 'v', long = "variable-file")]
    pub variable_file: Option<PathBuf>,

    /// Only search these top level sections of the model
    ///
    /// Can be specified multiple times
    #[clap(long = "section")]
    pub sections: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,

    /// Write the model here instead of stdout
    #[clap(short = 'O', long = "output-file")]
    pub output_file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Show the rule files and rules selected by the injector file
    Rules(DevRulesCommand),
}

#[derive(Parser, Debug)]
pub struct DevRulesCommand {
    #[clap(long = "injector-dir")]
    pub injector_dir: Option<PathBuf>,

    #[clap(long = "injector-file")]
    pub injector_file: Option<String>,

    #[clap(long = "keywords-dir")]
    pub keywords_dir: Option<PathBuf>,

    #[clap(long = "keywords-file")]
    pub keywords_file: Option<String>,
}
