//! confgrid cli interface

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
    /// This is equivalent to running { cd <directory>; confgrid ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate every variant of a configuration
    ///
    /// Reads the configuration from stdin unless --input-file is given
    #[command(alias = "eval")]
    Evaluate(EvaluateCommand),

    /// Print the rendered source of every variant
    Render(RenderCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct EvaluateCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub grid: GridArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct RenderCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub grid: GridArgs,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load the configuration from a file
    #[clap(short = 'f', long = "input-file")]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct GridArgs {
    /// Sweep a variable over a list of values, e.g. `lr=[0.1, 0.01]`
    ///
    /// Can be specified multiple times, the result is the cartesian product.
    #[clap(short = 'g', long = "grid")]
    pub grid: Vec<String>,

    /// Load grid variables from a yaml or json mapping of name to list
    #[clap(long = "grid-file")]
    pub grid_file: Option<PathBuf>,

    /// Override a variable in every variant, e.g. `epochs=3`
    #[clap(short = 's', long = "set")]
    pub set: Vec<String>,

    /// Permit assigning a variable more than once
    #[clap(long)]
    pub allow_double_assignment: bool,

    /// Permit tuple assignments such as `a, b = 1, 2`
    #[clap(long)]
    pub allow_tuple_assignment: bool,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
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
    #[clap(flatten)]
    pub input: InputArgs,

    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    Statements,
}
