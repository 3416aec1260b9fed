//! Command-line arguments and dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use m2c_mapping::NamerKind;

use crate::commands::{lex_file, locate_file, run_convert, ConvertConfig};
use crate::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "m2c",
    about = "Convert Magento 1 PHP classes to Magento 2 constructor injection",
    version
)]
pub struct Cli {
    /// Log debug output to stderr (`RUST_LOG` takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert files and directories in place
    Convert(ConvertArgs),
    /// Dump the tokens of a file
    Lex { file: PathBuf },
    /// Show the class and constructor a conversion would edit
    Locate { file: PathBuf },
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Files or directories to convert (default: current directory)
    pub paths: Vec<PathBuf>,

    /// JSON file with class and alias mapping tables
    #[arg(long, value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// Report files that would change; exit 1 if any would
    #[arg(long, conflicts_with_all = ["diff", "stdout"])]
    pub check: bool,

    /// Print a diff instead of writing files
    #[arg(long, conflicts_with = "stdout")]
    pub diff: bool,

    /// Print converted sources instead of writing files
    #[arg(long)]
    pub stdout: bool,

    /// How injected variables are named
    #[arg(long, value_enum, default_value_t = NamerArg::Module)]
    pub namer: NamerArg,

    /// Do not declare properties for injected dependencies
    #[arg(long)]
    pub no_properties: bool,

    /// Print a JSON report
    #[arg(long, conflicts_with_all = ["diff", "stdout"])]
    pub json: bool,

    /// Worker threads (default: one per core)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
}

/// `--namer` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum NamerArg {
    /// `\Magento\Tax\Helper\Data` becomes `$taxHelper`
    Module,
    /// `\Magento\Store\Model\StoreManagerInterface` becomes `$storeManager`
    Trailing,
}

impl From<NamerArg> for NamerKind {
    fn from(arg: NamerArg) -> Self {
        match arg {
            NamerArg::Module => NamerKind::ModuleQualified,
            NamerArg::Trailing => NamerKind::TrailingSegment,
        }
    }
}

impl ConvertArgs {
    pub fn config(&self) -> ConvertConfig {
        ConvertConfig {
            check: self.check,
            diff: self.diff,
            stdout: self.stdout,
            namer: self.namer.into(),
            jobs: self.jobs,
            report_json: self.json,
            mapping: self.mapping.clone(),
            no_properties: self.no_properties,
        }
    }
}

/// Run a parsed command line, returning the process exit code.
pub fn run(cli: Cli) -> i32 {
    match cli.command {
        Command::Convert(args) => {
            let config = args.config();
            match run_convert(&args.paths, &config) {
                Ok(summary) => summary.exit_code(config.check),
                Err(e) => {
                    eprintln!("error: {e}");
                    1
                }
            }
        }
        Command::Lex { file } => print_or_fail(lex_file(&file)),
        Command::Locate { file } => print_or_fail(locate_file(&file)),
    }
}

fn print_or_fail(result: Result<String, CliError>) -> i32 {
    match result {
        Ok(output) => {
            print!("{output}");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}
