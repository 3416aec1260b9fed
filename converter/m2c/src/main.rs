//! `m2c` command-line entry point.

use clap::Parser;
use m2c::cli::{run, Cli};

fn main() {
    let cli = Cli::parse();
    m2c::init_tracing(cli.verbose);
    std::process::exit(run(cli));
}
