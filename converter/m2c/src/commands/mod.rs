//! Command handlers for the `m2c` CLI.
//!
//! Each submodule implements one subcommand. File reading shared by all of
//! them lives here.

use std::path::Path;

use crate::CliError;

mod convert;
mod diff;
mod lex;
mod locate;

pub use convert::{
    build_processor, convert_file, convert_files, run_convert, ConvertConfig, ConvertSummary,
    FileReport, FileStatus, InjectedDependency,
};
pub use diff::render_diff;
pub use lex::lex_file;
pub use locate::locate_file;

pub(crate) fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
