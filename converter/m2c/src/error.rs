//! Driver errors.

use std::path::PathBuf;

use m2c_mapping::ConfigError;
use m2c_rewrite::RewriteError;
use thiserror::Error;

/// Everything that can go wrong in a command, per file or for the run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("path not found: `{}`", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Rewrite {
        path: PathBuf,
        #[source]
        source: RewriteError,
    },
    #[error("cannot serialize report: {0}")]
    Report(#[from] serde_json::Error),
}
