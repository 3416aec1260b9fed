//! Per-file conversion errors.

use m2c_lexer::LexError;
use thiserror::Error;

use crate::edit::EditConflict;
use crate::inject::InjectionError;

/// Why a file could not be converted. No partial output exists for it.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Injection(#[from] InjectionError),
    #[error("internal error: {0}")]
    Edit(#[from] EditConflict),
}

impl RewriteError {
    /// Line of the offending source, when there is one.
    pub fn line(&self) -> Option<u32> {
        match self {
            RewriteError::Lex(error) => Some(error.line),
            RewriteError::Injection(_) | RewriteError::Edit(_) => None,
        }
    }
}
