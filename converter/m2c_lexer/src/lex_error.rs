//! Lexer error types.
//!
//! Errors follow a WHERE+WHAT shape: `span`/`line` locate the error and
//! `kind` describes it. A lex error is fatal for the file; no partial token
//! stream is returned.

use thiserror::Error;

use crate::token::Span;

/// A lexer error with its location.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Error)]
#[error("line {line}: {kind}")]
pub struct LexError {
    /// WHERE the error occurred (byte range).
    pub span: Span,
    /// 1-based line of `span.start`.
    pub line: u32,
    /// WHAT went wrong.
    pub kind: LexErrorKind,
}

/// What kind of lexer error occurred.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum LexErrorKind {
    /// A byte sequence that starts no PHP token.
    #[error("unexpected character `{found}`")]
    UnexpectedCharacter { found: char },
    /// Missing closing quote for a string literal.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// `/*` without `*/`.
    #[error("unterminated comment")]
    UnterminatedComment,
    /// Heredoc/nowdoc whose closing label never appears.
    #[error("unterminated heredoc `{label}`")]
    UnterminatedHeredoc { label: String },
    /// `<<<` not followed by a label and a line break.
    #[error("malformed heredoc opener")]
    MalformedHeredoc,
    /// An opening delimiter that is never closed.
    #[error("unclosed `{open}`")]
    UnclosedDelimiter { open: char },
    /// A closing delimiter with nothing open.
    #[error("unexpected `{close}`")]
    UnexpectedCloser { close: char },
    /// A closing delimiter of the wrong family.
    #[error("mismatched `{close}`: `{open}` opened on line {open_line} is still open")]
    MismatchedDelimiter {
        open: char,
        close: char,
        open_line: u32,
    },
}

impl LexError {
    #[cold]
    pub fn new(span: Span, line: u32, kind: LexErrorKind) -> Self {
        Self { span, line, kind }
    }

    #[cold]
    pub fn unclosed(span: Span, line: u32, open: char) -> Self {
        Self::new(span, line, LexErrorKind::UnclosedDelimiter { open })
    }

    #[cold]
    pub fn unexpected_closer(span: Span, line: u32, close: char) -> Self {
        Self::new(span, line, LexErrorKind::UnexpectedCloser { close })
    }

    #[cold]
    pub fn mismatched(span: Span, line: u32, open: char, close: char, open_line: u32) -> Self {
        Self::new(
            span,
            line,
            LexErrorKind::MismatchedDelimiter {
                open,
                close,
                open_line,
            },
        )
    }
}

#[cfg(test)]
mod tests;
