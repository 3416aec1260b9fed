//! Edit Log
//!
//! Collects token edits during a read-only scan and applies them in one batch.
//!
//! # Design
//!
//! Edits address token indices of the stream as it was scanned. They are
//! applied in reverse order (from the highest start index down) so that
//! applying one edit never shifts the indices of an edit still pending.
//! Insertions at the same index keep their recording order.
//!
//! # Example
//!
//! ```ignore
//! let mut log = EditLog::new();
//! log.replace(4..10, synthesize("$this->taxHelper")?);
//! log.insert(2, synthesize("\n    protected $taxHelper;")?);
//! log.apply(&mut stream)?;
//! ```

use std::ops::Range;

use m2c_lexer::{tokenize_fragment, LexError, Token, TokenStream};
use thiserror::Error;

/// A token edit: replace `range` with `replacement`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TokenEdit {
    /// Indices to replace (empty range for insert).
    pub range: Range<usize>,
    pub replacement: Vec<Token>,
}

impl TokenEdit {
    pub fn replace(range: Range<usize>, replacement: Vec<Token>) -> Self {
        TokenEdit { range, replacement }
    }

    /// Insert before the token at `at`.
    pub fn insert(at: usize, replacement: Vec<Token>) -> Self {
        TokenEdit {
            range: at..at,
            replacement,
        }
    }
}

/// Two recorded edits overlap.
///
/// The scanner never records overlapping edits, so this signals a bug in a
/// call-site rule or in the injector rather than bad input.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("edits overlap: {first:?} and {second:?}")]
pub struct EditConflict {
    pub first: Range<usize>,
    pub second: Range<usize>,
}

/// Append-only list of pending edits.
#[derive(Clone, Debug, Default)]
pub struct EditLog {
    edits: Vec<TokenEdit>,
}

impl EditLog {
    pub fn new() -> Self {
        EditLog { edits: Vec::new() }
    }

    pub fn replace(&mut self, range: Range<usize>, replacement: Vec<Token>) {
        self.edits.push(TokenEdit::replace(range, replacement));
    }

    pub fn insert(&mut self, at: usize, replacement: Vec<Token>) {
        self.edits.push(TokenEdit::insert(at, replacement));
    }

    /// First pair of overlapping edits, if any.
    ///
    /// Touching ranges do not overlap, and any number of inserts may share
    /// an index.
    pub fn check_conflicts(&self) -> Option<EditConflict> {
        let mut sorted: Vec<&TokenEdit> = self.edits.iter().collect();
        sorted.sort_by_key(|e| (e.range.start, e.range.end));

        for window in sorted.windows(2) {
            let (a, b) = (window[0], window[1]);
            let overlaps = a.range.end > b.range.start
                || (a.range.start == b.range.start && !a.range.is_empty() && !b.range.is_empty());
            if overlaps {
                return Some(EditConflict {
                    first: a.range.clone(),
                    second: b.range.clone(),
                });
            }
        }
        None
    }

    /// Apply every edit to `stream`, rightmost first.
    ///
    /// Nothing is applied when two edits conflict.
    pub fn apply(self, stream: &mut TokenStream) -> Result<(), EditConflict> {
        if let Some(conflict) = self.check_conflicts() {
            return Err(conflict);
        }

        let mut ordered: Vec<(usize, TokenEdit)> = self.edits.into_iter().enumerate().collect();
        ordered.sort_by(|(seq_a, a), (seq_b, b)| {
            b.range
                .start
                .cmp(&a.range.start)
                .then(b.range.end.cmp(&a.range.end))
                .then(seq_b.cmp(seq_a))
        });

        for (_, edit) in ordered {
            stream.splice(edit.range, edit.replacement);
        }
        Ok(())
    }
}

/// Lex generated code into tokens with no source position.
pub fn synthesize(text: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = tokenize_fragment(text)?.into_tokens();
    for token in &mut tokens {
        token.line = 0;
    }
    Ok(tokens)
}
