//! Ordered token sequence with splice and reconstruction.
//!
//! Indices are positions in the current sequence. Any splice shifts the
//! indices after it, so callers collect edits first and apply them in one
//! rightmost-first batch.

use std::ops::{Index, Range};

use crate::token::{Token, TokenKind};

/// A lexed source file.
///
/// Invariant: [`TokenStream::reconstruct`] of a stream produced by
/// [`crate::tokenize`] and never spliced is byte-identical to the input.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream { tokens }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Concatenate all token text.
    pub fn reconstruct(&self) -> String {
        let len = self.tokens.iter().map(|t| t.text.len()).sum();
        let mut out = String::with_capacity(len);
        for token in &self.tokens {
            out.push_str(&token.text);
        }
        out
    }

    /// Concatenated text of `range`, clamped to the stream.
    pub fn text_of(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.tokens.len());
        let start = range.start.min(end);
        self.tokens[start..end]
            .iter()
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Replace `range` with `replacement`.
    ///
    /// Tokens outside the range are untouched; no whitespace is re-flowed.
    /// The range is clamped to the stream.
    pub fn splice(&mut self, range: Range<usize>, replacement: Vec<Token>) {
        let end = range.end.min(self.tokens.len());
        let start = range.start.min(end);
        self.tokens.splice(start..end, replacement);
    }

    /// First non-trivia index at or after `from`.
    pub fn significant_from(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&i| !self.tokens[i].is_trivia())
    }

    /// First non-trivia index after `index`.
    pub fn next_significant(&self, index: usize) -> Option<usize> {
        self.significant_from(index + 1)
    }

    /// Last non-trivia index before `index`.
    pub fn prev_significant(&self, index: usize) -> Option<usize> {
        (0..index.min(self.tokens.len()))
            .rev()
            .find(|&i| !self.tokens[i].is_trivia())
    }

    /// Kind of the token at `index`, if any.
    #[inline]
    pub fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    /// Index of the delimiter closing the opener at `open`.
    ///
    /// Counts every delimiter family together, which is exact for streams
    /// that passed the balance check in [`crate::tokenize`].
    pub fn matching_close(&self, open: usize) -> Option<usize> {
        if !self.kind_at(open)?.is_open_delimiter() {
            return None;
        }
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(open) {
            if token.kind.is_open_delimiter() {
                depth += 1;
            } else if token.kind.is_close_delimiter() {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    /// Split `range` at commas that are not nested inside a delimiter.
    ///
    /// Returns one sub-range per item, including its surrounding trivia and
    /// excluding the commas. An empty or all-trivia range yields no items; a
    /// trailing comma does not produce an empty final item.
    pub fn split_top_level(&self, range: Range<usize>) -> Vec<Range<usize>> {
        let end = range.end.min(self.tokens.len());
        let mut items = Vec::new();
        let mut depth = 0usize;
        let mut item_start = range.start;

        for i in range.start..end {
            let kind = self.tokens[i].kind;
            if kind.is_open_delimiter() {
                depth += 1;
            } else if kind.is_close_delimiter() {
                depth = depth.saturating_sub(1);
            } else if kind == TokenKind::Comma && depth == 0 {
                items.push(item_start..i);
                item_start = i + 1;
            }
        }
        items.push(item_start..end);

        items.retain(|item| item.clone().any(|i| !self.tokens[i].is_trivia()));
        items
    }

    /// Range with leading and trailing trivia removed.
    pub fn trim_trivia(&self, range: Range<usize>) -> Range<usize> {
        let mut start = range.start;
        let mut end = range.end.min(self.tokens.len());
        while start < end && self.tokens[start].is_trivia() {
            start += 1;
        }
        while end > start && self.tokens[end - 1].is_trivia() {
            end -= 1;
        }
        start..end
    }
}

impl Index<usize> for TokenStream {
    type Output = Token;

    #[inline]
    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        TokenStream::new(tokens)
    }
}
