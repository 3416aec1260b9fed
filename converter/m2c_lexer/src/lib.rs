//! Lossless PHP tokenizer for the m2c converter.
//!
//! Produces a [`TokenStream`] in which every byte of the input belongs to
//! exactly one token, so `reconstruct(tokenize(src)?) == src`.
//!
//! # Modes
//!
//! A PHP file alternates between inline HTML and code. The scanner finds the
//! open tags itself (`<?php` plus one whitespace character, or `<?=`) and
//! hands code regions to the logos-derived [`raw_token::RawToken`] until a
//! `?>` switches back. Short `<?` tags are not recognized and stay HTML.
//!
//! # Keywords
//!
//! Names are classified after the raw pass: a reserved word becomes
//! [`TokenKind::Keyword`] unless it follows `->`, `?->`, `::` or `function`,
//! where PHP allows reserved words as member names.

mod keywords;
mod lex_error;
mod line_index;
mod raw_token;
mod stream;
mod token;

pub use lex_error::{LexError, LexErrorKind};
pub use stream::TokenStream;
pub use token::{Span, Token, TokenKind};

use logos::Logos;

use line_index::LineIndex;
use raw_token::{RawError, RawToken};

/// Tokenize a whole PHP file, starting in inline HTML mode.
///
/// Fails on an unterminated string, comment or heredoc, on a byte that starts
/// no token, and on unbalanced `{}`/`()`/`[]` outside strings and comments.
pub fn tokenize(source: &str) -> Result<TokenStream, LexError> {
    let tokens = Scanner::new(source).run(false)?;
    check_balance(&tokens)?;
    tracing::trace!(tokens = tokens.len(), bytes = source.len(), "tokenized");
    Ok(TokenStream::new(tokens))
}

/// Tokenize a snippet of PHP code with no open tag.
///
/// Used to build replacement token sequences. Delimiter balance is not
/// checked, so a fragment such as `) {` is accepted.
pub fn tokenize_fragment(source: &str) -> Result<TokenStream, LexError> {
    Scanner::new(source).run(true).map(TokenStream::new)
}

/// Concatenate the text of every token in order.
pub fn reconstruct(stream: &TokenStream) -> String {
    stream.reconstruct()
}

struct Scanner<'src> {
    source: &'src str,
    pos: usize,
    lines: LineIndex,
    tokens: Vec<Token>,
    /// Last non-trivia token kind, with whether it was the `function` keyword.
    prev: Option<(TokenKind, bool)>,
}

impl<'src> Scanner<'src> {
    fn new(source: &'src str) -> Self {
        Scanner {
            source,
            pos: 0,
            lines: LineIndex::new(source),
            tokens: Vec::new(),
            prev: None,
        }
    }

    fn run(mut self, start_in_code: bool) -> Result<Vec<Token>, LexError> {
        let mut in_code = start_in_code;
        while self.pos < self.source.len() {
            if in_code {
                self.code()?;
                in_code = false;
            } else {
                in_code = self.html();
            }
        }
        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let source = self.source;
        let text = &source[start..end];
        if !kind.is_trivia() {
            let is_function = kind == TokenKind::Keyword && text.eq_ignore_ascii_case("function");
            self.prev = Some((kind, is_function));
        }
        self.tokens
            .push(Token::new(kind, text, self.lines.line_of(start)));
    }

    /// Inline HTML up to the next open tag. Returns whether a tag was found.
    fn html(&mut self) -> bool {
        let start = self.pos;
        match find_open_tag(self.source, start) {
            Some((tag_start, tag_end, kind)) => {
                if tag_start > start {
                    self.push(TokenKind::InlineHtml, start, tag_start);
                }
                self.push(kind, tag_start, tag_end);
                self.pos = tag_end;
                true
            }
            None => {
                self.push(TokenKind::InlineHtml, start, self.source.len());
                self.pos = self.source.len();
                false
            }
        }
    }

    /// Code up to and including the next `?>`, or to the end of input.
    fn code(&mut self) -> Result<(), LexError> {
        let source = self.source;
        let base = self.pos;
        let mut logos = RawToken::lexer(&source[base..]);

        while let Some(result) = logos.next() {
            let range = logos.span();
            let (start, end) = (base + range.start, base + range.end);
            let slice = logos.slice();

            let raw = match result {
                Ok(raw) => raw,
                Err(error) => return Err(self.raw_error(error, start, end, slice)),
            };

            if raw == RawToken::HashBracket && !raw_token::is_attribute(&source[start..]) {
                let comment_end = start + raw_token::line_comment_end(&source[start..]);
                logos.bump(comment_end - end);
                self.push(TokenKind::LineComment, start, comment_end);
                continue;
            }

            let kind = self.convert(raw, slice);
            self.push(kind, start, end);
            if raw == RawToken::CloseTag {
                self.pos = end;
                return Ok(());
            }
        }

        self.pos = self.source.len();
        Ok(())
    }

    fn convert(&self, raw: RawToken, slice: &str) -> TokenKind {
        match raw {
            RawToken::Whitespace => TokenKind::Whitespace,
            RawToken::LineComment => TokenKind::LineComment,
            RawToken::BlockComment => {
                let bytes = slice.as_bytes();
                if bytes.len() > 4
                    && bytes.starts_with(b"/**")
                    && bytes[3].is_ascii_whitespace()
                {
                    TokenKind::DocComment
                } else {
                    TokenKind::BlockComment
                }
            }
            RawToken::String => TokenKind::StringLiteral,
            RawToken::Heredoc => TokenKind::Heredoc,
            RawToken::Variable => TokenKind::Variable,
            RawToken::Name => self.classify_name(slice),
            RawToken::Number => TokenKind::Number,
            RawToken::CloseTag => TokenKind::CloseTag,
            RawToken::LBrace => TokenKind::OpenBrace,
            RawToken::RBrace => TokenKind::CloseBrace,
            RawToken::LParen => TokenKind::OpenParen,
            RawToken::RParen => TokenKind::CloseParen,
            RawToken::LBracket => TokenKind::OpenBracket,
            RawToken::RBracket => TokenKind::CloseBracket,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Comma => TokenKind::Comma,
            RawToken::DoubleColon => TokenKind::DoubleColon,
            RawToken::Arrow => TokenKind::ObjectOperator,
            RawToken::NullsafeArrow => TokenKind::NullsafeObjectOperator,
            RawToken::FatArrow => TokenKind::DoubleArrow,
            RawToken::Eq => TokenKind::Assign,
            RawToken::Amp => TokenKind::Ampersand,
            RawToken::Ellipsis => TokenKind::Ellipsis,
            RawToken::Question => TokenKind::Question,
            RawToken::HashBracket => TokenKind::AttributeStart,
            RawToken::Dollar => TokenKind::Dollar,
            RawToken::At => TokenKind::At,
            RawToken::Operator => TokenKind::Operator,
        }
    }

    fn classify_name(&self, slice: &str) -> TokenKind {
        if slice.contains('\\') {
            return TokenKind::QualifiedName;
        }
        let member_position = matches!(
            self.prev,
            Some(
                (
                    TokenKind::ObjectOperator
                        | TokenKind::NullsafeObjectOperator
                        | TokenKind::DoubleColon,
                    _
                ) | (_, true)
            )
        );
        if !member_position && keywords::is_keyword(slice) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    }

    #[cold]
    fn raw_error(&self, error: RawError, start: usize, end: usize, slice: &str) -> LexError {
        let span = Span::from_range(start..end);
        let line = self.lines.line_of(start);
        let kind = match error {
            RawError::Unrecognized => LexErrorKind::UnexpectedCharacter {
                found: slice.chars().next().unwrap_or('\0'),
            },
            RawError::UnterminatedString => LexErrorKind::UnterminatedString,
            RawError::UnterminatedComment => LexErrorKind::UnterminatedComment,
            RawError::UnterminatedHeredoc => LexErrorKind::UnterminatedHeredoc {
                label: heredoc_label(slice).to_owned(),
            },
            RawError::MalformedHeredoc => LexErrorKind::MalformedHeredoc,
        };
        LexError::new(span, line, kind)
    }
}

/// Locate the next `<?php` or `<?=` at or after `from`.
///
/// Returns the tag's byte range and kind. `<?php` must be followed by a
/// whitespace character (consumed into the tag, `\r\n` as one) or the end of
/// input.
fn find_open_tag(source: &str, from: usize) -> Option<(usize, usize, TokenKind)> {
    let bytes = source.as_bytes();
    let mut search = from;
    while let Some(offset) = source[search..].find("<?") {
        let start = search + offset;
        let after = start + 2;
        if bytes.get(after) == Some(&b'=') {
            return Some((start, after + 1, TokenKind::OpenTagWithEcho));
        }
        if bytes
            .get(after..after + 3)
            .is_some_and(|word| word.eq_ignore_ascii_case(b"php"))
        {
            let end = after + 3;
            match bytes.get(end) {
                None => return Some((start, end, TokenKind::OpenTag)),
                Some(b'\r') if bytes.get(end + 1) == Some(&b'\n') => {
                    return Some((start, end + 2, TokenKind::OpenTag));
                }
                Some(b' ' | b'\t' | b'\n' | b'\r') => {
                    return Some((start, end + 1, TokenKind::OpenTag));
                }
                Some(_) => {}
            }
        }
        search = after;
    }
    None
}

/// Label of a heredoc opener slice (`<<<"EOT"\n...` yields `EOT`).
fn heredoc_label(slice: &str) -> &str {
    let rest = slice
        .trim_start_matches("<<<")
        .trim_start_matches([' ', '\t'])
        .trim_start_matches(['\'', '"']);
    let end = rest
        .find(|c: char| !(c == '_' || c.is_alphanumeric()))
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Reject unbalanced delimiters, reporting the innermost open one.
fn check_balance(tokens: &[Token]) -> Result<(), LexError> {
    struct Open {
        kind: TokenKind,
        delimiter: char,
        offset: usize,
        line: u32,
    }

    let mut stack: Vec<Open> = Vec::new();
    let mut offset = 0usize;

    for token in tokens {
        let start = offset;
        offset += token.text.len();
        let delimiter = token.text.chars().next().unwrap_or('\0');

        if token.kind.is_open_delimiter() {
            stack.push(Open {
                kind: token.kind,
                delimiter: if token.kind == TokenKind::AttributeStart {
                    '['
                } else {
                    delimiter
                },
                offset: start,
                line: token.line,
            });
        } else if token.kind.is_close_delimiter() {
            let span = Span::from_range(start..offset);
            let Some(open) = stack.pop() else {
                return Err(LexError::unexpected_closer(span, token.line, delimiter));
            };
            if open.kind.closing() != Some(token.kind) {
                return Err(LexError::mismatched(
                    span,
                    token.line,
                    open.delimiter,
                    delimiter,
                    open.line,
                ));
            }
        }
    }

    match stack.pop() {
        Some(open) => Err(LexError::unclosed(
            Span::from_range(open.offset..open.offset + 1),
            open.line,
            open.delimiter,
        )),
        None => Ok(()),
    }
}
