//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer for PHP code mode
//! (between an open tag and `?>`). Inline HTML and the open tags are handled
//! by the scanner in `lib.rs`; keyword classification happens afterwards.
//!
//! Tokens whose extent a regex cannot express (comments that stop at `?>`,
//! strings with escapes, heredocs) are matched on their opener and finished
//! by a callback that bumps the lexer.

use logos::{Lexer, Logos};

/// Error raised by the raw layer, refined into `LexErrorKind` by the scanner.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum RawError {
    #[default]
    Unrecognized,
    UnterminatedString,
    UnterminatedComment,
    UnterminatedHeredoc,
    MalformedHeredoc,
}

/// Raw token from logos.
#[derive(Logos, Clone, Copy, Debug, Eq, PartialEq)]
#[logos(error = RawError)]
pub(crate) enum RawToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[token("//", line_comment)]
    #[token("#", line_comment)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[token("'", |lex| quoted(lex, b'\''))]
    #[token("\"", |lex| quoted(lex, b'"'))]
    #[token("`", |lex| quoted(lex, b'`'))]
    String,

    #[token("<<<", heredoc)]
    Heredoc,

    #[regex(r"\$[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*")]
    Variable,

    #[regex(r"\\?[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*(\\[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*)*")]
    Name,

    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[bB][01_]+")]
    #[regex(r"0[oO][0-7_]+")]
    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
    Number,

    #[regex(r"\?>(\r?\n)?")]
    CloseTag,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("::")]
    DoubleColon,
    #[token("->")]
    Arrow,
    #[token("?->")]
    NullsafeArrow,
    #[token("=>")]
    FatArrow,
    #[token("=")]
    Eq,
    #[token("&")]
    Amp,
    #[token("...")]
    Ellipsis,
    #[token("?")]
    Question,
    #[token("#[")]
    HashBracket,
    #[token("$")]
    Dollar,
    #[token("@")]
    At,

    #[token("==")]
    #[token("===")]
    #[token("!=")]
    #[token("!==")]
    #[token("<>")]
    #[token("<=>")]
    #[token("<=")]
    #[token(">=")]
    #[token("&&")]
    #[token("||")]
    #[token("??")]
    #[token("??=")]
    #[token("++")]
    #[token("--")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token(".=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("<<")]
    #[token(">>")]
    #[token("**")]
    #[token("**=")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("<")]
    #[token(">")]
    #[token("!")]
    #[token(".")]
    #[token("|")]
    #[token("^")]
    #[token("~")]
    #[token(":")]
    Operator,
}

/// A line comment runs to the end of the line or to `?>`, whichever is first.
fn line_comment(lex: &mut Lexer<'_, RawToken>) {
    let end = line_comment_end(lex.remainder());
    lex.bump(end);
}

/// Length of `text` up to the first line break or `?>`.
pub(crate) fn line_comment_end(text: &str) -> usize {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .find(|&(i, &b)| b == b'\n' || (b == b'?' && bytes.get(i + 1) == Some(&b'>')))
        .map_or(bytes.len(), |(i, _)| i)
}

/// Whether the `#[` starting `text` opens a PHP 8 attribute.
///
/// Older PHP reads `#[` as a line comment. It is an attribute only when its
/// `]` closes on the same line and no string is left open on that line.
pub(crate) fn is_attribute(text: &str) -> bool {
    let line = &text.as_bytes()[..line_comment_end(text)];
    let mut depth = 0usize;
    let mut closed = false;
    let mut quote = None;
    let mut i = 1;
    while i < line.len() {
        let b = line[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'[' => depth += 1,
                b']' if depth > 0 => {
                    depth -= 1;
                    closed |= depth == 0;
                }
                _ => {}
            },
        }
        i += 1;
    }
    closed && quote.is_none()
}

fn block_comment(lex: &mut Lexer<'_, RawToken>) -> Result<(), RawError> {
    let rest = lex.remainder();
    if let Some(end) = rest.find("*/") {
        lex.bump(end + 2);
        Ok(())
    } else {
        lex.bump(rest.len());
        Err(RawError::UnterminatedComment)
    }
}

/// Scan to the closing `quote`, honoring backslash escapes.
///
/// Only ASCII bytes are compared, so every stop position is a char boundary.
fn quoted(lex: &mut Lexer<'_, RawToken>, quote: u8) -> Result<(), RawError> {
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            b if b == quote => {
                lex.bump(i + 1);
                return Ok(());
            }
            _ => i += 1,
        }
    }
    lex.bump(rest.len());
    Err(RawError::UnterminatedString)
}

/// `<<<LABEL`, `<<<"LABEL"` or `<<<'LABEL'`, a line break, the body, and the
/// closing label (which may be indented).
fn heredoc(lex: &mut Lexer<'_, RawToken>) -> Result<(), RawError> {
    let rest = lex.remainder();
    let bytes = rest.as_bytes();

    let mut i = skip_blanks(bytes, 0);
    let quote = match bytes.get(i) {
        Some(&q @ (b'\'' | b'"')) => {
            i += 1;
            Some(q)
        }
        _ => None,
    };

    let label_start = i;
    while i < bytes.len() && is_label_byte(bytes[i], i == label_start) {
        i += 1;
    }
    if i == label_start {
        return Err(RawError::MalformedHeredoc);
    }
    let label = &rest[label_start..i];

    if let Some(q) = quote {
        if bytes.get(i) != Some(&q) {
            return Err(RawError::MalformedHeredoc);
        }
        i += 1;
    }

    if bytes[i..].starts_with(b"\r\n") {
        i += 2;
    } else if bytes.get(i) == Some(&b'\n') {
        i += 1;
    } else {
        return Err(RawError::MalformedHeredoc);
    }

    let mut line_start = i;
    loop {
        let j = skip_blanks(bytes, line_start);
        if rest[j..].starts_with(label)
            && !bytes
                .get(j + label.len())
                .is_some_and(|&b| is_label_byte(b, false))
        {
            lex.bump(j + label.len());
            return Ok(());
        }
        match rest[line_start..].find('\n') {
            Some(nl) => line_start += nl + 1,
            None => {
                lex.bump(rest.len());
                return Err(RawError::UnterminatedHeredoc);
            }
        }
    }
}

fn skip_blanks(bytes: &[u8], mut i: usize) -> usize {
    while matches!(bytes.get(i), Some(b' ' | b'\t')) {
        i += 1;
    }
    i
}

fn is_label_byte(b: u8, first: bool) -> bool {
    b == b'_' || b.is_ascii_alphabetic() || b >= 0x80 || (!first && b.is_ascii_digit())
}
