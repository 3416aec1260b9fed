//! Whitespace conventions read from the surrounding code.

use m2c_lexer::{Token, TokenKind, TokenStream};

/// Indentation after the last line break of a whitespace token.
pub(super) fn line_indent(token: &Token) -> Option<&str> {
    if !token.is(TokenKind::Whitespace) {
        return None;
    }
    token.text.rfind('\n').map(|nl| &token.text[nl + 1..])
}

/// Indentation of the line `index` starts, when it is first on its line.
pub(super) fn indent_before(stream: &TokenStream, index: usize) -> Option<&str> {
    let prev = index.checked_sub(1)?;
    line_indent(&stream[prev])
}

/// `\r\n` when the file uses it, `\n` otherwise.
pub(super) fn line_ending(stream: &TokenStream) -> &'static str {
    let crlf = stream
        .iter()
        .find(|t| t.is(TokenKind::Whitespace) && t.has_newline())
        .is_some_and(|t| t.text.contains("\r\n"));
    if crlf {
        "\r\n"
    } else {
        "\n"
    }
}

/// Whether any whitespace strictly between `open` and `close` breaks a line.
pub(super) fn spans_lines(stream: &TokenStream, open: usize, close: usize) -> bool {
    (open + 1..close).any(|i| stream[i].is(TokenKind::Whitespace) && stream[i].has_newline())
}

/// Whitespace separating top-level statements of a one-line body.
///
/// Taken from the first gap after a `;` or `}` that is followed by more code.
pub(super) fn inline_separator(stream: &TokenStream, open: usize, last: usize) -> Option<&str> {
    let mut depth = 0usize;
    for i in open + 1..last {
        let kind = stream[i].kind;
        if kind.is_open_delimiter() {
            depth += 1;
        } else if kind.is_close_delimiter() {
            depth = depth.saturating_sub(1);
        }
        let ends_statement = kind == TokenKind::Semicolon || kind == TokenKind::CloseBrace;
        if depth == 0 && ends_statement && i + 1 < last && stream[i + 1].is(TokenKind::Whitespace) {
            return Some(stream[i + 1].text.as_str());
        }
    }
    None
}

/// Last non-whitespace token strictly between `open` and `close`.
///
/// Comments count, so code appended after a trailing comment lands below it
/// rather than inside it.
pub(super) fn last_content(stream: &TokenStream, open: usize, close: usize) -> Option<usize> {
    (open + 1..close)
        .rev()
        .find(|&i| !stream[i].is(TokenKind::Whitespace))
}

/// First non-whitespace token strictly between `open` and `close`.
pub(super) fn first_content(stream: &TokenStream, open: usize, close: usize) -> Option<usize> {
    (open + 1..close).find(|&i| !stream[i].is(TokenKind::Whitespace))
}
