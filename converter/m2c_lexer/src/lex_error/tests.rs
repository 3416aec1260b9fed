use super::*;

#[test]
fn error_construction() {
    let span = Span::from_range(10..11);
    let err = LexError::unclosed(span, 3, '{');
    assert_eq!(err.span, span);
    assert_eq!(err.line, 3);
    assert_eq!(err.kind, LexErrorKind::UnclosedDelimiter { open: '{' });
}

#[test]
fn display_includes_line() {
    let err = LexError::new(
        Span::from_range(0..1),
        7,
        LexErrorKind::UnexpectedCharacter { found: '\\' },
    );
    assert_eq!(err.to_string(), "line 7: unexpected character `\\`");
}

#[test]
fn mismatched_message_names_both_delimiters() {
    let err = LexError::mismatched(Span::from_range(5..6), 2, '(', ']', 1);
    assert_eq!(
        err.to_string(),
        "line 2: mismatched `]`: `(` opened on line 1 is still open"
    );
}

#[test]
fn error_equality() {
    let span = Span::from_range(0..1);
    let a = LexError::unexpected_closer(span, 1, '}');
    let b = LexError::unexpected_closer(span, 1, '}');
    let c = LexError::unexpected_closer(span, 1, ')');
    assert_eq!(a, b);
    assert_ne!(a, c);
}
