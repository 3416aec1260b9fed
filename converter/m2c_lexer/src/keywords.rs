//! Reserved word lookup.
//!
//! PHP keywords are case-insensitive. The lookup lowercases into a small
//! stack buffer and uses the length as a first-pass filter (keywords are
//! 2-12 bytes), then matches the words of that length.
//!
//! `parent`, `self` and type names like `int` are not keywords here; they lex
//! as identifiers, matching how PHP itself tokenizes them.

/// Longest reserved word (`include_once`, `require_once`).
const MAX_KEYWORD_LEN: usize = 12;

/// Whether `text` is a reserved word.
pub(crate) fn is_keyword(text: &str) -> bool {
    let bytes = text.as_bytes();
    let len = bytes.len();
    if !(2..=MAX_KEYWORD_LEN).contains(&len) || !bytes[0].is_ascii_alphabetic() {
        return false;
    }

    let mut buf = [0u8; MAX_KEYWORD_LEN];
    for (dst, src) in buf.iter_mut().zip(bytes) {
        *dst = src.to_ascii_lowercase();
    }
    let Ok(lower) = std::str::from_utf8(&buf[..len]) else {
        return false;
    };

    match len {
        2 => matches!(lower, "as" | "do" | "fn" | "if" | "or"),
        3 => matches!(
            lower,
            "and" | "die" | "for" | "new" | "try" | "use" | "var" | "xor"
        ),
        4 => matches!(
            lower,
            "case" | "echo" | "else" | "eval" | "exit" | "goto" | "list"
        ),
        5 => matches!(
            lower,
            "array"
                | "break"
                | "catch"
                | "class"
                | "clone"
                | "const"
                | "empty"
                | "endif"
                | "final"
                | "isset"
                | "match"
                | "print"
                | "throw"
                | "trait"
                | "unset"
                | "while"
                | "yield"
        ),
        6 => matches!(
            lower,
            "elseif" | "endfor" | "global" | "public" | "return" | "static" | "switch"
        ),
        7 => matches!(
            lower,
            "declare" | "default" | "extends" | "finally" | "foreach" | "include" | "private"
                | "require"
        ),
        8 => matches!(
            lower,
            "abstract" | "callable" | "continue" | "endwhile" | "function" | "readonly"
        ),
        9 => matches!(
            lower,
            "endswitch" | "insteadof" | "interface" | "namespace" | "protected"
        ),
        10 => matches!(
            lower,
            "enddeclare" | "endforeach" | "implements" | "instanceof"
        ),
        12 => matches!(lower, "include_once" | "require_once"),
        _ => false,
    }
}
