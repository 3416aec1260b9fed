//! Token and span types.
//!
//! A [`Token`] owns its source text so that a stream can be edited and
//! re-serialized without consulting the original buffer. Nothing is dropped
//! during lexing: whitespace, comments and inline HTML are tokens too.

use std::fmt;
use std::ops::Range;

/// Byte range in the original source.
///
/// Only used for error reporting; token positions inside a stream are plain
/// indices.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create from a byte range, saturating at `u32::MAX`.
    #[inline]
    pub fn from_range(range: Range<usize>) -> Self {
        let start = u32::try_from(range.start).unwrap_or(u32::MAX);
        let end = u32::try_from(range.end).unwrap_or(u32::MAX);
        Span { start, end }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Lexical category of a token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    // === Mode switches ===
    /// Text outside `<?php ... ?>`.
    InlineHtml,
    /// `<?php` including the single whitespace character that follows it.
    OpenTag,
    /// `<?=`
    OpenTagWithEcho,
    /// `?>` including one directly following newline.
    CloseTag,

    // === Trivia ===
    Whitespace,
    /// `// ...` or `# ...`
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// `/** ... */`
    DocComment,

    // === Names and literals ===
    /// `$name`
    Variable,
    /// Unqualified name that is not a keyword.
    Identifier,
    /// Name containing a namespace separator: `\Foo`, `Foo\Bar`.
    QualifiedName,
    /// Reserved word; compare with [`Token::is_keyword`] (case-insensitive).
    Keyword,
    /// Single-quoted, double-quoted or backtick string.
    StringLiteral,
    /// Heredoc or nowdoc, opener through closing label.
    Heredoc,
    Number,

    // === Delimiters ===
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,

    // === Punctuation ===
    Semicolon,
    Comma,
    /// `::`
    DoubleColon,
    /// `->`
    ObjectOperator,
    /// `?->`
    NullsafeObjectOperator,
    /// `=>`
    DoubleArrow,
    /// `=`
    Assign,
    /// `&`
    Ampersand,
    /// `...`
    Ellipsis,
    /// `?`
    Question,
    /// `#[`
    AttributeStart,
    /// `$` not followed by a name (`$$var`, `${expr}`).
    Dollar,
    /// `@`
    At,
    /// Any other operator (`+`, `===`, `??=`, `.`, `:`...).
    Operator,
}

impl TokenKind {
    /// Whitespace and comments.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::DocComment
        )
    }

    /// Opening delimiter; `#[` opens a bracket pair like `[`.
    #[inline]
    pub fn is_open_delimiter(self) -> bool {
        matches!(
            self,
            TokenKind::OpenBrace
                | TokenKind::OpenParen
                | TokenKind::OpenBracket
                | TokenKind::AttributeStart
        )
    }

    #[inline]
    pub fn is_close_delimiter(self) -> bool {
        matches!(
            self,
            TokenKind::CloseBrace | TokenKind::CloseParen | TokenKind::CloseBracket
        )
    }

    /// The closer matching an opening delimiter.
    pub fn closing(self) -> Option<TokenKind> {
        match self {
            TokenKind::OpenBrace => Some(TokenKind::CloseBrace),
            TokenKind::OpenParen => Some(TokenKind::CloseParen),
            TokenKind::OpenBracket | TokenKind::AttributeStart => Some(TokenKind::CloseBracket),
            _ => None,
        }
    }

    /// Short human-readable name, used by token dumps.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::InlineHtml => "inline-html",
            TokenKind::OpenTag => "open-tag",
            TokenKind::OpenTagWithEcho => "open-tag-echo",
            TokenKind::CloseTag => "close-tag",
            TokenKind::Whitespace => "whitespace",
            TokenKind::LineComment => "line-comment",
            TokenKind::BlockComment => "block-comment",
            TokenKind::DocComment => "doc-comment",
            TokenKind::Variable => "variable",
            TokenKind::Identifier => "identifier",
            TokenKind::QualifiedName => "qualified-name",
            TokenKind::Keyword => "keyword",
            TokenKind::StringLiteral => "string",
            TokenKind::Heredoc => "heredoc",
            TokenKind::Number => "number",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::DoubleColon => "::",
            TokenKind::ObjectOperator => "->",
            TokenKind::NullsafeObjectOperator => "?->",
            TokenKind::DoubleArrow => "=>",
            TokenKind::Assign => "=",
            TokenKind::Ampersand => "&",
            TokenKind::Ellipsis => "...",
            TokenKind::Question => "?",
            TokenKind::AttributeStart => "#[",
            TokenKind::Dollar => "$",
            TokenKind::At => "@",
            TokenKind::Operator => "operator",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexed token.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line the token starts on; 0 for synthesized tokens.
    pub line: u32,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
        }
    }

    /// A token that has no position in the original source.
    #[inline]
    pub fn synthetic(kind: TokenKind, text: impl Into<String>) -> Self {
        Self::new(kind, text, 0)
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    #[inline]
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// Keyword check; PHP keywords are case-insensitive.
    #[inline]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Identifier or qualified name equal to `name`, ignoring ASCII case.
    #[inline]
    pub fn is_name(&self, name: &str) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::QualifiedName)
            && self.text.eq_ignore_ascii_case(name)
    }

    /// Whether the text contains a line break.
    #[inline]
    pub fn has_newline(&self) -> bool {
        self.text.contains('\n')
    }
}
