//! Constructor Locator
//!
//! Finds the primary class of a file, its parent, and its constructor, by
//! scanning tokens. No syntax tree is built; delimiter depth relative to the
//! class body is enough to tell class members from code nested in methods
//! or anonymous classes.
//!
//! A [`ConstructorDescriptor`] holds token indices and is stale after any
//! edit to the stream. Locate again instead of adjusting it.

use std::ops::Range;

use m2c_lexer::{Token, TokenKind, TokenStream};

/// Method name PHP uses for constructors.
pub const CONSTRUCTOR_MARKER: &str = "__construct";

const METHOD_MODIFIERS: [&str; 6] = [
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
];
const PROMOTION_MODIFIERS: [&str; 4] = ["public", "protected", "private", "readonly"];

/// The first class declared in a file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassInfo {
    /// Index of the `class` keyword.
    pub keyword_index: usize,
    pub name: Option<String>,
    /// `extends` target, verbatim.
    pub parent_class: Option<String>,
    pub body_open: usize,
    pub body_close: usize,
}

/// One declared constructor parameter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    /// Declared type text (`\Foo\Bar`, `?int`, `array`), if any.
    pub type_name: Option<String>,
    /// Name without the `$`.
    pub name: String,
    pub has_default: bool,
    pub is_variadic: bool,
    /// Constructor-promoted (`private Foo $foo`).
    pub is_promoted: bool,
    /// First significant token of the parameter.
    pub start: usize,
    /// One past the last significant token.
    pub end: usize,
}

impl Parameter {
    /// Mandatory parameters have no default and are not variadic.
    pub fn is_mandatory(&self) -> bool {
        !self.has_default && !self.is_variadic
    }
}

/// `(` and `)` of a parameter list.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ParameterList {
    pub open: usize,
    pub close: usize,
}

impl ParameterList {
    /// Indices strictly between the parentheses.
    pub fn inner(&self) -> Range<usize> {
        self.open + 1..self.close
    }
}

/// Where a class's constructor is, or where one would go.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConstructorDescriptor {
    pub exists: bool,
    /// First modifier (or `function`) of the constructor; the class body `{`
    /// when there is no constructor.
    pub start_index: usize,
    pub body_open_index: Option<usize>,
    pub body_close_index: Option<usize>,
    pub parameter_list: Option<ParameterList>,
    pub existing_parameters: Vec<Parameter>,
    pub parent_class: Option<String>,
    pub class_body_open: usize,
    pub class_body_close: usize,
    /// Additional top-level constructors after the first.
    pub duplicate_constructors: usize,
}

impl ConstructorDescriptor {
    /// Abstract or interface-style constructor without a body.
    pub fn is_bodiless(&self) -> bool {
        self.exists && self.body_open_index.is_none()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.existing_parameters.iter().find(|p| p.name == name)
    }
}

/// The first class declaration in the stream.
///
/// `Foo::class`, `$x->class` and `new class` are not declarations.
pub fn find_class(stream: &TokenStream) -> Option<ClassInfo> {
    let keyword_index = (0..stream.len()).find(|&i| {
        stream[i].is_keyword("class")
            && !stream.prev_significant(i).is_some_and(|p| {
                let prev = &stream[p];
                matches!(
                    prev.kind,
                    TokenKind::DoubleColon
                        | TokenKind::ObjectOperator
                        | TokenKind::NullsafeObjectOperator
                ) || prev.is_keyword("new")
            })
    })?;

    let body_open =
        (keyword_index + 1..stream.len()).find(|&i| stream[i].is(TokenKind::OpenBrace))?;
    let body_close = stream.matching_close(body_open)?;

    let name = stream
        .next_significant(keyword_index)
        .filter(|&i| i < body_open && stream[i].is(TokenKind::Identifier))
        .map(|i| stream[i].text.clone());

    let parent_class = (keyword_index + 1..body_open)
        .find(|&i| stream[i].is_keyword("extends"))
        .and_then(|i| stream.next_significant(i))
        .filter(|&i| i < body_open && is_name(&stream[i]))
        .map(|i| stream[i].text.clone());

    Some(ClassInfo {
        keyword_index,
        name,
        parent_class,
        body_open,
        body_close,
    })
}

/// Locate the constructor of the first class, matching `marker`
/// case-insensitively. `None` when the file declares no class.
pub fn locate(stream: &TokenStream, marker: &str) -> Option<ConstructorDescriptor> {
    let class = find_class(stream)?;
    let mut descriptor = ConstructorDescriptor {
        exists: false,
        start_index: class.body_open,
        body_open_index: None,
        body_close_index: None,
        parameter_list: None,
        existing_parameters: Vec::new(),
        parent_class: class.parent_class.clone(),
        class_body_open: class.body_open,
        class_body_close: class.body_close,
        duplicate_constructors: 0,
    };

    for function in class_members(stream, class.body_open, class.body_close) {
        if !stream[function].is_keyword("function") {
            continue;
        }
        let Some(name) = method_name(stream, function) else {
            continue;
        };
        if !stream[name].text.eq_ignore_ascii_case(marker) {
            continue;
        }
        if descriptor.exists {
            descriptor.duplicate_constructors += 1;
            continue;
        }
        fill_constructor(stream, function, name, &mut descriptor);
    }

    tracing::trace!(
        exists = descriptor.exists,
        parameters = descriptor.existing_parameters.len(),
        parent = ?descriptor.parent_class,
        "located constructor"
    );
    Some(descriptor)
}

/// Indices of tokens directly inside a class body (depth 1), given its braces.
pub(crate) fn class_members(
    stream: &TokenStream,
    body_open: usize,
    body_close: usize,
) -> impl Iterator<Item = usize> + '_ {
    let mut depth = 0usize;
    (body_open + 1..body_close).filter(move |&i| {
        let kind = stream[i].kind;
        let at_top = depth == 0;
        if kind.is_open_delimiter() {
            depth += 1;
        } else if kind.is_close_delimiter() {
            depth = depth.saturating_sub(1);
        }
        at_top && !kind.is_close_delimiter()
    })
}

/// Name token after `function` (skipping a by-reference `&`).
pub(crate) fn method_name(stream: &TokenStream, function: usize) -> Option<usize> {
    let mut i = stream.next_significant(function)?;
    if stream[i].is(TokenKind::Ampersand) {
        i = stream.next_significant(i)?;
    }
    stream[i].is(TokenKind::Identifier).then_some(i)
}

/// First modifier in the run of modifiers before `function`.
pub(crate) fn method_start(stream: &TokenStream, function: usize) -> usize {
    let mut start = function;
    while let Some(prev) = stream.prev_significant(start) {
        if METHOD_MODIFIERS.iter().any(|m| stream[prev].is_keyword(m)) {
            start = prev;
        } else {
            break;
        }
    }
    start
}

fn fill_constructor(
    stream: &TokenStream,
    function: usize,
    name: usize,
    descriptor: &mut ConstructorDescriptor,
) {
    descriptor.exists = true;
    descriptor.start_index = method_start(stream, function);

    let Some(open) = stream
        .next_significant(name)
        .filter(|&i| stream[i].is(TokenKind::OpenParen))
    else {
        return;
    };
    let Some(close) = stream.matching_close(open) else {
        return;
    };
    let list = ParameterList { open, close };
    descriptor.parameter_list = Some(list);
    descriptor.existing_parameters = stream
        .split_top_level(list.inner())
        .into_iter()
        .filter_map(|item| parse_parameter(stream, stream.trim_trivia(item)))
        .collect();

    // Body `{`, or `;` for an abstract constructor.
    let mut i = close + 1;
    while i < stream.len() {
        match stream[i].kind {
            TokenKind::OpenBrace => {
                descriptor.body_open_index = Some(i);
                descriptor.body_close_index = stream.matching_close(i);
                return;
            }
            TokenKind::Semicolon => return,
            _ => i += 1,
        }
    }
}

/// `[#[Attr]] [modifiers] [Type] [&] [...] $name [= default]`
fn parse_parameter(stream: &TokenStream, range: Range<usize>) -> Option<Parameter> {
    let mut is_promoted = false;
    let mut type_start = None;
    let mut type_end = range.start;
    let mut is_variadic = false;
    let mut variable = None;

    let mut i = range.start;
    while i < range.end {
        let token = &stream[i];
        match token.kind {
            _ if token.is_trivia() => {}
            TokenKind::AttributeStart => {
                i = stream.matching_close(i).unwrap_or(range.end);
            }
            TokenKind::Keyword if PROMOTION_MODIFIERS.iter().any(|m| token.is_keyword(m)) => {
                is_promoted = true;
            }
            TokenKind::Ellipsis => is_variadic = true,
            TokenKind::Ampersand => {}
            TokenKind::Variable => {
                variable = Some(i);
                break;
            }
            _ => {
                type_start.get_or_insert(i);
                type_end = i + 1;
            }
        }
        i += 1;
    }

    let variable = variable?;
    let has_default = (variable + 1..range.end).any(|j| stream[j].is(TokenKind::Assign));
    Some(Parameter {
        type_name: type_start.map(|start| stream.text_of(start..type_end)),
        name: stream[variable].text.trim_start_matches('$').to_owned(),
        has_default,
        is_variadic,
        is_promoted,
        start: range.start,
        end: range.end,
    })
}

fn is_name(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Identifier | TokenKind::QualifiedName)
}
