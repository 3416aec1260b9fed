//! Rewrite Orchestrator
//!
//! Converts one file in a single pass:
//!
//! 1. scan the class body left to right, dispatching at every token and
//!    recording each match as a replacement in an [`EditLog`];
//! 2. apply all replacements in one batch;
//! 3. locate the constructor once on the rewritten stream and inject every
//!    dependency the matches introduced, in discovery order.
//!
//! Only the first class of a file is converted. Code outside it keeps its
//! legacy calls, and so do static methods, static closures and static arrow
//! functions, where `$this` does not exist.
//! Running the processor on its own output finds nothing to convert.

use std::ops::Range;
use std::sync::Arc;

use m2c_lexer::{tokenize, TokenKind, TokenStream};
use m2c_mapping::Resolver;
use rustc_hash::FxHashSet;

use crate::call_site::{CallSiteMatch, Dependency, Dispatcher};
use crate::constructor::{class_members, find_class, locate, method_name, method_start};
use crate::edit::EditLog;
use crate::error::RewriteError;
use crate::inject::{ArgumentSpec, ConstructorHelper, InjectionOptions};

/// Converts files against one set of mapping tables.
///
/// Cheap to share across threads: the resolver is behind an `Arc` and
/// nothing is mutated while processing.
#[derive(Clone, Debug, Default)]
pub struct Processor {
    resolver: Arc<Resolver>,
    options: InjectionOptions,
}

/// Result of [`Processor::process`].
#[derive(Clone, Debug)]
pub struct Conversion {
    pub stream: TokenStream,
    /// Dependencies the converted calls use, deduplicated, in discovery order.
    pub dependencies: Vec<Dependency>,
    /// Parameters the constructor actually gained.
    pub added_parameters: Vec<ArgumentSpec>,
    /// Top-level call sites that were replaced.
    pub matches: Vec<CallSiteMatch>,
    /// Constructors beyond the first one in the class.
    pub duplicate_constructors: usize,
}

impl Conversion {
    fn untouched(stream: TokenStream, duplicate_constructors: usize) -> Self {
        Conversion {
            stream,
            dependencies: Vec::new(),
            added_parameters: Vec::new(),
            matches: Vec::new(),
            duplicate_constructors,
        }
    }

    /// Number of converted call sites, nested ones included.
    pub fn converted_calls(&self) -> usize {
        self.matches.iter().map(|m| m.dependencies().len()).sum()
    }
}

/// Result of [`Processor::convert_source`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConvertedSource {
    pub output: String,
    /// Whether `output` differs from the input.
    pub changed: bool,
    /// Dependencies the converted calls use, including ones the constructor
    /// already had.
    pub dependencies: Vec<Dependency>,
    /// Parameters the constructor gained.
    pub added_parameters: Vec<ArgumentSpec>,
    pub converted_calls: usize,
    pub duplicate_constructors: usize,
}

impl Processor {
    pub fn new(resolver: Arc<Resolver>, options: InjectionOptions) -> Self {
        Processor { resolver, options }
    }

    /// Convert a tokenized file.
    pub fn process(&self, mut stream: TokenStream) -> Result<Conversion, RewriteError> {
        let Some(class) = find_class(&stream) else {
            tracing::debug!("no class declared, leaving file as is");
            return Ok(Conversion::untouched(stream, 0));
        };

        let dispatcher = Dispatcher::new(&self.resolver);
        let mut skipped = static_method_bodies(&stream, class.body_open, class.body_close);
        skipped.extend(static_closures(&stream, class.body_open, class.body_close));
        skipped.sort_by_key(|range| range.start);
        let mut skipped = skipped.iter().peekable();
        let mut log = EditLog::new();
        let mut matches: Vec<CallSiteMatch> = Vec::new();

        let mut i = class.body_open + 1;
        while i < class.body_close {
            if let Some(body) = skipped.next_if(|body| body.start <= i) {
                i = i.max(body.end);
                continue;
            }
            match dispatcher
                .dispatch(&stream, i)
                .filter(|found| found.end_index <= class.body_close)
            {
                Some(found) => {
                    log.replace(found.range(), found.replacement_tokens.clone());
                    i = found.end_index;
                    matches.push(found);
                }
                None => i += 1,
            }
        }

        if matches.is_empty() {
            let duplicates =
                locate(&stream, &self.options.marker).map_or(0, |d| d.duplicate_constructors);
            return Ok(Conversion::untouched(stream, duplicates));
        }

        let dependencies = unique_dependencies(&matches);
        tracing::debug!(
            class = class.name.as_deref().unwrap_or("<anonymous>"),
            matches = matches.len(),
            dependencies = dependencies.len(),
            alias_lookups = matches.iter().filter(|m| m.requires_parent_constructor_call).count(),
            "replacing call sites"
        );

        log.apply(&mut stream)?;

        let mut helper = ConstructorHelper::new(&self.options);
        let duplicate_constructors = helper
            .set_context(&stream)
            .map_or(0, |d| d.duplicate_constructors);
        let specs: Vec<ArgumentSpec> = dependencies.iter().map(Dependency::to_spec).collect();
        let added_parameters = helper.inject_arguments(&mut stream, &specs)?;

        Ok(Conversion {
            stream,
            dependencies,
            added_parameters,
            matches,
            duplicate_constructors,
        })
    }

    /// Tokenize, convert and serialize `source`.
    ///
    /// Atomic: on error there is no output at all.
    pub fn convert_source(&self, source: &str) -> Result<ConvertedSource, RewriteError> {
        let stream = tokenize(source)?;
        let conversion = self.process(stream)?;
        let converted_calls = conversion.converted_calls();
        let output = conversion.stream.reconstruct();
        Ok(ConvertedSource {
            changed: output != source,
            output,
            dependencies: conversion.dependencies,
            added_parameters: conversion.added_parameters,
            converted_calls,
            duplicate_constructors: conversion.duplicate_constructors,
        })
    }
}

/// Dependencies of all matches, first occurrence wins.
fn unique_dependencies(matches: &[CallSiteMatch]) -> Vec<Dependency> {
    let mut seen: FxHashSet<&Dependency> = FxHashSet::default();
    let mut unique = Vec::new();
    for found in matches {
        for dependency in found.dependencies() {
            if seen.insert(dependency) {
                unique.push(dependency.clone());
            }
        }
    }
    unique
}

/// Body ranges (`{` through `}`) of the class's static methods, in order.
fn static_method_bodies(
    stream: &TokenStream,
    body_open: usize,
    body_close: usize,
) -> Vec<Range<usize>> {
    class_members(stream, body_open, body_close)
        .filter(|&i| stream[i].is_keyword("function"))
        .filter(|&function| {
            (method_start(stream, function)..function).any(|i| stream[i].is_keyword("static"))
        })
        .filter_map(|function| {
            let name = method_name(stream, function)?;
            let open = stream
                .next_significant(name)
                .filter(|&i| stream[i].is(TokenKind::OpenParen))?;
            let params_close = stream.matching_close(open)?;
            let body = (params_close + 1..body_close)
                .find(|&i| matches!(stream[i].kind, TokenKind::OpenBrace | TokenKind::Semicolon))
                .filter(|&i| stream[i].is(TokenKind::OpenBrace))?;
            Some(body..stream.matching_close(body)? + 1)
        })
        .collect()
}

/// Ranges of `static function (...) {...}` and `static fn (...) => expr`
/// inside the class body, from `static` through the end of the body.
fn static_closures(
    stream: &TokenStream,
    body_open: usize,
    body_close: usize,
) -> Vec<Range<usize>> {
    (body_open + 1..body_close)
        .filter(|&i| stream[i].is_keyword("static"))
        .filter_map(|start| {
            let keyword = stream.next_significant(start)?;
            let is_arrow = stream[keyword].is_keyword("fn");
            if !is_arrow && !stream[keyword].is_keyword("function") {
                return None;
            }
            let mut open = stream.next_significant(keyword)?;
            if stream[open].is(TokenKind::Ampersand) {
                open = stream.next_significant(open)?;
            }
            if !stream[open].is(TokenKind::OpenParen) {
                return None;
            }
            let params_close = stream.matching_close(open)?;
            let end = if is_arrow {
                arrow_function_end(stream, params_close, body_close)
            } else {
                let body = (params_close + 1..body_close)
                    .find(|&i| stream[i].is(TokenKind::OpenBrace))?;
                stream.matching_close(body)? + 1
            };
            Some(start..end)
        })
        .collect()
}

/// One past the expression of an arrow function: the first `,`, `;` or
/// unmatched closer after its `=>`.
fn arrow_function_end(stream: &TokenStream, params_close: usize, limit: usize) -> usize {
    let mut depth = 0usize;
    for i in params_close + 1..limit {
        let kind = stream[i].kind;
        if kind.is_open_delimiter() {
            depth += 1;
        } else if kind.is_close_delimiter() {
            if depth == 0 {
                return i;
            }
            depth -= 1;
        } else if depth == 0 && matches!(kind, TokenKind::Comma | TokenKind::Semicolon) {
            return i;
        }
    }
    limit
}
