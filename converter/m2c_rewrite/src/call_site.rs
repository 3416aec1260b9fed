//! Call-Site Matcher / Dispatcher
//!
//! Recognizes legacy `Mage::<method>(...)` static calls at a token index and
//! plans their replacement by an access to an injected dependency.
//!
//! A call is `Mage` or `\Mage`, `::`, a method name (any case) and a
//! parenthesized argument list. The method and argument count select a
//! [`CallShape`]; alias shapes additionally need a constant string as their
//! first argument. Anything else is left alone.
//!
//! Arguments copied into a replacement are rewritten first, so
//! `Mage::getStoreConfig(Mage::helper('x')->path())` converts both calls.
//! Matches found that way are reported as [`CallSiteMatch::nested`].

mod shape;

use std::ops::Range;

use m2c_lexer::{Token, TokenKind, TokenStream};
use m2c_mapping::{AliasKind, Resolver};

use crate::edit::synthesize;
use crate::inject::ArgumentSpec;

pub use shape::CallShape;

const SCOPE_STORE: &str = "\\Magento\\Store\\Model\\ScopeInterface::SCOPE_STORE";

/// A framework service with a fixed injection name.
struct Service {
    class: &'static str,
    variable_name: &'static str,
}

const SCOPE_CONFIG: Service = Service {
    class: "\\Magento\\Framework\\App\\Config\\ScopeConfigInterface",
    variable_name: "scopeConfig",
};

const EVENT_MANAGER: Service = Service {
    class: "\\Magento\\Framework\\Event\\ManagerInterface",
    variable_name: "eventManager",
};

const LOGGER: Service = Service {
    class: "\\Psr\\Log\\LoggerInterface",
    variable_name: "logger",
};

/// A class to inject and the name it is injected under.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Dependency {
    pub class: String,
    pub variable_name: String,
}

impl Dependency {
    pub fn new(class: impl Into<String>, variable_name: impl Into<String>) -> Self {
        Dependency {
            class: class.into(),
            variable_name: variable_name.into(),
        }
    }

    pub fn to_spec(&self) -> ArgumentSpec {
        ArgumentSpec::new(self.class.clone(), self.variable_name.clone())
    }

    fn factory(self) -> Self {
        Dependency {
            class: format!("{}Factory", self.class),
            variable_name: format!("{}Factory", self.variable_name),
        }
    }
}

impl From<&Service> for Dependency {
    fn from(service: &Service) -> Self {
        Dependency::new(service.class, service.variable_name)
    }
}

/// One converted call site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallSiteMatch {
    pub shape: CallShape,
    /// Index of the `Mage` receiver.
    pub token_index: usize,
    /// One past the closing `)`.
    pub end_index: usize,
    pub dependency: Dependency,
    pub replacement_tokens: Vec<Token>,
    pub requires_parent_constructor_call: bool,
    /// Legacy calls converted inside this call's arguments.
    pub nested: Vec<CallSiteMatch>,
}

impl CallSiteMatch {
    pub fn range(&self) -> Range<usize> {
        self.token_index..self.end_index
    }

    pub fn replacement_text(&self) -> String {
        self.replacement_tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// This match's dependency, then those of nested matches, depth-first.
    pub fn dependencies(&self) -> Vec<&Dependency> {
        let mut out = vec![&self.dependency];
        for nested in &self.nested {
            out.extend(nested.dependencies());
        }
        out
    }
}

/// A syntactic `Mage::method(...)` call, before shape selection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct LegacyCall {
    pub start: usize,
    /// Index of the method name.
    pub method: usize,
    pub open: usize,
    pub close: usize,
    /// Argument ranges, trimmed of trivia.
    pub arguments: Vec<Range<usize>>,
}

impl LegacyCall {
    fn end(&self) -> usize {
        self.close + 1
    }
}

/// Parse a `Mage::method(...)` call starting at `index`.
pub(crate) fn legacy_call(stream: &TokenStream, index: usize) -> Option<LegacyCall> {
    let receiver = stream.get(index)?;
    if !(receiver.is_name("Mage") || receiver.is_name("\\Mage")) {
        return None;
    }
    let member_of_something = stream.prev_significant(index).is_some_and(|p| {
        let prev = &stream[p];
        matches!(
            prev.kind,
            TokenKind::DoubleColon | TokenKind::ObjectOperator | TokenKind::NullsafeObjectOperator
        ) || prev.is_keyword("new")
            || prev.is_keyword("function")
    });
    if member_of_something {
        return None;
    }

    let colons = stream
        .next_significant(index)
        .filter(|&i| stream[i].is(TokenKind::DoubleColon))?;
    let method = stream
        .next_significant(colons)
        .filter(|&i| stream[i].is(TokenKind::Identifier))?;
    let open = stream
        .next_significant(method)
        .filter(|&i| stream[i].is(TokenKind::OpenParen))?;
    let close = stream.matching_close(open)?;
    let arguments = stream
        .split_top_level(open + 1..close)
        .into_iter()
        .map(|item| stream.trim_trivia(item))
        .collect();

    Some(LegacyCall {
        start: index,
        method,
        open,
        close,
        arguments,
    })
}

/// Value of an argument that is exactly one constant string literal.
///
/// Double-quoted strings with `$` interpolate and are not constant.
fn constant_string(stream: &TokenStream, argument: &Range<usize>) -> Option<String> {
    if argument.len() != 1 {
        return None;
    }
    let token = &stream[argument.start];
    if !token.is(TokenKind::StringLiteral) {
        return None;
    }
    let text = token.text.as_str();
    if let Some(inner) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        return Some(inner.replace("\\'", "'").replace("\\\\", "\\"));
    }
    let inner = text.strip_prefix('"').and_then(|t| t.strip_suffix('"'))?;
    if inner.contains('$') {
        return None;
    }
    Some(inner.replace("\\\"", "\"").replace("\\\\", "\\"))
}

/// Replacement text and the matches converted inside it.
struct Planned {
    dependency: Dependency,
    text: String,
    nested: Vec<CallSiteMatch>,
}

/// Tries every [`CallShape`] at a token index.
#[derive(Clone, Copy, Debug)]
pub struct Dispatcher<'r> {
    resolver: &'r Resolver,
}

impl<'r> Dispatcher<'r> {
    pub fn new(resolver: &'r Resolver) -> Self {
        Dispatcher { resolver }
    }

    /// The first shape, in [`CallShape::ALL`] order, that converts the call
    /// at `index`.
    pub fn dispatch(&self, stream: &TokenStream, index: usize) -> Option<CallSiteMatch> {
        let call = legacy_call(stream, index)?;
        let method = stream[call.method].text.as_str();
        CallShape::ALL
            .into_iter()
            .filter(|shape| shape.accepts(method, call.arguments.len()))
            .find_map(|shape| self.build(shape, stream, &call))
    }

    /// Text of `range` with every legacy call in it converted.
    pub fn rewrite_span(
        &self,
        stream: &TokenStream,
        range: Range<usize>,
    ) -> (String, Vec<CallSiteMatch>) {
        let mut text = String::new();
        let mut matches = Vec::new();
        let mut i = range.start;
        while i < range.end {
            match self.dispatch(stream, i).filter(|m| m.end_index <= range.end) {
                Some(found) => {
                    text.push_str(&found.replacement_text());
                    i = found.end_index;
                    matches.push(found);
                }
                None => {
                    text.push_str(&stream[i].text);
                    i += 1;
                }
            }
        }
        (text, matches)
    }

    fn build(
        &self,
        shape: CallShape,
        stream: &TokenStream,
        call: &LegacyCall,
    ) -> Option<CallSiteMatch> {
        let planned = match shape {
            CallShape::Helper => self.alias_access(stream, call, AliasKind::Helper),
            CallShape::GetSingleton => self.alias_access(stream, call, AliasKind::Model),
            CallShape::GetResourceSingleton => {
                self.alias_access(stream, call, AliasKind::ResourceModel)
            }
            CallShape::GetModel => self.factory_create(stream, call, AliasKind::Model),
            CallShape::GetResourceModel => {
                self.factory_create(stream, call, AliasKind::ResourceModel)
            }
            CallShape::GetStoreConfig => self.store_config(stream, call, "getValue"),
            CallShape::GetStoreConfigFlag => self.store_config(stream, call, "isSetFlag"),
            CallShape::DispatchEvent => {
                Some(self.forward(stream, call, &EVENT_MANAGER, "dispatch"))
            }
            CallShape::LogException => Some(self.forward(stream, call, &LOGGER, "critical")),
            CallShape::Log => Some(self.forward(stream, call, &LOGGER, "debug")),
        }?;

        let replacement_tokens = match synthesize(&planned.text) {
            Ok(tokens) => tokens,
            Err(error) => {
                tracing::warn!(%shape, %error, "replacement does not lex, leaving call as is");
                return None;
            }
        };
        tracing::debug!(
            %shape,
            line = stream[call.start].line,
            class = %planned.dependency.class,
            variable = %planned.dependency.variable_name,
            "matched call site"
        );
        Some(CallSiteMatch {
            shape,
            token_index: call.start,
            end_index: call.end(),
            dependency: planned.dependency,
            replacement_tokens,
            requires_parent_constructor_call: shape.requires_parent_constructor_call(),
            nested: planned.nested,
        })
    }

    fn resolve_alias(
        &self,
        stream: &TokenStream,
        call: &LegacyCall,
        kind: AliasKind,
    ) -> Option<Dependency> {
        let alias = constant_string(stream, call.arguments.first()?)?;
        match self.resolver.resolve(kind, &alias) {
            Some(resolved) => Some(Dependency::new(resolved.class, resolved.variable_name)),
            None => {
                tracing::debug!(?kind, %alias, "alias does not resolve to a class");
                None
            }
        }
    }

    /// `$this->name`
    fn alias_access(
        &self,
        stream: &TokenStream,
        call: &LegacyCall,
        kind: AliasKind,
    ) -> Option<Planned> {
        let dependency = self.resolve_alias(stream, call, kind)?;
        Some(Planned {
            text: format!("$this->{}", dependency.variable_name),
            dependency,
            nested: Vec::new(),
        })
    }

    /// `$this->nameFactory->create([['data' => $data]])`
    fn factory_create(
        &self,
        stream: &TokenStream,
        call: &LegacyCall,
        kind: AliasKind,
    ) -> Option<Planned> {
        let dependency = self.resolve_alias(stream, call, kind)?.factory();
        let (text, nested) = match call.arguments.get(1) {
            Some(data) => {
                let (data, nested) = self.rewrite_span(stream, data.clone());
                (
                    format!("$this->{}->create(['data' => {data}])", dependency.variable_name),
                    nested,
                )
            }
            None => (format!("$this->{}->create()", dependency.variable_name), Vec::new()),
        };
        Some(Planned {
            dependency,
            text,
            nested,
        })
    }

    /// `$this->scopeConfig->method($path, SCOPE_STORE[, $store])`
    fn store_config(
        &self,
        stream: &TokenStream,
        call: &LegacyCall,
        method: &str,
    ) -> Option<Planned> {
        let (path, mut nested) = self.rewrite_span(stream, call.arguments.first()?.clone());
        let mut text = format!(
            "$this->{}->{method}({path}, {SCOPE_STORE}",
            SCOPE_CONFIG.variable_name
        );
        if let Some(store) = call.arguments.get(1) {
            let (store, more) = self.rewrite_span(stream, store.clone());
            nested.extend(more);
            text.push_str(", ");
            text.push_str(&store);
        }
        text.push(')');
        Some(Planned {
            dependency: Dependency::from(&SCOPE_CONFIG),
            text,
            nested,
        })
    }

    /// `$this->service->method(<arguments as written>)`
    fn forward(
        &self,
        stream: &TokenStream,
        call: &LegacyCall,
        service: &Service,
        method: &str,
    ) -> Planned {
        let (arguments, nested) = self.rewrite_span(stream, call.open + 1..call.close);
        Planned {
            dependency: Dependency::from(service),
            text: format!("$this->{}->{method}({arguments})", service.variable_name),
            nested,
        }
    }
}

#[cfg(test)]
mod tests;
