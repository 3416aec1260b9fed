//! Argument Injector
//!
//! Adds constructor parameters, `$this->name = $name;` assignments and
//! property declarations for a list of dependencies.
//!
//! # Layouts
//!
//! One algorithm covers every existing constructor. Two facts drive it:
//!
//! - where the last mandatory parameter is. New parameters go right after
//!   it, so they land before the first optional (defaulted or variadic)
//!   parameter and the list stays valid;
//! - whether the body is written on one line. One-line bodies take new
//!   statements on the same line, joined by the body's own separator;
//!   multi-line bodies get one line per statement at the statement indent.
//!
//! Parameter lists follow the same rule: a multi-line list gets one
//! parameter per line, an inline list gets `, `-separated parameters.
//!
//! A missing constructor is synthesized after the class `{` with canonical
//! indentation ([`InjectionOptions::indent`]).
//!
//! All changes are recorded in one [`EditLog`] against the descriptor's
//! indices and applied together.

mod layout;

use m2c_lexer::{LexError, TokenKind, TokenStream};
use thiserror::Error;

use crate::constructor::{
    class_members, locate, ConstructorDescriptor, Parameter, CONSTRUCTOR_MARKER,
};
use crate::edit::{synthesize, EditConflict, EditLog};

/// A dependency to inject: `Type $variable_name`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ArgumentSpec {
    /// Parameter type, usually fully qualified.
    pub type_name: String,
    /// Parameter and property name, without `$`.
    pub variable_name: String,
}

impl ArgumentSpec {
    pub fn new(type_name: impl Into<String>, variable_name: impl Into<String>) -> Self {
        ArgumentSpec {
            type_name: type_name.into(),
            variable_name: variable_name.into(),
        }
    }

    fn parameter(&self) -> String {
        format!("{} ${}", self.type_name, self.variable_name)
    }

    fn assignment(&self) -> String {
        format!("$this->{0} = ${0};", self.variable_name)
    }

    fn property(&self, indent: &str, eol: &str) -> String {
        format!(
            "{indent}/** @var {} */{eol}{indent}protected ${};",
            self.type_name, self.variable_name
        )
    }

    fn is_valid(&self) -> bool {
        let name_ok = self
            .variable_name
            .chars()
            .next()
            .is_some_and(|c| c == '_' || c.is_alphabetic())
            && self
                .variable_name
                .chars()
                .all(|c| c == '_' || c.is_alphanumeric());
        let type_name = self.type_name.strip_prefix('?').unwrap_or(&self.type_name);
        let type_ok = type_name.chars().any(char::is_alphabetic)
            && type_name
                .chars()
                .all(|c| c == '_' || c == '\\' || c.is_alphanumeric());
        name_ok && type_ok
    }
}

/// Why injection was refused. The stream is untouched in every case.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InjectionError {
    #[error(
        "`${name}` is already a `{existing_type}` parameter, cannot inject it as `{requested_type}`"
    )]
    VariableCollision {
        name: String,
        existing_type: String,
        requested_type: String,
    },
    #[error("invalid dependency `{type_name} ${variable_name}`")]
    InvalidSpec {
        type_name: String,
        variable_name: String,
    },
    #[error("generated code does not lex: {0}")]
    Synthesis(#[from] LexError),
    #[error(transparent)]
    Conflict(#[from] EditConflict),
}

/// Injection settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InjectionOptions {
    /// Constructor method name.
    pub marker: String,
    /// Declare a `protected` property for each injected dependency the class
    /// does not declare yet.
    pub declare_properties: bool,
    /// One indentation step for synthesized code.
    pub indent: String,
}

impl Default for InjectionOptions {
    fn default() -> Self {
        InjectionOptions {
            marker: CONSTRUCTOR_MARKER.to_owned(),
            declare_properties: true,
            indent: "    ".to_owned(),
        }
    }
}

/// What a single injection will change.
#[derive(Default)]
struct Plan<'s> {
    parameters: Vec<&'s ArgumentSpec>,
    assignments: Vec<&'s ArgumentSpec>,
    properties: Vec<&'s ArgumentSpec>,
    parent_call: bool,
}

impl Plan<'_> {
    fn is_empty(&self) -> bool {
        self.parameters.is_empty()
            && self.assignments.is_empty()
            && self.properties.is_empty()
            && !self.parent_call
    }
}

/// Inject `specs` into the constructor described by `descriptor`.
///
/// `descriptor` must have been located on `stream` as it is now. Returns the
/// specs that became new parameters, in order. Existing parameters may still
/// gain a missing assignment.
pub fn inject(
    stream: &mut TokenStream,
    descriptor: &ConstructorDescriptor,
    specs: &[ArgumentSpec],
    options: &InjectionOptions,
) -> Result<Vec<ArgumentSpec>, InjectionError> {
    let specs = unique_specs(specs)?;
    let plan = plan(stream, descriptor, &specs, options)?;
    if plan.is_empty() {
        tracing::debug!("constructor already has every dependency");
        return Ok(Vec::new());
    }

    let eol = layout::line_ending(stream);
    let mut log = EditLog::new();
    if descriptor.exists {
        let indent = layout::indent_before(stream, descriptor.start_index)
            .unwrap_or(&options.indent)
            .to_owned();
        if !plan.properties.is_empty() {
            let blocks: Vec<String> = plan
                .properties
                .iter()
                .map(|s| s.property(&indent, eol))
                .collect();
            log.insert(
                descriptor.class_body_open + 1,
                synthesize(&class_head_text(stream, descriptor, &blocks, eol))?,
            );
        }
        record_parameters(stream, descriptor, &plan.parameters, &indent, options, eol, &mut log)?;
        record_assignments(stream, descriptor, &plan.assignments, &indent, options, eol, &mut log)?;
    } else {
        let indent = options.indent.as_str();
        let mut blocks: Vec<String> = plan
            .properties
            .iter()
            .map(|s| s.property(indent, eol))
            .collect();
        blocks.push(constructor_block(&plan, options, eol));
        log.insert(
            descriptor.class_body_open + 1,
            synthesize(&class_head_text(stream, descriptor, &blocks, eol))?,
        );
    }

    tracing::debug!(
        synthesized = !descriptor.exists,
        parameters = plan.parameters.len(),
        assignments = plan.assignments.len(),
        properties = plan.properties.len(),
        parent_call = plan.parent_call,
        "injecting dependencies"
    );
    log.apply(stream)?;
    Ok(plan.parameters.into_iter().cloned().collect())
}

/// Drop repeated specs, rejecting one name requested with two types.
fn unique_specs(specs: &[ArgumentSpec]) -> Result<Vec<&ArgumentSpec>, InjectionError> {
    let mut unique: Vec<&ArgumentSpec> = Vec::with_capacity(specs.len());
    for spec in specs {
        if !spec.is_valid() {
            return Err(InjectionError::InvalidSpec {
                type_name: spec.type_name.clone(),
                variable_name: spec.variable_name.clone(),
            });
        }
        match unique.iter().find(|s| s.variable_name == spec.variable_name) {
            Some(seen) if same_type(&seen.type_name, &spec.type_name) => {}
            Some(seen) => {
                return Err(InjectionError::VariableCollision {
                    name: spec.variable_name.clone(),
                    existing_type: seen.type_name.clone(),
                    requested_type: spec.type_name.clone(),
                })
            }
            None => unique.push(spec),
        }
    }
    Ok(unique)
}

fn plan<'s>(
    stream: &TokenStream,
    descriptor: &ConstructorDescriptor,
    specs: &[&'s ArgumentSpec],
    options: &InjectionOptions,
) -> Result<Plan<'s>, InjectionError> {
    let mut plan = Plan::default();
    let body = descriptor.body_open_index.zip(descriptor.body_close_index);

    for &spec in specs {
        let assigned = body.is_some_and(|(open, close)| {
            assigns_property(stream, open, close, &spec.variable_name)
        });
        let touched = match descriptor.parameter(&spec.variable_name) {
            Some(existing) => {
                check_compatible(existing, spec)?;
                if existing.is_promoted || assigned {
                    false
                } else {
                    plan.assignments.push(spec);
                    true
                }
            }
            None => {
                plan.parameters.push(spec);
                if !assigned {
                    plan.assignments.push(spec);
                }
                true
            }
        };
        if touched
            && options.declare_properties
            && !declares_property(stream, descriptor, &spec.variable_name)
        {
            plan.properties.push(spec);
        }
    }

    if descriptor.is_bodiless() && !plan.assignments.is_empty() {
        tracing::debug!("constructor has no body, skipping assignments");
        plan.assignments.clear();
    }

    // Only a synthesized constructor calls the parent; an existing one keeps
    // whatever parent call it has.
    plan.parent_call =
        !descriptor.exists && descriptor.parent_class.is_some() && !plan.parameters.is_empty();
    Ok(plan)
}

fn check_compatible(existing: &Parameter, spec: &ArgumentSpec) -> Result<(), InjectionError> {
    match &existing.type_name {
        Some(existing_type) if same_type(existing_type, &spec.type_name) => Ok(()),
        existing_type => Err(InjectionError::VariableCollision {
            name: spec.variable_name.clone(),
            existing_type: existing_type.clone().unwrap_or_else(|| "untyped".to_owned()),
            requested_type: spec.type_name.clone(),
        }),
    }
}

/// Types compare without a leading `\` and ignoring ASCII case.
fn same_type(a: &str, b: &str) -> bool {
    a.trim_start_matches('\\')
        .eq_ignore_ascii_case(b.trim_start_matches('\\'))
}

/// Whether the body contains `$this->name =`.
fn assigns_property(stream: &TokenStream, open: usize, close: usize, name: &str) -> bool {
    (open + 1..close).any(|i| {
        if !(stream[i].is(TokenKind::Variable) && stream[i].text == "$this") {
            return false;
        }
        let Some(arrow) = stream.next_significant(i) else {
            return false;
        };
        let Some(member) = stream.next_significant(arrow) else {
            return false;
        };
        stream[arrow].is(TokenKind::ObjectOperator)
            && stream[member].is(TokenKind::Identifier)
            && stream[member].text == name
            && stream
                .next_significant(member)
                .is_some_and(|j| stream[j].is(TokenKind::Assign))
    })
}

/// Whether the class body declares `$name` as a property.
fn declares_property(stream: &TokenStream, descriptor: &ConstructorDescriptor, name: &str) -> bool {
    class_members(stream, descriptor.class_body_open, descriptor.class_body_close).any(|i| {
        stream[i].is(TokenKind::Variable) && stream[i].text.strip_prefix('$') == Some(name)
    })
}

/// Blocks inserted after the class `{`, separated by blank lines.
fn class_head_text(
    stream: &TokenStream,
    descriptor: &ConstructorDescriptor,
    blocks: &[String],
    eol: &str,
) -> String {
    let mut text: String = blocks.iter().map(|b| format!("{eol}{b}{eol}")).collect();
    let (open, close) = (descriptor.class_body_open, descriptor.class_body_close);
    let empty_multiline_body = layout::first_content(stream, open, close).is_none()
        && layout::spans_lines(stream, open, close);
    if empty_multiline_body {
        text.truncate(text.len() - eol.len());
    }
    text
}

/// A whole constructor with canonical layout.
fn constructor_block(plan: &Plan<'_>, options: &InjectionOptions, eol: &str) -> String {
    let indent = options.indent.as_str();
    let inner = format!("{indent}{indent}");
    let marker = options.marker.as_str();

    let mut lines = vec![format!("{indent}public function {marker}(")];
    let count = plan.parameters.len();
    for (n, spec) in plan.parameters.iter().enumerate() {
        let comma = if n + 1 < count { "," } else { "" };
        lines.push(format!("{inner}{}{comma}", spec.parameter()));
    }
    lines.push(format!("{indent}) {{"));
    if plan.parent_call {
        lines.push(format!("{inner}parent::{marker}();"));
    }
    for spec in &plan.assignments {
        lines.push(format!("{inner}{}", spec.assignment()));
    }
    lines.push(format!("{indent}}}"));
    lines.join(eol)
}

/// New parameters go after the last mandatory one.
fn record_parameters(
    stream: &TokenStream,
    descriptor: &ConstructorDescriptor,
    new: &[&ArgumentSpec],
    ctor_indent: &str,
    options: &InjectionOptions,
    eol: &str,
    log: &mut EditLog,
) -> Result<(), InjectionError> {
    if new.is_empty() {
        return Ok(());
    }
    let Some(list) = descriptor.parameter_list else {
        tracing::debug!("constructor has no parameter list, skipping parameters");
        return Ok(());
    };
    let texts: Vec<String> = new.iter().map(|s| s.parameter()).collect();
    let existing = &descriptor.existing_parameters;

    if existing.is_empty() {
        let inner = format!("{ctor_indent}{}", options.indent);
        let mut text = String::new();
        for (n, parameter) in texts.iter().enumerate() {
            text.push_str(eol);
            text.push_str(&inner);
            text.push_str(parameter);
            if n + 1 < texts.len() {
                text.push(',');
            }
        }
        text.push_str(eol);
        text.push_str(ctor_indent);
        // Comments in the empty list stay in front of the new parameters.
        let kept = layout::last_content(stream, list.open, list.close).unwrap_or(list.open);
        log.replace(kept + 1..list.close, synthesize(&text)?);
        return Ok(());
    }

    let separator = if layout::spans_lines(stream, list.open, list.close) {
        let indent = existing
            .iter()
            .rev()
            .find_map(|p| layout::indent_before(stream, p.start))
            .map_or_else(|| format!("{ctor_indent}{}", options.indent), str::to_owned);
        format!(",{eol}{indent}")
    } else {
        ", ".to_owned()
    };
    let joined = texts.join(&separator);

    match existing.iter().rposition(Parameter::is_mandatory) {
        Some(last) if last + 1 == existing.len() => {
            log.insert(existing[last].end, synthesize(&format!("{separator}{joined}"))?);
        }
        Some(last) => {
            log.insert(existing[last + 1].start, synthesize(&format!("{joined}{separator}"))?);
        }
        None => {
            log.insert(existing[0].start, synthesize(&format!("{joined}{separator}"))?);
        }
    }
    Ok(())
}

/// Assignments go after the last body statement.
fn record_assignments(
    stream: &TokenStream,
    descriptor: &ConstructorDescriptor,
    new: &[&ArgumentSpec],
    ctor_indent: &str,
    options: &InjectionOptions,
    eol: &str,
    log: &mut EditLog,
) -> Result<(), InjectionError> {
    let (Some(open), Some(close)) = (descriptor.body_open_index, descriptor.body_close_index) else {
        return Ok(());
    };
    if new.is_empty() {
        return Ok(());
    }
    let assignments: Vec<String> = new.iter().map(|s| s.assignment()).collect();

    let multi_line = layout::spans_lines(stream, open, close);
    let statement_indent = format!("{ctor_indent}{}", options.indent);

    let Some(last) = layout::last_content(stream, open, close) else {
        // Empty body: one line per statement.
        let mut text: String = assignments
            .iter()
            .map(|s| format!("{eol}{statement_indent}{s}"))
            .collect();
        if multi_line {
            log.insert(open + 1, synthesize(&text)?);
        } else {
            text.push_str(eol);
            text.push_str(ctor_indent);
            log.replace(open + 1..close, synthesize(&text)?);
        }
        return Ok(());
    };

    let separator = if multi_line {
        let first = layout::first_content(stream, open, close).unwrap_or(last);
        let indent = layout::indent_before(stream, first).unwrap_or(&statement_indent);
        format!("{eol}{indent}")
    } else {
        layout::inline_separator(stream, open, last)
            .unwrap_or(" ")
            .to_owned()
    };

    let text: String = assignments
        .iter()
        .map(|s| format!("{separator}{s}"))
        .collect();
    log.insert(last + 1, synthesize(&text)?);
    Ok(())
}

/// Per-file constructor helper.
///
/// Holds the descriptor located for one stream. Build a fresh helper for
/// every file; injecting consumes it because the descriptor is stale once
/// the stream changes.
#[derive(Debug)]
pub struct ConstructorHelper<'o> {
    options: &'o InjectionOptions,
    descriptor: Option<ConstructorDescriptor>,
}

impl<'o> ConstructorHelper<'o> {
    pub fn new(options: &'o InjectionOptions) -> Self {
        ConstructorHelper {
            options,
            descriptor: None,
        }
    }

    /// Locate the class and constructor of `stream`.
    pub fn set_context(&mut self, stream: &TokenStream) -> Option<&ConstructorDescriptor> {
        self.descriptor = locate(stream, &self.options.marker);
        self.descriptor.as_ref()
    }

    /// Inject into the stream the context was set from. A stream without a
    /// class is left alone.
    pub fn inject_arguments(
        self,
        stream: &mut TokenStream,
        specs: &[ArgumentSpec],
    ) -> Result<Vec<ArgumentSpec>, InjectionError> {
        match &self.descriptor {
            Some(descriptor) => inject(stream, descriptor, specs, self.options),
            None => Ok(Vec::new()),
        }
    }
}
