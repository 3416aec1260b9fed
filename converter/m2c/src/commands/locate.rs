//! The `locate` command: show what the converter sees of a class.

use std::fmt::Write as _;
use std::path::Path;

use m2c_lexer::tokenize;
use m2c_rewrite::{find_class, locate, Parameter, CONSTRUCTOR_MARKER};

use super::read_source;
use crate::CliError;

/// Describe the first class of a file and its constructor.
pub fn locate_file(path: &Path) -> Result<String, CliError> {
    let source = read_source(path)?;
    let stream = tokenize(&source).map_err(|error| CliError::Rewrite {
        path: path.to_path_buf(),
        source: error.into(),
    })?;

    let (Some(class), Some(descriptor)) = (find_class(&stream), locate(&stream, CONSTRUCTOR_MARKER))
    else {
        return Ok(format!("{}: no class declared\n", path.display()));
    };

    let mut output = String::new();
    let _ = writeln!(
        output,
        "class {} (line {})",
        class.name.as_deref().unwrap_or("<anonymous>"),
        stream[class.keyword_index].line
    );
    let _ = match &descriptor.parent_class {
        Some(parent) => writeln!(output, "extends {parent}"),
        None => writeln!(output, "no parent class"),
    };

    if descriptor.exists {
        let shape = if descriptor.is_bodiless() {
            "no body"
        } else {
            "with body"
        };
        let _ = writeln!(
            output,
            "constructor: line {} ({shape}), {} parameter(s)",
            stream[descriptor.start_index].line,
            descriptor.existing_parameters.len()
        );
        for parameter in &descriptor.existing_parameters {
            let _ = writeln!(output, "  {}", describe(parameter));
        }
    } else {
        let _ = writeln!(
            output,
            "constructor: none, class body opens on line {}",
            stream[descriptor.class_body_open].line
        );
    }

    if descriptor.duplicate_constructors > 0 {
        let _ = writeln!(
            output,
            "warning: {} extra constructor declaration(s) ignored",
            descriptor.duplicate_constructors
        );
    }
    Ok(output)
}

fn describe(parameter: &Parameter) -> String {
    let kind = if parameter.is_variadic {
        "variadic"
    } else if parameter.has_default {
        "optional"
    } else {
        "mandatory"
    };
    let promoted = if parameter.is_promoted { ", promoted" } else { "" };
    format!(
        "${}: {} ({kind}{promoted})",
        parameter.name,
        parameter.type_name.as_deref().unwrap_or("untyped")
    )
}
