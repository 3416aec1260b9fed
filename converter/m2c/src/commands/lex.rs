//! The `lex` command: dump the tokens of a file.

use std::fmt::Write as _;
use std::path::Path;

use m2c_lexer::tokenize;

use super::read_source;
use crate::CliError;

/// One line per token: source line, kind and the exact text.
pub fn lex_file(path: &Path) -> Result<String, CliError> {
    let source = read_source(path)?;
    let stream = tokenize(&source).map_err(|error| CliError::Rewrite {
        path: path.to_path_buf(),
        source: error.into(),
    })?;

    let mut output = String::new();
    let _ = writeln!(
        output,
        "Tokens for '{}' ({} tokens):",
        path.display(),
        stream.len()
    );
    for token in stream.iter() {
        let _ = writeln!(
            output,
            "  {:>4}  {:<20} {:?}",
            token.line,
            token.kind.name(),
            token.text
        );
    }
    Ok(output)
}

#[cfg(test)]
mod tests;
