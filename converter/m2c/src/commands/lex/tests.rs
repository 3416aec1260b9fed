use std::fs;

use tempfile::TempDir;

use super::*;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap_or_else(|e| panic!("{e}"));
    path
}

#[test]
fn dumps_every_token_with_its_line() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let path = write(&dir, "a.php", "<?php\n$x = 1;\n");
    let dump = lex_file(&path).unwrap_or_else(|e| panic!("{e}"));

    let mut lines = dump.lines();
    let header = lines.next().unwrap_or_default();
    assert!(header.ends_with("(8 tokens):"), "{header}");
    let variable = lines
        .find(|line| line.contains("variable"))
        .unwrap_or_else(|| panic!("no variable token in\n{dump}"));
    assert!(variable.trim_start().starts_with("2 "), "{variable}");
    assert!(variable.ends_with("\"$x\""), "{variable}");
}

#[test]
fn lex_errors_carry_path_and_line() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let path = write(&dir, "broken.php", "<?php\nfunction f() {\n");
    let error = lex_file(&path).err().unwrap_or_else(|| panic!("expected an error"));
    let message = error.to_string();
    assert!(message.contains("broken.php: line 2: "), "{message}");
    assert!(message.contains("unclosed `{`"), "{message}");
}

#[test]
fn unreadable_file_is_a_read_error() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let result = lex_file(&dir.path().join("missing.php"));
    assert!(matches!(result, Err(CliError::Read { .. })));
}
