//! Find the PHP sources to convert.
//!
//! Directories are walked recursively. Hidden entries and dependency or build
//! directories are skipped; explicitly named files are always taken, whatever
//! their extension.

use std::path::{Path, PathBuf};

/// Extensions of files picked up from directories.
pub const SOURCE_EXTENSIONS: &[&str] = &["php", "phtml"];

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["vendor", "node_modules", "target"];

/// Result of [`discover`].
#[derive(Debug, Default)]
pub struct Discovered {
    /// Sorted, without duplicates.
    pub files: Vec<PathBuf>,
    /// Arguments that named nothing on disk.
    pub missing: Vec<PathBuf>,
}

/// Expand `paths` into source files.
pub fn discover(paths: &[PathBuf]) -> Discovered {
    let mut discovered = Discovered::default();
    for path in paths {
        if path.is_file() {
            discovered.files.push(path.clone());
        } else if path.is_dir() {
            visit_dir(path, &mut discovered.files);
        } else {
            discovered.missing.push(path.clone());
        }
    }
    discovered.files.sort();
    discovered.files.dedup();
    tracing::debug!(
        files = discovered.files.len(),
        missing = discovered.missing.len(),
        "discovered sources"
    );
    discovered
}

pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn is_skipped(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_DIRS.contains(&name)
}

fn visit_dir(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("warning: cannot read directory `{}`: {e}", dir.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_skipped)
        {
            continue;
        }
        if path.is_dir() {
            visit_dir(&path, files);
        } else if is_source_file(&path) {
            files.push(path);
        }
    }
}
