//! The `convert` command: rewrite Magento 1 sources.
//!
//! Files are discovered up front, converted in parallel and reported in
//! discovery order. A file that fails keeps its original content.

#![allow(
    clippy::struct_excessive_bools,
    reason = "ConvertConfig mirrors independent CLI flags"
)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use m2c_mapping::{MappingTables, NamerKind, Resolver};
use m2c_rewrite::{InjectionOptions, Processor};
use rayon::prelude::*;
use serde::Serialize;

use super::diff::render_diff;
use super::read_source;
use crate::discovery::discover;
use crate::CliError;

/// Configuration for the convert command.
#[derive(Clone, Debug, Default)]
pub struct ConvertConfig {
    /// Report files that would change without writing them.
    /// The run fails if any would.
    pub check: bool,
    /// Print a diff instead of writing.
    pub diff: bool,
    /// Print converted sources instead of writing.
    pub stdout: bool,
    pub namer: NamerKind,
    /// Worker threads; `None` uses one per core.
    pub jobs: Option<usize>,
    /// Print a JSON report instead of the human-readable one.
    pub report_json: bool,
    /// Mapping tables file; empty tables when unset.
    pub mapping: Option<PathBuf>,
    /// Skip `protected` property declarations for injected dependencies.
    pub no_properties: bool,
}

impl ConvertConfig {
    fn writes_files(&self) -> bool {
        !self.check && !self.diff && !self.stdout
    }
}

/// Outcome for one file.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Unchanged,
    Converted,
    /// Would change, but the run does not write files.
    WouldConvert,
    Failed,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct InjectedDependency {
    pub class: String,
    pub variable: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    pub converted_calls: usize,
    pub injected: Vec<InjectedDependency>,
    pub duplicate_constructors: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Source line of the error, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Converted source (`--stdout`) or its diff (`--diff`).
    #[serde(skip)]
    pub output: Option<String>,
}

impl FileReport {
    fn new(path: &Path) -> Self {
        FileReport {
            path: path.to_path_buf(),
            status: FileStatus::Unchanged,
            converted_calls: 0,
            injected: Vec::new(),
            duplicate_constructors: 0,
            error: None,
            line: None,
            output: None,
        }
    }

    fn failed(path: &Path, error: &CliError) -> Self {
        FileReport {
            status: FileStatus::Failed,
            error: Some(error.to_string()),
            ..FileReport::new(path)
        }
    }
}

/// Totals over a run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ConvertSummary {
    pub files: usize,
    /// Converted, or would be in a run that does not write.
    pub converted: usize,
    pub unchanged: usize,
    /// Failed files plus path arguments that did not exist.
    pub failed: usize,
    pub converted_calls: usize,
}

impl ConvertSummary {
    pub fn from_reports(reports: &[FileReport], missing_paths: usize) -> Self {
        let mut summary = ConvertSummary {
            files: reports.len(),
            failed: missing_paths,
            ..ConvertSummary::default()
        };
        for report in reports {
            match report.status {
                FileStatus::Unchanged => summary.unchanged += 1,
                FileStatus::Converted | FileStatus::WouldConvert => summary.converted += 1,
                FileStatus::Failed => summary.failed += 1,
            }
            summary.converted_calls += report.converted_calls;
        }
        summary
    }

    /// `1` when anything failed, or when `check` is set and a file would change.
    pub fn exit_code(&self, check: bool) -> i32 {
        i32::from(self.failed > 0 || (check && self.converted > 0))
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    summary: &'a ConvertSummary,
}

/// Build the processor a run shares across its workers.
pub fn build_processor(config: &ConvertConfig) -> Result<Processor, CliError> {
    let tables = match &config.mapping {
        Some(path) => MappingTables::load(path)?,
        None => MappingTables::default(),
    };
    let resolver = Resolver::new(Arc::new(tables), config.namer.build());
    let options = InjectionOptions {
        declare_properties: !config.no_properties,
        ..InjectionOptions::default()
    };
    Ok(Processor::new(Arc::new(resolver), options))
}

/// Convert one file, writing it back when the run writes files.
pub fn convert_file(path: &Path, processor: &Processor, config: &ConvertConfig) -> FileReport {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(error) => return FileReport::failed(path, &error),
    };
    let converted = match processor.convert_source(&source) {
        Ok(converted) => converted,
        Err(rewrite) => {
            let line = rewrite.line();
            let error = CliError::Rewrite {
                path: path.to_path_buf(),
                source: rewrite,
            };
            tracing::debug!(%error, "conversion failed");
            return FileReport {
                line,
                ..FileReport::failed(path, &error)
            };
        }
    };

    let mut report = FileReport::new(path);
    report.converted_calls = converted.converted_calls;
    report.duplicate_constructors = converted.duplicate_constructors;
    report.injected = converted
        .added_parameters
        .iter()
        .map(|parameter| InjectedDependency {
            class: parameter.type_name.clone(),
            variable: parameter.variable_name.clone(),
        })
        .collect();

    if !converted.changed {
        if config.stdout {
            report.output = Some(converted.output);
        }
        return report;
    }

    if config.writes_files() {
        if let Err(source) = std::fs::write(path, &converted.output) {
            let error = CliError::Write {
                path: path.to_path_buf(),
                source,
            };
            return FileReport::failed(path, &error);
        }
        report.status = FileStatus::Converted;
        return report;
    }

    report.status = FileStatus::WouldConvert;
    if config.diff {
        report.output = Some(render_diff(
            &path.display().to_string(),
            &source,
            &converted.output,
        ));
    } else if config.stdout {
        report.output = Some(converted.output);
    }
    report
}

/// Convert `files` on a scoped thread pool.
///
/// The pool is torn down before returning. If it cannot be built the files
/// are converted sequentially.
pub fn convert_files(
    files: &[PathBuf],
    processor: &Processor,
    config: &ConvertConfig,
) -> Vec<FileReport> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = config.jobs {
        builder = builder.num_threads(jobs);
    }

    builder
        .build_scoped(rayon::ThreadBuilder::run, |pool| {
            pool.install(|| {
                files
                    .par_iter()
                    .map(|file| convert_file(file, processor, config))
                    .collect::<Vec<_>>()
            })
        })
        .unwrap_or_else(|e| {
            tracing::warn!("failed to create thread pool ({e}), running sequentially");
            files
                .iter()
                .map(|file| convert_file(file, processor, config))
                .collect()
        })
}

/// Run the convert command and print its report.
///
/// Paths default to the current directory. Per-file problems are reported
/// and counted; only an unusable mapping file stops the run.
pub fn run_convert(paths: &[PathBuf], config: &ConvertConfig) -> Result<ConvertSummary, CliError> {
    let processor = build_processor(config)?;
    let roots = if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths.to_vec()
    };

    let discovered = discover(&roots);
    for missing in &discovered.missing {
        eprintln!("error: {}", CliError::NotFound(missing.clone()));
    }

    let reports = convert_files(&discovered.files, &processor, config);
    let summary = ConvertSummary::from_reports(&reports, discovered.missing.len());

    if config.report_json {
        let json = serde_json::to_string_pretty(&JsonReport {
            files: &reports,
            summary: &summary,
        })?;
        println!("{json}");
    } else {
        print_reports(&reports, config);
        if !config.stdout {
            print_summary(&summary, config);
        }
    }
    Ok(summary)
}

fn print_reports(reports: &[FileReport], config: &ConvertConfig) {
    for report in reports {
        let path = report.path.display();
        if let Some(error) = &report.error {
            eprintln!("error: {error}");
        }
        if report.duplicate_constructors > 0 {
            eprintln!(
                "warning: {path}: {} extra constructor declaration(s) ignored",
                report.duplicate_constructors
            );
        }
        if let Some(output) = &report.output {
            print!("{output}");
        }
        match report.status {
            FileStatus::Converted => {
                println!("Converted: {path} ({} call sites)", report.converted_calls);
            }
            FileStatus::WouldConvert if config.check => println!("Would convert: {path}"),
            FileStatus::WouldConvert | FileStatus::Unchanged | FileStatus::Failed => {}
        }
    }
}

fn print_summary(summary: &ConvertSummary, config: &ConvertConfig) {
    if summary.files == 0 && summary.failed == 0 {
        println!("No PHP sources found");
        return;
    }
    let verb = if config.writes_files() {
        "converted"
    } else {
        "would convert"
    };
    println!(
        "\n{} {verb}, {} unchanged, {} failed ({} call sites)",
        summary.converted, summary.unchanged, summary.failed, summary.converted_calls
    );
}

#[cfg(test)]
mod tests;
