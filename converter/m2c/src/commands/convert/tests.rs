use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;

const LOGGING_CLASS: &str = "<?php
class Foo
{
    public function run()
    {
        Mage::log('ran');
    }
}
";

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap_or_else(|e| panic!("{e}"));
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{e}"))
}

fn processor(config: &ConvertConfig) -> Processor {
    build_processor(config).unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn converts_and_writes_in_place() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let path = write(&dir, "Foo.php", LOGGING_CLASS);
    let config = ConvertConfig::default();

    let report = convert_file(&path, &processor(&config), &config);
    assert_eq!(report.status, FileStatus::Converted);
    assert_eq!(report.converted_calls, 1);
    assert_eq!(
        report.injected,
        vec![InjectedDependency {
            class: "\\Psr\\Log\\LoggerInterface".to_owned(),
            variable: "logger".to_owned(),
        }]
    );
    assert!(report.output.is_none());

    let written = read(&path);
    assert!(written.contains("$this->logger->debug('ran');"), "{written}");
    assert!(written.contains("\\Psr\\Log\\LoggerInterface $logger"), "{written}");
}

#[test]
fn check_mode_leaves_files_alone() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let path = write(&dir, "Foo.php", LOGGING_CLASS);
    let config = ConvertConfig {
        check: true,
        ..ConvertConfig::default()
    };

    let report = convert_file(&path, &processor(&config), &config);
    assert_eq!(report.status, FileStatus::WouldConvert);
    assert_eq!(read(&path), LOGGING_CLASS);
}

#[test]
fn diff_mode_renders_a_diff() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let path = write(&dir, "Foo.php", LOGGING_CLASS);
    let config = ConvertConfig {
        diff: true,
        ..ConvertConfig::default()
    };

    let report = convert_file(&path, &processor(&config), &config);
    assert_eq!(report.status, FileStatus::WouldConvert);
    let diff = report.output.unwrap_or_default();
    assert!(diff.contains("-        Mage::log('ran');\n"), "{diff}");
    assert!(diff.contains("+        $this->logger->debug('ran');\n"), "{diff}");
    assert_eq!(read(&path), LOGGING_CLASS);
}

#[test]
fn stdout_mode_returns_every_file() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let plain = write(&dir, "plain.php", "<?php\necho 1;\n");
    let config = ConvertConfig {
        stdout: true,
        ..ConvertConfig::default()
    };

    let report = convert_file(&plain, &processor(&config), &config);
    assert_eq!(report.status, FileStatus::Unchanged);
    assert_eq!(report.output.as_deref(), Some("<?php\necho 1;\n"));
}

#[test]
fn failures_keep_the_file_and_carry_the_line() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let broken = "<?php\nclass Foo\n{\n    public function run()\n    {\n        Mage::log('x');\n";
    let path = write(&dir, "Broken.php", broken);
    let config = ConvertConfig::default();

    let report = convert_file(&path, &processor(&config), &config);
    assert_eq!(report.status, FileStatus::Failed);
    assert_eq!(report.line, Some(5));
    assert!(report.error.as_deref().is_some_and(|e| e.contains("unclosed `{`")));
    assert_eq!(read(&path), broken);
}

#[test]
fn collisions_fail_without_a_line() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let source = "<?php
class Foo
{
    public function __construct(array $logger)
    {
    }

    public function run()
    {
        Mage::log('x');
    }
}
";
    let path = write(&dir, "Foo.php", source);
    let config = ConvertConfig::default();

    let report = convert_file(&path, &processor(&config), &config);
    assert_eq!(report.status, FileStatus::Failed);
    assert_eq!(report.line, None);
    assert_eq!(read(&path), source);
}

#[test]
fn parallel_conversion_keeps_input_order() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let files: Vec<PathBuf> = (0..12)
        .map(|n| {
            let content = if n % 3 == 0 { LOGGING_CLASS } else { "<?php\n" };
            write(&dir, &format!("f{n:02}.php"), content)
        })
        .collect();
    let config = ConvertConfig {
        check: true,
        jobs: Some(3),
        ..ConvertConfig::default()
    };

    let reports = convert_files(&files, &processor(&config), &config);
    let paths: Vec<&PathBuf> = reports.iter().map(|r| &r.path).collect();
    assert_eq!(paths, files.iter().collect::<Vec<_>>());
    let would: usize = reports
        .iter()
        .filter(|r| r.status == FileStatus::WouldConvert)
        .count();
    assert_eq!(would, 4);
}

#[test]
fn mapping_file_feeds_the_resolver() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let mapping = write(
        &dir,
        "mapping.json",
        r#"{"aliases": {"helper": {"blog": "Acme_Blog_Helper_Data"}}}"#,
    );
    let path = write(
        &dir,
        "Post.php",
        "<?php\nclass Post\n{\n    public function a()\n    {\n        return Mage::helper('blog');\n    }\n}\n",
    );
    let config = ConvertConfig {
        mapping: Some(mapping),
        ..ConvertConfig::default()
    };

    let report = convert_file(&path, &processor(&config), &config);
    assert_eq!(report.status, FileStatus::Converted);
    assert_eq!(report.injected[0].class, "\\Acme\\Blog\\Helper\\Data");
}

#[test]
fn unreadable_mapping_stops_the_run() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let bad = write(&dir, "mapping.json", "{\"classes\": 3}");
    let config = ConvertConfig {
        mapping: Some(bad),
        ..ConvertConfig::default()
    };
    assert!(matches!(build_processor(&config), Err(CliError::Config(_))));
}

#[test]
fn trailing_namer_and_no_properties() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let path = write(
        &dir,
        "Foo.php",
        "<?php\nclass Foo\n{\n    public function a()\n    {\n        return Mage::getModel('catalog/category');\n    }\n}\n",
    );
    let config = ConvertConfig {
        namer: NamerKind::TrailingSegment,
        no_properties: true,
        ..ConvertConfig::default()
    };

    convert_file(&path, &processor(&config), &config);
    let written = read(&path);
    assert!(written.contains("$this->categoryFactory->create()"), "{written}");
    assert!(!written.contains("protected $categoryFactory;"), "{written}");
}

#[test]
fn summary_counts_and_exit_codes() {
    let report = |status| FileReport {
        status,
        converted_calls: 2,
        ..FileReport::new(Path::new("x.php"))
    };
    let reports = vec![
        report(FileStatus::Converted),
        report(FileStatus::Unchanged),
        report(FileStatus::WouldConvert),
    ];

    let summary = ConvertSummary::from_reports(&reports, 0);
    assert_eq!(
        summary,
        ConvertSummary {
            files: 3,
            converted: 2,
            unchanged: 1,
            failed: 0,
            converted_calls: 6,
        }
    );
    assert_eq!(summary.exit_code(false), 0);
    assert_eq!(summary.exit_code(true), 1);

    let with_missing = ConvertSummary::from_reports(&reports[1..2], 1);
    assert_eq!(with_missing.failed, 1);
    assert_eq!(with_missing.exit_code(false), 1);
}

#[test]
fn report_serializes_without_output() {
    let report = FileReport {
        status: FileStatus::WouldConvert,
        output: Some("diff".to_owned()),
        ..FileReport::new(Path::new("a.php"))
    };
    let json = serde_json::to_value(&report).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(json["status"], "would_convert");
    assert_eq!(json["path"], "a.php");
    assert!(json.get("output").is_none());
    assert!(json.get("error").is_none());
}

#[test]
fn report_lists_only_parameters_the_constructor_gained() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("{e}"));
    let path = write(
        &dir,
        "Foo.php",
        "<?php
class Foo
{
    public function __construct(\\Magento\\Tax\\Helper\\Data $taxHelper)
    {
        $this->taxHelper = $taxHelper;
    }

    public function run()
    {
        Mage::log(Mage::helper('tax')->getRate());
    }
}
",
    );
    let config = ConvertConfig::default();

    let report = convert_file(&path, &processor(&config), &config);
    assert_eq!(report.status, FileStatus::Converted);
    assert_eq!(report.converted_calls, 2);
    assert_eq!(
        report.injected,
        vec![InjectedDependency {
            class: "\\Psr\\Log\\LoggerInterface".to_owned(),
            variable: "logger".to_owned(),
        }]
    );
}
