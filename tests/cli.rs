//! Integration tests for the command-line interface.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const FORMATTERS: &str = r#"<formatters>
  <format name="Agent" title="Agent" class="edu.ku.brc.specify.datamodel.Agent" default="true">
    <switch single="true">
      <fields>
        <field>lastName</field>
      </fields>
    </switch>
  </format>
</formatters>
"#;

/// Helper to create a workspace holding a formatter resource
fn setup_test_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("formatters.xml"), FORMATTERS).unwrap();
    dir
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xml-sync"))
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["resolve", "format", "lint", "read", "roundtrip", "tables"] {
        assert!(text.contains(command), "missing {command} in:\n{text}");
    }
}

#[test]
fn test_resolve_prints_span() {
    let dir = setup_test_workspace();
    let output = run(dir.path(), &["resolve", "formatters.xml", "/format[0]/@class"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("(2:"), "{text}");
    assert!(text.contains("edu.ku.brc.specify.datamodel.Agent\n"), "{text}");
}

#[test]
fn test_resolve_unknown_path_fails() {
    let dir = setup_test_workspace();
    let output = run(dir.path(), &["resolve", "formatters.xml", "/format[3]"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("did not resolve"));
}

#[test]
fn test_format_write() {
    let dir = setup_test_workspace();
    let file = dir.path().join("formatters.xml");

    let output = run(
        dir.path(),
        &["format", "formatters.xml", "--write", "--max-line-length", "60"],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("Formatted"));

    let formatted = fs::read_to_string(&file).unwrap();
    assert!(formatted.contains(
        "  <format\n    name=\"Agent\"\n    title=\"Agent\"\n    class=\"edu.ku.brc.specify.datamodel.Agent\"\n    default=\"true\">\n    <switch"
    ));

    // Second run is a no-op
    let output = run(
        dir.path(),
        &["format", "formatters.xml", "--write", "--max-line-length", "60"],
    );
    assert!(stdout(&output).contains("already formatted"));
    assert_eq!(fs::read_to_string(&file).unwrap(), formatted);
}

#[test]
fn test_format_reads_config_budget() {
    let dir = setup_test_workspace();
    fs::write(dir.path().join("xml-sync.toml"), "[format]\nmax_line_length = 200\n").unwrap();

    let output = run(dir.path(), &["format", "formatters.xml"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), FORMATTERS);
}

#[test]
fn test_lint_clean_and_broken() {
    let dir = setup_test_workspace();
    let output = run(dir.path(), &["lint", "."]);
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("0 errors"));

    fs::write(
        dir.path().join("broken.xml"),
        FORMATTERS.replace("datamodel.Agent", "datamodel.Agnet"),
    )
    .unwrap();
    let output = run(dir.path(), &["lint", ".", "--json"]);
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let files = report.as_array().unwrap();
    assert_eq!(files.len(), 2);
    let broken = files
        .iter()
        .find(|entry| entry["file"].as_str().unwrap().ends_with("broken.xml"))
        .unwrap();
    let diagnostic = &broken["diagnostics"][0];
    assert_eq!(diagnostic["path"], "/format[0]/@class");
    assert_eq!(diagnostic["severity"], "error");
    assert_eq!(diagnostic["line"], 2);
}

#[test]
fn test_lint_extra_table_from_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("formatters.xml"),
        FORMATTERS.replace("datamodel.Agent", "datamodel.Specimen"),
    )
    .unwrap();

    let output = run(dir.path(), &["lint", "formatters.xml"]);
    assert_eq!(output.status.code(), Some(1));

    fs::write(dir.path().join("xml-sync.toml"), "[tables]\nextra = [\"Specimen\"]\n").unwrap();
    let output = run(dir.path(), &["lint", "formatters.xml"]);
    assert!(output.status.success(), "{}", stdout(&output));
}

#[test]
fn test_read_prints_json() {
    let dir = setup_test_workspace();
    let output = run(dir.path(), &["read", "formatters.xml"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["kind"], "formatters");
    assert_eq!(value["value"]["formats"][0]["table"], "Agent");
    assert_eq!(value["diagnostics"].as_array().unwrap().len(), 0);
}

#[test]
fn test_roundtrip_unchanged() {
    let dir = setup_test_workspace();
    let output = run(dir.path(), &["roundtrip", "formatters.xml"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("unchanged after round trip"));
}

#[test]
fn test_tables_lists_defaults() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["tables"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("edu.ku.brc.specify.datamodel"));
    assert!(text.contains("  CollectionObject\n"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = setup_test_workspace();
    fs::write(dir.path().join("xml-sync.toml"), "[format]\nmax_line_length = 0\n").unwrap();
    let output = run(dir.path(), &["format", "formatters.xml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("max_line_length"));
}
