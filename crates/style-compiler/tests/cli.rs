//! End-to-end tests for the `scoped-styles` binary.
//!
//! Each test builds a small workspace in a temporary directory, runs the
//! binary against it and inspects the exit status, stdout and build outputs.

use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

#[derive(Debug, Clone, Deserialize)]
struct JsonMessage {
    #[serde(rename = "type")]
    message_type: String,
    filename: String,
    start: JsonPosition,
    message: String,
    code: String,
}

#[derive(Debug, Clone, Deserialize)]
struct JsonPosition {
    line: u32,
    column: u32,
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (relative, contents) in files {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

fn run(dir: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scoped-styles"))
        .arg("--workspace")
        .arg(dir)
        .args(extra)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run scoped-styles")
}

fn json_messages(output: &Output) -> Vec<JsonMessage> {
    serde_json::from_slice(&output.stdout).expect("stdout is a JSON array")
}

const CARD: &str = r#"<!doctype html>
<html><body>
<element name="x-card">
<style>
@accent: #c00;
.card { color: var(accent); background: url(img/card.png); }
#title { margin: var(gap, 4px); }
</style>
<div class="card shadow"><h2 id="title">Card</h2></div>
</element>
</body></html>
"#;

#[test]
fn test_clean_build_succeeds() {
    let dir = workspace(&[("components/card.html", CARD)]);
    let output = run(dir.path(), &["--compact"]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("scoped-styles found 0 errors and 0 warnings in 1 file"));

    let css = fs::read_to_string(dir.path().join("build/components/card.css")).unwrap();
    insta::assert_snapshot!(css.trim_end(), @r"
    .x-card_card { color: #c00; background: url(../../components/img/card.png); }
    #x-card_title { margin: 4px; }
    ");

    let html = fs::read_to_string(dir.path().join("build/components/card.html")).unwrap();
    assert!(html.contains(r#"<div class="x-card_card shadow"><h2 id="x-card_title">Card</h2></div>"#));
    assert!(!html.contains("<style>"));

    let selectors = fs::read_to_string(dir.path().join("build/components/card.selectors.json")).unwrap();
    let selectors: serde_json::Value = serde_json::from_str(&selectors).unwrap();
    assert_eq!(
        selectors,
        serde_json::json!({ "x-card": { "#title": "#x-card_title", ".card": ".x-card_card" } })
    );
}

#[test]
fn test_no_scope_keeps_names() {
    let dir = workspace(&[("card.html", CARD)]);
    let output = run(dir.path(), &["--compact", "--no-scope"]);

    assert!(output.status.success());
    let css = fs::read_to_string(dir.path().join("build/card.css")).unwrap();
    assert!(css.starts_with(".card { color: #c00;"), "{css}");
    let html = fs::read_to_string(dir.path().join("build/card.html")).unwrap();
    assert!(html.contains(r#"<div class="card shadow">"#));
}

#[test]
fn test_cycle_is_reported_as_json() {
    let dir = workspace(&[(
        "x-loop.html",
        "<element name=\"x-loop\"><style>\n@one: var(two);\n@two: var(one);\n.a { top: var(one); }\n</style></element>",
    )]);
    let output = run(dir.path(), &["--output", "json"]);

    assert!(output.status.success(), "warnings alone do not fail the build");
    let mut messages = json_messages(&output);
    messages.sort_by(|a, b| a.message.cmp(&b.message));
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].message, "var cycle detected var-one");
    assert_eq!(messages[0].code, "var-cycle");
    assert_eq!(messages[0].message_type, "Warning");
    assert_eq!(messages[0].filename, "x-loop.html");
    assert_eq!((messages[0].start.line, messages[0].start.column), (2, 1));
    assert_eq!(messages[1].message, "var cycle detected var-two");
    assert_eq!(messages[1].start.line, 3);
}

#[test]
fn test_fail_on_warnings() {
    let dir = workspace(&[(
        "x-a.html",
        r#"<element name="x-a"><style>@a: var(a);</style></element>"#,
    )]);
    let output = run(dir.path(), &["--fail-on-warnings"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error: var cycle detected var-a (var-cycle)"), "{stdout}");
    assert!(stdout.contains("found 1 error and 0 warnings"));
}

#[test]
fn test_fail_on_warnings_from_config() {
    let dir = workspace(&[
        ("scoped-styles.json", r#"{ "failOnWarnings": true, "outDir": "dist" }"#),
        ("x-a.html", r#"<element name="x-a"><style>@a: var(a);</style></element>"#),
    ]);
    let output = run(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(dir.path().join("dist/x-a.css").exists());
}

#[test]
fn test_missing_import_is_a_warning() {
    let dir = workspace(&[
        ("styles/base.css", ".base { top: 0; }"),
        (
            "pages/x-page.html",
            r#"<element name="x-page"><style>@import "../styles/base.css"; @import "nope.css" screen; @import "https://cdn.example.com/x.css";</style></element>"#,
        ),
    ]);
    let output = run(dir.path(), &["--output", "machine"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().filter(|l| l.starts_with("WARNING")).collect();
    assert_eq!(lines.len(), 1, "{stdout}");
    assert!(lines[0].starts_with("WARNING pages/x-page.html:1:"));
    assert!(lines[0].ends_with("(import-unresolved)"));
    assert!(lines[0].contains("nope.css"));
}

#[test]
fn test_threshold_error_hides_warnings() {
    let dir = workspace(&[(
        "x-a.html",
        r#"<element name="x-a"><style>@a: var(a);</style></element>"#,
    )]);
    let output = run(dir.path(), &["--threshold", "error"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("var cycle"));
    assert!(stdout.contains("found 0 errors and 0 warnings in 1 file"));
}

#[test]
fn test_ignore_and_extensions() {
    let dir = workspace(&[
        ("a.htm", r#"<element name="x-a"><style>.a { top: 0; }</style></element>"#),
        ("b.html", r#"<element name="x-b"><style>.b { top: 0; }</style></element>"#),
        ("skip/c.htm", r#"<element name="x-c"><style>.c { top: 0; }</style></element>"#),
    ]);
    let output = run(dir.path(), &["--extensions", ".htm", "--ignore", "skip/**"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("in 1 file"), "{stdout}");
    assert!(dir.path().join("build/a.css").exists());
    assert!(!dir.path().join("build/b.css").exists());
    assert!(!dir.path().join("build/skip/c.css").exists());
}

#[test]
fn test_invalid_config_fails() {
    let dir = workspace(&[("scoped-styles.json", "{ not json")]);
    let output = run(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"), "{stderr}");
}

#[test]
fn test_out_dir_equal_to_workspace_is_rejected() {
    let source = r#"<element name="x-a"><style>.a { top: 0; }</style><p class="a"></p></element>"#;
    let dir = workspace(&[("x-a.html", source)]);
    let output = run(dir.path(), &["--out-dir", "."]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("is the workspace"), "{stderr}");
    assert_eq!(fs::read_to_string(dir.path().join("x-a.html")).unwrap(), source);
}

#[test]
fn test_imported_stylesheets_are_copied() {
    let dir = workspace(&[
        ("styles/base.css", ".base { top: 0; }"),
        (
            "pages/x-page.html",
            r#"<element name="x-page"><style>@import "../styles/base.css";</style></element>"#,
        ),
    ]);
    let output = run(dir.path(), &[]);

    assert!(output.status.success(), "{output:?}");
    let css = fs::read_to_string(dir.path().join("build/pages/x-page.css")).unwrap();
    assert!(css.contains(r#"@import "../styles/base.css";"#), "{css}");
    let copied = fs::read_to_string(dir.path().join("build/styles/base.css")).unwrap();
    assert_eq!(copied, ".base { top: 0; }");
}
