//! The `render` and `check` commands, run through the binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn yatplt(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("yatplt").unwrap();
    // Keep the user's own configuration out of the tests.
    cmd.current_dir(temp.path())
        .env("YATPLT_CONFIG", temp.path().join("absent.toml"))
        .env_remove("RUST_LOG");
    cmd
}

fn write(temp: &TempDir, name: &str, text: &str) -> String {
    let path = temp.path().join(name);
    std::fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_render_to_stdout() {
    let temp = TempDir::new().unwrap();
    let template = write(&temp, "page.tpl", "a{{%'x'+'y'%}}b");

    yatplt(&temp).args(["render", &template]).assert().success().stdout("axyb");
}

#[test]
fn test_render_with_scope_and_context() {
    let temp = TempDir::new().unwrap();
    let template = write(
        &temp,
        "page.tpl",
        "{1{! global site = 'docs' !}1}{{% site + ':' + title + ':' + count %}}",
    );

    yatplt(&temp)
        .args(["render", &template, "--set", "title=Home", "--set", "count=3"])
        .assert()
        .success()
        .stdout("docs:Home:3");

    yatplt(&temp)
        .args(["render", &template, "--context", "title=\"From context\"", "-s", "count=1"])
        .assert()
        .success()
        .stdout("docs:From context:1");
}

#[test]
fn test_render_to_output_file() {
    let temp = TempDir::new().unwrap();
    let template = write(&temp, "page.tpl", "<p>{{% body %}}</p>");
    let output = temp.path().join("page.html");

    yatplt(&temp)
        .args(["render", &template, "--output", output.to_str().unwrap(), "--set", "body=hi"])
        .assert()
        .success()
        .stdout("");
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "<p>hi</p>");
}

#[test]
fn test_render_allow_none_flag() {
    let temp = TempDir::new().unwrap();
    let template = write(&temp, "page.tpl", "a{{% none %}}b");

    yatplt(&temp)
        .args(["render", &template])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expression returned none at render-expression#1"))
        .stderr(predicate::str::contains("--allow-none"));

    yatplt(&temp).args(["render", &template, "--allow-none"]).assert().success().stdout("ab");
}

#[test]
fn test_render_unbalanced_template_fails_with_suggestion() {
    let temp = TempDir::new().unwrap();
    let template = write(&temp, "page.tpl", "{{! a !}} {{! b");

    yatplt(&temp)
        .args(["render", &template])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tags count mismatch: 2 != 1"))
        .stderr(predicate::str::contains("suggestion"));
}

#[test]
fn test_render_missing_template() {
    let temp = TempDir::new().unwrap();
    yatplt(&temp)
        .args(["render", "missing.tpl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_invalid_assignment() {
    let temp = TempDir::new().unwrap();
    let template = write(&temp, "page.tpl", "x");
    yatplt(&temp)
        .args(["render", &template, "--set", "oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid assignment 'oops'"));
}

#[test]
fn test_check_text_and_json() {
    let temp = TempDir::new().unwrap();
    let template = write(&temp, "page.tpl", "head{1{! x = 1 !}1}{{% x %}}");

    yatplt(&temp)
        .args(["check", &template])
        .assert()
        .success()
        .stdout(predicate::str::contains("one-time-block#1"))
        .stdout(predicate::str::contains("render-expression#1"));

    let output = yatplt(&temp).args(["check", &template, "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["one_time"], 1);
    assert_eq!(report["render"], 1);
    assert_eq!(report["literals"], 1);
    assert_eq!(report["fragments"][0]["kind"], "literal");
    assert_eq!(report["fragments"][1]["name"], "one-time-block#1");
}

#[test]
fn test_config_file_delimiters() {
    let temp = TempDir::new().unwrap();
    let config = write(
        &temp,
        "config.toml",
        "[delimiters.expression]\nstart = \"<%=\"\nend = \"%>\"\n",
    );
    let template = write(&temp, "page.tpl", "x<%= 'y' %>z");

    yatplt(&temp)
        .args(["--config", &config, "render", &template])
        .assert()
        .success()
        .stdout("xyz");
}

#[test]
fn test_invalid_config_reports_toml_error() {
    let temp = TempDir::new().unwrap();
    let config = write(&temp, "config.toml", "strip_literal_text = ");
    let template = write(&temp, "page.tpl", "x");

    yatplt(&temp)
        .args(["--config", &config, "check", &template])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}
