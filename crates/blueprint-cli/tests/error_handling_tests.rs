//! Tests for error messages, suggestions and exit codes.

use std::fs;
use std::path::Path;

use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

const APP_BLUEPRINT: &str = r#"
apiVersion: xl/v2
kind: Blueprint
metadata:
  name: app
spec:
  parameters:
    - name: AppName
      type: Input
      prompt: Application name?
    - name: Port
      type: Input
      prompt: Port?
      validate: !expr "regex('[0-9]+', Port)"
  files:
    - path: app.txt.tmpl
"#;

fn repository() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("app");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("blueprint.yaml"), APP_BLUEPRINT).unwrap();
    fs::write(root.join("app.txt.tmpl"), "{{ .AppName }}:{{ .Port }}").unwrap();
    temp
}

fn blueprint(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!("blueprint");
    cmd.env_remove("BLUEPRINT_REPOSITORY")
        .env_remove("RUST_LOG")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1");
    cmd
}

fn answers(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("answers.yaml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn missing_blueprint_is_not_found() {
    let home = TempDir::new().unwrap();
    let repo = repository();
    blueprint(home.path())
        .args(["inspect", "nope", "-r"])
        .arg(repo.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("was not found"))
        .stderr(predicate::str::contains("blueprint list"));
}

#[test]
fn missing_repository_is_not_found() {
    let home = TempDir::new().unwrap();
    blueprint(home.path())
        .args(["list", "-r"])
        .arg(home.path().join("no-such-dir"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--repository"));
}

#[test]
fn strict_answers_report_missing_parameter() {
    let home = TempDir::new().unwrap();
    let repo = repository();
    let answers = answers(home.path(), "AppName: shop\n");
    let out = home.path().join("out");

    blueprint(home.path())
        .args(["generate", "app", "-s", "-a"])
        .arg(&answers)
        .arg("-r")
        .arg(repo.path())
        .arg("-o")
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Port"))
        .stderr(predicate::str::contains("answers file"));

    assert!(!out.exists());
}

#[test]
fn invalid_answer_is_a_user_error() {
    let home = TempDir::new().unwrap();
    let repo = repository();
    let answers = answers(home.path(), "AppName: shop\nPort: eighty\n");

    blueprint(home.path())
        .args(["generate", "app", "-s", "-a"])
        .arg(&answers)
        .arg("-r")
        .arg(repo.path())
        .arg("-o")
        .arg(home.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Port"));
}

#[test]
fn answers_file_must_be_a_map() {
    let home = TempDir::new().unwrap();
    let repo = repository();
    let answers = answers(home.path(), "- AppName\n- Port\n");

    blueprint(home.path())
        .args(["generate", "app", "-s", "-a"])
        .arg(&answers)
        .arg("-r")
        .arg(repo.path())
        .assert()
        .code(2);
}

#[test]
fn existing_output_needs_force() {
    let home = TempDir::new().unwrap();
    let repo = repository();
    let answers = answers(home.path(), "AppName: shop\nPort: 8080\n");
    let out = home.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("app.txt"), "keep").unwrap();

    let run = |force: bool| {
        let mut cmd = blueprint(home.path());
        cmd.args(["generate", "app", "-s", "-a"])
            .arg(&answers)
            .arg("-r")
            .arg(repo.path())
            .arg("-o")
            .arg(&out);
        if force {
            cmd.arg("--force");
        }
        cmd.assert()
    };

    run(false)
        .code(2)
        .stderr(predicate::str::contains("--force"));
    assert_eq!(fs::read_to_string(out.join("app.txt")).unwrap(), "keep");

    run(true).success();
    assert_eq!(fs::read_to_string(out.join("app.txt")).unwrap(), "shop:8080");
}

#[test]
fn invalid_blueprint_definition() {
    let home = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();
    let root = repo.path().join("broken");
    fs::create_dir_all(&root).unwrap();
    fs::write(
        root.join("blueprint.yaml"),
        "apiVersion: xl/v3\nkind: Blueprint\nmetadata:\n  name: broken\n",
    )
    .unwrap();

    blueprint(home.path())
        .args(["inspect", "broken", "-r"])
        .arg(repo.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("api version"));
}

#[test]
fn strict_answers_without_answers_file_is_rejected_by_clap() {
    let home = TempDir::new().unwrap();
    blueprint(home.path())
        .args(["generate", "app", "--strict-answers"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--answers"));
}

#[test]
fn verbose_errors_skip_the_hint() {
    let home = TempDir::new().unwrap();
    let repo = repository();
    blueprint(home.path())
        .args(["-v", "inspect", "nope", "-r"])
        .arg(repo.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Use -v / --verbose").not());
}
