use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn evalir() -> Command {
    let mut cmd = Command::cargo_bin("evalir").unwrap();
    cmd.arg("--no-color");
    cmd
}

fn write(dir: &TempDir, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path
}

#[test]
fn test_compile_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "version.eva", "(var VERSION 45)\n(printf \"Version: %d\\n\" VERSION)\n");

    evalir()
        .arg("compile")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("@VERSION = global i32 45, align 4"))
        .stdout(predicate::str::contains("declare i32 @printf(ptr, ...)"))
        .stdout(predicate::str::contains("%0 = load i32, ptr @VERSION, align 4"))
        .stdout(predicate::str::contains("ret i32 0"));
}

#[test]
fn test_compile_to_file() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "hello.eva", "(printf \"Hello\\n\")");
    let output = dir.path().join("hello.ll");
    let json = dir.path().join("hello.json");

    evalir()
        .arg("compile")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--json")
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("; ModuleID = 'EvalLLVM'"));
    assert!(text.contains("c\"Hello\\0A\\00\""));
    assert!(json.exists());
}

#[test]
fn test_compile_reports_lowering_error() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bad.eva", "(printf \"%d\" missing)");

    evalir()
        .arg("compile")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Undefined variable `missing` at 1:14"));
}

#[test]
fn test_strict_redefinition_flag() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "twice.eva", "(var X 1) (var X 2)");

    evalir().arg("compile").arg(&input).assert().success();
    evalir()
        .arg("compile")
        .arg(&input)
        .arg("--strict-redefinition")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already defined"));
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "demo.eva", "(printf \"x\")");
    let config = write(
        &dir,
        "config.json",
        r#"{"compiler": {"module_name": "Demo"}, "emitter": {"include_header": true}, "output_path": null}"#,
    );

    evalir()
        .arg("compile")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("; ModuleID = 'Demo'"));
}

#[test]
fn test_config_file_paths_are_kept() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "paths.eva", "(var A 1)");
    let output = dir.path().join("from-config.ll");
    let json = dir.path().join("from-config.json");
    let config = write(
        &dir,
        "config.json",
        &serde_json::json!({ "output_path": output, "json_path": json }).to_string(),
    );

    evalir()
        .arg("compile")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(fs::read_to_string(&output).unwrap().contains("@A = global i32 1"));
    assert!(json.exists());
}

#[test]
fn test_output_flag_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "paths.eva", "(var A 1)");
    let configured = dir.path().join("configured.ll");
    let flagged = dir.path().join("flagged.ll");
    let config = write(
        &dir,
        "config.json",
        &serde_json::json!({ "output_path": configured }).to_string(),
    );

    evalir()
        .arg("compile")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .arg("-o")
        .arg(&flagged)
        .assert()
        .success();

    assert!(flagged.exists());
    assert!(!configured.exists());
}

#[test]
fn test_compile_directory() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.eva", "(printf \"a\")");
    write(&dir, "b.eva", "(var B 2)");
    write(&dir, "notes.txt", "(not a program");

    evalir()
        .arg("compile")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 compiled, 0 failed"));

    assert!(dir.path().join("a.ll").exists());
    assert!(dir.path().join("b.ll").exists());
    assert!(!dir.path().join("notes.ll").exists());
}

#[test]
fn test_compile_directory_with_config_artifacts() {
    let dir = TempDir::new().unwrap();
    let sources = dir.path().join("src");
    fs::create_dir(&sources).unwrap();
    fs::write(sources.join("a.eva"), "(var A 1)").unwrap();
    let config = write(&dir, "config.json", r#"{"json_path": "unused.json"}"#);

    evalir()
        .arg("compile")
        .arg(&sources)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 compiled, 0 failed"));

    assert!(sources.join("a.ll").exists());
    assert!(sources.join("a.json").exists());
}

#[test]
fn test_compile_directory_rejects_single_file_flags() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.eva", "(var A 1)");

    evalir()
        .arg("compile")
        .arg(dir.path())
        .arg("-o")
        .arg(dir.path().join("all.ll"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("need a single input file"));
}

#[test]
fn test_compile_directory_with_failure() {
    let dir = TempDir::new().unwrap();
    write(&dir, "good.eva", "(printf \"ok\")");
    write(&dir, "bad.eva", "(foo)");

    evalir()
        .arg("compile")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 compiled, 1 failed"));
    assert!(dir.path().join("good.ll").exists());
}

#[test]
fn test_validate() {
    let dir = TempDir::new().unwrap();
    let good = write(&dir, "good.eva", "(printf \"hi\")");
    let bad = write(&dir, "bad.eva", "(printf \"hi\"");

    evalir()
        .arg("validate")
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("VALID"));

    evalir()
        .arg("validate")
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID"));
}

#[test]
fn test_debug_stats() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "stats.eva", "(var A 1) (printf \"%d %d\" A A)");

    evalir()
        .arg("debug")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Globals: 1"))
        .stdout(predicate::str::contains("Instructions: 3"))
        .stdout(predicate::str::contains("Calls: 1"))
        .stdout(predicate::str::contains("declare @printf: i32 (ptr, ...)"));
}
