use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn pkgdef(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pkgdef").unwrap();
    cmd.current_dir(dir.path()).arg("--no-color");
    cmd
}

#[test]
fn test_check_clean_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("ok.pkgdef"),
        "[$RootKey$\\Test]\n@=\"x\"\n\"Count\"=dword:00000001\n",
    )
    .unwrap();

    pkgdef(&dir)
        .args(["check", "ok.pkgdef"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file checked, no problems found"));
}

#[test]
fn test_check_reports_errors() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.pkgdef"), "[Test\n\"Count\"=dword:1\n").unwrap();

    pkgdef(&dir)
        .args(["check", "bad.pkgdef"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("error[PL002]"))
        .stdout(predicate::str::contains("bad.pkgdef:2:9"))
        .stdout(predicate::str::contains("2 errors"));
}

#[test]
fn test_warnings_only_fail_when_denied() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("warn.pkgdef"), "[$Nope$\\Test]\n").unwrap();

    pkgdef(&dir)
        .args(["check", "warn.pkgdef"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning[PL006]"));

    pkgdef(&dir)
        .args(["check", "--deny-warnings", "warn.pkgdef"])
        .assert()
        .failure();
}

#[test]
fn test_ignore_flag_and_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.pkgdef"), "[A]\n\"x\"=dword:1\n").unwrap();

    pkgdef(&dir)
        .args(["check", "--ignore", "PL009", "bad.pkgdef"])
        .assert()
        .success();

    fs::write(dir.path().join(".pkgdefrc"), "ignore = [\"PL009\"]\n").unwrap();
    pkgdef(&dir).args(["check", "bad.pkgdef"]).assert().success();
}

#[test]
fn test_unreadable_file_does_not_stop_the_walk() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.pkgdef"), "[A]\n").unwrap();
    fs::write(dir.path().join("b.pkgdef"), [b'[', 0xff, 0xfe, b']', b'\n']).unwrap();
    fs::write(dir.path().join("c.pkgdef"), "[C]\n").unwrap();

    pkgdef(&dir)
        .args(["check", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"))
        .stderr(predicate::str::contains("b.pkgdef"))
        .stdout(predicate::str::contains("2 files checked: 1 error"));
}

#[test]
fn test_check_walks_directories() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("a.pkgdef"), "[A]\n").unwrap();
    fs::write(dir.path().join("nested/b.pkgundef"), "[B]\n").unwrap();
    fs::write(dir.path().join("nested/readme.txt"), "not pkgdef").unwrap();

    pkgdef(&dir)
        .args(["check", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 files checked"));
}

#[test]
fn test_missing_path() {
    let dir = TempDir::new().unwrap();
    pkgdef(&dir)
        .args(["check", "nope.pkgdef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No such file or directory"));
}

#[test]
fn test_variables_and_explain() {
    let dir = TempDir::new().unwrap();

    pkgdef(&dir)
        .arg("variables")
        .assert()
        .success()
        .stdout(predicate::str::contains("$RootKey$"));

    pkgdef(&dir)
        .args(["explain", "pl008"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PL008 (suggestion, suggestion)"));

    pkgdef(&dir).args(["explain", "PL999"]).assert().failure();
}

#[test]
fn test_init_writes_config_once() {
    let dir = TempDir::new().unwrap();

    pkgdef(&dir).arg("init").assert().success();
    assert!(dir.path().join(".pkgdefrc").exists());

    pkgdef(&dir).arg("init").assert().failure();
    pkgdef(&dir).args(["init", "--force"]).assert().success();
}
