use clap::Parser;
use dupscan::cli::Cli;
use dupscan::error::ExitCode;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn run(args: &[String]) -> ExitCode {
    let cli = Cli::try_parse_from(std::iter::once("dupscan".to_string()).chain(args.iter().cloned()))
        .unwrap();
    dupscan::run_app(cli).unwrap()
}

#[test]
fn test_run_app_writes_report_file() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    write(&data.join("a.txt"), b"hello");
    write(&data.join("b.txt"), b"hello");
    write(&data.join("c.txt"), b"world");
    let report = dir.path().join("report.txt");

    let code = run(&[
        format!("paths={}", data.display()),
        format!("output_file={}", report.display()),
        "--io-threads=1".to_string(),
    ]);

    assert_eq!(code, ExitCode::Success);
    let text = fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        format!(
            "5d41402abc4b2a76b9719d911017c592: [{}, {}] :2",
            data.join("a.txt").display(),
            data.join("b.txt").display()
        )
    );
    assert!(lines[1].starts_with("7d793037a0760186574b0282f2f435e7: ["));
}

#[test]
fn test_run_app_duplicates_only() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    write(&data.join("a.txt"), b"hello");
    write(&data.join("b.txt"), b"hello");
    write(&data.join("c.txt"), b"world");
    let report = dir.path().join("dups.txt");

    let code = run(&[
        "--duplicates-only".to_string(),
        format!("paths={}", data.display()),
        format!("output_file={}", report.display()),
    ]);

    assert_eq!(code, ExitCode::Success);
    let text = fs::read_to_string(&report).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.trim_end().ends_with(":2"));
}

#[test]
fn test_run_app_exclusion_reduces_group() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    write(&data.join("keep").join("a.txt"), b"hello");
    write(&data.join("skip_me").join("b.txt"), b"hello");
    let report = dir.path().join("report.txt");

    let code = run(&[
        format!("paths={}", data.display()),
        "exclude_paths=skip_me".to_string(),
        format!("output_file={}", report.display()),
    ]);

    assert_eq!(code, ExitCode::Success);
    let text = fs::read_to_string(&report).unwrap();
    assert_eq!(
        text,
        format!(
            "5d41402abc4b2a76b9719d911017c592: [{}] :1\n",
            data.join("keep").join("a.txt").display()
        )
    );
}

#[test]
fn test_run_app_missing_paths() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("never.txt");

    let code = run(&[format!("output_file={}", report.display())]);

    assert_eq!(code, ExitCode::MissingArgument);
    assert_eq!(code.as_i32(), 1);
    assert!(!report.exists());
}

#[test]
fn test_run_app_unwritable_output_is_an_error() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("no_such_dir").join("report.txt");

    let cli = Cli::try_parse_from([
        "dupscan".to_string(),
        format!("paths={}", dir.path().display()),
        format!("output_file={}", report.display()),
    ])
    .unwrap();

    assert!(dupscan::run_app(cli).is_err());
}

#[test]
fn test_bare_token_is_rejected() {
    assert!(Cli::try_parse_from(["dupscan", "/some/dir"]).is_err());
}

#[test]
fn test_binary_without_paths_prints_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_dupscan"))
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("paths="));
}

#[test]
fn test_binary_reports_to_stdout() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("b.txt"), b"hello");

    let output = Command::new(env!("CARGO_BIN_EXE_dupscan"))
        .arg("-q")
        .arg(format!("paths={}", dir.path().display()))
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Two progress lines, then the report line.
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[2].starts_with("5d41402abc4b2a76b9719d911017c592: ["));
    assert!(lines[2].ends_with(":2"));
}

#[test]
fn test_report_inside_scanned_root_is_not_listed() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("empty.txt"), b"");
    let report = dir.path().join("report.txt");

    let code = run(&[
        format!("paths={}", dir.path().display()),
        format!("output_file={}", report.display()),
        "--io-threads=1".to_string(),
    ]);

    assert_eq!(code, ExitCode::Success);
    let text = fs::read_to_string(&report).unwrap();
    assert!(!text.contains("report.txt"));
    assert_eq!(
        text,
        format!(
            "5d41402abc4b2a76b9719d911017c592: [{}] :1\n\
             d41d8cd98f00b204e9800998ecf8427e: [{}] :1\n",
            dir.path().join("a.txt").display(),
            dir.path().join("empty.txt").display()
        )
    );
}
