//! CLI contract tests
//!
//! Runs the built binary with its data and config directories pointed at a
//! temp dir. Nothing goes beyond a local listener standing in for the API.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};

fn repolens_bin() -> &'static str {
    env!("CARGO_BIN_EXE_repolens")
}

fn run(home: &Path, args: &[&str]) -> Output {
    run_with_env(home, args, &[])
}

fn run_with_env(home: &Path, args: &[&str], vars: &[(&str, &str)]) -> Output {
    Command::new(repolens_bin())
        .args(args)
        .envs(vars.iter().copied())
        .env("REPOLENS_DATA_DIR", home.join("data"))
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .output()
        .expect("Failed to run repolens")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_version() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("repolens {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_scan_rejects_malformed_url() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["scan", "https://github.com/only-owner"]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("Invalid repository URL format"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_show_without_results_fails() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["show"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No saved audit"));
}

#[test]
fn test_token_lifecycle() {
    let home = tempfile::tempdir().unwrap();

    let output = run(home.path(), &["token", "set", "  ghp_abcdefghijkl1234  "]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stored = std::fs::read_to_string(home.path().join("data").join("token")).unwrap();
    assert_eq!(stored, "ghp_abcdefghijkl1234");

    let output = run(home.path(), &["token", "show"]);
    let shown = stdout(&output);
    assert!(shown.contains("1234"));
    assert!(!shown.contains("ghp_abcdefghijkl"));

    let output = run(home.path(), &["token", "clear"]);
    assert!(output.status.success());
    assert!(!home.path().join("data").join("token").exists());

    let output = run(home.path(), &["token", "show"]);
    assert!(stdout(&output).contains("No token stored"));
}

#[test]
fn test_config_set_rejects_unknown_backend() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["config", "set", "ai.backend", "watson"]);
    assert!(!output.status.success());

    let output = run(home.path(), &["config", "set", "ai.backend", "ollama"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[test]
fn test_status_on_fresh_install() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["status"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("No audit yet"));
    assert!(out.contains("No GitHub token"));
}

/// Answers every tree request with 404 until `count` connections are served
fn missing_repo_api(count: usize) -> (String, std::thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = std::thread::spawn(move || {
        for _ in 0..count {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            stream
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}")
                .unwrap();
        }
    });
    (base, handle)
}

#[test]
fn test_scan_failure_reported_once() {
    let home = tempfile::tempdir().unwrap();
    let (api, server) = missing_repo_api(2);

    let output = run_with_env(
        home.path(),
        &["scan", "https://github.com/acme/gone"],
        &[("REPOLENS_GITHUB_API", api.as_str()), ("GEMINI_API_KEY", "test-key")],
    );
    server.join().unwrap();

    assert!(!output.status.success());
    let err = stderr(&output);
    assert_eq!(
        err.matches("Failed to fetch repository tree: Not Found").count(),
        1,
        "stderr: {}",
        err
    );
}
