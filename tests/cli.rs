// ABOUTME: Integration tests for the endrun CLI binary.
// ABOUTME: Validates help output, config merging, and discovery failure modes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

fn endrun_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("endrun"))
}

/// Serve one canned HTTP response from a background thread.
fn serve_once(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();

        let mut buf = [0u8; 4096];
        let mut seen = Vec::new();
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            seen.extend_from_slice(&buf[..n]);
            if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        stream.write_all(response.as_bytes()).unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn help_shows_connection_flags() {
    endrun_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--strict-host-key"))
        .stdout(predicate::str::contains("--auth-timeout"))
        .stdout(predicate::str::contains("--exec-timeout"));
}

#[test]
fn missing_url_is_an_error() {
    let temp = tempfile::tempdir().unwrap();

    endrun_cmd()
        .current_dir(temp.path())
        .args(["--user", "dev", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no server URL"));
}

#[test]
fn missing_endpoint_header_exits_255() {
    let url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n");
    let temp = tempfile::tempdir().unwrap();

    endrun_cmd()
        .current_dir(temp.path())
        .args(["--url", &url, "--user", "dev", "true"])
        .assert()
        .code(255)
        .stderr(predicate::str::contains("SSH endpoint"));
}

#[test]
fn malformed_endpoint_header_is_fatal() {
    let url =
        serve_once("HTTP/1.1 200 OK\r\nX-SSH-Endpoint: bad-endpoint\r\nContent-Length: 0\r\n\r\n");
    let temp = tempfile::tempdir().unwrap();

    endrun_cmd()
        .current_dir(temp.path())
        .args(["--url", &url, "--user", "dev", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("malformed SSH endpoint"));
}

#[test]
fn unloadable_key_is_reported_after_resolution() {
    let url = serve_once(
        "HTTP/1.1 200 OK\r\nX-SSH-Endpoint: 127.0.0.1:2222\r\nContent-Length: 0\r\n\r\n",
    );
    let temp = tempfile::tempdir().unwrap();

    endrun_cmd()
        .current_dir(temp.path())
        .args(["--url", &url, "--user", "dev", "--key", "/nonexistent/key", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load key"));
}

#[test]
fn url_is_read_from_config_file() {
    let url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n");
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(
        temp.path().join("endrun.yml"),
        format!("url: {url}\nuser: dev\n"),
    )
    .unwrap();

    // Reaching the 255 "no endpoint" exit proves the file's URL was used.
    endrun_cmd()
        .current_dir(temp.path())
        .arg("true")
        .assert()
        .code(255);
}

#[test]
fn broken_config_file_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("endrun.yml"), "no_such_field: 1\n").unwrap();

    endrun_cmd()
        .current_dir(temp.path())
        .args(["--user", "dev", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("YAML"));
}
