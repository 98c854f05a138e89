//! End-to-end CLI tests for the sitegrab binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sitegrab() -> Command {
    let mut cmd = Command::cargo_bin("sitegrab").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    sitegrab()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--mirror"))
        .stdout(predicate::str::contains("--reject"))
        .stdout(predicate::str::contains("--exclude"))
        .stdout(predicate::str::contains("--folder"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    sitegrab()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sitegrab"));
}

#[test]
fn test_binary_missing_url_is_usage_error() {
    sitegrab()
        .arg("--mirror")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    sitegrab()
        .args(["--url", "http://example.test/", "--invalid-flag"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_rejects_non_http_url() {
    let temp_dir = TempDir::new().unwrap();
    sitegrab()
        .args(["--url", "ftp://example.test/file.txt", "--folder"])
        .arg(temp_dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ftp"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_primary_404_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();

    sitegrab()
        .args(["--mirror", "--url", &format!("{}/page.html", server.uri())])
        .arg("--folder")
        .arg(temp_dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("404"));

    assert!(!temp_dir.path().join("page.html").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_mirror_with_reject_saves_expected_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<script src="/app.js"></script><link href="/style.css">"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app.js"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"let a = 1;".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/style.css"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();

    sitegrab()
        .arg("--mirror")
        .arg("--reject=.css")
        .arg(format!("--url={}/page.html", server.uri()))
        .arg("--folder")
        .arg(temp_dir.path())
        .assert()
        .success();

    assert!(temp_dir.path().join("page.html").exists());
    assert_eq!(
        std::fs::read(temp_dir.path().join("app.js")).unwrap(),
        b"let a = 1;"
    );
    assert!(!temp_dir.path().join("style.css").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_failed_asset_still_exits_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"<img src="/gone.png">"#, "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();

    sitegrab()
        .args(["--mirror", "--url", &format!("{}/page.html", server.uri())])
        .arg("--folder")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("asset download failed"));

    assert!(temp_dir.path().join("page.html").exists());
    assert!(!temp_dir.path().join("gone.png").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_single_file_mode_skips_assets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/page.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"<img src="/logo.png">"#, "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();

    sitegrab()
        .args(["-q", "--url", &format!("{}/docs/page.html", server.uri())])
        .arg("--folder")
        .arg(temp_dir.path())
        .assert()
        .success();

    assert!(temp_dir.path().join("page.html").exists());
    assert!(!temp_dir.path().join("docs").exists());
}
