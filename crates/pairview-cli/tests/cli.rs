#![allow(deprecated)]
use assert_cmd::Command;
use pairview_cache::{AssetRequest, AssetResponse, CacheConfig, CacheStorage};
use predicates::prelude::*;
use std::fs;
use std::net::TcpListener;
use std::time::{Duration, Instant};
use tempfile::tempdir;

const SAMPLE: &str = r#"[
  {"section_1_id": "12", "section_1_content": "Tax on income", "section_2_id": "40", "section_2_content": "Exemptions", "reason": "Article 40 narrows article 12."},
  {"section_1_id": "7", "section_2_id": "9", "explanation": "Both define residency."},
  {"section_1_content": "Untitled text"}
]"#;

fn pairview() -> Command {
    let mut cmd = Command::cargo_bin("pairview").unwrap();
    cmd.env_remove("PAIRVIEW_LOCALE")
        .env_remove("PAIRVIEW_ORIGIN")
        .env_remove("PAIRVIEW_CACHE_VERSION")
        .env_remove("PAIRVIEW_CACHE_DIR")
        .env_remove("PAIRVIEW_CACHE_PREFIX")
        .env_remove("PAIRVIEW_FETCH_TIMEOUT")
        .env("RUST_LOG", "warn");
    cmd
}

fn write_sample(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("pairs.json");
    fs::write(&path, SAMPLE).unwrap();
    path
}

#[test]
fn list_prints_selector_labels() {
    let dir = tempdir().unwrap();
    let file = write_sample(dir.path());

    pairview()
        .args(["--locale", "en", "list"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Compare 12 and 40"))
        .stdout(predicate::str::contains("3. Compare Section 1 and Section 2"))
        .stderr(predicate::str::contains("File loaded successfully."));
}

#[test]
fn list_uses_persian_labels_by_default() {
    let dir = tempdir().unwrap();
    let file = write_sample(dir.path());

    pairview()
        .arg("list")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("مقایسه 12 و 40"));
}

#[test]
fn show_selects_one_based_index() {
    let dir = tempdir().unwrap();
    let file = write_sample(dir.path());

    pairview()
        .args(["--locale", "en", "show", "--index", "2"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 of 3)"))
        .stdout(predicate::str::contains("Both define residency."))
        .stdout(predicate::str::contains("(first section content not available)"));
}

#[test]
fn show_out_of_range_keeps_first_record() {
    let dir = tempdir().unwrap();
    let file = write_sample(dir.path());

    pairview()
        .args(["--locale", "en", "show", "--index", "9"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 of 3)"));
}

#[test]
fn show_html_escapes_content() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("markup.json");
    fs::write(
        &file,
        r#"[{"section_1_id": "1", "section_1_content": "a < b\nc"}]"#,
    )
    .unwrap();

    pairview()
        .args(["--locale", "en", "show", "--html"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("<div class=\"section-content\">"))
        .stdout(predicate::str::contains("a &lt; b<br>c"));
}

#[test]
fn invalid_json_exits_with_load_failure() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("broken.json");
    fs::write(&file, "{not json").unwrap();

    pairview()
        .args(["--locale", "en", "list"])
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid JSON file:"));
}

#[test]
fn non_array_json_exits_with_load_failure() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("object.json");
    fs::write(&file, r#"{"section_1_id": "1"}"#).unwrap();

    pairview()
        .args(["--locale", "en", "show"])
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid JSON file:"));
}

#[test]
fn non_json_extension_is_rejected_without_notification() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("pairs.txt");
    fs::write(&file, SAMPLE).unwrap();

    pairview()
        .args(["--locale", "en", "list"])
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid JSON file:").not());
}

#[test]
fn missing_file_is_notified_and_internal_error() {
    let dir = tempdir().unwrap();

    pairview()
        .args(["--locale", "en", "list"])
        .arg(dir.path().join("absent.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid JSON file: failed to read"));
}

#[test]
fn unknown_locale_is_an_internal_error() {
    let dir = tempdir().unwrap();
    let file = write_sample(dir.path());

    pairview()
        .args(["--locale", "xx", "list"])
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown locale"));
}

#[test]
fn labels_file_overrides_words() {
    let dir = tempdir().unwrap();
    let file = write_sample(dir.path());
    let labels = dir.path().join("labels.json");
    fs::write(&labels, r#"{"compare": "Diff", "and": "vs"}"#).unwrap();

    pairview()
        .arg("--labels")
        .arg(&labels)
        .arg("list")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Diff 12 vs 40"));
}

#[test]
fn browse_steps_through_stdin_commands() {
    let dir = tempdir().unwrap();
    let file = write_sample(dir.path());

    pairview()
        .args(["--locale", "en", "browse"])
        .arg(&file)
        .write_stdin("n\nn\nn\np\n1\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 of 3)"))
        .stdout(predicate::str::contains("(3 of 3)"))
        .stdout(predicate::str::contains("Untitled text"));
}

#[test]
fn cache_status_on_empty_dir() {
    let dir = tempdir().unwrap();

    pairview()
        .args(["cache", "status", "--cache-dir"])
        .arg(dir.path().join("buckets"))
        .assert()
        .success()
        .stdout(predicate::str::contains("no buckets"));
}

#[test]
fn cache_fetch_requires_installed_version() {
    let dir = tempdir().unwrap();

    pairview()
        .args(["cache", "fetch", "index.html", "--cache-dir"])
        .arg(dir.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not installed"));
}

#[test]
fn cache_activate_before_install_fails() {
    let dir = tempdir().unwrap();

    pairview()
        .args(["cache", "activate", "--cache-dir"])
        .arg(dir.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not installed"));
}

/// Origin that accepts connections and never sends a byte back.
fn silent_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let origin = format!("http://{}/", listener.local_addr().unwrap());
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });
    origin
}

#[tokio::test]
async fn cache_fetch_exits_while_refresh_hangs() {
    let dir = tempdir().unwrap();
    let origin = silent_origin();

    let config = CacheConfig::default().with_origin(&origin);
    let storage = CacheStorage::with_dir(dir.path());
    let staged = storage.stage(&config.bucket_name()).await.unwrap();
    let request = AssetRequest::get(config.resolve("index.html").unwrap());
    staged
        .put(&request, &AssetResponse::new(&request.url, 200, "<html>cached</html>"))
        .await
        .unwrap();
    storage.commit(&staged, 1).await.unwrap();

    let started = Instant::now();
    pairview()
        .args(["cache", "fetch", "index.html", "--origin", origin.as_str(), "--cache-dir"])
        .arg(dir.path())
        .timeout(Duration::from_secs(60))
        .assert()
        .success()
        .stdout("<html>cached</html>")
        .stderr(predicate::str::contains("(cache)"));
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[tokio::test]
async fn cache_status_flags_incomplete_bucket() {
    let dir = tempdir().unwrap();
    let storage = CacheStorage::with_dir(dir.path());
    storage.open("section-keywords-cache-v4").await.unwrap();

    pairview()
        .args(["cache", "status", "--cache-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("* section-keywords-cache-v4 (incomplete)"));

    pairview()
        .args(["cache", "activate", "--cache-dir"])
        .arg(dir.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("did not complete"));
}
