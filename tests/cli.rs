use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

/// A binary invocation pointed at `root`, with a server address nothing
/// listens on so any request would fail loudly.
fn uploader(root: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("osc-uploader").expect("Binary exists");
    cmd.arg("--images-dir")
        .arg(root.join("images"))
        .arg("--temp-dir")
        .arg(root.join("temp"))
        .arg("--token-file")
        .arg(root.join("token_OSC"))
        .arg("--server")
        .arg("http://127.0.0.1:9/");
    cmd
}

#[test]
fn missing_token_file_exits_with_failure() {
    let root = tempdir().unwrap();
    std::fs::create_dir(root.path().join("images")).unwrap();
    std::fs::create_dir(root.path().join("temp")).unwrap();

    uploader(root.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Verifying token"))
        .stderr(predicate::str::contains("missing or empty"));
}

#[test]
fn empty_token_file_exits_with_failure() {
    let root = tempdir().unwrap();
    std::fs::create_dir(root.path().join("images")).unwrap();
    std::fs::create_dir(root.path().join("temp")).unwrap();
    std::fs::write(root.path().join("token_OSC"), "\n").unwrap();

    uploader(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing or empty"));
}

#[test]
fn missing_images_dir_is_a_configuration_error() {
    let root = tempdir().unwrap();
    std::fs::create_dir(root.path().join("temp")).unwrap();

    uploader(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Images directory not found"));
}

#[test]
fn help_lists_options() {
    Command::cargo_bin("osc-uploader")
        .expect("Binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--split-size").and(predicate::str::contains("--token-file")));
}

#[test]
fn default_token_lookup_names_local_file() {
    let root = tempdir().unwrap();
    let home = tempdir().unwrap();
    std::fs::create_dir(root.path().join("images")).unwrap();
    std::fs::create_dir(root.path().join("temp")).unwrap();

    Command::cargo_bin("osc-uploader")
        .expect("Binary exists")
        .current_dir(root.path())
        .env("HOME", home.path())
        .env_remove("OSC_TOKEN_FILE")
        .arg("--server")
        .arg("http://127.0.0.1:9/")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'token_OSC'"));
}
