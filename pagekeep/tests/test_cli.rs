use assert_cmd::Command;
use predicates::prelude::*;
use rstest::*;
use std::fs;
use tempfile::TempDir;

/// Binary isolated from the user's config, catalog and downloads.
fn pagekeep(dir: &TempDir) -> Command {
    let config = dir.path().join("config.toml");
    if !config.exists() {
        fs::write(&config, "open_clones = false\n").unwrap();
    }
    let mut cmd = Command::cargo_bin("pagekeep").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .env("PAGEKEEP_DATA_DIR", dir.path().join("data"))
        .env("PAGEKEEP_DOWNLOAD_DIR", dir.path().join("Downloads"))
        .env_remove("PAGEKEEP_SUBDIRECTORY");
    cmd
}

#[fixture]
fn dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

#[rstest]
fn given_help_flag_when_run_then_lists_commands(dir: TempDir) {
    pagekeep(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("save"))
        .stdout(predicate::str::contains("clear"));
}

#[rstest]
fn given_generate_config_when_run_then_prints_defaults() {
    Command::cargo_bin("pagekeep")
        .unwrap()
        .arg("--generate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("subdirectory = \"offline_pages\""));
}

#[rstest]
fn given_empty_catalog_when_listing_then_placeholder_is_shown(dir: TempDir) {
    pagekeep(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No pages saved yet"));
}

#[rstest]
fn given_local_page_when_saved_then_file_and_entry_exist(dir: TempDir) {
    let page = dir.path().join("page.html");
    fs::write(
        &page,
        "<html><head><title>Local Page</title><style>p{color:red}</style></head><body><p>hi</p></body></html>",
    )
    .unwrap();

    pagekeep(&dir)
        .args(["-d", "save"])
        .arg(&page)
        .assert()
        .success()
        .stderr(predicate::str::contains("Saving page..."))
        .stderr(predicate::str::contains("Page saved successfully!"));

    let saved = dir.path().join("Downloads/offline_pages/local_page.html");
    let html = fs::read_to_string(saved).unwrap();
    assert!(html.contains("p{color:red}"));
    assert!(html.contains("This is an offline copy of"));

    pagekeep(&dir)
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Local Page\""));

    pagekeep(&dir)
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stderr(predicate::str::contains("All pages cleared!"));
    assert!(!dir.path().join("Downloads/offline_pages/local_page.html").exists());

    pagekeep(&dir)
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("No pages saved yet"));
}

#[rstest]
fn given_missing_page_when_saved_then_error_and_usage_exit(dir: TempDir) {
    pagekeep(&dir)
        .args(["save", "/definitely/not/here.html"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Error:"));
}

#[rstest]
fn given_declined_prompt_when_clearing_then_cancelled(dir: TempDir) {
    pagekeep(&dir)
        .arg("clear")
        .write_stdin("n\n")
        .assert()
        .code(130);
}

#[rstest]
fn given_zero_index_when_opening_then_invalid_input(dir: TempDir) {
    pagekeep(&dir)
        .args(["open", "0"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("numbered from 1"));
}

#[rstest]
fn given_ping_on_stdin_when_serving_then_answers_ready(dir: TempDir) {
    pagekeep(&dir)
        .arg("serve")
        .write_stdin("{\"action\":\"ping\"}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("{\"status\":\"ready\"}"));
}

#[rstest]
fn given_bash_when_generating_completion_then_script_is_printed(dir: TempDir) {
    pagekeep(&dir)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pagekeep"));
}
