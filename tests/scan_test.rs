use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn scan_lists_datasets_and_versions() {
    let tmp = tempdir().expect("tempdir");
    let work = tmp.path().join("gws");
    for dir in ["a/ds1/v20200101", "a/ds1/v20200201", "b/ds2/v20210101", "c/notes"] {
        fs::create_dir_all(work.join(dir)).expect("mkdir");
    }

    assert_cmd::cargo::cargo_bin_cmd!("archlink")
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("ARCHLINK_CONFIG_PATH", tmp.path().join("absent.toml"))
        .arg("scan")
        .arg(&work)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "dataset=a/ds1 versions=v20200101,v20200201 latest=none",
        ))
        .stdout(predicate::str::contains("dataset=b/ds2 versions=v20210101"))
        .stdout(predicate::str::contains("datasets=2"));

    assert!(work.join("a/ds1/v20200101").is_dir());
}

#[test]
fn scan_of_missing_tree_fails() {
    let tmp = tempdir().expect("tempdir");
    assert_cmd::cargo::cargo_bin_cmd!("archlink")
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("ARCHLINK_CONFIG_PATH", tmp.path().join("absent.toml"))
        .arg("scan")
        .arg(tmp.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("top-level directory does not exist"));
}
