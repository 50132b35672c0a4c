use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn config_merges_file_and_environment() {
    let tmp = tempdir().expect("tempdir");
    let config = tmp.path().join("archlink.toml");
    fs::write(
        &config,
        "[paths]\nworking_dir = \"/gws/data\"\n\n[verify]\nblock_size = 8192\n",
    )
    .expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("archlink")
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("ARCHLINK_CONFIG_PATH", &config)
        .env("ARCHLINK_ARCHIVE_DIR", "/archive/data")
        .env_remove("ARCHLINK_WORKING_DIR")
        .env_remove("ARCHLINK_DRY_RUN")
        .env_remove("ARCHLINK_BLOCK_SIZE")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("paths.working_dir=/gws/data"))
        .stdout(predicate::str::contains("paths.archive_dir=/archive/data"))
        .stdout(predicate::str::contains("verify.block_size=8192"))
        .stdout(predicate::str::contains("reconcile.dry_run=false"));
}

#[test]
fn config_rejects_invalid_block_size() {
    let tmp = tempdir().expect("tempdir");
    let config = tmp.path().join("archlink.toml");
    fs::write(&config, "[verify]\nblock_size = 0\n").expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("archlink")
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("ARCHLINK_CONFIG_PATH", &config)
        .env_remove("ARCHLINK_BLOCK_SIZE")
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid verify block size"));
}

#[test]
fn config_reports_dotenv_file_and_env_readers() {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join(".env"), "ARCHLINK_DRY_RUN=true\n").expect("write .env");

    assert_cmd::cargo::cargo_bin_cmd!("archlink")
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("ARCHLINK_CONFIG_PATH", tmp.path().join("absent.toml"))
        .env_remove("ARCHLINK_WORKING_DIR")
        .env_remove("ARCHLINK_ARCHIVE_DIR")
        .env_remove("ARCHLINK_DRY_RUN")
        .env_remove("ARCHLINK_BLOCK_SIZE")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("dotenv="))
        .stdout(predicate::str::contains(".env"))
        .stdout(predicate::str::contains("reconcile.dry_run=true"))
        .stdout(predicate::str::contains("env.ARCHLINK_BLOCK_SIZE=unset"));
}
