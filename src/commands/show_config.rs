use anyhow::Result;
use std::env;
use std::path::Path;

use crate::commands::CommandReport;
use crate::store::config::{load_config, resolve_config_path, unknown_env_keys};

include!(concat!(env!("OUT_DIR"), "/archlink_env_allowlist.rs"));

fn known_keys() -> Vec<&'static str> {
    GENERATED_ENV_ALLOWLIST.iter().map(|(key, _)| *key).collect()
}

pub fn run(dotenv: Option<&Path>) -> Result<CommandReport> {
    let mut report = CommandReport::new("config");

    match dotenv {
        Some(path) => report.detail(format!("dotenv={}", path.display())),
        None => report.detail("dotenv=none"),
    }

    match resolve_config_path() {
        Some(path) if path.exists() => report.detail(format!("config_file={}", path.display())),
        Some(path) => report.detail(format!("config_file={} (absent)", path.display())),
        None => report.detail("config_file=none (home directory unresolved)"),
    }

    let cfg = load_config()?;
    let show = |p: &Option<std::path::PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "unset".to_string())
    };
    report.detail(format!("paths.working_dir={}", show(&cfg.paths.working_dir)));
    report.detail(format!("paths.archive_dir={}", show(&cfg.paths.archive_dir)));
    report.detail(format!("verify.block_size={}", cfg.verify.block_size));
    report.detail(format!("reconcile.dry_run={}", cfg.reconcile.dry_run));
    for (key, readers) in GENERATED_ENV_ALLOWLIST {
        let state = if env::var_os(key).is_some() { "set" } else { "unset" };
        report.detail(format!("env.{key}={state} (read in {readers})"));
    }

    let present = env::vars_os().filter_map(|(key, _)| key.into_string().ok());
    for key in unknown_env_keys(present, &known_keys()) {
        report.issue(format!("unrecognized environment variable {key}"));
    }

    Ok(report)
}
