use crate::store::verify::DEFAULT_BLOCK_SIZE;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

const MAX_BLOCK_SIZE: usize = 64 * 1024 * 1024;
pub const ENV_PREFIX: &str = "ARCHLINK_";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub working_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerifyConfig {
    pub block_size: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ReconcileConfig {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ArchlinkConfig {
    pub paths: PathsConfig,
    pub verify: VerifyConfig,
    pub reconcile: ReconcileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialArchlinkConfig {
    paths: Option<PathsConfig>,
    verify: Option<VerifyConfig>,
    reconcile: Option<ReconcileConfig>,
}

fn env_or_usize(lookup: &dyn Fn(&str) -> Option<String>, var: &str, fallback: usize) -> usize {
    match lookup(var) {
        Some(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        None => fallback,
    }
}

fn env_or_bool(lookup: &dyn Fn(&str) -> Option<String>, var: &str, fallback: bool) -> bool {
    match lookup(var) {
        Some(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        None => fallback,
    }
}

fn env_or_path(
    lookup: &dyn Fn(&str) -> Option<String>,
    var: &str,
    fallback: Option<PathBuf>,
) -> Option<PathBuf> {
    match lookup(var) {
        Some(v) if !v.trim().is_empty() => Some(PathBuf::from(v.trim())),
        _ => fallback,
    }
}

pub fn check_block_size(block: usize) -> Result<()> {
    if block == 0 || block > MAX_BLOCK_SIZE {
        return Err(anyhow!(
            "invalid verify block size {block}: require 1 <= block_size <= {MAX_BLOCK_SIZE}"
        ));
    }
    Ok(())
}

fn validate(cfg: &ArchlinkConfig) -> Result<()> {
    check_block_size(cfg.verify.block_size)
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("ARCHLINK_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".archlink").join("config.toml"))
}

fn merge_file_config(base: &mut ArchlinkConfig, raw: &str, origin: &str) -> Result<()> {
    let parsed: PartialArchlinkConfig = toml::from_str(raw)
        .map_err(|err| anyhow!("failed to parse archlink config {origin}: {err}"))?;
    if let Some(paths) = parsed.paths {
        base.paths = paths;
    }
    if let Some(verify) = parsed.verify {
        base.verify = verify;
    }
    if let Some(reconcile) = parsed.reconcile {
        base.reconcile = reconcile;
    }
    Ok(())
}

fn apply_env(cfg: &mut ArchlinkConfig, lookup: &dyn Fn(&str) -> Option<String>) {
    cfg.paths.working_dir = env_or_path(
        lookup,
        "ARCHLINK_WORKING_DIR",
        cfg.paths.working_dir.take(),
    );
    cfg.paths.archive_dir = env_or_path(
        lookup,
        "ARCHLINK_ARCHIVE_DIR",
        cfg.paths.archive_dir.take(),
    );
    cfg.verify.block_size = env_or_usize(lookup, "ARCHLINK_BLOCK_SIZE", cfg.verify.block_size);
    cfg.reconcile.dry_run = env_or_bool(lookup, "ARCHLINK_DRY_RUN", cfg.reconcile.dry_run);
}

fn build_config(
    file: Option<(&str, &str)>,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<ArchlinkConfig> {
    let mut cfg = ArchlinkConfig::default();
    if let Some((origin, raw)) = file {
        merge_file_config(&mut cfg, raw, origin)?;
    }
    apply_env(&mut cfg, lookup);
    validate(&cfg)?;
    Ok(cfg)
}

/// Defaults, then the TOML file, then `ARCHLINK_*` environment overrides.
pub fn load_config() -> Result<ArchlinkConfig> {
    let lookup = |var: &str| env::var(var).ok();
    let Some(path) = resolve_config_path().filter(|p| p.exists()) else {
        return build_config(None, &lookup);
    };

    let raw = fs::read_to_string(&path)
        .map_err(|err| anyhow!("failed to read archlink config {}: {err}", path.display()))?;
    let origin = path.display().to_string();
    build_config(Some((origin.as_str(), raw.as_str())), &lookup)
}

/// `ARCHLINK_*` variables present in the environment but not understood.
pub fn unknown_env_keys<I>(present: I, known: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = present
        .into_iter()
        .filter(|key| key.starts_with(ENV_PREFIX) && !known.contains(&key.as_str()))
        .collect();
    out.sort();
    out
}
