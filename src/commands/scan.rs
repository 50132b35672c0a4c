use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::commands::{CommandReport, require_dir};
use crate::store::config::load_config;
use crate::store::locate::find_dataset_roots;
use crate::store::version::{VersionId, list_versions, read_latest_link};

fn describe_dataset(base: &Path, root: &Path) -> Result<String> {
    let versions = list_versions(root)?;
    let names = versions
        .iter()
        .map(VersionId::name)
        .collect::<Vec<_>>()
        .join(",");
    let latest = read_latest_link(root)?
        .map(|target| target.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    let relative = root.strip_prefix(base).unwrap_or(root);
    let shown = if relative.as_os_str().is_empty() {
        ".".to_string()
    } else {
        relative.display().to_string()
    };
    Ok(format!("dataset={shown} versions={names} latest={latest}"))
}

/// Read-only listing of the datasets found under a tree.
pub fn run(tree: Option<PathBuf>) -> Result<CommandReport> {
    let cfg = load_config()?;
    let tree = require_dir(tree, cfg.paths.working_dir, "tree to scan", "ARCHLINK_WORKING_DIR")?;

    let mut report = CommandReport::new("scan");
    report.detail(format!("tree={}", tree.display()));
    if !tree.is_dir() {
        report.issue(format!("top-level directory does not exist: {}", tree.display()));
        return Ok(report);
    }

    let scan = find_dataset_roots(&tree, VersionId::is_version_name)
        .with_context(|| format!("failed to scan {}", tree.display()))?;
    for (dir, err) in &scan.unreadable {
        report.issue(format!("cannot read {}: {err}", dir.display()));
    }
    let roots = scan.roots;
    for root in &roots {
        match describe_dataset(&tree, root) {
            Ok(line) => report.detail(line),
            Err(err) => report.issue(format!("cannot read dataset {}: {err:#}", root.display())),
        }
    }
    report.detail(format!("datasets={}", roots.len()));
    Ok(report)
}
