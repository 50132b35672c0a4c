use crate::error::{StoreError, StoreResult};
use crate::store::archive::ArchiveState;
use crate::store::locate::find_dataset_roots;
use crate::store::mutate::{create_symlink, delete_directory, link_target, links_to};
use crate::store::report::Reporter;
use crate::store::verify::{DEFAULT_BLOCK_SIZE, compare_directories};
use crate::store::version::{self, VersionId};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub block_size: usize,
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOutcome {
    /// Older than archive latest; replaced by a link into the archive.
    Relinked,
    /// Equal to archive latest and verified identical; replaced by a link.
    Deduplicated,
    AlreadyLinked,
    /// Equal to archive latest but different content; left in place.
    Diverged,
    AwaitingIngestion,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dry_run: bool,
    pub datasets: usize,
    pub datasets_skipped: usize,
    pub relinked: usize,
    pub deduplicated: usize,
    pub already_linked: usize,
    pub diverged: usize,
    pub awaiting_ingestion: usize,
    pub failed: usize,
    pub unreadable_dirs: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: VersionOutcome) {
        match outcome {
            VersionOutcome::Relinked => self.relinked += 1,
            VersionOutcome::Deduplicated => self.deduplicated += 1,
            VersionOutcome::AlreadyLinked => self.already_linked += 1,
            VersionOutcome::Diverged => self.diverged += 1,
            VersionOutcome::AwaitingIngestion => self.awaiting_ingestion += 1,
            VersionOutcome::Failed => self.failed += 1,
        }
    }

    pub fn mutations(&self) -> usize {
        self.relinked + self.deduplicated
    }
}

pub struct Reconciler<'a> {
    working_base: PathBuf,
    archive_base: PathBuf,
    options: ReconcileOptions,
    reporter: &'a dyn Reporter,
}

fn canonical_base(path: &Path, reporter: &dyn Reporter) -> StoreResult<PathBuf> {
    if !path.is_dir() {
        reporter.error(&format!(
            "top-level directory does not exist: {}",
            path.display()
        ));
        return Err(StoreError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    fs::canonicalize(path).map_err(|err| StoreError::io(path, err))
}

impl<'a> Reconciler<'a> {
    /// Fails before any dataset is looked at unless both bases are distinct,
    /// non-nested directories.
    pub fn new(
        working_base: &Path,
        archive_base: &Path,
        options: ReconcileOptions,
        reporter: &'a dyn Reporter,
    ) -> StoreResult<Self> {
        let working_base = canonical_base(working_base, reporter)?;
        let archive_base = canonical_base(archive_base, reporter)?;
        // starts_with also covers equal paths.
        if working_base.starts_with(&archive_base) || archive_base.starts_with(&working_base) {
            let err = StoreError::OverlappingBases {
                working: working_base,
                archive: archive_base,
            };
            reporter.error(&format!("{err}; refusing to reconcile"));
            return Err(err);
        }
        Ok(Self {
            working_base,
            archive_base,
            options,
            reporter,
        })
    }

    pub fn working_base(&self) -> &Path {
        &self.working_base
    }

    pub fn archive_base(&self) -> &Path {
        &self.archive_base
    }

    pub fn run(&self) -> StoreResult<RunSummary> {
        let mut summary = RunSummary {
            dry_run: self.options.dry_run,
            ..RunSummary::default()
        };

        let scan = find_dataset_roots(&self.working_base, VersionId::is_version_name)?;
        for (dir, err) in &scan.unreadable {
            summary.unreadable_dirs += 1;
            self.reporter.error(&format!(
                "cannot read {}; not searched for datasets: {err}",
                dir.display()
            ));
        }

        let roots = scan.roots;
        if roots.is_empty() {
            self.reporter.error(&format!(
                "no content found in directory: {}",
                self.working_base.display()
            ));
        }

        for working_root in roots {
            summary.datasets += 1;
            if let Err(err) = self.reconcile_dataset(&working_root, &mut summary) {
                summary.datasets_skipped += 1;
                self.reporter.error(&format!(
                    "skipping dataset {}: {err}",
                    working_root.display()
                ));
            }
        }

        Ok(summary)
    }

    pub fn archive_root_for(&self, working_root: &Path) -> PathBuf {
        match working_root.strip_prefix(&self.working_base) {
            Ok(relative) => self.archive_base.join(relative),
            Err(_) => self.archive_base.clone(),
        }
    }

    fn reconcile_dataset(&self, working_root: &Path, summary: &mut RunSummary) -> StoreResult<()> {
        let archive = ArchiveState::load_reported(&self.archive_root_for(working_root), self.reporter)?;
        let Some(latest) = archive.latest() else {
            summary.datasets_skipped += 1;
            self.reporter.warning(&format!(
                "archive state for {} is invalid; dataset left untouched",
                working_root.display()
            ));
            return Ok(());
        };

        let versions = version::list_versions(working_root)?;
        for v in versions.iter().rev() {
            let outcome = self.reconcile_version(working_root, &archive, latest, *v);
            summary.record(outcome);
        }
        Ok(())
    }

    fn reconcile_version(
        &self,
        working_root: &Path,
        archive: &ArchiveState,
        latest: VersionId,
        v: VersionId,
    ) -> VersionOutcome {
        let gv = working_root.join(v.name());
        let av = archive.root.join(v.name());
        self.reporter
            .info(&format!("working on {} and {}", gv.display(), av.display()));

        let result = match v.cmp(&latest) {
            Ordering::Less => self.reconcile_stale(&gv, &av),
            Ordering::Equal => {
                let outcome = self.reconcile_current(&gv, &av);
                self.reporter.warning(&format!("    {}", archive.describe_latest()));
                self.reporter
                    .warning(&format!("    working {}", version::describe_latest(working_root)));
                outcome
            }
            Ordering::Greater => {
                self.reporter.warning(&format!(
                    "working version is newer than archive: {} newer than {}",
                    gv.display(),
                    archive.root.join(latest.name()).display()
                ));
                self.reporter
                    .warning(&format!("    working {}", version::describe_latest(working_root)));
                Ok(VersionOutcome::AwaitingIngestion)
            }
        };

        result.unwrap_or_else(|err| {
            self.reporter
                .error(&format!("failed to reconcile {}: {err}", gv.display()));
            VersionOutcome::Failed
        })
    }

    fn existing_link(&self, gv: &Path, av: &Path) -> StoreResult<Option<VersionOutcome>> {
        if links_to(gv, av)? {
            self.reporter.info(&format!(
                "{} correctly points to: {}",
                gv.display(),
                av.display()
            ));
            return Ok(Some(VersionOutcome::AlreadyLinked));
        }
        if let Some(other) = link_target(gv)? {
            self.reporter.error(&format!(
                "{} is a symlink to {} rather than {}; leaving it untouched",
                gv.display(),
                other.display(),
                av.display()
            ));
            return Ok(Some(VersionOutcome::Failed));
        }
        Ok(None)
    }

    fn reconcile_stale(&self, gv: &Path, av: &Path) -> StoreResult<VersionOutcome> {
        if let Some(outcome) = self.existing_link(gv, av)? {
            return Ok(outcome);
        }
        if !av.is_dir() {
            self.reporter.error(&format!(
                "archive copy is missing: {}; not deleting {}",
                av.display(),
                gv.display()
            ));
            return Ok(VersionOutcome::Failed);
        }

        self.replace_with_link(gv, av)?;
        self.reporter.warning(&format!(
            "[ACTION] deleted old version in working tree: {}",
            gv.display()
        ));
        Ok(VersionOutcome::Relinked)
    }

    fn reconcile_current(&self, gv: &Path, av: &Path) -> StoreResult<VersionOutcome> {
        if let Some(outcome) = self.existing_link(gv, av)? {
            return Ok(outcome);
        }

        let comparison = match compare_directories(gv, av, self.options.block_size) {
            Ok(comparison) => comparison,
            Err(err) => {
                self.reporter.error(&format!(
                    "could not verify {} against {}: {err}",
                    gv.display(),
                    av.display()
                ));
                return Ok(VersionOutcome::Failed);
            }
        };

        if !comparison.is_equal() {
            for line in comparison.describe(gv, av) {
                self.reporter.error(&line);
            }
            self.reporter.warning(&format!(
                "{} differs from archive ({} mismatches); leaving it in place",
                gv.display(),
                comparison.mismatch_count()
            ));
            return Ok(VersionOutcome::Diverged);
        }

        self.reporter.info(&format!(
            "{} matches archive copy ({} files verified)",
            gv.display(),
            comparison.files_checked
        ));
        self.replace_with_link(gv, av)?;
        self.reporter.warning(&format!(
            "[ACTION] deleted {} and symlinked to: {}",
            gv.display(),
            av.display()
        ));
        Ok(VersionOutcome::Deduplicated)
    }

    // The link path must be free before the symlink is created.
    fn replace_with_link(&self, gv: &Path, av: &Path) -> StoreResult<()> {
        if self.options.dry_run {
            self.reporter.warning(&format!(
                "[DRY-RUN] would delete {} and symlink it to: {}",
                gv.display(),
                av.display()
            ));
            return Ok(());
        }

        self.reporter
            .warning(&format!("deleting files in: {}", gv.display()));
        let removed = delete_directory(gv)?;
        self.reporter.warning(&format!(
            "deleted directory {} ({removed} files)",
            gv.display()
        ));
        create_symlink(av, gv)?;
        self.reporter.warning(&format!(
            "symlinked {} to: {}",
            gv.display(),
            av.display()
        ));
        Ok(())
    }
}
